//! Panel registry for one editor instance.

use std::any::Any;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

use super::{ShareError, ShareKey, Shareable};

/// Where a panel docks on its editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PanelPosition {
    Top,
    Right,
    Bottom,
    Left,
}

/// A named widget zone entry. How a panel draws itself is the host's
/// business; this registry only tracks placement and visibility.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Panel {
    pub name: String,
    pub position: PanelPosition,
    pub visible: bool,
}

impl Panel {
    pub fn new(name: impl Into<String>, position: PanelPosition) -> Self {
        Self {
            name: name.into(),
            position,
            visible: true,
        }
    }
}

/// Registry of the panels installed on one editor.
///
/// Holds its own mirroring slot: when the owning editor mirrors another,
/// this manager's shared reference points at the source editor's panels
/// manager. The link is non-owning; a dropped source simply reads back as
/// `None`.
pub struct PanelsManager {
    entries: RefCell<Vec<Panel>>,
    shared: RefCell<Option<Weak<PanelsManager>>>,
}

impl PanelsManager {
    const TYPE_LABEL: &'static str = "PanelsManager";

    pub fn new() -> Rc<Self> {
        Rc::new(Self {
            entries: RefCell::new(Vec::new()),
            shared: RefCell::new(None),
        })
    }

    /// Install a panel, replacing any existing panel with the same name.
    pub fn install(&self, panel: Panel) {
        let mut entries = self.entries.borrow_mut();
        if let Some(existing) = entries.iter_mut().find(|p| p.name == panel.name) {
            *existing = panel;
        } else {
            entries.push(panel);
        }
    }

    /// Remove a panel by name. Returns false if it was not installed.
    pub fn uninstall(&self, name: &str) -> bool {
        let mut entries = self.entries.borrow_mut();
        let before = entries.len();
        entries.retain(|p| p.name != name);
        entries.len() != before
    }

    pub fn get(&self, name: &str) -> Option<Panel> {
        self.entries.borrow().iter().find(|p| p.name == name).cloned()
    }

    /// Panels docked at `position`, in installation order.
    pub fn at(&self, position: PanelPosition) -> Vec<Panel> {
        self.entries
            .borrow()
            .iter()
            .filter(|p| p.position == position)
            .cloned()
            .collect()
    }

    /// Set a panel's visibility. Returns false if the panel is unknown.
    pub fn set_visible(&self, name: &str, visible: bool) -> bool {
        let mut entries = self.entries.borrow_mut();
        match entries.iter_mut().find(|p| p.name == name) {
            Some(panel) => {
                panel.visible = visible;
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// The panels manager currently mirrored, if it is still alive.
    pub fn shared_reference(&self) -> Option<Rc<Self>> {
        self.shared.borrow().as_ref()?.upgrade()
    }

    pub fn clear_shared_reference(&self) {
        *self.shared.borrow_mut() = None;
    }
}

impl Shareable for PanelsManager {
    fn key(&self) -> ShareKey {
        ShareKey::Panels
    }

    fn type_label(&self) -> &'static str {
        Self::TYPE_LABEL
    }

    fn as_any_rc(self: Rc<Self>) -> Rc<dyn Any> {
        self
    }

    fn adopt_shared(&self, source: &Rc<dyn Shareable>) -> Result<(), ShareError> {
        match Rc::clone(source).as_any_rc().downcast::<Self>() {
            Ok(concrete) => {
                *self.shared.borrow_mut() = Some(Rc::downgrade(&concrete));
                Ok(())
            }
            Err(_) => Err(ShareError::Incompatible {
                key: self.key(),
                expected: Self::TYPE_LABEL,
                found: source.type_label(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_install_replaces_same_name() {
        let panels = PanelsManager::new();
        panels.install(Panel::new("line-numbers", PanelPosition::Left));
        panels.install(Panel::new("line-numbers", PanelPosition::Right));

        assert_eq!(panels.len(), 1);
        assert_eq!(
            panels.get("line-numbers").map(|p| p.position),
            Some(PanelPosition::Right)
        );
    }

    #[test]
    fn test_uninstall_unknown_is_noop() {
        let panels = PanelsManager::new();
        panels.install(Panel::new("marker", PanelPosition::Left));

        assert!(!panels.uninstall("missing"));
        assert!(panels.uninstall("marker"));
        assert!(panels.is_empty());
    }

    #[test]
    fn test_at_filters_by_position() {
        let panels = PanelsManager::new();
        panels.install(Panel::new("marker", PanelPosition::Left));
        panels.install(Panel::new("line-numbers", PanelPosition::Left));
        panels.install(Panel::new("search", PanelPosition::Top));

        let left = panels.at(PanelPosition::Left);
        assert_eq!(left.len(), 2);
        assert_eq!(left[0].name, "marker");
        assert_eq!(left[1].name, "line-numbers");
    }

    #[test]
    fn test_adopt_shared_links_to_source_by_identity() {
        let target = PanelsManager::new();
        let source = PanelsManager::new();
        let source_dyn: Rc<dyn Shareable> = Rc::clone(&source) as Rc<dyn Shareable>;

        target.adopt_shared(&source_dyn).unwrap();

        let linked = target.shared_reference().expect("source is alive");
        assert!(Rc::ptr_eq(&linked, &source));
    }

    #[test]
    fn test_shared_reference_is_none_after_source_dropped() {
        let target = PanelsManager::new();
        {
            let source = PanelsManager::new();
            let source_dyn: Rc<dyn Shareable> = Rc::clone(&source) as Rc<dyn Shareable>;
            target.adopt_shared(&source_dyn).unwrap();
            assert!(target.shared_reference().is_some());
        }
        assert!(target.shared_reference().is_none());
    }
}
