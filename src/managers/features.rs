//! Feature registry for one editor instance.

use std::any::Any;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

use super::{ShareError, ShareKey, Shareable};

/// A named editor capability (auto-indent, occurrence highlighting, ...).
/// Behavior lives in the host; this registry only tracks installation and
/// the enabled flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feature {
    pub name: String,
    pub enabled: bool,
}

impl Feature {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            enabled: true,
        }
    }
}

/// Registry of the features installed on one editor, with its own mirroring
/// slot (see [`PanelsManager`](super::PanelsManager) for the linking rules).
pub struct FeaturesManager {
    entries: RefCell<Vec<Feature>>,
    shared: RefCell<Option<Weak<FeaturesManager>>>,
}

impl FeaturesManager {
    const TYPE_LABEL: &'static str = "FeaturesManager";

    pub fn new() -> Rc<Self> {
        Rc::new(Self {
            entries: RefCell::new(Vec::new()),
            shared: RefCell::new(None),
        })
    }

    /// Install a feature, replacing any existing feature with the same name.
    pub fn install(&self, feature: Feature) {
        let mut entries = self.entries.borrow_mut();
        if let Some(existing) = entries.iter_mut().find(|f| f.name == feature.name) {
            *existing = feature;
        } else {
            entries.push(feature);
        }
    }

    /// Remove a feature by name. Returns false if it was not installed.
    pub fn uninstall(&self, name: &str) -> bool {
        let mut entries = self.entries.borrow_mut();
        let before = entries.len();
        entries.retain(|f| f.name != name);
        entries.len() != before
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.borrow().iter().any(|f| f.name == name)
    }

    pub fn get(&self, name: &str) -> Option<Feature> {
        self.entries.borrow().iter().find(|f| f.name == name).cloned()
    }

    /// Toggle a feature. Returns false if the feature is unknown.
    pub fn set_enabled(&self, name: &str, enabled: bool) -> bool {
        let mut entries = self.entries.borrow_mut();
        match entries.iter_mut().find(|f| f.name == name) {
            Some(feature) => {
                feature.enabled = enabled;
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

    /// The features manager currently mirrored, if it is still alive.
    pub fn shared_reference(&self) -> Option<Rc<Self>> {
        self.shared.borrow().as_ref()?.upgrade()
    }

    pub fn clear_shared_reference(&self) {
        *self.shared.borrow_mut() = None;
    }
}

impl Shareable for FeaturesManager {
    fn key(&self) -> ShareKey {
        ShareKey::Features
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
