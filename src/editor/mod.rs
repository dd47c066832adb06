//! Editor instances and their mirroring relationships.
//!
//! An [`Editor`] is the core's view of one editor widget: a shared document
//! reference, two shareable sub-component slots (panels, features), an event
//! surface, and the follow-graph state. The handle is cheap to clone; all
//! cross-instance links (followers, mirror sources) are weak, so instance
//! lifetime stays with the host.

mod follow;

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::document::{Document, DocumentRef};
use crate::events::{
    DocumentChange, EditorEvents, KeyEvent, MouseEvent, Point, Size, WheelDelta,
};
use crate::managers::{
    FeaturesManager, ManagerError, PanelsManager, ShareKey, Shareable,
};

use follow::FollowerSet;

static NEXT_EDITOR_ID: AtomicU64 = AtomicU64::new(0);

/// Stable identity for an editor instance, independent of its address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EditorId(u64);

impl EditorId {
    fn next() -> Self {
        Self(NEXT_EDITOR_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for EditorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "editor#{}", self.0)
    }
}

pub(crate) struct EditorInner {
    id: EditorId,
    document: RefCell<DocumentRef>,
    panels: RefCell<Rc<dyn Shareable>>,
    features: RefCell<Rc<dyn Shareable>>,
    followers: RefCell<FollowerSet>,
    shared_reference: RefCell<Option<Weak<EditorInner>>>,
    events: EditorEvents,
    last_mouse_pos: Cell<Point>,
}

/// Cheap-clone handle to one editor instance.
#[derive(Clone)]
pub struct Editor {
    inner: Rc<EditorInner>,
}

impl Editor {
    /// Create an editor with an empty document and stock managers.
    pub fn new() -> Self {
        Self::with_document(Document::shared(""))
    }

    /// Create an editor over an existing (possibly shared) document.
    pub fn with_document(document: DocumentRef) -> Self {
        Self {
            inner: Rc::new(EditorInner {
                id: EditorId::next(),
                document: RefCell::new(document),
                panels: RefCell::new(PanelsManager::new() as Rc<dyn Shareable>),
                features: RefCell::new(FeaturesManager::new() as Rc<dyn Shareable>),
                followers: RefCell::new(FollowerSet::new()),
                shared_reference: RefCell::new(None),
                events: EditorEvents::new(),
                last_mouse_pos: Cell::new(Point::default()),
            }),
        }
    }

    pub fn id(&self) -> EditorId {
        self.inner.id
    }

    pub fn events(&self) -> &EditorEvents {
        &self.inner.events
    }

    pub(crate) fn downgrade(&self) -> Weak<EditorInner> {
        Rc::downgrade(&self.inner)
    }

    pub(crate) fn from_inner(inner: Rc<EditorInner>) -> Self {
        Self { inner }
    }

    // --- document ---

    /// Handle to this editor's document. Cloning the handle aliases it.
    pub fn document(&self) -> DocumentRef {
        Rc::clone(&self.inner.document.borrow())
    }

    /// Rebind this editor to another document reference.
    pub fn set_document(&self, document: DocumentRef) {
        let revision = document.borrow().revision();
        *self.inner.document.borrow_mut() = document;
        self.inner
            .events
            .document_changed
            .emit(&DocumentChange { revision });
    }

    /// Replace the document text, notifying `text_set` and
    /// `document_changed` subscribers.
    pub fn set_text(&self, text: &str) {
        let revision = {
            let doc = self.document();
            let mut doc = doc.borrow_mut();
            doc.set_text(text);
            doc.revision()
        };
        self.inner.events.text_set.emit(&text.to_owned());
        self.inner
            .events
            .document_changed
            .emit(&DocumentChange { revision });
    }

    pub fn text(&self) -> String {
        self.document().borrow().text()
    }

    // --- shareable slots ---

    /// The stock panels manager, unless the slot was replaced with a custom
    /// component.
    pub fn panels(&self) -> Option<Rc<PanelsManager>> {
        Rc::clone(&self.inner.panels.borrow())
            .as_any_rc()
            .downcast::<PanelsManager>()
            .ok()
    }

    /// The stock features manager, unless the slot was replaced with a
    /// custom component.
    pub fn features(&self) -> Option<Rc<FeaturesManager>> {
        Rc::clone(&self.inner.features.borrow())
            .as_any_rc()
            .downcast::<FeaturesManager>()
            .ok()
    }

    /// The component occupying `key`'s slot.
    pub fn shareable(&self, key: ShareKey) -> Rc<dyn Shareable> {
        match key {
            ShareKey::Panels => Rc::clone(&self.inner.panels.borrow()),
            ShareKey::Features => Rc::clone(&self.inner.features.borrow()),
        }
    }

    /// All shareable slots, in propagation order.
    pub fn shareables(&self) -> [(ShareKey, Rc<dyn Shareable>); 2] {
        [
            (ShareKey::Panels, self.shareable(ShareKey::Panels)),
            (ShareKey::Features, self.shareable(ShareKey::Features)),
        ]
    }

    /// Replace the component in `key`'s slot.
    ///
    /// # Errors
    ///
    /// Returns [`ManagerError::InvalidKind`] when `component` declares a
    /// different slot than `key`; the slot keeps its current component.
    pub fn replace_shareable(
        &self,
        key: ShareKey,
        component: Rc<dyn Shareable>,
    ) -> Result<(), ManagerError> {
        if component.key() != key {
            return Err(ManagerError::InvalidKind {
                slot: key,
                found: component.type_label(),
            });
        }
        let slot = match key {
            ShareKey::Panels => &self.inner.panels,
            ShareKey::Features => &self.inner.features,
        };
        *slot.borrow_mut() = component;
        Ok(())
    }

    // --- event dispatch (called by the host widget) ---

    pub fn notify_resized(&self, size: Size) {
        self.inner.events.resized.emit(&size);
    }

    /// Signal a state refresh, mirroring the host widget's update cycle.
    pub fn notify_updated(&self) {
        self.inner.events.updated.emit(&());
    }

    /// Forward a key press before the host processes it.
    pub fn notify_key_pressed(&self, event: KeyEvent) {
        self.inner.events.key_pressed.emit(&event);
    }

    /// Forward a key press after the host processed it.
    pub fn notify_post_key_pressed(&self, event: KeyEvent) {
        self.inner.events.post_key_pressed.emit(&event);
    }

    pub fn notify_key_released(&self, event: KeyEvent) {
        self.inner.events.key_released.emit(&event);
    }

    /// Forward pointer movement; the position is remembered for
    /// [`last_mouse_pos`](Editor::last_mouse_pos).
    pub fn notify_mouse_moved(&self, event: MouseEvent) {
        self.inner.events.mouse_moved.emit(&event);
        self.inner.last_mouse_pos.set(event.pos);
    }

    pub fn notify_mouse_released(&self, event: MouseEvent) {
        self.inner.events.mouse_released.emit(&event);
    }

    pub fn notify_mouse_double_clicked(&self, event: MouseEvent) {
        self.inner.events.mouse_double_clicked.emit(&event);
    }

    pub fn notify_wheel(&self, delta: WheelDelta) {
        self.inner.events.wheel.emit(&delta);
    }

    /// The last pointer position seen by [`notify_mouse_moved`](Editor::notify_mouse_moved).
    pub fn last_mouse_pos(&self) -> Point {
        self.inner.last_mouse_pos.get()
    }
}

impl Default for Editor {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for Editor {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Editor {}

impl fmt::Debug for Editor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Editor").field("id", &self.inner.id).finish()
    }
}
