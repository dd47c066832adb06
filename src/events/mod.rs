//! Editor event surface.
//!
//! A minimal single-threaded pub/sub primitive plus the bundle of signals an
//! editor instance re-emits to its consumers: resize, key, mouse, wheel,
//! text-set, and document-changed notifications. The host widget pushes
//! events in; subscribers (completion popups, rulers, sibling views) listen
//! without the editor knowing about them.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Identifies one subscriber connection on a [`Signal`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Handler<T> = Rc<dyn Fn(&T)>;

/// A single-threaded signal: connect handlers, emit payloads.
///
/// Emission iterates over a snapshot of the subscriber list, so a handler
/// may connect or disconnect subscribers (including itself) while the signal
/// is being delivered.
pub struct Signal<T> {
    next_id: Cell<u64>,
    handlers: RefCell<Vec<(SubscriptionId, Handler<T>)>>,
}

impl<T> Signal<T> {
    pub fn new() -> Self {
        Self {
            next_id: Cell::new(0),
            handlers: RefCell::new(Vec::new()),
        }
    }

    /// Register a handler; the returned id can be passed to [`disconnect`].
    ///
    /// [`disconnect`]: Signal::disconnect
    pub fn connect(&self, handler: impl Fn(&T) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.handlers.borrow_mut().push((id, Rc::new(handler)));
        id
    }

    /// Remove a handler. Returns false if the id was already disconnected.
    pub fn disconnect(&self, id: SubscriptionId) -> bool {
        let mut handlers = self.handlers.borrow_mut();
        let before = handlers.len();
        handlers.retain(|(sub, _)| *sub != id);
        handlers.len() != before
    }

    /// Deliver `payload` to every currently connected handler.
    pub fn emit(&self, payload: &T) {
        // Snapshot so handlers can mutate the subscriber list mid-delivery.
        let snapshot: Vec<Handler<T>> = self
            .handlers
            .borrow()
            .iter()
            .map(|(_, handler)| Rc::clone(handler))
            .collect();
        for handler in snapshot {
            handler(payload);
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.handlers.borrow().len()
    }
}

impl<T> Default for Signal<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// A point in widget coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

/// Viewport size reported through [`EditorEvents::resized`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Size {
    pub width: u16,
    pub height: u16,
}

/// A key chord forwarded from the host widget.
///
/// The key code is the host's native code; this core never interprets it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub code: u32,
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
}

impl KeyEvent {
    pub const fn plain(code: u32) -> Self {
        Self {
            code,
            shift: false,
            ctrl: false,
            alt: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// A pointer event forwarded from the host widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MouseEvent {
    pub pos: Point,
    pub button: Option<MouseButton>,
}

/// Scroll wheel movement in host units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WheelDelta {
    pub x: i32,
    pub y: i32,
}

/// Notification that the shared document changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentChange {
    /// Revision of the document after the change.
    pub revision: u64,
}

/// Signals re-emitted by an editor instance.
///
/// `key_pressed` fires before the host processes the chord and
/// `post_key_pressed` after, so subscribers can observe both sides of the
/// host's own handling.
pub struct EditorEvents {
    pub resized: Signal<Size>,
    pub updated: Signal<()>,
    pub key_pressed: Signal<KeyEvent>,
    pub post_key_pressed: Signal<KeyEvent>,
    pub key_released: Signal<KeyEvent>,
    pub mouse_moved: Signal<MouseEvent>,
    pub mouse_released: Signal<MouseEvent>,
    pub mouse_double_clicked: Signal<MouseEvent>,
    pub wheel: Signal<WheelDelta>,
    pub text_set: Signal<String>,
    pub document_changed: Signal<DocumentChange>,
}

impl EditorEvents {
    pub(crate) fn new() -> Self {
        Self {
            resized: Signal::new(),
            updated: Signal::new(),
            key_pressed: Signal::new(),
            post_key_pressed: Signal::new(),
            key_released: Signal::new(),
            mouse_moved: Signal::new(),
            mouse_released: Signal::new(),
            mouse_double_clicked: Signal::new(),
            wheel: Signal::new(),
            text_set: Signal::new(),
            document_changed: Signal::new(),
        }
    }
}
