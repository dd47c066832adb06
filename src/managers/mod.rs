//! Shareable sub-component managers.
//!
//! An editor exposes a fixed set of named sub-components ("panels",
//! "features"). Each participates in mirror propagation through the
//! [`Shareable`] contract: when an editor starts mirroring another, every
//! slot on the source is offered to the matching slot on the follower, which
//! adopts it as its own shared reference.
//!
//! The contract is deliberately open: alternative manager implementations
//! can occupy a slot, but adoption only succeeds between components of the
//! same concrete type. A mismatch is reported per slot and never aborts
//! propagation of the remaining slots.

mod features;
mod panels;

pub use features::{Feature, FeaturesManager};
pub use panels::{Panel, PanelPosition, PanelsManager};

use std::any::Any;
use std::fmt;
use std::rc::Rc;

use thiserror::Error;

/// Names the fixed shareable slots an editor exposes, in propagation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShareKey {
    Panels,
    Features,
}

impl ShareKey {
    /// All slots, in the order propagation visits them.
    pub const ALL: [Self; 2] = [Self::Panels, Self::Features];

    pub const fn name(self) -> &'static str {
        match self {
            Self::Panels => "panels",
            Self::Features => "features",
        }
    }
}

impl fmt::Display for ShareKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A sub-component rejected a shared reference during propagation.
#[derive(Debug, Error)]
pub enum ShareError {
    #[error("incompatible shareable for `{key}`: expected {expected}, found {found}")]
    Incompatible {
        key: ShareKey,
        expected: &'static str,
        found: &'static str,
    },
}

/// A manager slot was assigned an object of the wrong kind.
#[derive(Debug, Error)]
pub enum ManagerError {
    #[error("invalid manager for `{slot}` slot: expected a {slot} component, found {found}")]
    InvalidKind { slot: ShareKey, found: &'static str },
}

/// Contract for sub-components that participate in mirror propagation.
///
/// Implementors must be single concrete types: adoption downcasts the source
/// to `Self`, so two different implementations of the same slot cannot share
/// state with each other.
pub trait Shareable: Any {
    /// The slot this component occupies on its editor.
    fn key(&self) -> ShareKey;

    /// Concrete type name used in diagnostics.
    fn type_label(&self) -> &'static str;

    /// Upcast for identity-preserving downcasts.
    fn as_any_rc(self: Rc<Self>) -> Rc<dyn Any>;

    /// Adopt `source` as this component's shared reference.
    ///
    /// # Errors
    ///
    /// Returns [`ShareError::Incompatible`] when `source`'s concrete type
    /// does not match this component's. The component's existing shared
    /// reference is left untouched in that case.
    fn adopt_shared(&self, source: &Rc<dyn Shareable>) -> Result<(), ShareError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_share_key_order_is_panels_then_features() {
        assert_eq!(ShareKey::ALL, [ShareKey::Panels, ShareKey::Features]);
    }

    #[test]
    fn test_share_error_names_both_types() {
        let err = ShareError::Incompatible {
            key: ShareKey::Panels,
            expected: "PanelsManager",
            found: "FeaturesManager",
        };
        let message = err.to_string();
        assert!(message.contains("panels"));
        assert!(message.contains("PanelsManager"));
        assert!(message.contains("FeaturesManager"));
    }

    #[test]
    fn test_manager_error_names_expected_slot() {
        let err = ManagerError::InvalidKind {
            slot: ShareKey::Features,
            found: "PanelsManager",
        };
        let message = err.to_string();
        assert!(message.contains("features"));
        assert!(message.contains("PanelsManager"));
    }
}
