// Only allow lints that are either transitive-dependency noise or
// genuinely opinionated style choices that don't indicate real issues.
#![allow(
    // Transitive dependency version mismatches we can't control
    clippy::multiple_crate_versions,
    // module_name_repetitions is pure style preference (e.g. editor::EditorId)
    clippy::module_name_repetitions
)]

//! # Tandem
//!
//! Core library for mirrored editor instances.
//!
//! Tandem provides the two pieces of machinery a split-view editor widget
//! needs underneath its rendering layer:
//!
//! - A **debounce scheduler**: bursts of requests for the same kind of work
//!   (reparses, refreshes) collapse into a single delayed execution; only
//!   the latest request survives a busy window.
//! - A **follow graph**: editor instances can follow one another, share a
//!   document reference, and mirror each other's shareable sub-components
//!   (panels, features) with per-slot propagation.
//!
//! Rendering, text-editing commands, and highlighting are explicitly not
//! here — the host widget owns those and feeds events in through
//! [`editor::Editor`]'s notify methods.
//!
//! ## Concurrency model
//!
//! Everything is single-threaded and poll-driven. The scheduler holds no
//! timer; the host loop injects time and decides when to fire. Cross-editor
//! links are weak references, so instance lifetime stays with the host.
//!
//! ## Modules
//!
//! - [`scheduler`]: debounced job execution
//! - [`editor`]: editor instances and the follow graph
//! - [`document`]: the shared rope-backed document
//! - [`managers`]: shareable sub-components (panels, features)
//! - [`events`]: the editor event surface
//! - [`watcher`]: file watching for the harness watch mode
//! - [`script`]: deterministic harness scripts
//! - [`config`]: settings persistence

pub mod config;
pub mod document;
pub mod editor;
pub mod events;
pub mod managers;
pub mod perf;
pub mod scheduler;
pub mod script;
pub mod watcher;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::document::{Document, DocumentRef};
    pub use crate::editor::{Editor, EditorId};
    pub use crate::managers::{
        Feature, FeaturesManager, Panel, PanelPosition, PanelsManager, ShareKey, Shareable,
    };
    pub use crate::scheduler::{DelayJobRunner, Job};
}
