//! The follow graph: who mirrors whom, and what propagates when they do.
//!
//! Followers are back-references: `a.following(&b)` holds exactly when `a`
//! sits in `b`'s follower set. The set is identity-keyed and weak — an
//! editor registers interest at most once, and a dropped follower disappears
//! on the next access instead of dangling.

use std::rc::{Rc, Weak};

use crate::managers::{ShareError, ShareKey};

use super::{Editor, EditorId, EditorInner};

/// Identity-keyed weak set of follower back-references, in insertion order.
pub(crate) struct FollowerSet {
    entries: Vec<(EditorId, Weak<EditorInner>)>,
}

impl FollowerSet {
    pub(crate) const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Register a follower. Returns false if it was already registered.
    pub(crate) fn insert(&mut self, id: EditorId, editor: Weak<EditorInner>) -> bool {
        if self.contains(id) {
            return false;
        }
        self.entries.push((id, editor));
        true
    }

    /// Remove a follower. Returns false if it was not registered.
    pub(crate) fn remove(&mut self, id: EditorId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry_id, _)| *entry_id != id);
        self.entries.len() != before
    }

    pub(crate) fn contains(&self, id: EditorId) -> bool {
        self.entries.iter().any(|(entry_id, _)| *entry_id == id)
    }

    /// Upgrade all live followers, pruning entries whose editor was dropped.
    pub(crate) fn live(&mut self) -> Vec<Rc<EditorInner>> {
        let mut live = Vec::with_capacity(self.entries.len());
        self.entries.retain(|(_, weak)| match weak.upgrade() {
            Some(inner) => {
                live.push(inner);
                true
            }
            None => false,
        });
        live
    }
}

impl Editor {
    /// Start mirroring `other`: register this editor in `other`'s follower
    /// set and alias this editor's document to `other`'s.
    ///
    /// Redundant calls are idempotent. With `follow_back`, `other` is also
    /// registered as a follower of this editor — that direction only records
    /// the relationship and does not touch `other`'s document.
    pub fn follow(&self, other: &Editor, follow_back: bool) {
        let inserted = other
            .inner
            .followers
            .borrow_mut()
            .insert(self.id(), self.downgrade());
        if inserted {
            tracing::debug!(follower = %self.id(), source = %other.id(), "follow");
        }
        self.set_document(other.document());

        if follow_back {
            other.follow_link_only(self);
        }
    }

    /// Register `follower` without document aliasing (the `follow_back` leg).
    fn follow_link_only(&self, other: &Editor) {
        other
            .inner
            .followers
            .borrow_mut()
            .insert(self.id(), self.downgrade());
    }

    /// Stop following `other`. A relationship that does not exist is a
    /// silent no-op. With `unfollow_back`, also removes `other` from this
    /// editor's follower set.
    pub fn unfollow(&self, other: &Editor, unfollow_back: bool) {
        if self.following(other) {
            other.inner.followers.borrow_mut().remove(self.id());
            tracing::debug!(follower = %self.id(), source = %other.id(), "unfollow");
        }
        if unfollow_back && other.following(self) {
            self.inner.followers.borrow_mut().remove(other.id());
        }
    }

    /// True iff this editor is registered in `other`'s follower set.
    pub fn following(&self, other: &Editor) -> bool {
        other.inner.followers.borrow().contains(self.id())
    }

    /// Live followers of this editor, pruning any that were dropped.
    pub fn followers(&self) -> Vec<Editor> {
        self.inner
            .followers
            .borrow_mut()
            .live()
            .into_iter()
            .map(Editor::from_inner)
            .collect()
    }

    /// True iff at least one live editor follows this one.
    pub fn is_followed(&self) -> bool {
        !self.followers().is_empty()
    }

    /// Declare `other` as this editor's mirror source and propagate shared
    /// sub-component state.
    ///
    /// Each of `other`'s shareable slots is offered, in slot order, to this
    /// editor's component for the same slot. A component that rejects the
    /// source (wrong concrete type) is recorded in the returned outcome list
    /// and logged; later slots still propagate. Replacing an earlier mirror
    /// source does not unwind anything that source propagated, and does not
    /// touch any follower set.
    pub fn set_shared_reference(
        &self,
        other: &Editor,
    ) -> Vec<(ShareKey, Result<(), ShareError>)> {
        *self.inner.shared_reference.borrow_mut() = Some(other.downgrade());
        tracing::debug!(editor = %self.id(), source = %other.id(), "mirror");

        let mut outcomes = Vec::with_capacity(ShareKey::ALL.len());
        for (key, source) in other.shareables() {
            let target = self.shareable(key);
            let result = target.adopt_shared(&source);
            if let Err(err) = &result {
                tracing::warn!(
                    editor = %self.id(),
                    key = %key,
                    error = %err,
                    "shared reference propagation rejected; continuing with remaining slots"
                );
            }
            outcomes.push((key, result));
        }
        outcomes
    }

    /// The editor this one is currently mirroring, if any and still alive.
    pub fn shared_reference(&self) -> Option<Editor> {
        self.inner
            .shared_reference
            .borrow()
            .as_ref()?
            .upgrade()
            .map(Editor::from_inner)
    }

    /// Forget the mirror source. Sub-component state propagated when the
    /// source was set is deliberately left in place; sub-components manage
    /// their own unlinking.
    pub fn clear_shared_reference(&self) {
        *self.inner.shared_reference.borrow_mut() = None;
    }
}
