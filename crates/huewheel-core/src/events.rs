//! Engine change notifications.
//!
//! The engine fires two events: "markers changed" after every incremental
//! mutation of the marker set, and "commit" once a logical interaction
//! settles (drag released, mode changed, slider released). Listeners
//! receive the current set and re-read whatever state they need; delivery
//! order among listeners is unspecified.

use std::fmt;

use crate::marker::HarmonySet;

/// Handle identifying a subscribed listener, for unsubscribing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Callback = Box<dyn FnMut(&HarmonySet)>;

/// Registry for the engine's two events.
#[derive(Default)]
pub struct EventDispatcher {
    markers_changed: Vec<(ListenerId, Callback)>,
    commit: Vec<(ListenerId, Callback)>,
    next_id: u64,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&mut self) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Subscribe to "markers changed".
    pub fn on_markers_changed(&mut self, listener: impl FnMut(&HarmonySet) + 'static) -> ListenerId {
        let id = self.next_id();
        self.markers_changed.push((id, Box::new(listener)));
        id
    }

    /// Subscribe to "commit".
    pub fn on_commit(&mut self, listener: impl FnMut(&HarmonySet) + 'static) -> ListenerId {
        let id = self.next_id();
        self.commit.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener from whichever event it subscribed to.
    /// Returns whether a listener was removed.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.markers_changed.len() + self.commit.len();
        self.markers_changed.retain(|(listener, _)| *listener != id);
        self.commit.retain(|(listener, _)| *listener != id);
        self.markers_changed.len() + self.commit.len() < before
    }

    pub(crate) fn emit_markers_changed(&mut self, set: &HarmonySet) {
        for (_, listener) in &mut self.markers_changed {
            listener(set);
        }
    }

    pub(crate) fn emit_commit(&mut self, set: &HarmonySet) {
        for (_, listener) in &mut self.commit {
            listener(set);
        }
    }
}

impl fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("markers_changed", &self.markers_changed.len())
            .field("commit", &self.commit.len())
            .finish()
    }
}
