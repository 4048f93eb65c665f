//! Caller-owned view state.
//!
//! The graph engine keeps nothing between queries. Whatever the UI needs to
//! remember lives here, changed only through explicit messages, and
//! in-flight requests are ordered by generation so a slow, stale response
//! can never overwrite a newer one.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

/// A change to group expansion state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "groupId", rename_all = "camelCase")]
pub enum ViewMessage {
    /// Flip one group.
    Toggle(String),
    /// Expand one group.
    Expand(String),
    /// Collapse one group.
    Collapse(String),
    /// Expand every group.
    ExpandAll,
    /// Collapse the listed groups.
    CollapseAll(Vec<String>),
}

/// Expanded/collapsed flags keyed by group id.
///
/// Groups with no entry are expanded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupExpansion {
    states: BTreeMap<String, bool>,
}

impl GroupExpansion {
    /// Empty state: every group expanded.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `group_id` is expanded.
    #[must_use]
    pub fn is_expanded(&self, group_id: &str) -> bool {
        self.states.get(group_id).copied().unwrap_or(true)
    }

    /// Apply a message. Returns whether anything changed.
    pub fn apply(&mut self, message: ViewMessage) -> bool {
        debug!(?message, "Applying view message");
        match message {
            ViewMessage::Toggle(id) => {
                let next = !self.is_expanded(&id);
                self.states.insert(id, next);
                true
            }
            ViewMessage::Expand(id) => self.set(id, true),
            ViewMessage::Collapse(id) => self.set(id, false),
            ViewMessage::ExpandAll => {
                let changed = self.states.values().any(|expanded| !expanded);
                self.states.clear();
                changed
            }
            ViewMessage::CollapseAll(ids) => ids
                .into_iter()
                .fold(false, |changed, id| self.set(id, false) || changed),
        }
    }

    fn set(&mut self, id: String, expanded: bool) -> bool {
        let changed = self.is_expanded(&id) != expanded;
        self.states.insert(id, expanded);
        changed
    }

    /// Ids of groups explicitly collapsed.
    pub fn collapsed(&self) -> impl Iterator<Item = &str> {
        self.states
            .iter()
            .filter(|(_, expanded)| !**expanded)
            .map(|(id, _)| id.as_str())
    }
}

/// Identifies one request issued by a [`RequestGeneration`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(u64);

impl RequestToken {
    /// The generation number.
    #[must_use]
    pub const fn generation(self) -> u64 {
        self.0
    }
}

/// Monotonic request counter.
///
/// Each new request calls [`Self::begin`]; when its result arrives, it is
/// applied only if no newer request has begun since.
#[derive(Debug, Default)]
pub struct RequestGeneration {
    latest: AtomicU64,
}

impl RequestGeneration {
    /// New counter with no requests issued.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a request, superseding all earlier ones.
    pub fn begin(&self) -> RequestToken {
        RequestToken(self.latest.fetch_add(1, Ordering::AcqRel) + 1)
    }

    /// Whether `token` belongs to the most recent request.
    #[must_use]
    pub fn is_current(&self, token: RequestToken) -> bool {
        self.latest.load(Ordering::Acquire) == token.0
    }

    /// Hand `value` to `apply` only if `token` is still current.
    ///
    /// Returns whether the value was applied.
    pub fn apply_if_current<T>(&self, token: RequestToken, value: T, apply: impl FnOnce(T)) -> bool {
        if self.is_current(token) {
            apply(value);
            true
        } else {
            debug!(
                generation = token.0,
                latest = self.latest.load(Ordering::Acquire),
                "Dropping stale result"
            );
            false
        }
    }
}
