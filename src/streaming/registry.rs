use std::collections::HashSet;
use std::sync::Arc;
use log::{debug, info};
use parking_lot::RwLock;
use super::UserId;

/// Set of users that currently have streaming mode enabled.
///
/// Absence from the set means "not streaming". Every call takes the lock for the
/// duration of a single set operation, so concurrent callers observe each call
/// atomically and never see a half-applied write.
pub struct VisibilityRegistry {
    streaming: RwLock<HashSet<UserId>>,
}

impl Default for VisibilityRegistry {
    fn default() -> Self {
        Self {
            streaming: RwLock::new(HashSet::new()),
        }
    }
}

impl VisibilityRegistry {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Returns whether `id` is flagged. Ids that were never set are not streaming.
    pub fn is_streaming(&self, id: &UserId) -> bool {
        self.streaming.read().contains(id)
    }

    /// Enables or disables the flag for `id`. Repeating a call has no further effect.
    pub fn set_streaming(&self, id: UserId, enabled: bool) {
        let changed = if enabled {
            self.streaming.write().insert(id)
        } else {
            self.streaming.write().remove(&id)
        };

        if changed {
            debug!("Streaming mode for {} set to {}", id, enabled);
        } else {
            debug!("Streaming mode for {} already {}", id, enabled);
        }
    }

    /// Session end hook. Returns true if the user was flagged.
    pub fn remove(&self, id: &UserId) -> bool {
        let removed = self.streaming.write().remove(id);
        if removed {
            debug!("Cleared streaming mode for disconnected user {}", id);
        }
        removed
    }

    pub fn streaming_count(&self) -> usize {
        self.streaming.read().len()
    }

    pub fn streaming_users(&self) -> Vec<UserId> {
        let mut users: Vec<UserId> = self.streaming.read().iter().copied().collect();
        users.sort();
        users
    }

    pub fn clear(&self) {
        let mut streaming = self.streaming.write();
        info!("Clearing streaming mode for {} user(s)", streaming.len());
        streaming.clear();
    }
}
