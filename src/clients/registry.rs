//! Ordered multiset of subscribed client identities.

use crate::types::ClientId;

/// Tracks which clients currently hold a reference.
#[derive(Debug, Default)]
pub struct ClientRegistry {
    /// One entry per outstanding subscribe, in arrival order.
    entries: Vec<ClientId>,
}

impl ClientRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one subscription from `id`.
    ///
    /// Returns true if `id` was not watched before this call.
    pub fn subscribe(&mut self, id: ClientId) -> bool {
        let first = !self.is_watched(&id);
        self.entries.push(id);
        first
    }

    /// Withdraw one subscription from `id`. No-op if `id` holds none.
    ///
    /// Returns true if this removed the last occurrence of `id`.
    pub fn unsubscribe(&mut self, id: &ClientId) -> bool {
        match self.entries.iter().position(|entry| entry == id) {
            Some(index) => {
                self.entries.remove(index);
                !self.is_watched(id)
            }
            None => false,
        }
    }

    /// Drop every subscription held by `id`. Returns how many were removed.
    pub fn remove_all(&mut self, id: &ClientId) -> usize {
        let before = self.entries.len();
        self.entries.retain(|entry| entry != id);
        before - self.entries.len()
    }

    pub fn is_watched(&self, id: &ClientId) -> bool {
        self.entries.contains(id)
    }

    /// Total outstanding subscriptions, duplicates included.
    pub fn count(&self) -> usize {
        self.entries.len()
    }

    pub fn occurrences(&self, id: &ClientId) -> usize {
        self.entries.iter().filter(|entry| *entry == id).count()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
