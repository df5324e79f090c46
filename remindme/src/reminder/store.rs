//! In-memory collection of pending reminders.

use chrono::{DateTime, Local};

use crate::reminder::protocol::Reminder;

/// Unordered set of reminders waiting to come due.
///
/// The watcher owns exactly one store behind its lock. Due entries are
/// removed by swap, so [`sweep`](ReminderStore::sweep) returns them in
/// arbitrary order.
#[derive(Debug, Default)]
pub struct ReminderStore {
    pending: Vec<Reminder>,
}

impl ReminderStore {
    pub fn new() -> Self {
        ReminderStore::default()
    }

    /// Rebuild a store from a loaded document.
    pub fn from_pending(pending: Vec<Reminder>) -> Self {
        ReminderStore { pending }
    }

    /// Hand the remaining entries back for persistence.
    pub fn into_pending(self) -> Vec<Reminder> {
        self.pending
    }

    /// Number of reminders still pending.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Queue a reminder. Deadlines in the past are accepted; they come
    /// due on the next sweep.
    pub fn insert(&mut self, reminder: Reminder) {
        self.pending.push(reminder);
    }

    /// Remove and return every reminder with `deadline <= now`.
    ///
    /// Each entry is returned exactly once; sweeping again at the same
    /// instant yields nothing new.
    pub fn sweep(&mut self, now: DateTime<Local>) -> Vec<Reminder> {
        let mut due = Vec::new();
        let mut i = 0;
        while i < self.pending.len() {
            if self.pending[i].deadline <= now {
                due.push(self.pending.swap_remove(i));
            } else {
                i += 1;
            }
        }
        due
    }

    /// Drop reminders whose deadline is strictly in the past without
    /// processing them. Returns how many were removed. Used by the
    /// document watcher at startup so stale entries do not fire.
    pub fn purge_expired(&mut self, now: DateTime<Local>) -> usize {
        let before = self.pending.len();
        self.pending.retain(|reminder| reminder.deadline >= now);
        before - self.pending.len()
    }
}
