// Reminder scheduling: parsing, storage, sweeping, and delivery
// Shared between the resident watcher and the one-shot CLI

pub mod clock;
pub mod config;
pub mod daemon;
pub mod error;
pub mod notify;
pub mod persistence;
pub mod pomodoro;
pub mod protocol;
pub mod scheduler;
pub mod store;

// One-shot socket client (Unix only)
#[cfg(unix)]
pub mod client;
