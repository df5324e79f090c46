// Reminder protocol - shared types for client <-> watcher communication
// Uses newline-framed JSON messages over Unix sockets; the same
// `Reminder` records are persisted in the file-transport document.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Maximum accepted size of a single request frame in bytes.
pub const MAX_REQUEST_FRAME_SIZE: usize = 1024 * 1024;

/// Maximum accepted size of a single response frame in bytes.
pub const MAX_RESPONSE_FRAME_SIZE: usize = 1024 * 1024;

/// Monotonic Pomodoro cycle token. Stopping a cycle invalidates every
/// in-flight phase event stamped with the old id.
pub type CycleId = u64;

/// Phase carried by a scheduled Pomodoro event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// A work phase begins.
    Started,
    /// A work phase ended; time for a break.
    WorkBreak,
    /// A break ended; back to work.
    BreakFinished,
    /// The user stopped the cycle.
    Stopped,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Phase::Started => "started",
            Phase::WorkBreak => "work_break",
            Phase::BreakFinished => "break_finished",
            Phase::Stopped => "stopped",
        };
        write!(f, "{}", name)
    }
}

/// Delivery priority of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    Low,
    Normal,
    Critical,
}

/// Pomodoro metadata attached to a scheduled reminder. Dispatch keys
/// off this tag; the message text is display only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PomodoroTag {
    /// Phase this event advances when it comes due.
    pub phase: Phase,
    /// Cycle the event was scheduled under.
    pub cycle: CycleId,
}

/// A scheduled notification with a deadline and message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reminder {
    /// Local wall-clock instant at which the reminder comes due.
    pub deadline: DateTime<Local>,
    /// Text shown in the notification body. A single trailing `!`
    /// marks the reminder as critical and is stripped before display.
    pub message: String,
    /// Present only on Pomodoro phase events.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pomodoro: Option<PomodoroTag>,
}

impl Reminder {
    /// A plain reminder submitted by the user.
    pub fn plain(deadline: DateTime<Local>, message: impl Into<String>) -> Self {
        Reminder {
            deadline,
            message: message.into(),
            pomodoro: None,
        }
    }

    /// A Pomodoro phase event stamped with its owning cycle.
    pub fn phase(deadline: DateTime<Local>, phase: Phase, cycle: CycleId) -> Self {
        let message = match phase {
            Phase::Started => "Pomodoro started",
            Phase::WorkBreak => "Work phase over",
            Phase::BreakFinished => "Break over",
            Phase::Stopped => "Pomodoro stopped",
        };
        Reminder {
            deadline,
            message: message.to_string(),
            pomodoro: Some(PomodoroTag { phase, cycle }),
        }
    }

    pub fn is_pomodoro(&self) -> bool {
        self.pomodoro.is_some()
    }
}

/// Request message from the one-shot CLI to the watcher daemon
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DaemonRequest {
    /// Schedule a plain reminder
    Submit { reminder: Reminder },
    /// Begin a Pomodoro cycle
    PomodoroStart,
    /// Stop the active Pomodoro cycle
    PomodoroStop,
}

/// Response message from the watcher daemon
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DaemonResponse {
    /// The reminder or cycle event was queued
    Accepted { deadline: DateTime<Local> },
    /// Error response
    Error { message: String },
}

/// Serialize a message to JSON with a trailing newline for framing
pub fn serialize_message<T: Serialize>(msg: &T) -> Result<Vec<u8>, serde_json::Error> {
    let mut bytes = serde_json::to_vec(msg)?;
    bytes.push(b'\n');
    Ok(bytes)
}

/// Deserialize a newline-framed JSON message
pub fn deserialize_message<T: for<'de> Deserialize<'de>>(
    bytes: &[u8],
) -> Result<T, serde_json::Error> {
    let trimmed = bytes.strip_suffix(b"\n").unwrap_or(bytes);
    serde_json::from_slice(trimmed)
}
