//! Pomodoro work/break cycle state machine.
//!
//! Every scheduled phase event carries the id of the cycle that
//! created it. Stopping or restarting bumps the active id, so events
//! left over from a superseded cycle are recognized and dropped when
//! they come due. At most one live phase chain exists at any time.

use crate::reminder::notify::Notice;
use crate::reminder::protocol::{CycleId, Phase, Urgency};

/// Work phase length in minutes.
pub const WORK_MINUTES: i64 = 25;
/// Short break length in minutes.
pub const SHORT_BREAK_MINUTES: i64 = 5;
/// Long break length in minutes, taken after the fourth work phase.
pub const LONG_BREAK_MINUTES: i64 = 15;
/// Breaks per full cycle; the last one is long.
pub const BREAKS_PER_CYCLE: u8 = 4;

/// Notification title for Pomodoro notices.
pub const POMODORO_TITLE: &str = "Pomodoro";

/// Follow-up phase event to schedule, stamped with its owning cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NextPhase {
    pub phase: Phase,
    pub cycle: CycleId,
    /// Delay from the instant the current event fired.
    pub delay_minutes: i64,
}

/// Outcome of consuming one due phase event.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// The event belongs to a superseded cycle; drop it silently.
    Stale,
    /// Notify the user and, unless the chain ends here, schedule the
    /// next phase.
    Fire {
        notice: Notice,
        next: Option<NextPhase>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CycleState {
    Idle,
    Working,
    OnBreak,
}

/// The watcher's Pomodoro bookkeeping.
///
/// `breaks` counts which break of the active cycle comes next, from 1
/// after a start up to [`BREAKS_PER_CYCLE`], then wraps.
#[derive(Debug)]
pub struct PomodoroMachine {
    active_cycle: CycleId,
    breaks: u8,
    state: CycleState,
}

impl Default for PomodoroMachine {
    fn default() -> Self {
        PomodoroMachine::new()
    }
}

impl PomodoroMachine {
    pub fn new() -> Self {
        PomodoroMachine {
            active_cycle: 0,
            breaks: 0,
            state: CycleState::Idle,
        }
    }

    /// Id to stamp onto a start event being submitted now.
    pub fn current_cycle(&self) -> CycleId {
        self.active_cycle
    }

    /// Invalidate the active cycle. This runs when a stop request is
    /// accepted, not when its event comes due, so a start submitted
    /// right after the stop lands in the new cycle even if both are
    /// processed by the same sweep.
    ///
    /// Returns the id the stop event should carry.
    pub fn register_stop(&mut self) -> CycleId {
        let stopped = self.active_cycle;
        self.active_cycle += 1;
        stopped
    }

    /// Consume one due phase event and decide what happens next.
    pub fn advance(&mut self, phase: Phase, cycle: CycleId) -> Step {
        if phase != Phase::Stopped && cycle != self.active_cycle {
            return Step::Stale;
        }

        match phase {
            Phase::Started => {
                if self.state != CycleState::Idle {
                    // A start over a running cycle supersedes it; the
                    // old cycle's events go stale from here on.
                    self.active_cycle += 1;
                }
                self.breaks = 1;
                self.state = CycleState::Working;
                Step::Fire {
                    notice: Notice::new(
                        POMODORO_TITLE,
                        format!("Work started, focus for {} minutes", WORK_MINUTES),
                        Urgency::Normal,
                    ),
                    next: Some(NextPhase {
                        phase: Phase::WorkBreak,
                        cycle: self.active_cycle,
                        delay_minutes: WORK_MINUTES,
                    }),
                }
            }

            Phase::WorkBreak => {
                self.state = CycleState::OnBreak;
                let long = self.breaks == BREAKS_PER_CYCLE;
                let minutes = if long {
                    LONG_BREAK_MINUTES
                } else {
                    SHORT_BREAK_MINUTES
                };
                Step::Fire {
                    notice: Notice::new(
                        POMODORO_TITLE,
                        format!("Take a {} minute break", minutes),
                        Urgency::Critical,
                    ),
                    next: Some(NextPhase {
                        phase: Phase::BreakFinished,
                        cycle: self.active_cycle,
                        delay_minutes: minutes,
                    }),
                }
            }

            Phase::BreakFinished => {
                self.breaks = if self.breaks == BREAKS_PER_CYCLE {
                    1
                } else {
                    self.breaks + 1
                };
                self.state = CycleState::Working;
                Step::Fire {
                    notice: Notice::new(POMODORO_TITLE, "Break over, back to work", Urgency::Critical),
                    next: Some(NextPhase {
                        phase: Phase::WorkBreak,
                        cycle: self.active_cycle,
                        delay_minutes: WORK_MINUTES,
                    }),
                }
            }

            Phase::Stopped => {
                // Only reset if no newer start has taken over since the
                // stop was registered; otherwise this event arrived
                // after a restart and must leave its state alone.
                if self.active_cycle == cycle + 1 {
                    self.breaks = 0;
                    self.state = CycleState::Idle;
                }
                Step::Fire {
                    notice: Notice::new(POMODORO_TITLE, "Pomodoro stopped", Urgency::Normal),
                    next: None,
                }
            }
        }
    }
}
