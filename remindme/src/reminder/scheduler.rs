//! Turns due reminders into notifications and follow-up events.

use chrono::{DateTime, Duration, Local};

use crate::reminder::notify::Notice;
use crate::reminder::pomodoro::{PomodoroMachine, Step};
use crate::reminder::protocol::{CycleId, Reminder, Urgency};

/// Notification title for plain reminders.
pub const REMINDER_TITLE: &str = "Remindme";

/// What one due reminder turned into.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    /// Notification to deliver. Empty when the event was stale.
    pub notice: Option<Notice>,
    /// Next Pomodoro phase to queue, deadline already resolved.
    pub successor: Option<Reminder>,
}

impl Outcome {
    fn silent() -> Self {
        Outcome {
            notice: None,
            successor: None,
        }
    }
}

/// Dispatches due reminders, owning the Pomodoro machine. Lives next
/// to the store behind the watcher's lock so a submission can never
/// interleave with a sweep mid-transition.
#[derive(Debug, Default)]
pub struct Scheduler {
    machine: PomodoroMachine,
}

impl Scheduler {
    pub fn new() -> Self {
        Scheduler::default()
    }

    /// Id for stamping a start event submitted now.
    pub fn current_cycle(&self) -> CycleId {
        self.machine.current_cycle()
    }

    /// Invalidate the active cycle on an accepted stop request.
    pub fn register_stop(&mut self) -> CycleId {
        self.machine.register_stop()
    }

    /// Process one due reminder at `now`. Successor deadlines are
    /// measured from `now`, not from the reminder's own deadline, so a
    /// work phase always gets its full length even if the sweep ran
    /// late.
    pub fn process(&mut self, reminder: Reminder, now: DateTime<Local>) -> Outcome {
        let tag = match reminder.pomodoro {
            Some(tag) => tag,
            None => {
                return Outcome {
                    notice: Some(plain_notice(&reminder.message)),
                    successor: None,
                }
            }
        };

        match self.machine.advance(tag.phase, tag.cycle) {
            Step::Stale => Outcome::silent(),
            Step::Fire { notice, next } => Outcome {
                notice: Some(notice),
                successor: next.map(|next| {
                    Reminder::phase(
                        now + Duration::minutes(next.delay_minutes),
                        next.phase,
                        next.cycle,
                    )
                }),
            },
        }
    }
}

/// Classify a plain reminder message. A single trailing `!` raises the
/// notification to critical and is stripped from the displayed text.
pub fn plain_notice(message: &str) -> Notice {
    match message.strip_suffix('!') {
        Some(stripped) => Notice::new(REMINDER_TITLE, stripped, Urgency::Critical),
        None => Notice::new(REMINDER_TITLE, message, Urgency::Normal),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reminder::pomodoro::{SHORT_BREAK_MINUTES, WORK_MINUTES};
    use crate::reminder::protocol::Phase;
    use crate::reminder::store::ReminderStore;
    use chrono::TimeZone;

    fn now() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 5, 14, 12, 0, 0).unwrap()
    }

    #[test]
    fn trailing_bang_raises_urgency_and_is_stripped() {
        let notice = plain_notice("call mom!");
        assert_eq!(notice.title, REMINDER_TITLE);
        assert_eq!(notice.body, "call mom");
        assert_eq!(notice.urgency, Urgency::Critical);
    }

    #[test]
    fn plain_message_stays_normal() {
        let notice = plain_notice("call mom");
        assert_eq!(notice.body, "call mom");
        assert_eq!(notice.urgency, Urgency::Normal);
    }

    #[test]
    fn only_one_bang_is_stripped() {
        let notice = plain_notice("ship it!!");
        assert_eq!(notice.body, "ship it!");
        assert_eq!(notice.urgency, Urgency::Critical);
    }

    #[test]
    fn plain_reminder_produces_no_successor() {
        let mut scheduler = Scheduler::new();
        let outcome = scheduler.process(Reminder::plain(now(), "stretch"), now());
        assert!(outcome.successor.is_none());
        assert_eq!(outcome.notice.unwrap().body, "stretch");
    }

    #[test]
    fn start_event_schedules_a_work_break_from_now() {
        let mut scheduler = Scheduler::new();
        let cycle = scheduler.current_cycle();

        // The start event itself was created a while ago; the work
        // phase still runs its full length from the sweep instant.
        let started = Reminder::phase(now() - Duration::seconds(30), Phase::Started, cycle);
        let outcome = scheduler.process(started, now());

        let successor = outcome.successor.unwrap();
        assert_eq!(successor.deadline, now() + Duration::minutes(WORK_MINUTES));
        let tag = successor.pomodoro.unwrap();
        assert_eq!(tag.phase, Phase::WorkBreak);
        assert_eq!(tag.cycle, cycle);
    }

    #[test]
    fn stale_event_is_fully_silent() {
        let mut scheduler = Scheduler::new();
        scheduler.process(Reminder::phase(now(), Phase::Started, 0), now());
        scheduler.register_stop();

        let outcome = scheduler.process(
            Reminder::phase(now(), Phase::WorkBreak, 0),
            now() + Duration::minutes(WORK_MINUTES),
        );
        assert_eq!(outcome, Outcome::silent());
    }

    #[test]
    fn chain_runs_through_store_and_scheduler() {
        let mut store = ReminderStore::new();
        let mut scheduler = Scheduler::new();

        store.insert(Reminder::phase(now(), Phase::Started, scheduler.current_cycle()));

        // Sweep at start time: work phase begins.
        let mut at = now();
        let due = store.sweep(at);
        assert_eq!(due.len(), 1);
        for reminder in due {
            let outcome = scheduler.process(reminder, at);
            if let Some(successor) = outcome.successor {
                store.insert(successor);
            }
        }
        assert_eq!(store.len(), 1);

        // Sweep when the work phase ends: a short break is queued.
        at = at + Duration::minutes(WORK_MINUTES);
        let due = store.sweep(at);
        assert_eq!(due.len(), 1);
        let outcome = scheduler.process(due.into_iter().next().unwrap(), at);
        let successor = outcome.successor.unwrap();
        assert_eq!(successor.pomodoro.unwrap().phase, Phase::BreakFinished);
        assert_eq!(
            successor.deadline,
            at + Duration::minutes(SHORT_BREAK_MINUTES)
        );
    }

    #[test]
    fn reminder_due_next_second_fires_once() {
        let mut store = ReminderStore::new();
        let mut scheduler = Scheduler::new();

        store.insert(Reminder::plain(now() + Duration::seconds(1), "blink"));

        assert!(store.sweep(now()).is_empty());

        let at = now() + Duration::seconds(1);
        let due = store.sweep(at);
        assert_eq!(due.len(), 1);
        let outcome = scheduler.process(due.into_iter().next().unwrap(), at);
        assert_eq!(outcome.notice.unwrap().body, "blink");

        assert!(store.sweep(at).is_empty());
    }
}
