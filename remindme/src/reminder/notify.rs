//! Desktop notification delivery.

use notify_rust::Notification;

use crate::reminder::error::NotifyError;
use crate::reminder::protocol::Urgency;

/// One notification ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub title: String,
    pub body: String,
    pub urgency: Urgency,
}

impl Notice {
    pub fn new(title: impl Into<String>, body: impl Into<String>, urgency: Urgency) -> Self {
        Notice {
            title: title.into(),
            body: body.into(),
            urgency,
        }
    }
}

/// Seam between the sweep loop and the OS notification surface. The
/// watcher only observes success or failure; a failed delivery is
/// logged and never retried.
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: &Notice) -> Result<(), NotifyError>;
}

/// Notifier backed by the desktop notification service.
#[derive(Debug, Default)]
pub struct DesktopNotifier;

impl Notifier for DesktopNotifier {
    fn notify(&self, notice: &Notice) -> Result<(), NotifyError> {
        let mut notification = Notification::new();
        notification
            .summary(&notice.title)
            .body(&notice.body)
            .appname("remindme")
            .icon("appointment-soon");

        // Urgency hints only exist on XDG notification servers
        #[cfg(all(unix, not(target_os = "macos")))]
        notification.urgency(desktop_urgency(notice.urgency));

        notification
            .show()
            .map(|_| ())
            .map_err(|e| NotifyError::Desktop(e.to_string()))
    }
}

#[cfg(all(unix, not(target_os = "macos")))]
fn desktop_urgency(urgency: Urgency) -> notify_rust::Urgency {
    match urgency {
        Urgency::Low => notify_rust::Urgency::Low,
        Urgency::Normal => notify_rust::Urgency::Normal,
        Urgency::Critical => notify_rust::Urgency::Critical,
    }
}

/// Test double that records notices instead of delivering them.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    delivered: std::sync::Mutex<Vec<Notice>>,
}

#[cfg(test)]
impl RecordingNotifier {
    pub fn delivered(&self) -> Vec<Notice> {
        self.delivered.lock().unwrap().clone()
    }

    pub fn take(&self) -> Vec<Notice> {
        std::mem::take(&mut *self.delivered.lock().unwrap())
    }
}

#[cfg(test)]
impl Notifier for RecordingNotifier {
    fn notify(&self, notice: &Notice) -> Result<(), NotifyError> {
        self.delivered.lock().unwrap().push(notice.clone());
        Ok(())
    }
}
