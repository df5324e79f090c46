// Watcher runtime: resident socket daemon and document polling loop
//
// Responsibilities:
// - Own the pending reminders and the Pomodoro machine behind one lock
// - Sweep for due reminders and deliver their notifications
// - Serve the Unix socket protocol for one-shot submissions
// - In file deployments, poll the shared reminder document instead

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::Mutex;

use crate::reminder::config::Config;
use crate::reminder::notify::{Notice, Notifier};
use crate::reminder::persistence;
use crate::reminder::protocol::{
    deserialize_message, serialize_message, DaemonRequest, DaemonResponse, Phase, Reminder,
    MAX_REQUEST_FRAME_SIZE,
};
use crate::reminder::scheduler::{plain_notice, Scheduler};
use crate::reminder::store::ReminderStore;

/// How often the socket daemon checks for due reminders.
const SWEEP_INTERVAL: Duration = Duration::from_secs(1);

/// How often the document watcher re-reads the shared file.
const POLL_INTERVAL: Duration = Duration::from_secs(60);

/// Store and scheduler live under a single lock: a submission and a
/// sweep can never interleave mid-transition, and a stop followed by a
/// start observes the bumped cycle id.
struct WatchState {
    store: ReminderStore,
    scheduler: Scheduler,
}

/// Shared context for the sweep task and client connections
struct DaemonState {
    state: Mutex<WatchState>,
    notifier: Arc<dyn Notifier>,
}

impl DaemonState {
    fn new(notifier: Arc<dyn Notifier>) -> Self {
        DaemonState {
            state: Mutex::new(WatchState {
                store: ReminderStore::new(),
                scheduler: Scheduler::new(),
            }),
            notifier,
        }
    }
}

/// Run the resident socket daemon until ctrl-c.
pub async fn run(config: Config, notifier: Arc<dyn Notifier>) -> Result<()> {
    config
        .ensure_dirs()
        .context("Failed to create watcher directories")?;

    // Refuse to start a second watcher; clean up a socket left behind
    // by a crash
    if config.socket_exists() {
        if config.is_daemon_running() {
            anyhow::bail!(
                "watcher already running (PID {})",
                config
                    .read_pid()
                    .map(|pid| pid.to_string())
                    .unwrap_or_else(|| "unknown".to_string())
            );
        }
        config
            .remove_socket()
            .context("Failed to remove stale socket")?;
    }

    config.write_pid().context("Failed to write PID file")?;

    let listener = UnixListener::bind(&config.socket_path)
        .with_context(|| format!("Failed to bind socket: {}", config.socket_path.display()))?;

    // The socket carries local submissions only; keep it private
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&config.socket_path, std::fs::Permissions::from_mode(0o600))
            .with_context(|| {
                format!(
                    "Failed to set socket permissions: {}",
                    config.socket_path.display()
                )
            })?;
    }

    tracing::info!(socket = %config.socket_path.display(), "watcher listening");

    let state = Arc::new(DaemonState::new(notifier));
    let mut shutdown_rx = shutdown_channel();
    let mut sweep = tokio::time::interval(SWEEP_INTERVAL);

    loop {
        tokio::select! {
            _ = sweep.tick() => {
                sweep_once(&state, Local::now()).await;
            }

            result = listener.accept() => {
                match result {
                    Ok((stream, _addr)) => {
                        let state = Arc::clone(&state);
                        tokio::spawn(async move {
                            if let Err(e) = handle_client(state, stream).await {
                                tracing::warn!(error = %e, "client connection failed");
                            }
                        });
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "failed to accept connection");
                    }
                }
            }

            _ = shutdown_rx.recv() => {
                tracing::info!("shutting down watcher");
                break;
            }
        }
    }

    config.remove_pid().ok();
    config.remove_socket().ok();

    Ok(())
}

/// Run the document polling watcher until ctrl-c.
///
/// Every tick performs a whole read-modify-write of the shared
/// document: due entries come out and get notified, the rest go back.
/// Pomodoro phase events never belong in the document; a tagged record
/// is dropped with a warning.
pub async fn run_file_watcher(config: Config, notifier: Arc<dyn Notifier>) -> Result<()> {
    config
        .ensure_dirs()
        .context("Failed to create watcher directories")?;

    // Entries that expired while no watcher was running are dropped
    // without notifying.
    let purged = persistence::update_reminders(&config, |reminders| {
        let mut store = ReminderStore::from_pending(std::mem::take(reminders));
        let purged = store.purge_expired(Local::now());
        *reminders = store.into_pending();
        purged
    })?;
    if purged > 0 {
        tracing::info!(count = purged, "dropped reminders that expired while the watcher was down");
    }

    tracing::info!(document = %config.reminders_file().display(), "watching reminder document");

    let mut shutdown_rx = shutdown_channel();
    let mut poll = tokio::time::interval(POLL_INTERVAL);

    loop {
        tokio::select! {
            _ = poll.tick() => {
                if let Err(e) = poll_document(&config, notifier.as_ref()) {
                    tracing::warn!(error = %e, "document sweep failed");
                }
            }

            _ = shutdown_rx.recv() => {
                tracing::info!("shutting down watcher");
                break;
            }
        }
    }

    Ok(())
}

/// Forward ctrl-c into a channel the select loops can wait on
fn shutdown_channel() -> tokio::sync::mpsc::Receiver<()> {
    let (shutdown_tx, shutdown_rx) = tokio::sync::mpsc::channel::<()>(1);
    tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        let _ = shutdown_tx.send(()).await;
    });
    shutdown_rx
}

/// One sweep tick of the socket daemon: pull every due reminder, let
/// the scheduler decide, queue successors, then deliver notices after
/// the lock is released so submissions never wait on the desktop
/// service.
async fn sweep_once(state: &DaemonState, now: DateTime<Local>) {
    let notices = {
        let mut guard = state.state.lock().await;
        let WatchState { store, scheduler } = &mut *guard;

        let mut notices = Vec::new();
        for reminder in store.sweep(now) {
            let outcome = scheduler.process(reminder, now);
            if let Some(successor) = outcome.successor {
                store.insert(successor);
            }
            if let Some(notice) = outcome.notice {
                notices.push(notice);
            }
        }
        notices
    };

    for notice in notices {
        deliver(state.notifier.as_ref(), &notice);
    }
}

/// At-most-once delivery: a failed notification is logged, never
/// retried.
fn deliver(notifier: &dyn Notifier, notice: &Notice) {
    if let Err(e) = notifier.notify(notice) {
        tracing::warn!(title = %notice.title, error = %e, "failed to deliver notification");
    }
}

/// One sweep tick of the document watcher.
fn poll_document(config: &Config, notifier: &dyn Notifier) -> Result<()> {
    let now = Local::now();
    let due = persistence::update_reminders(config, |reminders| {
        let mut store = ReminderStore::from_pending(std::mem::take(reminders));
        let due = store.sweep(now);
        *reminders = store.into_pending();
        due
    })?;

    for reminder in due {
        if reminder.is_pomodoro() {
            tracing::warn!(
                message = %reminder.message,
                "dropping Pomodoro event found in the reminder document"
            );
            continue;
        }
        deliver(notifier, &plain_notice(&reminder.message));
    }

    Ok(())
}

/// Handle a client connection: newline-framed JSON requests, one
/// response frame per request
async fn handle_client(state: Arc<DaemonState>, mut stream: UnixStream) -> Result<()> {
    let (reader, mut writer) = stream.split();
    let mut reader = BufReader::new(reader);
    let mut line = String::new();

    loop {
        line.clear();
        let n = reader.read_line(&mut line).await?;
        if n == 0 {
            break; // client disconnected
        }

        let response = if line.len() > MAX_REQUEST_FRAME_SIZE {
            DaemonResponse::Error {
                message: format!(
                    "request frame too large: {} bytes (max {})",
                    line.len(),
                    MAX_REQUEST_FRAME_SIZE
                ),
            }
        } else {
            match deserialize_message::<DaemonRequest>(line.as_bytes()) {
                Ok(request) => handle_request(&state, request).await,
                Err(e) => DaemonResponse::Error {
                    message: format!("failed to parse request: {}", e),
                },
            }
        };

        let bytes = serialize_message(&response)?;
        writer.write_all(&bytes).await?;
        writer.flush().await?;
    }

    Ok(())
}

async fn handle_request(state: &DaemonState, request: DaemonRequest) -> DaemonResponse {
    match request {
        DaemonRequest::Submit { reminder } => {
            // Phase events are scheduled internally by the sweep; a
            // client-forged tag would corrupt the cycle bookkeeping
            if reminder.is_pomodoro() {
                return DaemonResponse::Error {
                    message: "phase events cannot be submitted directly".to_string(),
                };
            }

            let deadline = reminder.deadline;
            let mut guard = state.state.lock().await;
            guard.store.insert(reminder);
            DaemonResponse::Accepted { deadline }
        }

        DaemonRequest::PomodoroStart => {
            let now = Local::now();
            let mut guard = state.state.lock().await;
            let cycle = guard.scheduler.current_cycle();
            guard.store.insert(Reminder::phase(now, Phase::Started, cycle));
            DaemonResponse::Accepted { deadline: now }
        }

        DaemonRequest::PomodoroStop => {
            let now = Local::now();
            let mut guard = state.state.lock().await;
            // Bump the cycle at submission time so a start sent right
            // after this stop is not invalidated with the old cycle
            let stopped = guard.scheduler.register_stop();
            guard
                .store
                .insert(Reminder::phase(now, Phase::Stopped, stopped));
            DaemonResponse::Accepted { deadline: now }
        }
    }
}
