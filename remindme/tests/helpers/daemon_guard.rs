use std::os::unix::net::UnixStream;
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use remindme::reminder::config::Config;

/// Path to the compiled CLI binary under test.
pub const BIN: &str = env!("CARGO_BIN_EXE_remindme");

const STARTUP_TIMEOUT: Duration = Duration::from_secs(10);
const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Build a Config rooted at a test directory, mirroring what a spawned
/// watcher derives from REMINDME_DIR.
pub fn config_for(dir: &Path) -> Config {
    Config {
        runtime_dir: dir.to_path_buf(),
        state_dir: dir.to_path_buf(),
        socket_path: dir.join("remindme.sock"),
        pid_file: dir.join("remindme.pid"),
    }
}

/// A spawned `remindme --watch` process that is killed when the guard
/// drops, so a failing test cannot leak watchers.
pub struct WatcherGuard {
    child: Child,
    pub config: Config,
}

impl WatcherGuard {
    /// Spawn a socket-transport watcher rooted at `dir` and wait until
    /// it accepts connections.
    pub fn start_socket(dir: &Path) -> Self {
        let child = spawn_watcher(dir, None);
        let mut guard = WatcherGuard {
            child,
            config: config_for(dir),
        };
        guard.wait_until_accepting();
        guard
    }

    /// Spawn a file-transport watcher rooted at `dir`. There is no
    /// socket to probe, so callers observe its effects on the document
    /// instead of waiting here.
    pub fn start_file(dir: &Path) -> Self {
        let child = spawn_watcher(dir, Some("file"));
        WatcherGuard {
            child,
            config: config_for(dir),
        }
    }

    fn wait_until_accepting(&mut self) {
        let start = Instant::now();
        loop {
            if let Ok(Some(status)) = self.child.try_wait() {
                panic!("watcher exited during startup: {}", status);
            }
            if self.config.read_pid().is_some()
                && UnixStream::connect(&self.config.socket_path).is_ok()
            {
                return;
            }
            if start.elapsed() >= STARTUP_TIMEOUT {
                panic!(
                    "watcher did not start listening on {} within {:?}",
                    self.config.socket_path.display(),
                    STARTUP_TIMEOUT
                );
            }
            thread::sleep(POLL_INTERVAL);
        }
    }

    /// PID of the spawned watcher process.
    pub fn pid(&self) -> u32 {
        self.child.id()
    }

    /// Kill the watcher without running its shutdown path, leaving the
    /// socket and PID file behind the way a crashed watcher would.
    pub fn kill_abruptly(mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

impl Drop for WatcherGuard {
    fn drop(&mut self) {
        // Only kill if the child has not already exited on its own
        if let Ok(None) = self.child.try_wait() {
            let _ = self.child.kill();
            let _ = self.child.wait();
        }
    }
}

fn spawn_watcher(dir: &Path, transport: Option<&str>) -> Child {
    let mut command = Command::new(BIN);
    command
        .arg("--watch")
        .env("REMINDME_DIR", dir)
        .stdout(Stdio::null())
        .stderr(Stdio::null());

    match transport {
        Some(value) => command.env("REMINDME_TRANSPORT", value),
        None => command.env_remove("REMINDME_TRANSPORT"),
    };

    command.spawn().expect("failed to spawn watcher")
}
