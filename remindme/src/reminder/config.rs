// Environment configuration helpers for the watcher
// Handles platform-specific paths for the socket, PID file, and the
// reminder document

use std::path::PathBuf;

/// Which submission channel a deployment uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Transport {
    /// Resident daemon behind a Unix socket, swept every second.
    #[default]
    Socket,
    /// Shared JSON document polled once a minute.
    File,
}

impl Transport {
    /// Read the transport selection from REMINDME_TRANSPORT. Anything
    /// other than "file" selects the socket daemon.
    pub fn from_env() -> Self {
        match std::env::var("REMINDME_TRANSPORT").as_deref() {
            Ok("file") => Transport::File,
            _ => Transport::Socket,
        }
    }
}

/// Configuration for watcher paths and settings
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding the socket and PID file
    pub runtime_dir: PathBuf,
    /// Directory holding the reminder document
    pub state_dir: PathBuf,
    /// Path to the watcher Unix socket
    pub socket_path: PathBuf,
    /// Path to the watcher PID file
    pub pid_file: PathBuf,
}

impl Config {
    /// Configuration rooted at the default per-user paths
    pub fn default_paths() -> Self {
        let runtime_dir = Self::default_runtime_dir();
        let state_dir = Self::default_state_dir();

        Self {
            socket_path: runtime_dir.join("remindme.sock"),
            pid_file: runtime_dir.join("remindme.pid"),
            runtime_dir,
            state_dir,
        }
    }

    /// Configuration honoring REMINDME_DIR, falling back to the defaults
    pub fn from_env() -> Self {
        // REMINDME_DIR overrides BOTH runtime_dir and state_dir
        match std::env::var("REMINDME_DIR") {
            Ok(dir) => {
                let base = PathBuf::from(dir);
                Self {
                    socket_path: base.join("remindme.sock"),
                    pid_file: base.join("remindme.pid"),
                    runtime_dir: base.clone(),
                    state_dir: base,
                }
            }
            Err(_) => Self::default_paths(),
        }
    }

    /// Default directory for the socket and PID file
    fn default_runtime_dir() -> PathBuf {
        #[cfg(target_os = "linux")]
        {
            // Prefer XDG_RUNTIME_DIR on Linux; otherwise share the state dir
            match std::env::var("XDG_RUNTIME_DIR") {
                Ok(dir) => PathBuf::from(dir).join("remindme"),
                Err(_) => Self::default_state_dir(),
            }
        }

        #[cfg(not(target_os = "linux"))]
        {
            Self::default_state_dir()
        }
    }

    /// Default directory for the reminder document
    fn default_state_dir() -> PathBuf {
        // All platforms: ~/.remindme/ (or /tmp/remindme if home unavailable)
        match dirs::home_dir() {
            Some(home) => home.join(".remindme"),
            None => PathBuf::from("/tmp/remindme"),
        }
    }

    /// Get the reminders.json file path
    pub fn reminders_file(&self) -> PathBuf {
        self.state_dir.join("reminders.json")
    }

    /// Create the state and runtime directories if they are missing
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.state_dir)?;
        std::fs::create_dir_all(&self.runtime_dir)?;

        // Runtime directory holds the socket; keep it private
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let private = std::fs::Permissions::from_mode(0o700);
            std::fs::set_permissions(&self.runtime_dir, private)?;
        }

        Ok(())
    }

    /// Record this process id in the PID file
    pub fn write_pid(&self) -> std::io::Result<()> {
        self.ensure_dirs()?;
        std::fs::write(&self.pid_file, format!("{}\n", std::process::id()))
    }

    /// Process id recorded by a running watcher, if any
    pub fn read_pid(&self) -> Option<u32> {
        let contents = std::fs::read_to_string(&self.pid_file).ok()?;
        contents.trim().parse().ok()
    }

    /// Delete the PID file; a missing file is not an error
    pub fn remove_pid(&self) -> std::io::Result<()> {
        match std::fs::remove_file(&self.pid_file) {
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            other => other,
        }
    }

    /// Delete the socket file; a missing file is not an error
    pub fn remove_socket(&self) -> std::io::Result<()> {
        match std::fs::remove_file(&self.socket_path) {
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            other => other,
        }
    }

    /// Whether the watcher socket path exists on disk
    pub fn socket_exists(&self) -> bool {
        self.socket_path.exists()
    }

    /// Whether the process named in the PID file is still alive
    #[cfg(unix)]
    pub fn is_daemon_running(&self) -> bool {
        match self.read_pid() {
            // Signal 0 probes liveness without touching the process
            Some(pid) => unsafe { libc::kill(pid as i32, 0) == 0 },
            None => false,
        }
    }

    #[cfg(not(unix))]
    pub fn is_daemon_running(&self) -> bool {
        // No signals to probe with; a present socket has to count
        self.socket_exists()
    }
}
