use std::fmt;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Error type describing what the poll was still seeing when the
/// timeout ran out.
#[derive(Debug)]
pub struct WaitError {
    pub path: PathBuf,
    pub attempts: u32,
    pub waited: Duration,
    pub last_content: Option<String>,
}

impl fmt::Display for WaitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "timed out waiting for {} after {} attempts ({:?}); last content: {}",
            self.path.display(),
            self.attempts,
            self.waited,
            match &self.last_content {
                Some(content) => format!("{:?}", content),
                None => "<file missing>".to_string(),
            }
        )
    }
}

impl std::error::Error for WaitError {}

/// Poll a file until its content satisfies `predicate`, returning the
/// matching content. Retries while the file is missing, so it is safe
/// to call before the writing process has created it.
pub fn wait_for_file_content<F>(
    path: &Path,
    timeout: Duration,
    predicate: F,
) -> Result<String, WaitError>
where
    F: Fn(&str) -> bool,
{
    let start = Instant::now();
    let mut attempts = 0;
    let mut last_content = None;

    loop {
        attempts += 1;
        match std::fs::read_to_string(path) {
            Ok(content) => {
                if predicate(&content) {
                    return Ok(content);
                }
                last_content = Some(content);
            }
            Err(_) => {
                last_content = None;
            }
        }

        if start.elapsed() >= timeout {
            return Err(WaitError {
                path: path.to_path_buf(),
                attempts,
                waited: start.elapsed(),
                last_content,
            });
        }
        thread::sleep(POLL_INTERVAL);
    }
}
