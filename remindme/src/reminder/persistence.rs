// Persistence helpers for the reminder document
// Plain reminders are persisted to ~/.remindme/reminders.json with
// file locking

use crate::reminder::config::Config;
use crate::reminder::protocol::Reminder;
use anyhow::{Context, Result};
use fs2::FileExt;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

/// Parse document text, treating corruption as an empty list. The next
/// save rewrites the file, so one bad document never wedges the
/// watcher; it costs the entries that were in it.
fn parse_document(contents: &str, path: &Path) -> Vec<Reminder> {
    if contents.trim().is_empty() {
        return Vec::new();
    }

    match serde_json::from_str(contents) {
        Ok(reminders) => reminders,
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "reminder document is corrupt, starting over with an empty list"
            );
            Vec::new()
        }
    }
}

/// Load the reminder document. A missing file reads as an empty list.
///
/// No lock is taken; saves replace the document by rename, so a reader
/// always sees a complete old or new version.
pub fn load_reminders(config: &Config) -> Result<Vec<Reminder>> {
    let path = config.reminders_file();

    if !path.exists() {
        return Ok(Vec::new());
    }

    let contents = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read reminder document: {}", path.display()))?;

    Ok(parse_document(&contents, &path))
}

/// Apply `f` to the reminder document under an exclusive lock and
/// write the result back atomically.
///
/// The lock spans the whole read-modify-write, so concurrent
/// submissions and watcher sweeps cannot lose entries. It lives on a
/// sidecar file because the document itself gets replaced by rename on
/// every save.
pub fn update_reminders<T>(config: &Config, f: impl FnOnce(&mut Vec<Reminder>) -> T) -> Result<T> {
    let path = config.reminders_file();

    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create state directory: {}", parent.display()))?;
    }

    let lock_file = OpenOptions::new()
        .write(true)
        .create(true)
        .open(lock_path(config))
        .with_context(|| "Failed to open reminder document lock file")?;

    // Acquire exclusive lock (blocking)
    lock_file
        .lock_exclusive()
        .with_context(|| "Failed to acquire exclusive lock on reminder document")?;

    let contents = if path.exists() {
        fs::read_to_string(&path)
            .with_context(|| format!("Failed to read reminder document: {}", path.display()))?
    } else {
        String::new()
    };

    let mut reminders = parse_document(&contents, &path);
    let value = f(&mut reminders);

    let serialized = serde_json::to_string_pretty(&reminders)
        .with_context(|| "Failed to serialize reminders")?;
    atomic_write(&path, &serialized)?;

    // Lock is automatically released when lock_file is dropped
    Ok(value)
}

fn lock_path(config: &Config) -> PathBuf {
    config.state_dir.join("reminders.lock")
}

/// Replace `path` by writing a sibling temp file and renaming it into
/// place, so a concurrent reader never observes a partial document.
pub fn atomic_write(path: &Path, contents: &str) -> Result<()> {
    let parent = path
        .parent()
        .with_context(|| format!("Invalid document path: {}", path.display()))?;

    // Sibling of the target so the rename stays on one filesystem
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("reminders");
    let temp_path = parent.join(format!(".{}.tmp.{}", file_name, std::process::id()));

    fs::write(&temp_path, contents)
        .with_context(|| format!("Failed to stage document at {}", temp_path.display()))?;

    fs::rename(&temp_path, path)
        .with_context(|| format!("Failed to move {} into place", temp_path.display()))?;

    Ok(())
}
