//! Handoff of emitted notifications to the external notifier.
//!
//! Every notification the deduplicator lets through is appended to an ndjson
//! file. Open, write and flush failures are returned to the caller.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::types::Notification;

const OUTBOX_FILE: &str = "notifications.ndjson";

/// Append-only ndjson outbox read by the external notifier
pub struct NotificationOutbox {
    enabled: bool,
    max_size_bytes: u64,
    file_path: PathBuf,
    writer: Option<BufWriter<File>>,
}

impl NotificationOutbox {
    /// Create an outbox writing to `<dir>/notifications.ndjson`
    ///
    /// The file is opened on the first record. If `enabled` is false, all
    /// record calls are no-ops.
    pub fn new(enabled: bool, dir: &Path, max_size_bytes: u64) -> Self {
        Self {
            enabled,
            max_size_bytes,
            file_path: dir.join(OUTBOX_FILE),
            writer: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }

    /// Append one notification as a single JSON line and flush it.
    ///
    /// An error means the notification did not reach the outbox.
    pub fn record(&mut self, notification: &Notification) -> io::Result<()> {
        if !self.enabled {
            return Ok(());
        }

        let json = serde_json::to_string(notification)?;
        self.append_line(&json)?;
        self.maybe_rotate();
        Ok(())
    }

    /// A writer that failed is dropped so the next call reopens the file
    fn append_line(&mut self, line: &str) -> io::Result<()> {
        let mut writer = match self.writer.take() {
            Some(w) => w,
            None => Self::open_writer(&self.file_path)?,
        };
        writeln!(writer, "{}", line)?;
        writer.flush()?;
        self.writer = Some(writer);
        Ok(())
    }

    fn open_writer(file_path: &Path) -> io::Result<BufWriter<File>> {
        if let Some(dir) = file_path.parent() {
            fs::create_dir_all(dir)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(file_path)?;
        Ok(BufWriter::new(file))
    }

    /// Move the full file aside to the next free `.ndjson.<n>` generation.
    ///
    /// Older generations are never overwritten; the notifier removes them
    /// once read. A failed rename leaves the current file growing.
    fn maybe_rotate(&mut self) {
        let len = match fs::metadata(&self.file_path) {
            Ok(m) => m.len(),
            Err(_) => return,
        };
        if len < self.max_size_bytes {
            return;
        }

        let rotated = self.next_generation();
        self.writer = None;
        match fs::rename(&self.file_path, &rotated) {
            Ok(()) => debug!(path = ?rotated, "notification outbox rotated"),
            Err(e) => warn!(path = ?rotated, "Failed to rotate notification outbox: {}", e),
        }
    }

    fn next_generation(&self) -> PathBuf {
        (1u32..)
            .map(|n| self.file_path.with_extension(format!("ndjson.{}", n)))
            .find(|p| !p.exists())
            .unwrap_or_else(|| self.file_path.with_extension("ndjson.overflow"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use crate::notify::types::RecipientKind;
    use crate::warning::{GlobalWarning, WarningCode};

    fn notification() -> Notification {
        Notification {
            recipient_kind: RecipientKind::AdminGlobal,
            recipient_id: None,
            resource: "data".to_string(),
            code: WarningCode::Global(GlobalWarning::Overage),
            message: "An account overage for data has occurred!".to_string(),
        }
    }

    #[test]
    fn test_disabled_outbox_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let mut outbox = NotificationOutbox::new(false, dir.path(), 1024);
        outbox.record(&notification()).unwrap();
        assert!(!outbox.path().exists());
    }

    #[test]
    fn test_ndjson_output() {
        let dir = tempfile::tempdir().unwrap();
        let mut outbox = NotificationOutbox::new(true, dir.path(), 10_485_760);
        outbox.record(&notification()).unwrap();
        outbox.record(&notification()).unwrap();

        let content = fs::read_to_string(outbox.path()).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        let parsed: Notification = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(parsed, notification());
        assert!(lines[0].contains(r#""recipient_kind":"admin_global""#));
        assert!(!lines[0].contains("recipient_id"));
    }

    #[test]
    fn test_rotation_keeps_older_generations() {
        let dir = tempfile::tempdir().unwrap();
        let mut outbox = NotificationOutbox::new(true, dir.path(), 50);

        outbox.record(&notification()).unwrap();
        outbox.record(&notification()).unwrap();

        let first = dir.path().join("notifications.ndjson.1");
        let second = dir.path().join("notifications.ndjson.2");
        assert_eq!(fs::read_to_string(&first).unwrap().lines().count(), 1);
        assert_eq!(fs::read_to_string(&second).unwrap().lines().count(), 1);

        outbox.record(&notification()).unwrap();
        assert!(dir.path().join("notifications.ndjson.3").exists());
    }

    #[test]
    fn test_unwritable_outbox_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        fs::write(&blocker, "").unwrap();

        let mut outbox = NotificationOutbox::new(true, &blocker.join("outbox"), 10_485_760);
        assert!(outbox.record(&notification()).is_err());
        assert!(!outbox.path().exists());

        // Retried on the next call
        assert!(outbox.record(&notification()).is_err());
    }
}
