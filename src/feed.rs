use crate::event::AppEvent;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use std::time::{Duration, SystemTime};

const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Watches a canvas document on disk and forwards each revision to the UI
/// thread. Polling by mtime is plenty for a file written by an agent or a
/// hand editor, and it keeps the feed free of platform watcher quirks.
pub struct DocumentFeed {
    path: PathBuf,
    tx: Sender<AppEvent>,
}

impl DocumentFeed {
    pub fn new(path: PathBuf, tx: Sender<AppEvent>) -> Self {
        Self { path, tx }
    }

    /// Spawns the polling loop on the ambient tokio runtime. The first tick
    /// fires immediately, so the window never opens empty.
    pub fn start(&self) {
        let path = self.path.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            // Outer None: never checked. Inner None: file unreadable, which
            // is reported once rather than every tick.
            let mut last_seen: Option<Option<SystemTime>> = None;
            let mut interval = tokio::time::interval(POLL_INTERVAL);
            loop {
                interval.tick().await;
                let modified = std::fs::metadata(&path).and_then(|m| m.modified()).ok();
                if last_seen == Some(modified) {
                    continue;
                }
                last_seen = Some(modified);

                let event = match read_document(&path) {
                    Ok(document) => AppEvent::DocumentLoaded(document),
                    Err(message) => AppEvent::FeedError(message),
                };
                if tx.send(event).is_err() {
                    break;
                }
            }
        });
    }
}

/// Reads and parses a canvas document file.
pub fn read_document(path: &Path) -> Result<Value, String> {
    let raw = std::fs::read_to_string(path)
        .map_err(|err| format!("cannot read {}: {err}", path.display()))?;
    serde_json::from_str(&raw)
        .map_err(|err| format!("invalid JSON in {}: {err}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("glaze-feed-{}-{name}", std::process::id()))
    }

    #[test]
    fn read_document_parses_valid_json() {
        let path = temp_path("valid.json");
        std::fs::write(&path, r#"{ "root": "a", "elements": {} }"#).expect("write temp file");
        let document = read_document(&path).expect("should parse");
        assert_eq!(document, json!({ "root": "a", "elements": {} }));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn read_document_reports_invalid_json() {
        let path = temp_path("broken.json");
        std::fs::write(&path, "{ not json").expect("write temp file");
        let err = read_document(&path).expect_err("should fail");
        assert!(err.contains("invalid JSON"));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn read_document_reports_missing_files() {
        let path = temp_path("nowhere.json");
        let err = read_document(&path).expect_err("should fail");
        assert!(err.contains("cannot read"));
    }
}
