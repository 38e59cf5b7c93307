//! Append-only audit log: `YYYY-MM-DD HH:MM:SS - <message>` lines written to
//! a fixed file. Not part of the CSV data contract — purely diagnostic.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Local;

use crate::errors::EngineError;

pub struct Logger {
    path: PathBuf,
}

impl Logger {
    /// Opens (creating if needed) the log file at `path` for appending.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, EngineError> {
        let path = path.as_ref().to_path_buf();
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|_| EngineError::FileIo {
                path: path.display().to_string(),
                op: "open".to_string(),
            })?;
        Ok(Logger { path })
    }

    /// Appends one line, stamped with the current local time.
    pub fn log(&self, message: impl AsRef<str>) {
        let line = format!(
            "{} - {}\n",
            Local::now().format("%Y-%m-%d %H:%M:%S"),
            message.as_ref()
        );
        // Logging is best-effort: a write failure here shouldn't abort
        // processing of the input that triggered it.
        if let Ok(mut file) = OpenOptions::new().append(true).open(&self.path) {
            let _ = file.write_all(line.as_bytes());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn log_lines_follow_the_fixed_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine.log");
        let logger = Logger::open(&path).unwrap();
        logger.log("line 1: malformed row skipped");
        logger.log("line 2: order 7 not found");

        let contents = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        for line in &lines {
            let (timestamp, _) = line.split_once(" - ").expect("fixed separator");
            assert_eq!(timestamp.len(), "YYYY-MM-DD HH:MM:SS".len());
        }
        assert!(lines[1].ends_with("order 7 not found"));
    }
}
