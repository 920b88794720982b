//! Timestamped gameplay event log

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// One logged message
#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    /// Time since the log was created
    pub elapsed: Duration,
    pub message: String,
}

/// Sink for gameplay messages ("Added Ball at ...", "Collected Coin ...")
pub trait EventLog {
    fn record(&mut self, message: &str);

    /// Messages recorded so far
    fn entries(&self) -> &[LogEntry];
}

/// Keeps entries in memory and forwards them to `log`
pub struct MemoryEventLog {
    started: Instant,
    entries: Vec<LogEntry>,
}

impl Default for MemoryEventLog {
    fn default() -> Self {
        Self {
            started: Instant::now(),
            entries: Vec::new(),
        }
    }
}

impl MemoryEventLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, message: &str) -> &LogEntry {
        log::info!("{}", message);
        self.entries.push(LogEntry {
            elapsed: self.started.elapsed(),
            message: message.to_string(),
        });
        &self.entries[self.entries.len() - 1]
    }
}

impl EventLog for MemoryEventLog {
    fn record(&mut self, message: &str) {
        self.push(message);
    }

    fn entries(&self) -> &[LogEntry] {
        &self.entries
    }
}

/// Appends `seconds,"message"` rows to a file as well as keeping them in memory.
///
/// Write failures are reported once through `log` and then ignored.
pub struct CsvEventLog {
    memory: MemoryEventLog,
    path: PathBuf,
    writer: Option<BufWriter<File>>,
}

impl CsvEventLog {
    /// Open (or create) `path` for appending
    pub fn open(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            memory: MemoryEventLog::new(),
            path,
            writer: Some(BufWriter::new(file)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn csv_row(entry: &LogEntry) -> String {
    format!(
        "{:.3},\"{}\"\n",
        entry.elapsed.as_secs_f64(),
        entry.message.replace('"', "\"\"")
    )
}

impl EventLog for CsvEventLog {
    fn record(&mut self, message: &str) {
        let row = csv_row(self.memory.push(message));
        let Some(writer) = self.writer.as_mut() else {
            return;
        };
        let result = writer.write_all(row.as_bytes()).and_then(|_| writer.flush());
        if let Err(err) = result {
            log::warn!("Event log {:?} disabled: {}", self.path, err);
            self.writer = None;
        }
    }

    fn entries(&self) -> &[LogEntry] {
        self.memory.entries()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_log_keeps_order() {
        let mut log = MemoryEventLog::new();
        log.record("Resetting simulation...");
        log.record("Simulation reset.");
        let messages: Vec<&str> = log.entries().iter().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, ["Resetting simulation...", "Simulation reset."]);
        assert!(log.entries()[0].elapsed <= log.entries()[1].elapsed);
    }

    #[test]
    fn csv_quotes_are_escaped() {
        let entry = LogEntry {
            elapsed: Duration::from_millis(1500),
            message: "say \"hi\"".to_string(),
        };
        assert_eq!(csv_row(&entry), "1.500,\"say \"\"hi\"\"\"\n");
    }

    #[test]
    fn csv_log_appends_rows() {
        let path = std::env::temp_dir().join(format!("sandbox_events_{}.csv", std::process::id()));
        let _ = std::fs::remove_file(&path);
        {
            let mut log = CsvEventLog::open(&path).unwrap();
            log.record("Added Ball at (1.0, 2.0)");
            log.record("Collected Coin: +10 score");
            assert_eq!(log.entries().len(), 2);
        }
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 2);
        assert!(content.contains("\"Collected Coin: +10 score\""));
        let _ = std::fs::remove_file(&path);
    }
}
