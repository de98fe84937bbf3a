//! Append-only JSONL file output.

use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::fmt::MakeWriter;

/// Default log file: `~/.jobboard/logs/client.jsonl`, or a relative
/// `.jobboard/logs/client.jsonl` when no home directory is known.
pub fn default_log_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_default()
        .join(".jobboard")
        .join("logs")
        .join("client.jsonl")
}

/// Line-flushed writer appending to a single log file.
#[derive(Clone)]
pub struct FileLogWriter {
    inner: Arc<Mutex<BufWriter<File>>>,
}

impl FileLogWriter {
    pub fn new(path: &Path) -> io::Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new().create(true).append(true).open(path)?;

        Ok(Self {
            inner: Arc::new(Mutex::new(BufWriter::with_capacity(8192, file))),
        })
    }
}

impl io::Write for FileLogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut guard = self.inner.lock();
        let result = guard.write(buf);
        // one flush per line keeps `tail -f` current
        guard.flush()?;
        result
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.lock().flush()
    }
}

/// MakeWriter implementation for tracing-subscriber.
#[derive(Clone)]
pub struct WriterFactory {
    writer: FileLogWriter,
}

impl WriterFactory {
    pub fn new(writer: FileLogWriter) -> Self {
        Self { writer }
    }
}

impl<'a> MakeWriter<'a> for WriterFactory {
    type Writer = FileLogWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.writer.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use tempfile::tempdir;

    #[test]
    fn test_file_log_writer_appends() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("logs").join("test.jsonl");

        let mut writer = FileLogWriter::new(&path).unwrap();
        writer.write_all(b"first\n").unwrap();
        let mut second = FileLogWriter::new(&path).unwrap();
        second.write_all(b"second\n").unwrap();

        let mut content = String::new();
        File::open(&path)
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        assert_eq!(content, "first\nsecond\n");
    }

    #[test]
    fn test_writer_creates_parent_dirs() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("deeply").join("nested").join("test.jsonl");

        assert!(FileLogWriter::new(&path).is_ok());
        assert!(path.parent().unwrap().exists());
    }

    #[test]
    fn test_default_log_path_file_name() {
        let path = default_log_path();
        assert!(path.ends_with(".jobboard/logs/client.jsonl"));
    }
}
