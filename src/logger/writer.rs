//! Size-rotating file writer

use crate::logger::config::{FileConfig, RotationConfig};
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing_subscriber::fmt::MakeWriter;

/// File writer with size-based rotation.
///
/// Writes go to stderr once the file becomes unwritable so that log lines are
/// never silently lost.
#[derive(Clone)]
pub struct RotatingFileWriter {
    state: Arc<Mutex<WriterState>>,
    path: PathBuf,
    rotation: RotationConfig,
}

struct WriterState {
    file: BufWriter<File>,
    current_size: u64,
    fallback_mode: bool,
}

impl RotatingFileWriter {
    pub fn new(config: &FileConfig) -> anyhow::Result<Self> {
        if let Some(parent) = config.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let file = open_log_file(&config.path, config.append)?;
        let current_size = if config.append {
            std::fs::metadata(&config.path).map(|m| m.len()).unwrap_or(0)
        } else {
            0
        };

        Ok(Self {
            state: Arc::new(Mutex::new(WriterState {
                file,
                current_size,
                fallback_mode: false,
            })),
            path: config.path.clone(),
            rotation: config.rotation.clone(),
        })
    }

    fn write_locked(&self, state: &mut WriterState, buf: &[u8]) -> io::Result<usize> {
        if state.fallback_mode {
            return io::stderr().write(buf);
        }

        let needs_rotation = state.current_size > 0
            && state.current_size + buf.len() as u64 > self.rotation.max_size;
        if needs_rotation {
            if let Err(e) = self.rotate(state) {
                return fall_back(state, buf, e);
            }
        }

        match state.file.write(buf) {
            Ok(written) => {
                state.current_size += written as u64;
                Ok(written)
            }
            Err(e) => fall_back(state, buf, e),
        }
    }

    fn rotate(&self, state: &mut WriterState) -> io::Result<()> {
        state.file.flush()?;

        let oldest = rolled_path(&self.path, self.rotation.max_files);
        if oldest.exists() {
            std::fs::remove_file(&oldest)?;
        }
        for index in (1..self.rotation.max_files).rev() {
            let from = rolled_path(&self.path, index);
            if from.exists() {
                std::fs::rename(&from, rolled_path(&self.path, index + 1))?;
            }
        }
        std::fs::rename(&self.path, rolled_path(&self.path, 1))?;

        state.file = open_log_file(&self.path, false)?;
        state.current_size = 0;
        Ok(())
    }
}

fn fall_back(state: &mut WriterState, buf: &[u8], error: io::Error) -> io::Result<usize> {
    state.fallback_mode = true;
    eprintln!("[Logger] File write failed, falling back to stderr: {error}");
    io::stderr().write(buf)
}

fn rolled_path(path: &Path, index: usize) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(format!(".{index}"));
    PathBuf::from(name)
}

impl<'a> MakeWriter<'a> for RotatingFileWriter {
    type Writer = RotatingWriterGuard;

    fn make_writer(&'a self) -> Self::Writer {
        RotatingWriterGuard {
            writer: self.clone(),
        }
    }
}

pub struct RotatingWriterGuard {
    writer: RotatingFileWriter,
}

impl Write for RotatingWriterGuard {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut state = self
            .writer
            .state
            .lock()
            .map_err(|_| io::Error::other("Failed to acquire writer lock"))?;
        self.writer.write_locked(&mut state, buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut state = self
            .writer
            .state
            .lock()
            .map_err(|_| io::Error::other("Failed to acquire writer lock"))?;
        if state.fallback_mode {
            return io::stderr().flush();
        }
        state.file.flush()
    }
}

impl Drop for RotatingWriterGuard {
    fn drop(&mut self) {
        if let Ok(mut state) = self.writer.state.lock() {
            let _ = state.file.flush();
        }
    }
}

fn open_log_file(path: &Path, append: bool) -> io::Result<BufWriter<File>> {
    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .append(append)
        .truncate(!append)
        .open(path)?;

    Ok(BufWriter::new(file))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logger::config::LogFormat;
    use tempfile::TempDir;

    fn file_config(dir: &TempDir, max_size: u64, max_files: usize) -> FileConfig {
        FileConfig::new(
            true,
            dir.path().join("nested").join("app.log"),
            true,
            LogFormat::Full,
            RotationConfig::new(max_size, max_files).unwrap(),
        )
    }

    fn write_line(writer: &RotatingFileWriter, line: &str) {
        let mut guard = writer.make_writer();
        guard.write_all(line.as_bytes()).unwrap();
        guard.flush().unwrap();
    }

    #[test]
    fn test_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let config = file_config(&dir, 1024, 2);
        let writer = RotatingFileWriter::new(&config).unwrap();
        write_line(&writer, "hello\n");

        let content = std::fs::read_to_string(&config.path).unwrap();
        assert_eq!(content, "hello\n");
    }

    #[test]
    fn test_rotates_when_size_exceeded() {
        let dir = TempDir::new().unwrap();
        let config = file_config(&dir, 10, 2);
        let writer = RotatingFileWriter::new(&config).unwrap();

        write_line(&writer, "first-line\n");
        write_line(&writer, "second-line\n");
        write_line(&writer, "third-line\n");
        write_line(&writer, "fourth-line\n");

        assert_eq!(std::fs::read_to_string(&config.path).unwrap(), "fourth-line\n");
        assert_eq!(
            std::fs::read_to_string(rolled_path(&config.path, 1)).unwrap(),
            "third-line\n"
        );
        assert_eq!(
            std::fs::read_to_string(rolled_path(&config.path, 2)).unwrap(),
            "second-line\n"
        );
        assert!(!rolled_path(&config.path, 3).exists());
    }

    #[test]
    fn test_append_resumes_size_accounting() {
        let dir = TempDir::new().unwrap();
        let config = file_config(&dir, 1024, 1);
        {
            let writer = RotatingFileWriter::new(&config).unwrap();
            write_line(&writer, "a\n");
        }
        let writer = RotatingFileWriter::new(&config).unwrap();
        write_line(&writer, "b\n");
        assert_eq!(std::fs::read_to_string(&config.path).unwrap(), "a\nb\n");
    }
}
