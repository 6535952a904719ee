//! Logging setup: `env_logger` teed to stderr and a size-rotated log file.

use crate::{
    config::LoggingConfig,
    constants::{LOG_BACKUP_COUNT, LOG_FILE_NAME, LOG_MAX_BYTES},
};
use env_logger::{Builder, Target};
use log::warn;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Append-only file that rolls over once it reaches a size limit
///
/// On rollover `name` becomes `name.1`, `name.1` becomes `name.2` and so on;
/// the oldest backup beyond `backups` is deleted.
pub struct RotatingFile {
    path: PathBuf,
    max_bytes: u64,
    backups: usize,
    file: File,
    written: u64,
}

impl RotatingFile {
    /// Open (or create) `path` for appending
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened
    pub fn open<P: Into<PathBuf>>(path: P, max_bytes: u64, backups: usize) -> io::Result<Self> {
        let path = path.into();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let written = file.metadata()?.len();
        Ok(Self {
            path,
            max_bytes,
            backups,
            file,
            written,
        })
    }

    /// Path of the active log file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn backup_path(&self, n: usize) -> PathBuf {
        let mut name = self.path.clone().into_os_string();
        name.push(format!(".{n}"));
        PathBuf::from(name)
    }

    fn rotate(&mut self) -> io::Result<()> {
        self.file.flush()?;
        if self.backups > 0 {
            let oldest = self.backup_path(self.backups);
            if oldest.exists() {
                fs::remove_file(&oldest)?;
            }
            for n in (1..self.backups).rev() {
                let from = self.backup_path(n);
                if from.exists() {
                    fs::rename(&from, self.backup_path(n + 1))?;
                }
            }
            fs::rename(&self.path, self.backup_path(1))?;
        }
        self.file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&self.path)?;
        self.written = 0;
        Ok(())
    }
}

impl Write for RotatingFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.written > 0 && self.written + buf.len() as u64 > self.max_bytes {
            self.rotate()?;
        }
        let n = self.file.write(buf)?;
        self.written += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

/// Writes every record to stderr and, when available, to a log file
struct Tee {
    file: Option<RotatingFile>,
}

impl Write for Tee {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        io::stderr().write_all(buf)?;
        if let Some(file) = self.file.as_mut() {
            // A full disk must not take console logging down with it
            if file.write_all(buf).is_err() {
                self.file = None;
            }
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stderr().flush()?;
        if let Some(file) = self.file.as_mut() {
            file.flush()?;
        }
        Ok(())
    }
}

/// Initialize the global logger
///
/// `RUST_LOG` takes precedence over the configured level. Log lines go to
/// stderr and to `<log_dir>/makaton_app.log`; if the directory cannot be
/// prepared, logging continues on the console only. Calling this again
/// after a logger is installed does nothing.
///
/// Returns the path of the log file in use, if any.
pub fn init_logging(config: &LoggingConfig, log_dir: &Path) -> Option<PathBuf> {
    let level = config.parse_level();

    let file = fs::create_dir_all(log_dir)
        .and_then(|()| RotatingFile::open(log_dir.join(LOG_FILE_NAME), LOG_MAX_BYTES, LOG_BACKUP_COUNT));
    let (file, file_error) = match file {
        Ok(f) => (Some(f), None),
        Err(e) => (None, Some(e)),
    };
    let log_path = file.as_ref().map(|f| f.path().to_path_buf());

    let installed = Builder::new()
        .filter_level(level.unwrap_or(log::LevelFilter::Info))
        .parse_default_env()
        .format(|buf, record| {
            writeln!(
                buf,
                "{} | {} | {} | {}",
                buf.timestamp_millis(),
                record.level(),
                record.target(),
                record.args()
            )
        })
        .target(Target::Pipe(Box::new(Tee { file })))
        .try_init()
        .is_ok();

    if !installed {
        return None;
    }
    if level.is_none() {
        warn!("Unknown logging level '{}', using INFO", config.level);
    }
    if let Some(e) = file_error {
        warn!(
            "Cannot write logs to {}: {}. Logging to console only.",
            log_dir.display(),
            e
        );
    }
    log_path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotation_keeps_backups() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.log");
        let mut file = RotatingFile::open(&path, 10, 2).unwrap();

        for line in ["first-aaa\n", "second-bb\n", "third-ccc\n", "fourth-dd\n"] {
            file.write_all(line.as_bytes()).unwrap();
        }
        file.flush().unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "fourth-dd\n");
        assert_eq!(fs::read_to_string(dir.path().join("app.log.1")).unwrap(), "third-ccc\n");
        assert_eq!(fs::read_to_string(dir.path().join("app.log.2")).unwrap(), "second-bb\n");
        assert!(!dir.path().join("app.log.3").exists());
    }

    #[test]
    fn test_reopen_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.log");
        {
            let mut file = RotatingFile::open(&path, 1_000, 1).unwrap();
            file.write_all(b"one\n").unwrap();
        }
        let mut file = RotatingFile::open(&path, 1_000, 1).unwrap();
        file.write_all(b"two\n").unwrap();
        file.flush().unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "one\ntwo\n");
    }

    #[test]
    fn test_zero_backups_truncates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.log");
        let mut file = RotatingFile::open(&path, 4, 0).unwrap();
        file.write_all(b"abcd").unwrap();
        file.write_all(b"ef").unwrap();
        file.flush().unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "ef");
        assert!(!dir.path().join("app.log.1").exists());
    }
}
