use std::{
    fs::File,
    io::{self, BufRead, BufReader, Seek, SeekFrom},
    path::{Path, PathBuf},
    time::SystemTime,
};

use notify::{Event, EventKind, RecursiveMode, Watcher};
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use super::zone::parse_zone_change;

/// Prefix of the network log files written by ACT.
pub const NETWORK_LOG_PREFIX: &str = "Network_";

/// Errors raised while following the network log.
#[derive(Debug, Error)]
pub enum TailError {
    /// The configured directory holds no network log.
    #[error("no network log found in {0}")]
    NoLogFile(PathBuf),
    /// The file watcher could not be installed.
    #[error("failed to watch {path}: {source}")]
    Watch {
        /// Watched path.
        path: PathBuf,
        /// Underlying watcher error.
        #[source]
        source: notify::Error,
    },
    /// Reading the log failed.
    #[error("failed to read {path}: {source}")]
    Io {
        /// Log file path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
}

/// Notifications forwarded from the log to the session host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogFeed {
    /// A complete log line, without its line terminator.
    Line(String),
    /// The player changed zones.
    Zone(u32),
}

/// Follows a growing network log file from its current end.
///
/// When opened on a directory the tail also switches to any newer
/// `Network_*.log` created there, since ACT starts a fresh file on every
/// restart.
#[derive(Debug)]
pub struct LogTail {
    path: PathBuf,
    offset: u64,
    directory: Option<PathBuf>,
}

impl LogTail {
    /// Open `target`, which is either a log file or a directory of logs.
    ///
    /// Reading starts at the current end of the file so earlier sessions are
    /// not replayed.
    pub fn open(target: impl AsRef<Path>) -> Result<Self, TailError> {
        let target = target.as_ref();
        let (path, directory) = if target.is_dir() {
            let path = latest_log_file(target)?
                .ok_or_else(|| TailError::NoLogFile(target.to_path_buf()))?;
            (path, Some(target.to_path_buf()))
        } else {
            (target.to_path_buf(), None)
        };
        let offset = std::fs::metadata(&path)
            .map_err(|source| TailError::Io {
                path: path.clone(),
                source,
            })?
            .len();
        info!(path = %path.display(), offset, "Following network log");
        Ok(Self {
            path,
            offset,
            directory,
        })
    }

    /// Path of the followed log file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every complete line appended since the last call.
    ///
    /// A trailing line without a terminator is left for the next read. Bytes
    /// that are not valid UTF-8 are replaced rather than rejected. If the
    /// file shrank it is assumed to have been rotated and is read from the
    /// start.
    pub fn read_new_lines(&mut self) -> Result<Vec<String>, TailError> {
        let io_err = |source| TailError::Io {
            path: self.path.clone(),
            source,
        };
        let mut file = File::open(&self.path).map_err(io_err)?;
        let length = file.metadata().map_err(io_err)?.len();
        if length < self.offset {
            debug!(path = %self.path.display(), "Log truncated; rewinding");
            self.offset = 0;
        }
        file.seek(SeekFrom::Start(self.offset)).map_err(io_err)?;

        let mut reader = BufReader::new(file);
        let mut lines = Vec::new();
        let mut buffer = Vec::new();
        loop {
            buffer.clear();
            let read = match reader.read_until(b'\n', &mut buffer) {
                Ok(read) => read,
                Err(err) if lines.is_empty() => return Err(io_err(err)),
                Err(err) => {
                    // Keep what was read; the rest is retried next time.
                    warn!(%err, path = %self.path.display(), "Partial log read");
                    break;
                }
            };
            if read == 0 || buffer.last() != Some(&b'\n') {
                break;
            }
            self.offset += read as u64;
            let text = String::from_utf8_lossy(&buffer);
            lines.push(text.trim_end_matches(&['\r', '\n'][..]).to_string());
        }
        Ok(lines)
    }

    /// Switch to a network log newly created in the followed directory.
    ///
    /// Returns `true` when the tail moved to a new file, which is then read
    /// from its start.
    pub fn follow_rotation(&mut self, event: &Event) -> bool {
        let Some(directory) = self.directory.as_deref() else {
            return false;
        };
        if !matches!(event.kind, EventKind::Create(_)) {
            return false;
        }
        let Some(next) = event.paths.iter().find(|path| {
            path.as_path() != self.path
                && path.parent() == Some(directory)
                && path
                    .file_name()
                    .map_or(false, |name| is_network_log(&name.to_string_lossy()))
        }) else {
            return false;
        };
        info!(
            from = %self.path.display(),
            to = %next.display(),
            "Network log rotated"
        );
        self.path = next.clone();
        self.offset = 0;
        true
    }

    /// Watch the file and forward new lines until the receiver goes away.
    pub async fn run(mut self, sender: mpsc::Sender<LogFeed>) -> Result<(), TailError> {
        let (notify_tx, mut notify_rx) = mpsc::unbounded_channel::<notify::Result<Event>>();
        let mut watcher = notify::recommended_watcher(move |result: notify::Result<Event>| {
            if notify_tx.send(result).is_err() {
                debug!("Log watcher receiver dropped");
            }
        })
        .map_err(|source| TailError::Watch {
            path: self.path.clone(),
            source,
        })?;

        let watch_dir = match &self.directory {
            Some(directory) => directory.clone(),
            None => self
                .path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from(".")),
        };
        watcher
            .watch(&watch_dir, RecursiveMode::NonRecursive)
            .map_err(|source| TailError::Watch {
                path: watch_dir.clone(),
                source,
            })?;

        while let Some(result) = notify_rx.recv().await {
            let event = match result {
                Ok(event) => event,
                Err(err) => {
                    warn!(?err, "Log watcher error");
                    continue;
                }
            };
            let rotated = self.follow_rotation(&event);
            if !rotated && !self.is_relevant(&event) {
                continue;
            }

            let lines = match self.read_new_lines() {
                Ok(lines) => lines,
                Err(err) => {
                    warn!(%err, "Failed to read log update");
                    continue;
                }
            };
            for line in lines {
                let feed = match parse_zone_change(&line) {
                    Some(zone_id) => LogFeed::Zone(zone_id),
                    None => LogFeed::Line(line),
                };
                if sender.send(feed).await.is_err() {
                    return Ok(());
                }
            }
        }

        Ok(())
    }

    fn is_relevant(&self, event: &Event) -> bool {
        if !matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_)) {
            return false;
        }
        let Some(file_name) = self.path.file_name() else {
            return false;
        };
        event
            .paths
            .iter()
            .any(|path| path == &self.path || path.file_name() == Some(file_name))
    }
}

fn is_network_log(name: &str) -> bool {
    name.starts_with(NETWORK_LOG_PREFIX) && name.ends_with(".log")
}

/// Most recently modified `Network_*.log` file directly inside `dir`.
pub fn latest_log_file(dir: &Path) -> Result<Option<PathBuf>, TailError> {
    let mut latest: Option<(SystemTime, PathBuf)> = None;
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry.map_err(|err| TailError::Io {
            path: dir.to_path_buf(),
            source: err.into(),
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        if !is_network_log(&entry.file_name().to_string_lossy()) {
            continue;
        }
        let modified = entry
            .metadata()
            .ok()
            .and_then(|metadata| metadata.modified().ok())
            .unwrap_or(SystemTime::UNIX_EPOCH);
        if latest
            .as_ref()
            .map_or(true, |(latest_time, _)| modified > *latest_time)
        {
            latest = Some((modified, entry.into_path()));
        }
    }
    Ok(latest.map(|(_, path)| path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{fs, io::Write};

    use anyhow::Result;
    use notify::event::CreateKind;
    use tempfile::tempdir;

    fn append(path: &Path, text: &str) -> Result<()> {
        append_bytes(path, text.as_bytes())
    }

    fn append_bytes(path: &Path, bytes: &[u8]) -> Result<()> {
        let mut file = fs::OpenOptions::new().append(true).open(path)?;
        file.write_all(bytes)?;
        Ok(())
    }

    fn created(path: &Path) -> Event {
        Event::new(EventKind::Create(CreateKind::File)).add_path(path.to_path_buf())
    }

    #[test]
    fn reads_only_appended_complete_lines() -> Result<()> {
        let temp = tempdir()?;
        let path = temp.path().join("Network_26001_20211125.log");
        fs::write(&path, "00|old|0039||history line|\n")?;

        let mut tail = LogTail::open(&path)?;
        assert!(tail.read_new_lines()?.is_empty());

        append(&path, "00|t1|08c3||You cast your line.|a\r\n00|t2|08c3||Something")?;
        assert_eq!(tail.read_new_lines()?, vec!["00|t1|08c3||You cast your line.|a"]);

        append(&path, " bites!|b\n")?;
        assert_eq!(tail.read_new_lines()?, vec!["00|t2|08c3||Something bites!|b"]);
        assert!(tail.read_new_lines()?.is_empty());
        Ok(())
    }

    #[test]
    fn multibyte_character_split_across_writes() -> Result<()> {
        let temp = tempdir()?;
        let path = temp.path().join("Network_1.log");
        fs::write(&path, "")?;

        let mut tail = LogTail::open(&path)?;
        append_bytes(&path, b"00|t|0839||caf\xC3")?;
        assert!(tail.read_new_lines()?.is_empty());

        append_bytes(&path, b"\xA9|\n00|t|08c3||You cast your line.|\n")?;
        assert_eq!(
            tail.read_new_lines()?,
            vec!["00|t|0839||caf\u{e9}|", "00|t|08c3||You cast your line.|"]
        );
        Ok(())
    }

    #[test]
    fn invalid_utf8_line_does_not_block_later_lines() -> Result<()> {
        let temp = tempdir()?;
        let path = temp.path().join("Network_1.log");
        fs::write(&path, "")?;

        let mut tail = LogTail::open(&path)?;
        append_bytes(&path, b"00|t|0039||\xFF|\n00|t|08c3||You cast your line.|\n")?;
        let lines = tail.read_new_lines()?;
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "00|t|0039||\u{fffd}|");
        assert_eq!(lines[1], "00|t|08c3||You cast your line.|");
        assert!(tail.read_new_lines()?.is_empty());
        Ok(())
    }

    #[test]
    fn switches_to_new_log_created_in_directory() -> Result<()> {
        let temp = tempdir()?;
        let first = temp.path().join("Network_1.log");
        fs::write(&first, "00|old|0039||history|\n")?;

        let mut tail = LogTail::open(temp.path())?;
        assert!(!tail.follow_rotation(&created(&temp.path().join("notes.log"))));
        assert!(!tail.follow_rotation(&created(&first)));

        let second = temp.path().join("Network_2.log");
        fs::write(&second, "00|t|08c3||You cast your line.|\n")?;
        assert!(tail.follow_rotation(&created(&second)));
        assert_eq!(tail.path(), second.as_path());
        assert_eq!(tail.read_new_lines()?, vec!["00|t|08c3||You cast your line.|"]);
        Ok(())
    }

    #[test]
    fn single_file_tail_ignores_new_logs() -> Result<()> {
        let temp = tempdir()?;
        let first = temp.path().join("Network_1.log");
        fs::write(&first, "")?;

        let mut tail = LogTail::open(&first)?;
        let second = temp.path().join("Network_2.log");
        fs::write(&second, "")?;
        assert!(!tail.follow_rotation(&created(&second)));
        assert_eq!(tail.path(), first.as_path());
        Ok(())
    }

    #[test]
    fn rewinds_after_truncation() -> Result<()> {
        let temp = tempdir()?;
        let path = temp.path().join("Network_1.log");
        fs::write(&path, "a much longer line of history\n")?;

        let mut tail = LogTail::open(&path)?;
        fs::write(&path, "fresh\n")?;
        assert_eq!(tail.read_new_lines()?, vec!["fresh"]);
        Ok(())
    }

    #[test]
    fn picks_newest_network_log_in_directory() -> Result<()> {
        let temp = tempdir()?;
        let older = temp.path().join("Network_1.log");
        let newer = temp.path().join("Network_2.log");
        fs::write(&older, "")?;
        fs::write(temp.path().join("notes.txt"), "")?;
        fs::write(&newer, "")?;
        let file = fs::File::options().write(true).open(&older)?;
        file.set_modified(SystemTime::UNIX_EPOCH + std::time::Duration::from_secs(60))?;

        let tail = LogTail::open(temp.path())?;
        assert_eq!(tail.path(), newer.as_path());
        Ok(())
    }

    #[tokio::test]
    async fn forwards_lines_and_zone_changes() -> Result<()> {
        let temp = tempdir()?;
        let path = temp.path().join("Network_3.log");
        fs::write(&path, "00|old|0039||history|\n")?;

        let tail = LogTail::open(&path)?;
        let (tx, mut rx) = mpsc::channel(16);
        let task = tokio::spawn(tail.run(tx));

        let mut received = Vec::new();
        let deadline = tokio::time::Instant::now() + std::time::Duration::from_secs(5);
        while received.len() < 2 && tokio::time::Instant::now() < deadline {
            if received.is_empty() {
                append(
                    &path,
                    "01|2021|384|The Endeavor|\n00|t|08c3||You cast your line.|\n",
                )?;
            }
            if let Ok(Some(feed)) =
                tokio::time::timeout(std::time::Duration::from_millis(200), rx.recv()).await
            {
                received.push(feed);
            }
        }
        task.abort();

        assert_eq!(received.first(), Some(&LogFeed::Zone(900)));
        assert_eq!(
            received.get(1),
            Some(&LogFeed::Line("00|t|08c3||You cast your line.|".to_string()))
        );
        Ok(())
    }

    #[tokio::test]
    async fn follows_rotation_while_running() -> Result<()> {
        let temp = tempdir()?;
        fs::write(temp.path().join("Network_1.log"), "00|old|0039||history|\n")?;

        let tail = LogTail::open(temp.path())?;
        let (tx, mut rx) = mpsc::channel(16);
        let task = tokio::spawn(tail.run(tx));
        tokio::time::sleep(std::time::Duration::from_millis(200)).await;

        let second = temp.path().join("Network_2.log");
        fs::write(&second, "01|2021|384|The Endeavor|\n")?;

        let mut received = Vec::new();
        let deadline = tokio::time::Instant::now() + std::time::Duration::from_secs(5);
        while received.len() < 2 && tokio::time::Instant::now() < deadline {
            if received.len() == 1 {
                append(&second, "00|t|08c3||You cast your line.|\n")?;
            }
            if let Ok(Some(feed)) =
                tokio::time::timeout(std::time::Duration::from_millis(200), rx.recv()).await
            {
                received.push(feed);
            }
        }
        task.abort();

        assert_eq!(received.first(), Some(&LogFeed::Zone(900)));
        assert_eq!(
            received.get(1),
            Some(&LogFeed::Line("00|t|08c3||You cast your line.|".to_string()))
        );
        Ok(())
    }

    #[test]
    fn empty_directory_is_an_error() -> Result<()> {
        let temp = tempdir()?;
        assert!(matches!(
            LogTail::open(temp.path()),
            Err(TailError::NoLogFile(_))
        ));
        Ok(())
    }
}
