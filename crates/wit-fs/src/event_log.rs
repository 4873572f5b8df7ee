//! Filesystem event log: one `events.ndjson` per work item.
//!
//! Writers serialize on `events.lock` in the item directory. Readers take no
//! lock and ignore a trailing line that is not newline-terminated yet.

use crate::error::{FsError, Result};
use crate::lock::FileLock;
use crate::repository::EventRepository;
use chrono::Utc;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};
use wit_core::{Event, NewEvent, WorkItemId};

/// Events file name within an item directory.
pub const EVENTS_FILE: &str = "events.ndjson";
/// Lock guarding appends to the events file.
const EVENTS_LOCK: &str = "events.lock";
/// Bytes read per step when scanning back for the last event.
const TAIL_CHUNK: u64 = 4096;

/// Event log rooted at the items directory.
#[derive(Debug, Clone)]
pub struct EventLog {
    items_dir: PathBuf,
    lock_timeout: Duration,
}

impl EventLog {
    #[must_use]
    pub fn new(items_dir: impl Into<PathBuf>, lock_timeout: Duration) -> Self {
        Self {
            items_dir: items_dir.into(),
            lock_timeout,
        }
    }

    fn item_dir(&self, id: &WorkItemId) -> PathBuf {
        self.items_dir.join(id.to_string())
    }

    /// Path of a work item's events file.
    #[must_use]
    pub fn events_path(&self, id: &WorkItemId) -> PathBuf {
        self.item_dir(id).join(EVENTS_FILE)
    }

    fn append(&self, event: NewEvent) -> Result<Event> {
        let dir = self.item_dir(&event.work_item_id);
        let _lock = FileLock::acquire(&dir.join(EVENTS_LOCK), self.lock_timeout)?;

        let path = dir.join(EVENTS_FILE);
        let tail = read_tail(&path)?;
        if tail.torn {
            // A writer died mid-line; drop the fragment before appending.
            warn!(path = %path.display(), "Truncating unterminated event line");
            OpenOptions::new()
                .write(true)
                .open(&path)?
                .set_len(tail.complete_len)?;
        }
        let sequence = tail.last_sequence + 1;

        let event = event.into_event(sequence, Utc::now());
        let mut line = serde_json::to_string(&event)?;
        line.push('\n');

        let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
        file.write_all(line.as_bytes())?;
        file.sync_data()?;

        debug!(
            work_item_id = %event.work_item_id,
            sequence = event.sequence,
            name = %event.name,
            "Appended event"
        );

        Ok(event)
    }
}

impl EventRepository for EventLog {
    fn create(&self, event: NewEvent) -> Result<Event> {
        let id = event.work_item_id;
        self.append(event)
            .map_err(|err| FsError::event_log(id, "create", err))
    }

    fn list(&self, work_item_id: &WorkItemId) -> Result<Vec<Event>> {
        read_log(&self.events_path(work_item_id))
            .map_err(|err| FsError::event_log(*work_item_id, "list", err))
    }
}

/// End of an events file as seen by a writer.
#[derive(Debug, Default)]
struct Tail {
    /// Sequence of the last complete event, 0 when there is none.
    last_sequence: u64,
    /// Byte length of the newline-terminated prefix.
    complete_len: u64,
    /// Whether bytes follow the last newline.
    torn: bool,
}

/// Locate the last complete event by reading backwards from the end.
fn read_tail(path: &Path) -> Result<Tail> {
    let mut file = match File::open(path) {
        Ok(file) => file,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Tail::default()),
        Err(err) => return Err(err.into()),
    };
    let len = file.metadata()?.len();

    // `buf` holds bytes `start..len` of the file.
    let mut buf: Vec<u8> = Vec::new();
    let mut start = len;
    while start > 0 {
        let chunk_start = start.saturating_sub(TAIL_CHUNK);
        let mut chunk = vec![0; usize::try_from(start - chunk_start).unwrap_or(0)];
        file.seek(SeekFrom::Start(chunk_start))?;
        file.read_exact(&mut chunk)?;
        chunk.extend_from_slice(&buf);
        buf = chunk;
        start = chunk_start;

        let Some(end) = buf.iter().rposition(|b| *b == b'\n') else {
            continue;
        };
        let line_start = buf[..end].iter().rposition(|b| *b == b'\n').map(|i| i + 1);
        if line_start.is_none() && start > 0 {
            continue;
        }

        let line = std::str::from_utf8(&buf[line_start.unwrap_or(0)..end])
            .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?;
        let complete_len = start + end as u64 + 1;
        if line.trim().is_empty() {
            // Blank separator lines are never written by the log; fall back to a full scan.
            let last_sequence = read_log(path)?.last().map_or(0, |e| e.sequence);
            return Ok(Tail {
                last_sequence,
                complete_len,
                torn: complete_len != len,
            });
        }

        let last: Event = serde_json::from_str(line)?;
        return Ok(Tail {
            last_sequence: last.sequence,
            complete_len,
            torn: complete_len != len,
        });
    }

    Ok(Tail {
        last_sequence: 0,
        complete_len: 0,
        torn: len > 0,
    })
}

/// Parse every newline-terminated line of an events file.
fn read_log(path: &Path) -> Result<Vec<Event>> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => return Err(err.into()),
    };

    let complete = bytes
        .iter()
        .rposition(|b| *b == b'\n')
        .map_or(&[][..], |end| &bytes[..=end]);

    let text = std::str::from_utf8(complete)
        .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?;

    text.lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| serde_json::from_str(line).map_err(FsError::from))
        .collect()
}
