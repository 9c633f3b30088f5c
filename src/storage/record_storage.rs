use std::{
    collections::HashMap,
    future::Future,
    io::ErrorKind,
    marker::PhantomData,
    path::{Path, PathBuf},
};

use anyhow::Result;
use chrono::NaiveDate;
use fs4::tokio::AsyncFileExt;
use futures::{stream, StreamExt};
use tokio::{
    fs::File,
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader},
};
use tracing::{debug, error, warn};

use crate::tracking::date::CalendarDate;

use super::entities::{DatedRecord, Record};

/// Inclusive range of days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub since: CalendarDate,
    pub until: CalendarDate,
}

impl DateWindow {
    pub fn new(since: CalendarDate, until: CalendarDate) -> Self {
        Self { since, until }
    }

    pub fn day(date: CalendarDate) -> Self {
        Self::new(date, date)
    }

    /// Days shared by both windows. The result is empty when they don't overlap.
    pub fn intersect(&self, other: DateWindow) -> Self {
        Self::new(self.since.max(other.since), self.until.min(other.until))
    }

    pub fn days(&self) -> impl Iterator<Item = CalendarDate> {
        let since = self.since;
        (0..=self.until.days_since(since).max(-1)).map(move |offset| since.add_days(offset))
    }
}

/// Repository of records grouped by day.
pub trait RecordStorage<T: DatedRecord> {
    /// Current state of every record dated inside `window`.
    fn read(&self, window: DateWindow) -> impl Future<Output = Result<Vec<T>>>;

    /// Stores a new record or a new version of an existing one.
    fn write(&self, record: T) -> impl Future<Output = Result<()>>;
}

/// Number of day files read concurrently.
const PARALLEL_READS: usize = 4;

/// The main realization of [RecordStorage]. Each day has its own file named after the date,
/// holding one JSON record per line.
pub struct DayJournal<T> {
    dir: PathBuf,
    _record: PhantomData<T>,
}

impl<T: DatedRecord> DayJournal<T> {
    pub fn new(dir: PathBuf) -> Result<Self, std::io::Error> {
        std::fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            _record: PhantomData,
        })
    }

    fn path_for(&self, date: CalendarDate) -> PathBuf {
        self.dir.join(date.to_string())
    }

    /// Window from the first to the last day that has a file, [None] when nothing was stored yet.
    pub async fn stored_window(&self) -> Result<Option<DateWindow>> {
        let mut entries = tokio::fs::read_dir(&self.dir).await?;
        let mut window: Option<DateWindow> = None;
        while let Some(entry) = entries.next_entry().await? {
            let Ok(day) = entry.file_name().to_string_lossy().parse::<CalendarDate>() else {
                continue;
            };
            window = Some(match window {
                Some(v) => DateWindow::new(v.since.min(day), v.until.max(day)),
                None => DateWindow::day(day),
            });
        }
        Ok(window)
    }

    /// Every stored record.
    pub async fn read_all(&self) -> Result<Vec<T>> {
        self.read(DateWindow::new(
            CalendarDate::new(NaiveDate::MIN),
            CalendarDate::new(NaiveDate::MAX),
        ))
        .await
    }
}

impl<T: DatedRecord> RecordStorage<T> for DayJournal<T> {
    async fn read(&self, window: DateWindow) -> Result<Vec<T>> {
        // Only days between the first and last file can have records
        let Some(stored) = self.stored_window().await? else {
            return Ok(vec![]);
        };
        let files = stream::iter(window.intersect(stored).days())
            .map(|day| {
                let path = self.path_for(day);
                async move { (day, read_journal::<T>(&path).await) }
            })
            .buffered(PARALLEL_READS);
        let mut files = std::pin::pin!(files);

        let mut records = vec![];
        while let Some((day, data)) = files.next().await {
            let data = data.inspect_err(|e| error!("Failed to read records of {day}: {e:?}"))?;
            records.extend(data);
        }
        Ok(records)
    }

    async fn write(&self, record: T) -> Result<()> {
        append_journal(&self.path_for(record.date()), &record).await
    }
}

/// Single file journal for records that don't belong to a day.
pub struct Journal<T> {
    path: PathBuf,
    _record: PhantomData<T>,
}

impl<T: Record> Journal<T> {
    pub fn new(path: PathBuf) -> Result<Self, std::io::Error> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(Self {
            path,
            _record: PhantomData,
        })
    }

    pub async fn load(&self) -> Result<Vec<T>> {
        read_journal(&self.path).await
    }

    pub async fn write(&self, record: T) -> Result<()> {
        append_journal(&self.path, &record).await
    }
}

/// Reads a journal file and collapses it to the current state of each record. A missing file is
/// an empty journal.
async fn read_journal<T: Record>(path: &Path) -> Result<Vec<T>> {
    async fn extract<T: Record>(path: &Path) -> std::result::Result<Vec<T>, std::io::Error> {
        debug!("Extracting {path:?}");
        let file = File::open(path).await?;
        file.lock_shared()?;
        let mut lines = BufReader::new(file).lines();
        let mut records = vec![];
        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<T>(&line) {
                Ok(v) => records.push(v),
                Err(e) => {
                    // A write cut short by a crash leaves half a line behind.
                    warn!("Skipping illegal record in {path:?} {line}: {e}")
                }
            }
        }

        lines.into_inner().into_inner().unlock_async().await?;

        Ok(records)
    }

    match extract(path).await {
        Ok(records) => Ok(collapse_records(records)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(vec![]),
        Err(e) => Err(e)?,
    }
}

async fn append_journal<T: Record>(path: &Path, record: &T) -> Result<()> {
    let mut line = serde_json::to_vec(record)?;
    line.push(b'\n');

    let mut file = File::options()
        .create(true)
        .append(true)
        .open(path)
        .await?;

    file.lock_exclusive()?;
    let result: std::io::Result<()> = async {
        file.write_all(&line).await?;
        file.flush().await
    }
    .await;
    file.unlock_async().await?;
    result?;
    debug!("Appended {} to {path:?}", record.key());
    Ok(())
}

/// Keeps the last version of every key, in the order keys first appeared.
fn collapse_records<T: Record>(records: impl IntoIterator<Item = T>) -> Vec<T> {
    let mut positions = HashMap::<String, usize>::new();
    let mut collapsed: Vec<T> = vec![];
    for record in records {
        let key = record.key();
        match positions.get(&key) {
            Some(&index) => collapsed[index] = record,
            None => {
                positions.insert(key, collapsed.len());
                collapsed.push(record);
            }
        }
    }
    collapsed
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use anyhow::Result;
    use chrono::{TimeZone, Utc};
    use tempfile::tempdir;
    use uuid::Uuid;

    use crate::{
        storage::entities::{CheckinEntity, CounterEntity, TaskEntity},
        tracking::{date::CalendarDate, progress::CounterTarget},
        utils::logging::TEST_LOGGING,
    };

    use super::{collapse_records, DateWindow, DayJournal, Journal, RecordStorage};

    fn date(s: &str) -> CalendarDate {
        s.parse().unwrap()
    }

    fn checkin(counter_id: Uuid, day: &str, value: u32) -> CheckinEntity {
        CheckinEntity {
            counter_id,
            date: date(day),
            value,
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn window_days_are_inclusive() {
        let window = DateWindow::new(date("2024-01-30"), date("2024-02-02"));
        assert_eq!(window.days().count(), 4);
        assert_eq!(DateWindow::day(date("2024-01-30")).days().count(), 1);
        assert_eq!(DateWindow::new(date("2024-02-02"), date("2024-01-30")).days().count(), 0);
        let overlap = DateWindow::new(date("2024-01-01"), date("2024-01-10"))
            .intersect(DateWindow::new(date("2024-01-08"), date("2024-02-01")));
        assert_eq!(overlap, DateWindow::new(date("2024-01-08"), date("2024-01-10")));
    }

    #[test]
    fn collapse_keeps_last_version_in_first_position() {
        let id = Uuid::new_v4();
        let other = Uuid::new_v4();
        let collapsed = collapse_records(vec![
            checkin(id, "2024-01-01", 1),
            checkin(other, "2024-01-01", 1),
            checkin(id, "2024-01-01", 3),
        ]);
        assert_eq!(collapsed.len(), 2);
        assert_eq!(collapsed[0].counter_id, id);
        assert_eq!(collapsed[0].value, 3);
    }

    #[tokio::test]
    async fn day_journal_reads_window() -> Result<()> {
        *TEST_LOGGING;
        let dir = tempdir()?;
        let storage = DayJournal::<CheckinEntity>::new(dir.path().join("checkins"))?;
        let id = Uuid::new_v4();
        for day in ["2024-01-01", "2024-01-02", "2024-01-05"] {
            storage.write(checkin(id, day, 1)).await?;
        }
        // Checking in twice on the same day is not additive
        storage.write(checkin(id, "2024-01-02", 1)).await?;

        let records = storage
            .read(DateWindow::new(date("2024-01-02"), date("2024-01-05")))
            .await?;
        assert_eq!(
            records.iter().map(|v| v.date).collect::<Vec<_>>(),
            vec![date("2024-01-02"), date("2024-01-05")]
        );
        Ok(())
    }

    #[tokio::test]
    async fn read_all_spans_stored_days() -> Result<()> {
        let dir = tempdir()?;
        let storage = DayJournal::<CheckinEntity>::new(dir.path().to_path_buf())?;
        assert!(storage.read_all().await?.is_empty());

        let id = Uuid::new_v4();
        for day in ["2023-12-30", "2024-01-02"] {
            storage.write(checkin(id, day, 1)).await?;
        }
        std::fs::write(dir.path().join("notes.txt"), "not a day")?;

        assert_eq!(
            storage.stored_window().await?,
            Some(DateWindow::new(date("2023-12-30"), date("2024-01-02")))
        );
        assert_eq!(storage.read_all().await?.len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn unbounded_window_reads_stored_days_only() -> Result<()> {
        let dir = tempdir()?;
        let storage = DayJournal::<CheckinEntity>::new(dir.path().to_path_buf())?;
        let everything = DateWindow::new(date("2024-01-05").add_days(i64::MIN), date("2024-01-05"));
        assert!(storage.read(everything).await?.is_empty());

        storage.write(checkin(Uuid::new_v4(), "2024-01-03", 1)).await?;
        assert_eq!(storage.read(everything).await?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn task_toggle_reads_latest_state() -> Result<()> {
        let dir = tempdir()?;
        let storage = DayJournal::<TaskEntity>::new(dir.path().to_path_buf())?;
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap();
        let task = TaskEntity::new("write report".into(), date("2024-01-01"), now);
        storage.write(task.clone()).await?;
        storage.write(task.clone().with_completed(true, now)).await?;
        storage.write(task.clone().with_completed(false, now)).await?;
        storage.write(task.with_completed(true, now)).await?;

        let records = storage.read(DateWindow::day(date("2024-01-01"))).await?;
        assert_eq!(records.len(), 1);
        assert!(records[0].completed);
        assert_eq!(records[0].completed_at, Some(now));
        Ok(())
    }

    #[tokio::test]
    async fn corrupted_lines_are_skipped() -> Result<()> {
        *TEST_LOGGING;
        let dir = tempdir()?;
        let path = dir.path().join("counters");
        let journal = Journal::<CounterEntity>::new(path.clone())?;
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap();
        journal
            .write(CounterEntity::new("read".into(), None, CounterTarget::Daily, now))
            .await?;
        std::fs::OpenOptions::new()
            .append(true)
            .open(&path)?
            .write_all(b"{\"id\": \"half a rec")?;

        let counters = journal.load().await?;
        assert_eq!(counters.len(), 1);
        assert_eq!(counters[0].name, "read");
        Ok(())
    }

    #[tokio::test]
    async fn missing_journal_is_empty() -> Result<()> {
        let dir = tempdir()?;
        let journal = Journal::<CounterEntity>::new(dir.path().join("nothing"))?;
        assert!(journal.load().await?.is_empty());
        Ok(())
    }
}
