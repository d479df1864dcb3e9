use std::fs;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, anyhow};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tempfile::NamedTempFile;
use tracing::{debug, info};
use vacancy_shared::{AvailabilityCalendarDto, DayEditDto, ListingDto};

use crate::month::MonthKey;

/// Host-side files for one listing: the listing itself, the availability
/// snapshot, the month being edited and the journal of live edits.
#[derive(Debug)]
pub struct DataStore {
    pub data_dir: PathBuf,
    pub listing_path: PathBuf,
    pub calendar_path: PathBuf,
    pub month_path: PathBuf,
    pub edits_path: PathBuf,
}

impl DataStore {
    #[tracing::instrument(skip(data_dir))]
    pub fn open(data_dir: &Path) -> anyhow::Result<Self> {
        let data_dir = data_dir.to_path_buf();
        fs::create_dir_all(&data_dir)
            .with_context(|| format!("failed to create {}", data_dir.display()))?;

        let listing_path = data_dir.join("listing.json");
        let calendar_path = data_dir.join("calendar.json");
        let month_path = data_dir.join("month.data");
        let edits_path = data_dir.join("edits.data");

        if !month_path.exists() {
            fs::write(&month_path, "")?;
        }
        if !edits_path.exists() {
            fs::write(&edits_path, "")?;
        }

        info!(
            data_dir = %data_dir.display(),
            listing = %listing_path.display(),
            calendar = %calendar_path.display(),
            "opened datastore"
        );

        Ok(Self {
            data_dir,
            listing_path,
            calendar_path,
            month_path,
            edits_path,
        })
    }

    /// A missing listing file means a brand-new draft listing.
    #[tracing::instrument(skip(self))]
    pub fn load_listing(&self) -> anyhow::Result<ListingDto> {
        load_json_or_default(&self.listing_path).context("failed to load listing.json")
    }

    #[tracing::instrument(skip(self, listing))]
    pub fn save_listing(&self, listing: &ListingDto) -> anyhow::Result<()> {
        save_json_atomic(&self.listing_path, listing).context("failed to save listing.json")
    }

    #[tracing::instrument(skip(self))]
    pub fn load_calendar(&self) -> anyhow::Result<AvailabilityCalendarDto> {
        load_json_or_default(&self.calendar_path).context("failed to load calendar.json")
    }

    #[tracing::instrument(skip(self, calendar), fields(months = calendar.len()))]
    pub fn save_calendar(&self, calendar: &AvailabilityCalendarDto) -> anyhow::Result<()> {
        save_json_atomic(&self.calendar_path, calendar).context("failed to save calendar.json")
    }

    #[tracing::instrument(skip(self))]
    pub fn get_current_month(&self) -> anyhow::Result<Option<MonthKey>> {
        let raw = fs::read_to_string(&self.month_path)
            .with_context(|| format!("failed reading {}", self.month_path.display()))?;
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            Ok(None)
        } else {
            trimmed
                .parse()
                .map(Some)
                .with_context(|| format!("corrupt {}", self.month_path.display()))
        }
    }

    #[tracing::instrument(skip(self))]
    pub fn set_current_month(&self, month: MonthKey) -> anyhow::Result<()> {
        fs::write(&self.month_path, month.to_string())
            .with_context(|| format!("failed writing {}", self.month_path.display()))?;
        Ok(())
    }

    #[tracing::instrument(skip(self, entry), fields(month = %entry.month, day = %entry.toggle.day))]
    pub fn append_edit(&self, entry: &DayEditDto) -> anyhow::Result<()> {
        let mut file = fs::OpenOptions::new()
            .append(true)
            .create(true)
            .open(&self.edits_path)
            .with_context(|| format!("failed opening {}", self.edits_path.display()))?;
        writeln!(file, "{}", serde_json::to_string(entry)?)?;
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    pub fn load_edits(&self) -> anyhow::Result<Vec<DayEditDto>> {
        load_jsonl(&self.edits_path).context("failed to load edits.data")
    }
}

#[tracing::instrument(skip(path))]
fn load_json_or_default<T>(path: &Path) -> anyhow::Result<T>
where
    T: DeserializeOwned + Default,
{
    if !path.exists() {
        debug!(file = %path.display(), "file missing, using default");
        return Ok(T::default());
    }

    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed reading {}", path.display()))?;
    if raw.trim().is_empty() {
        return Ok(T::default());
    }
    serde_json::from_str(&raw).with_context(|| format!("failed parsing {}", path.display()))
}

#[tracing::instrument(skip(path, value))]
fn save_json_atomic<T: Serialize>(path: &Path, value: &T) -> anyhow::Result<()> {
    debug!(file = %path.display(), "saving json atomically");

    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut temp = NamedTempFile::new_in(dir)?;
    serde_json::to_writer_pretty(&mut temp, value)?;
    writeln!(temp)?;
    temp.flush()?;

    temp.persist(path)
        .map_err(|err| anyhow!("failed to persist {}: {}", path.display(), err))?;

    Ok(())
}

#[tracing::instrument(skip(path))]
fn load_jsonl<T: DeserializeOwned>(path: &Path) -> anyhow::Result<Vec<T>> {
    debug!(file = %path.display(), "loading jsonl");
    let file = fs::File::open(path)?;
    let reader = BufReader::new(file);

    let mut out = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let entry: T = serde_json::from_str(trimmed)
            .with_context(|| format!("failed parsing {} line {}", path.display(), idx + 1))?;
        out.push(entry);
    }

    debug!(count = out.len(), "loaded jsonl entries");
    Ok(out)
}
