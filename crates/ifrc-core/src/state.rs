//! Last-successful-run watermark kept in a single file.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use tracing::{debug, info};

/// Default state file name, relative to the working directory.
pub const STATE_FILE_NAME: &str = "last_run_date.txt";

/// Watermark read at startup and replaced only by an explicit commit.
///
/// Dropping a `RunState` without calling [`RunState::commit`] leaves the
/// file untouched.
#[derive(Debug, Clone)]
pub struct RunState {
    path: PathBuf,
    last_run: DateTime<Utc>,
    from_file: bool,
}

impl RunState {
    /// Reads the watermark at `path`, falling back to `initial` (at
    /// midnight UTC) when the file does not exist.
    pub fn load(path: impl Into<PathBuf>, initial: NaiveDate) -> Result<Self> {
        let path = path.into();
        match fs::read_to_string(&path) {
            Ok(text) => {
                let last_run = parse_watermark(text.trim())
                    .with_context(|| format!("parse state file {}", path.display()))?;
                debug!(path = %path.display(), %last_run, "loaded run state");
                Ok(Self {
                    path,
                    last_run,
                    from_file: true,
                })
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let last_run = initial.and_time(chrono::NaiveTime::MIN).and_utc();
                info!(path = %path.display(), %last_run, "no run state; using initial run date");
                Ok(Self {
                    path,
                    last_run,
                    from_file: false,
                })
            }
            Err(e) => Err(e).with_context(|| format!("read state file {}", path.display())),
        }
    }

    #[must_use]
    pub fn last_run(&self) -> DateTime<Utc> {
        self.last_run
    }

    /// Whether the watermark came from an existing state file.
    #[must_use]
    pub fn from_file(&self) -> bool {
        self.from_file
    }

    /// Replaces the state file with `now`, via a sibling temp file and rename.
    pub fn commit(self, now: DateTime<Utc>) -> Result<()> {
        let text = now.to_rfc3339_opts(SecondsFormat::Secs, true);
        let file_name = self
            .path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| STATE_FILE_NAME.to_string());
        let temp = self.path.with_file_name(format!(".{file_name}.tmp"));
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)
                .with_context(|| format!("create state folder {}", parent.display()))?;
        }
        fs::write(&temp, format!("{text}\n"))
            .with_context(|| format!("write {}", temp.display()))?;
        fs::rename(&temp, &self.path)
            .with_context(|| format!("replace state file {}", self.path.display()))?;
        info!(path = %self.path.display(), watermark = %text, "committed run state");
        Ok(())
    }
}

fn parse_watermark(text: &str) -> Result<DateTime<Utc>> {
    if let Ok(value) = DateTime::parse_from_rfc3339(text) {
        return Ok(value.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .with_context(|| format!("invalid watermark `{text}`"))?;
    Ok(date.and_time(chrono::NaiveTime::MIN).and_utc())
}
