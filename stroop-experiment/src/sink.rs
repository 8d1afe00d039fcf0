use crate::error::Result;
use chrono::{DateTime, Local};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use stroop_core::Record;

/// Destination for completed-trial records. Each append must be durable
/// before it returns, so an aborted session keeps every finished trial.
pub trait RecordSink<R> {
    fn append(&mut self, record: &R) -> Result<()>;
}

impl<R: Clone> RecordSink<R> for Vec<R> {
    fn append(&mut self, record: &R) -> Result<()> {
        self.push(record.clone());
        Ok(())
    }
}

/// Tab-separated writer, flushed after every row
pub struct TsvSink<W: Write> {
    writer: csv::Writer<W>,
    path: Option<PathBuf>,
}

impl TsvSink<File> {
    /// Creates (truncating) `path` and writes the header row for `R`
    pub fn create<R: Record>(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::create(path)?;
        let mut sink = Self::from_writer::<R>(file)?;
        sink.path = Some(path.to_path_buf());
        Ok(sink)
    }
}

impl<W: Write> TsvSink<W> {
    pub fn from_writer<R: Record>(inner: W) -> Result<Self> {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .from_writer(inner);
        writer.write_record(R::FIELDS)?;
        writer.flush()?;
        Ok(Self { writer, path: None })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn into_inner(self) -> Option<W> {
        self.writer.into_inner().ok()
    }
}

impl<R: Record, W: Write> RecordSink<R> for TsvSink<W> {
    fn append(&mut self, record: &R) -> Result<()> {
        self.writer.serialize(record)?;
        self.writer.flush()?;
        Ok(())
    }
}

/// `{prefix}_{participant}_{YYYYmmdd_HHMMSS}.tsv` inside `dir`
pub fn timestamped_path(dir: &Path, prefix: &str, participant_id: &str, at: DateTime<Local>) -> PathBuf {
    let id: String = participant_id
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' { c } else { '_' })
        .collect();
    let stamp = at.format("%Y%m%d_%H%M%S");
    if id.is_empty() {
        dir.join(format!("{prefix}_{stamp}.tsv"))
    } else {
        dir.join(format!("{prefix}_{id}_{stamp}.tsv"))
    }
}
