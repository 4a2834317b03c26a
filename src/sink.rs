//! Output sinks for generated records.
//!
//! A sink receives fully materialised `(name, content)` records and owns every
//! file handle it opens. Names are not required to be unique: a later record
//! with the same name replaces the earlier one.

use std::collections::HashMap;
use std::io::{Cursor, Seek, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, info, warn};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::Result;

/// One generated output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputRecord {
    pub name: String,
    pub content: String,
}

impl OutputRecord {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }
}

/// Destination for generated records.
///
/// # Contract
///
/// - `accept` may be called any number of times, then `finish` exactly once.
/// - `finish` returns where the output landed, if it landed on disk.
pub trait OutputSink {
    fn accept(&mut self, record: OutputRecord) -> Result<()>;

    fn finish(&mut self) -> Result<Option<PathBuf>>;
}

// ============================================================================
// Archive
// ============================================================================

/// Packs every record into one zip archive.
///
/// Records are buffered until `finish`, which writes the archive to a temporary
/// file beside the destination and then renames it into place. If anything
/// fails the temporary file is removed and no partial archive is left behind.
#[derive(Debug)]
pub struct ArchiveSink {
    destination: PathBuf,
    entries: Vec<OutputRecord>,
    positions: HashMap<String, usize>,
}

impl ArchiveSink {
    pub fn new(destination: impl Into<PathBuf>) -> Self {
        Self {
            destination: destination.into(),
            entries: Vec::new(),
            positions: HashMap::new(),
        }
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }

    pub fn entry_names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    /// Write the archive into any seekable writer.
    pub fn write_to<W: Write + Seek>(&self, writer: W) -> Result<W> {
        let mut zip = ZipWriter::new(writer);
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        for entry in &self.entries {
            zip.start_file(entry.name.as_str(), options)?;
            zip.write_all(entry.content.as_bytes())?;
        }

        Ok(zip.finish()?)
    }

    /// The archive as bytes, for callers that serve it directly.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(self.write_to(Cursor::new(Vec::new()))?.into_inner())
    }
}

impl OutputSink for ArchiveSink {
    fn accept(&mut self, record: OutputRecord) -> Result<()> {
        match self.positions.get(&record.name) {
            Some(&position) => {
                warn!("Output name {} repeated; later row replaces earlier", record.name);
                self.entries[position] = record;
            }
            None => {
                debug!("Queued archive entry {}", record.name);
                self.positions.insert(record.name.clone(), self.entries.len());
                self.entries.push(record);
            }
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<Option<PathBuf>> {
        let parent = match self.destination.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&parent)?;

        let staging = NamedTempFile::new_in(&parent)?;
        let staging = self.write_to(staging)?;
        staging
            .persist(&self.destination)
            .map_err(|e| e.error)?;

        info!(
            "Wrote archive {} with {} entries",
            self.destination.display(),
            self.entries.len()
        );
        Ok(Some(self.destination.clone()))
    }
}

// ============================================================================
// Directory
// ============================================================================

/// Writes each record to its own file in a directory (single-file mode).
#[derive(Debug)]
pub struct DirectorySink {
    directory: PathBuf,
    written: Vec<PathBuf>,
}

impl DirectorySink {
    /// Create the sink, creating `directory` if needed.
    pub fn new(directory: impl Into<PathBuf>) -> Result<Self> {
        let directory = directory.into();
        std::fs::create_dir_all(&directory)?;
        Ok(Self {
            directory,
            written: Vec::new(),
        })
    }

    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

impl OutputSink for DirectorySink {
    fn accept(&mut self, record: OutputRecord) -> Result<()> {
        let path = self.directory.join(&record.name);
        if self.written.contains(&path) {
            warn!("Output name {} repeated; overwriting {}", record.name, path.display());
        } else {
            self.written.push(path.clone());
        }
        std::fs::write(&path, record.content.as_bytes())?;
        debug!("Wrote {}", path.display());
        Ok(())
    }

    fn finish(&mut self) -> Result<Option<PathBuf>> {
        info!(
            "Wrote {} files to {}",
            self.written.len(),
            self.directory.display()
        );
        Ok(Some(self.directory.clone()))
    }
}

// ============================================================================
// Memory
// ============================================================================

/// Keeps every record in memory, in the order received.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub records: Vec<OutputRecord>,
    pub finished: bool,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl OutputSink for MemorySink {
    fn accept(&mut self, record: OutputRecord) -> Result<()> {
        self.records.push(record);
        Ok(())
    }

    fn finish(&mut self) -> Result<Option<PathBuf>> {
        self.finished = true;
        Ok(None)
    }
}
