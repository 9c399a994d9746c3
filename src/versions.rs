// ABOUTME: Durable per-service version record backed by a flat text file.
// ABOUTME: Lines are `service:version`; every save rewrites the file and syncs it to disk.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// First line of a freshly initialised version file.
pub const HEADER: &str = "Service Versions";

#[derive(Debug, Error)]
pub enum VersionStoreError {
    #[error("version record is empty, nothing to save")]
    Empty,

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Current version of every known service.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VersionRecord(BTreeMap<String, String>);

impl VersionRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, service: &str) -> Option<&str> {
        self.0.get(service).map(String::as_str)
    }

    pub fn set(&mut self, service: impl Into<String>, version: impl Into<String>) {
        self.0.insert(service.into(), version.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    fn parse(content: &str) -> Self {
        let entries = content
            .lines()
            .filter_map(|line| line.split_once(':'))
            .map(|(service, version)| (service.trim(), version.trim()))
            .filter(|(service, version)| !service.is_empty() && !version.is_empty())
            .map(|(service, version)| (service.to_string(), version.to_string()))
            .collect();
        Self(entries)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for VersionRecord {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Owns the on-disk version file.
#[derive(Debug, Clone)]
pub struct VersionStore {
    path: PathBuf,
}

impl VersionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the file with just the header line if it does not exist yet.
    pub fn initialize(&self) -> Result<(), VersionStoreError> {
        if self.path.exists() {
            return Ok(());
        }
        std::fs::write(&self.path, format!("{HEADER}\n")).map_err(|source| {
            VersionStoreError::Write {
                path: self.path.clone(),
                source,
            }
        })?;
        tracing::info!(event = "file_created", path = %self.path.display(), "version file created");
        Ok(())
    }

    /// Load the record. A missing file is an empty record, not an error.
    pub fn read(&self) -> Result<VersionRecord, VersionStoreError> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => Ok(VersionRecord::parse(&content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(VersionRecord::new()),
            Err(source) => Err(VersionStoreError::Read {
                path: self.path.clone(),
                source,
            }),
        }
    }

    /// Overwrite the file with `record` and force it to stable storage.
    pub fn write(&self, record: &VersionRecord) -> Result<(), VersionStoreError> {
        if record.is_empty() {
            return Err(VersionStoreError::Empty);
        }

        let write_err = |source| VersionStoreError::Write {
            path: self.path.clone(),
            source,
        };

        let file = File::create(&self.path).map_err(write_err)?;
        let mut writer = BufWriter::new(file);
        writeln!(writer, "{HEADER}").map_err(write_err)?;
        for (service, version) in record.iter() {
            writeln!(writer, "{service}:{version}").map_err(write_err)?;
        }
        writer.flush().map_err(write_err)?;
        let file = writer
            .into_inner()
            .map_err(|e| write_err(e.into_error()))?;
        file.sync_all().map_err(write_err)?;

        tracing::info!(
            event = "save_version",
            path = %self.path.display(),
            services = record.len(),
            "version data written"
        );
        Ok(())
    }
}
