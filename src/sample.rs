//! Sample storage: the ordered ground truth the models train against.
//!
//! A [`SampleStore`] is an append-only sequence of observed
//! `(input, output)` pairs stamped at insertion time. Duplicate inputs are
//! permitted and all of them influence predictions. The store can be
//! exported to and re-imported from a versioned [`SampleArchive`] without
//! loss; choosing a storage medium for the archive is the caller's concern.

use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::error::{AdivinarError, Result};

/// Archive format version written by this build.
pub const FORMAT_VERSION: &str = "1.0";

/// One observed `(input, output)` pair.
///
/// Immutable once created; `inserted_at_ms` is a millisecond wall-clock
/// timestamp used only for recency weighting and archive round-trips.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Observed input value.
    pub input: f64,
    /// Observed output value.
    pub output: f64,
    /// Insertion timestamp, milliseconds since the Unix epoch.
    pub inserted_at_ms: u64,
}

/// Append-only ordered collection of samples.
///
/// # Examples
///
/// ```
/// use adivinar::sample::SampleStore;
///
/// let mut store = SampleStore::new();
/// store.add(1.0, 2.0);
/// store.add(2.0, 4.0);
/// assert_eq!(store.len(), 2);
/// assert_eq!(store.outputs(), vec![2.0, 4.0]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct SampleStore {
    samples: Vec<Sample>,
    last_ms: u64,
}

impl SampleStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a sample stamped with the current wall clock.
    ///
    /// Timestamps are clamped to be non-decreasing across inserts so a
    /// recency-sorted view never reorders within a store's lifetime.
    pub fn add(&mut self, input: f64, output: f64) {
        let ts = now_ms().max(self.last_ms);
        self.add_at(input, output, ts);
    }

    /// Appends a sample with an explicit timestamp (imports, tests).
    pub fn add_at(&mut self, input: f64, output: f64, inserted_at_ms: u64) {
        self.last_ms = self.last_ms.max(inserted_at_ms);
        self.samples.push(Sample {
            input,
            output,
            inserted_at_ms,
        });
    }

    /// Empties the store.
    pub fn clear(&mut self) {
        self.samples.clear();
    }

    /// All samples in insertion order.
    #[must_use]
    pub fn all(&self) -> &[Sample] {
        &self.samples
    }

    /// Number of stored samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// True when no samples are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Input values in insertion order.
    #[must_use]
    pub fn inputs(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.input).collect()
    }

    /// Output values in insertion order.
    #[must_use]
    pub fn outputs(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.output).collect()
    }

    /// Snapshots the store into a versioned archive.
    #[must_use]
    pub fn export(&self) -> SampleArchive {
        SampleArchive {
            version: FORMAT_VERSION.to_string(),
            samples: self.samples.clone(),
        }
    }

    /// Replaces the store contents with the archive's samples.
    ///
    /// # Errors
    ///
    /// Returns [`AdivinarError::UnsupportedVersion`] when the archive was
    /// written by an incompatible major version.
    pub fn import(&mut self, archive: SampleArchive) -> Result<()> {
        archive.check_version()?;
        self.last_ms = archive
            .samples
            .iter()
            .map(|s| s.inserted_at_ms)
            .max()
            .unwrap_or(0);
        self.samples = archive.samples;
        Ok(())
    }
}

/// Serializable snapshot of a sample sequence with a format version tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleArchive {
    /// Archive format version, `major.minor`.
    pub version: String,
    /// Sample records in insertion order.
    pub samples: Vec<Sample>,
}

impl SampleArchive {
    fn check_version(&self) -> Result<()> {
        if self.version.split('.').next() == Some("1") {
            Ok(())
        } else {
            Err(AdivinarError::UnsupportedVersion {
                found: self.version.clone(),
                supported: "1.x".to_string(),
            })
        }
    }

    /// Serializes the archive to pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`AdivinarError::Serialization`] on encoding failure.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| AdivinarError::Serialization(e.to_string()))
    }

    /// Parses an archive from JSON and validates its version tag.
    ///
    /// # Errors
    ///
    /// Returns [`AdivinarError::Serialization`] on malformed JSON and
    /// [`AdivinarError::UnsupportedVersion`] on an incompatible version.
    pub fn from_json(json: &str) -> Result<Self> {
        let archive: Self =
            serde_json::from_str(json).map_err(|e| AdivinarError::Serialization(e.to_string()))?;
        archive.check_version()?;
        Ok(archive)
    }

    /// Writes the archive as JSON to `path`.
    ///
    /// # Errors
    ///
    /// Returns an error on serialization or I/O failure.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Reads a JSON archive from `path`.
    ///
    /// # Errors
    ///
    /// Returns an error on I/O, parse, or version failure.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
