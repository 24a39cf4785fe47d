//! The authoritative record of a processed batch. Callers must consult the
//! manifest rather than infer success from directory listings.

use std::path::PathBuf;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::ProcessingError;
use crate::writer::WrittenProfile;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileEntry {
    pub site_id: u32,
    pub date: NaiveDate,
    pub index: usize,
    pub table_path: PathBuf,
    pub figure_path: Option<PathBuf>,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailedEntry {
    pub date: NaiveDate,
    /// Profile index when the failure was span-scoped, `None` when the
    /// whole day unit failed.
    pub index: Option<usize>,
    pub error_kind: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ManifestEntry {
    Profile(ProfileEntry),
    /// A day that processed cleanly but where no cast met the thresholds.
    /// Distinct from a failure by contract.
    EmptyDay { date: NaiveDate },
    Failed(FailedEntry),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputManifest {
    pub entries: Vec<ManifestEntry>,
}

impl OutputManifest {
    pub fn push_profile(&mut self, site_id: u32, date: NaiveDate, index: usize, written: WrittenProfile) {
        self.entries.push(ManifestEntry::Profile(ProfileEntry {
            site_id,
            date,
            index,
            table_path: written.table_path,
            figure_path: written.figure_path,
            warnings: written.warnings,
        }));
    }

    pub fn push_empty_day(&mut self, date: NaiveDate) {
        self.entries.push(ManifestEntry::EmptyDay { date });
    }

    pub fn push_failure(&mut self, date: NaiveDate, index: Option<usize>, error: &ProcessingError) {
        self.entries.push(ManifestEntry::Failed(FailedEntry {
            date,
            index,
            error_kind: error.kind().to_string(),
            message: error.to_string(),
        }));
    }

    pub fn profiles(&self) -> impl Iterator<Item = &ProfileEntry> {
        self.entries.iter().filter_map(|entry| match entry {
            ManifestEntry::Profile(profile) => Some(profile),
            _ => None,
        })
    }

    pub fn failures(&self) -> impl Iterator<Item = &FailedEntry> {
        self.entries.iter().filter_map(|entry| match entry {
            ManifestEntry::Failed(failed) => Some(failed),
            _ => None,
        })
    }

    pub fn profile_count(&self) -> usize {
        self.profiles().count()
    }

    pub fn failure_count(&self) -> usize {
        self.failures().count()
    }

    pub fn empty_day_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| matches!(entry, ManifestEntry::EmptyDay { .. }))
            .count()
    }
}
