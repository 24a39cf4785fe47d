//! Core reduction pipeline for submersible CTD logger records: calendar-day
//! scanning, atmospheric correction, profile-cast detection, derived
//! quantities, and per-profile output artifacts.

pub mod atmospheric;
pub mod day_scanner;
pub mod derived;
pub mod eos;
pub mod error;
pub mod manifest;
pub mod orchestrator;
pub mod profile_detector;
pub mod sites;
pub mod types;
pub mod writer;

pub use error::{ProcessingError, Result};
pub use manifest::{FailedEntry, ManifestEntry, OutputManifest, ProfileEntry};
pub use types::{DayUnit, ProcessingParameters, ProfileDataset, ProfileSpan, RawSeries};
