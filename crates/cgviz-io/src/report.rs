//! Per-file load outcome.

use std::fmt;

use cgviz_core::VizError;

/// A file that failed to load and why.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadFailure {
    pub file: String,
    pub error: VizError,
}

/// Outcome of loading a batch of files.
///
/// A failing file never aborts the batch; it is recorded here and the
/// remaining files still load.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    /// Loaded file names, in load order.
    pub loaded: Vec<String>,
    pub failed: Vec<LoadFailure>,
}

impl LoadReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_loaded(&mut self, file: impl Into<String>) {
        self.loaded.push(file.into());
    }

    pub fn record_failure(&mut self, file: impl Into<String>, error: VizError) {
        let file = file.into();
        log::warn!("Failed to load {}: {}", file, error);
        self.failed.push(LoadFailure { file, error });
    }

    /// Record the outcome of one file.
    pub fn record<T>(&mut self, file: &str, result: Result<T, VizError>) -> Option<T> {
        match result {
            Ok(value) => {
                self.record_loaded(file);
                Some(value)
            }
            Err(err) => {
                self.record_failure(file, err);
                None
            }
        }
    }

    pub fn is_ok(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn total(&self) -> usize {
        self.loaded.len() + self.failed.len()
    }

    pub fn merge(&mut self, other: LoadReport) {
        self.loaded.extend(other.loaded);
        self.failed.extend(other.failed);
    }
}

impl fmt::Display for LoadReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} loaded, {} failed", self.loaded.len(), self.failed.len())?;
        for failure in &self.failed {
            write!(f, "\n  {}: {}", failure.file, failure.error)?;
        }
        Ok(())
    }
}
