use std::fs;
use std::path::{Path, PathBuf};

use loan_tracker_core::{Loan, LoanStore, LoanTrackerError, LoanTrackerResult};
use tracing::debug;

/// Loan collection persisted as one pretty-printed JSON document.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Relative paths resolve against the working directory.
    pub fn open(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let p = Path::new(path);
        let path = if p.is_absolute() {
            p.to_path_buf()
        } else {
            std::env::current_dir()?.join(p)
        };

        if path.is_dir() {
            return Err(format!("Store path is a directory: {}", path.display()).into());
        }
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LoanStore for JsonFileStore {
    fn load(&self) -> LoanTrackerResult<Vec<Loan>> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "no store yet, starting empty");
            return Ok(Vec::new());
        }
        let contents = fs::read_to_string(&self.path).map_err(|e| {
            LoanTrackerError::Storage(format!("Failed to read '{}': {}", self.path.display(), e))
        })?;
        if contents.trim().is_empty() {
            return Ok(Vec::new());
        }
        let loans: Vec<Loan> = serde_json::from_str(&contents)?;
        debug!(path = %self.path.display(), loans = loans.len(), "store loaded");
        Ok(loans)
    }

    /// Written to a sibling temp file first and renamed over the document,
    /// so a failed write never leaves a truncated store behind.
    fn save(&self, loans: &[Loan]) -> LoanTrackerResult<()> {
        let json = serde_json::to_string_pretty(loans)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(|e| {
            LoanTrackerError::Storage(format!("Failed to write '{}': {}", tmp.display(), e))
        })?;
        fs::rename(&tmp, &self.path).map_err(|e| {
            LoanTrackerError::Storage(format!(
                "Failed to replace '{}': {}",
                self.path.display(),
                e
            ))
        })?;
        Ok(())
    }
}
