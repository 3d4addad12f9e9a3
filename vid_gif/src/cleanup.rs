//! End-of-run removal of intermediate files.

use std::fs;
use std::io::ErrorKind;
use std::ops::{Deref, DerefMut};
use std::path::PathBuf;
use tracing::{debug, warn};

use crate::job::ConversionJob;

/// Owns the job for the rest of the run and cleans up after it on drop,
/// whichever stage returned early.
pub struct CleanupGuard {
    job: ConversionJob,
}

impl CleanupGuard {
    pub fn new(job: ConversionJob) -> Self {
        Self { job }
    }
}

impl Deref for CleanupGuard {
    type Target = ConversionJob;

    fn deref(&self) -> &ConversionJob {
        &self.job
    }
}

impl DerefMut for CleanupGuard {
    fn deref_mut(&mut self) -> &mut ConversionJob {
        &mut self.job
    }
}

impl Drop for CleanupGuard {
    fn drop(&mut self) {
        cleanup(&self.job);
    }
}

/// Delete the job's intermediate files. Returns the paths that could not be
/// removed; each one has already been reported as a warning.
pub fn cleanup(job: &ConversionJob) -> Vec<PathBuf> {
    if job.keep_files {
        debug!("Keeping intermediate files");
        return Vec::new();
    }

    let mut failed = Vec::new();
    for path in job.cleanup_targets() {
        match fs::remove_file(&path) {
            Ok(()) => debug!(path = %path.display(), "Removed intermediate file"),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "Intermediate file already gone")
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to remove intermediate file");
                eprintln!("⚠️ [cleanup] Could not remove file {}: {}", path.display(), e);
                failed.push(path);
            }
        }
    }
    failed
}
