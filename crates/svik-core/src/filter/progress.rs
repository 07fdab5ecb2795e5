//! Progress tracking and cancellation for filters.
//!
//! Filters report once per processed cell through a shared
//! [`ProgressReporter`]; callbacks receive an update roughly every 1% of
//! the cells and may ask the filter to stop.

use crate::error::{ImageError, Result};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Progress information for a running filter.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressInfo {
    /// Cells processed so far.
    pub completed_pixels: usize,
    /// Cells to process in total.
    pub total_pixels: usize,
    /// Time elapsed since start.
    pub elapsed: Duration,
    /// Estimated remaining time.
    pub estimated_remaining: Option<Duration>,
}

impl ProgressInfo {
    pub fn new(completed_pixels: usize, total_pixels: usize, elapsed: Duration) -> Self {
        let mut info = Self {
            completed_pixels,
            total_pixels,
            elapsed,
            estimated_remaining: None,
        };
        info.calculate_remaining();
        info
    }

    /// Progress in `[0, 1]`.
    pub fn fraction(&self) -> f64 {
        if self.total_pixels == 0 {
            return 1.0;
        }
        self.completed_pixels as f64 / self.total_pixels as f64
    }

    pub fn progress_percent(&self) -> f64 {
        self.fraction() * 100.0
    }

    /// Calculate estimated remaining time.
    pub fn calculate_remaining(&mut self) {
        if self.completed_pixels > 0 {
            let per_pixel = self.elapsed.as_secs_f64() / self.completed_pixels as f64;
            let remaining = self.total_pixels.saturating_sub(self.completed_pixels);
            self.estimated_remaining = Some(Duration::from_secs_f64(per_pixel * remaining as f64));
        }
    }
}

/// Progress callback trait for monitoring filters.
pub trait ProgressCallback: Send + Sync {
    /// Called periodically with progress information.
    fn on_progress(&self, info: &ProgressInfo);

    /// Called when the filter starts.
    fn on_start(&self) {}

    /// Called when the filter completes successfully.
    fn on_complete(&self, _info: &ProgressInfo) {}

    /// Called when the filter fails or is aborted.
    fn on_error(&self, _error: &str) {}

    /// Polled after every cell; returning true stops the filter.
    fn should_abort(&self) -> bool {
        false
    }
}

/// Console progress callback that logs to tracing.
#[derive(Debug, Clone)]
pub struct ConsoleProgressCallback {
    /// Log interval in percent.
    pub log_interval_percent: f64,
    last_logged: Arc<Mutex<f64>>,
}

impl Default for ConsoleProgressCallback {
    fn default() -> Self {
        Self::new(10.0)
    }
}

impl ConsoleProgressCallback {
    pub fn new(log_interval_percent: f64) -> Self {
        Self {
            log_interval_percent: log_interval_percent.max(1.0),
            last_logged: Arc::new(Mutex::new(0.0)),
        }
    }
}

impl ProgressCallback for ConsoleProgressCallback {
    fn on_progress(&self, info: &ProgressInfo) {
        let percent = info.progress_percent();
        let mut last = self
            .last_logged
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if percent - *last < self.log_interval_percent
            && info.completed_pixels < info.total_pixels
        {
            return;
        }
        *last = percent;
        drop(last);

        let remaining = info
            .estimated_remaining
            .map(|d| format!("{:.2}s", d.as_secs_f64()))
            .unwrap_or_else(|| "N/A".to_string());
        tracing::info!(
            "Resampled {}/{} pixels ({:.1}%) | Elapsed: {:.2}s | ETA: {}",
            info.completed_pixels,
            info.total_pixels,
            percent,
            info.elapsed.as_secs_f64(),
            remaining
        );
    }

    fn on_start(&self) {
        if let Ok(mut last) = self.last_logged.lock() {
            *last = 0.0;
        }
        tracing::info!("Resampling started");
    }

    fn on_complete(&self, info: &ProgressInfo) {
        tracing::info!(
            "Resampling completed in {:.2}s ({} pixels)",
            info.elapsed.as_secs_f64(),
            info.total_pixels
        );
    }

    fn on_error(&self, error: &str) {
        tracing::error!("Resampling failed: {}", error);
    }
}

/// History callback that records all progress information.
#[derive(Debug, Clone, Default)]
pub struct HistoryCallback {
    history: Arc<Mutex<Vec<ProgressInfo>>>,
}

impl HistoryCallback {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the recorded history.
    pub fn get_history(&self) -> Vec<ProgressInfo> {
        self.history
            .lock()
            .map(|h| h.clone())
            .unwrap_or_default()
    }
}

impl ProgressCallback for HistoryCallback {
    fn on_progress(&self, info: &ProgressInfo) {
        if let Ok(mut history) = self.history.lock() {
            history.push(info.clone());
        }
    }
}

/// Shared per-cell progress counter for parallel filters.
pub struct ProgressReporter {
    callback: Option<Arc<dyn ProgressCallback>>,
    total: usize,
    report_every: usize,
    completed: AtomicUsize,
    aborted: AtomicBool,
    start: Instant,
}

impl std::fmt::Debug for ProgressReporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressReporter")
            .field("total", &self.total)
            .field("completed", &self.completed.load(Ordering::Relaxed))
            .field("aborted", &self.aborted.load(Ordering::Relaxed))
            .finish()
    }
}

impl ProgressReporter {
    pub fn new(callback: Option<Arc<dyn ProgressCallback>>, total: usize) -> Self {
        Self {
            callback,
            total,
            report_every: (total / 100).max(1),
            completed: AtomicUsize::new(0),
            aborted: AtomicBool::new(false),
            start: Instant::now(),
        }
    }

    pub fn start(&self) {
        if let Some(cb) = &self.callback {
            cb.on_start();
        }
    }

    pub fn info(&self) -> ProgressInfo {
        ProgressInfo::new(
            self.completed.load(Ordering::Relaxed),
            self.total,
            self.start.elapsed(),
        )
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted.load(Ordering::Relaxed)
    }

    /// Count one processed cell.
    ///
    /// Returns `Aborted` once any worker has seen an abort request, so every
    /// worker stops at its next cell.
    pub fn completed_pixel(&self) -> Result<()> {
        let done = self.completed.fetch_add(1, Ordering::Relaxed) + 1;
        if self.aborted.load(Ordering::Relaxed) {
            return Err(self.aborted_error(done));
        }
        let Some(cb) = &self.callback else {
            return Ok(());
        };
        if done % self.report_every == 0 || done == self.total {
            cb.on_progress(&ProgressInfo::new(done, self.total, self.start.elapsed()));
        }
        if cb.should_abort() {
            self.aborted.store(true, Ordering::Relaxed);
            return Err(self.aborted_error(done));
        }
        Ok(())
    }

    /// Notify the callback of success.
    pub fn finish(&self) {
        if let Some(cb) = &self.callback {
            cb.on_complete(&self.info());
        }
    }

    /// Notify the callback of a failure.
    pub fn fail(&self, error: &ImageError) {
        if let Some(cb) = &self.callback {
            cb.on_error(&error.to_string());
        }
    }

    fn aborted_error(&self, completed: usize) -> ImageError {
        ImageError::Aborted {
            completed,
            total: self.total,
        }
    }
}
