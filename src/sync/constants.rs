//! Tunable constants for the sync engine. These values must match across
//! peers for download pacing to interoperate sanely, though no peer actually
//! enforces another's settings.

use std::time::Duration;

/// Maximum number of outstanding (in-flight) block requests at once.
pub const MAX_BATCH_SIZE: usize = 32;

/// How long an in-flight request may go unanswered before its height is
/// returned to the download queue.
pub const MAX_DOWNLOAD_TIME: Duration = Duration::from_millis(120_000);

/// Downloader scheduling period.
pub const DOWNLOADER_PERIOD: Duration = Duration::from_millis(500);

/// Processor scheduling period.
pub const PROCESSOR_PERIOD: Duration = Duration::from_millis(200);

/// The tunable timings above, bundled so they can be overridden per-`Controller`
/// (from `NodeConfig`) instead of baked in as process-wide constants.
#[derive(Debug, Clone, Copy)]
pub struct SyncTuning {
    pub max_batch_size: usize,
    pub max_download_time: Duration,
    pub downloader_period: Duration,
    pub processor_period: Duration,
}

impl Default for SyncTuning {
    fn default() -> Self {
        Self {
            max_batch_size: MAX_BATCH_SIZE,
            max_download_time: MAX_DOWNLOAD_TIME,
            downloader_period: DOWNLOADER_PERIOD,
            processor_period: PROCESSOR_PERIOD,
        }
    }
}
