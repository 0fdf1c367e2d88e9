//! Bridge configuration

use std::path::PathBuf;
use std::time::Duration;

/// Environment variable overriding the scratch directory root
pub const SCRATCH_ENV: &str = "ASSET_PIPELINE_SCRATCH";

/// Where the command and result files live and how often to poll
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Directory shared with the foreign listener
    pub scratch_dir: PathBuf,
    /// File name of the outgoing script
    pub command_file: String,
    /// File name of the incoming response
    pub result_file: String,
    /// Poll interval; also used as the settle delay before reading a result
    pub poll_interval: Duration,
}

fn scratch_root() -> PathBuf {
    std::env::var(SCRATCH_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| std::env::temp_dir().join("asset-pipeline"))
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self::max()
    }
}

impl BridgeConfig {
    /// Slot watched by the 3ds Max listener (MAXScript in, text out)
    pub fn max() -> Self {
        Self {
            scratch_dir: scratch_root().join("max"),
            command_file: "command.ms".to_string(),
            result_file: "result.txt".to_string(),
            poll_interval: Duration::from_millis(100),
        }
    }

    /// Slot watched by the Unreal editor listener (Python in, text out)
    pub fn unreal() -> Self {
        Self {
            scratch_dir: scratch_root().join("unreal"),
            command_file: "command.py".to_string(),
            ..Self::max()
        }
    }

    /// Same file names, different directory
    pub fn with_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scratch_dir = dir.into();
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn command_path(&self) -> PathBuf {
        self.scratch_dir.join(&self.command_file)
    }

    pub fn result_path(&self) -> PathBuf {
        self.scratch_dir.join(&self.result_file)
    }

    /// Number of polls that fit into `timeout`; 30 s at 100 ms gives 300
    pub fn max_attempts(&self, timeout: Duration) -> u128 {
        let interval = self.poll_interval.as_millis().max(1);
        timeout.as_millis().div_ceil(interval).max(1)
    }
}
