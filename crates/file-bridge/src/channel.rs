//! Command/response channel over a single file slot
//!
//! One request may be outstanding per channel. `execute` takes `&mut self`,
//! so a shared channel has to be wrapped (e.g. in a `tokio::sync::Mutex`)
//! before several tasks can use it.

use crate::config::BridgeConfig;
use crate::fs::write_atomic;
use pipeline_core::{PipelineError, Result};
use std::io::ErrorKind;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tokio::fs;
use tokio::time::sleep;
use tracing::{debug, info, warn};

/// Where the channel is in its request cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    /// No request has been sent, or the last one failed locally
    Idle,
    /// Command written, waiting for the result file
    AwaitingResponse,
    /// Last request got a response
    Completed,
    /// Last request ran out of poll attempts
    TimedOut,
}

/// Synchronous request/response over a shared filesystem slot
#[derive(Debug)]
pub struct CommandChannel {
    config: BridgeConfig,
    state: ChannelState,
}

impl CommandChannel {
    /// Create a channel without touching the filesystem
    pub fn new(config: BridgeConfig) -> Self {
        Self {
            config,
            state: ChannelState::Idle,
        }
    }

    /// Create a channel and make sure its scratch directory exists
    pub async fn open(config: BridgeConfig) -> Result<Self> {
        fs::create_dir_all(&config.scratch_dir).await.map_err(|e| {
            PipelineError::Io(format!(
                "Failed to create scratch dir {}: {}",
                config.scratch_dir.display(),
                e
            ))
        })?;
        Ok(Self::new(config))
    }

    pub fn state(&self) -> ChannelState {
        self.state
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn command_path(&self) -> PathBuf {
        self.config.command_path()
    }

    pub fn result_path(&self) -> PathBuf {
        self.config.result_path()
    }

    /// Send `script` and wait up to `timeout` for the response text.
    ///
    /// The returned text is trimmed. Fails with `Timeout` when no result
    /// file shows up in time and with `Protocol` when it cannot be read.
    pub async fn execute(&mut self, script: &str, timeout: Duration) -> Result<String> {
        self.state = ChannelState::Idle;

        // A request abandoned after a local timeout may still be answered;
        // that answer must not be taken for this request's.
        self.clear_result().await?;

        write_atomic(&self.command_path(), script.as_bytes()).await?;
        debug!(
            "Command sent ({} bytes): {}",
            script.len(),
            preview(script.trim())
        );

        let interval = self.config.poll_interval;
        let max_attempts = self.config.max_attempts(timeout);
        let started = Instant::now();
        self.state = ChannelState::AwaitingResponse;

        let mut attempt = 0;
        while self.state == ChannelState::AwaitingResponse {
            if self.result_present().await {
                // Settle delay: the listener may still be writing. This
                // narrows the window for a partial read but cannot close it.
                sleep(interval).await;
                return match self.take_result().await {
                    Ok(response) => {
                        self.state = ChannelState::Completed;
                        debug!(
                            "Response after {:?}: {}",
                            started.elapsed(),
                            preview(&response)
                        );
                        Ok(response)
                    }
                    Err(e) => {
                        self.state = ChannelState::Idle;
                        Err(e)
                    }
                };
            }

            attempt += 1;
            sleep(interval).await;
            if attempt >= max_attempts {
                self.state = ChannelState::TimedOut;
            }
        }

        let elapsed = started.elapsed();
        warn!(
            "No response in {} after {:?} ({} polls)",
            self.config.scratch_dir.display(),
            elapsed,
            attempt
        );
        Err(PipelineError::Timeout { elapsed })
    }

    /// Send a trivial script and report whether anything answered.
    ///
    /// Every fault collapses into `false`.
    pub async fn probe(&mut self, script: &str, timeout: Duration) -> bool {
        match self.execute(script, timeout).await {
            Ok(_) => {
                info!("Listener at {} is responding", self.config.scratch_dir.display());
                true
            }
            Err(e) => {
                info!("Listener at {} not reachable: {}", self.config.scratch_dir.display(), e);
                false
            }
        }
    }

    async fn result_present(&self) -> bool {
        fs::try_exists(self.result_path()).await.unwrap_or(false)
    }

    async fn clear_result(&self) -> Result<()> {
        let path = self.result_path();
        match fs::remove_file(&path).await {
            Ok(()) => {
                debug!("Removed stale result {}", path.display());
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(PipelineError::Io(format!(
                "Failed to clear stale result {}: {}",
                path.display(),
                e
            ))),
        }
    }

    async fn take_result(&self) -> Result<String> {
        let path = self.result_path();
        let content = fs::read_to_string(&path).await.map_err(|e| {
            PipelineError::Protocol(format!("Failed to read result {}: {}", path.display(), e))
        })?;

        if let Err(e) = fs::remove_file(&path).await {
            // The next execute clears it anyway.
            warn!("Failed to remove result {}: {}", path.display(), e);
        }

        Ok(content.trim().to_string())
    }
}

fn preview(text: &str) -> &str {
    match text.char_indices().nth(100) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
