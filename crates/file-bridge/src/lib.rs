//! Shared file-slot bridge for talking to foreign applications
//!
//! Neither 3ds Max nor the Unreal editor can be linked against or reached
//! over a socket, so requests are handed over through files:
//!
//! - **Command**: a script written to a well-known command file
//! - **Result**: a plain-text response the foreign listener writes back
//!
//! The presence of the result file is the only synchronization signal.

pub mod channel;
pub mod config;
pub mod fs;

pub use channel::{ChannelState, CommandChannel};
pub use config::BridgeConfig;
pub use fs::write_atomic;
