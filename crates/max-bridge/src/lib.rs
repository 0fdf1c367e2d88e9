//! 3ds Max bridge for the asset pipeline
//!
//! Talks to a MAXScript listener inside 3ds Max through the shared file
//! slot from `file-bridge`:
//!
//! - **Requests**: MAXScript snippets built in [`maxscript`]
//! - **Responses**: plain text, mapped onto typed results in [`protocol`]
//!
//! After a successful export, [`ExportMetadataWriter`] drops the JSON
//! sidecar next to the FBX for the Unreal side to pick up.

pub mod exporter;
pub mod maxscript;
pub mod protocol;
pub mod scene;

pub use exporter::ExportMetadataWriter;
pub use protocol::{ExportResponse, ListResponse, StatsResponse, TextureAuditResponse};
pub use scene::{QueryTimeouts, SceneQueryService};
