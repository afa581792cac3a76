//! Scene export.
//!
//! Turns a host [`SceneSource`](crate::types::SceneSource) into an AWD file:
//! every mesh becomes a deduplicated geometry block plus a scene node that
//! instances it.

pub mod awd;
pub mod options;

pub use awd::{export_awd, ExportSummary, Exporter};
pub use options::ExportOptions;
