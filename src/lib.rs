//! Summary statistics and connection graphs from Wireshark CSV exports.

pub mod analyzer;
pub mod config;
pub mod error;
pub mod filter;
pub mod graph;
pub mod loader;
pub mod pipeline;
pub mod record;
pub mod report;

pub use analyzer::{Connection, IpPair, NetAnalyzer, Summary};
pub use config::{AnalyzerConfig, GraphConfig, ReportConfig};
pub use error::{AnalyzerError, Result};
pub use record::{PortField, Record};
