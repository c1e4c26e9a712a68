use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    pub output_dir: PathBuf,
    pub report: ReportConfig,
    pub graph: GraphConfig,
}

/// Items per line for the tab-separated blocks of the report.
#[derive(Debug, Clone)]
pub struct ReportConfig {
    pub ip_columns: usize,
    pub port_columns: usize,
    pub mac_columns: usize,
    pub protocol_columns: usize,
}

#[derive(Debug, Clone)]
pub struct GraphConfig {
    pub enabled: bool,
    /// Run Graphviz `dot` on the generated files to produce PNGs.
    pub render_png: bool,
    /// Also write `nx.html`, a browser view of the graph.
    pub interactive: bool,
    /// Edges per DOT file before the graph is split into parts.
    pub max_edges_per_file: usize,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("./output"),
            report: ReportConfig::default(),
            graph: GraphConfig::default(),
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            ip_columns: 5,
            port_columns: 10,
            mac_columns: 5,
            protocol_columns: 10,
        }
    }
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            render_png: false,
            interactive: false,
            max_edges_per_file: 10_000,
        }
    }
}
