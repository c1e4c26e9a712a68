use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::analyzer::{Connection, NetAnalyzer};
use crate::config::AnalyzerConfig;
use crate::error::{AnalyzerError, Result};
use crate::filter::filter_ipv4;
use crate::graph::{self, HostGraph};
use crate::loader::load_records;
use crate::report::write_report;

/// Files produced by one run.
#[derive(Debug, Default)]
pub struct RunOutput {
    pub report: PathBuf,
    pub graph_files: Vec<PathBuf>,
    pub records_analyzed: usize,
}

/// Creates `dir` unless it already exists.
pub fn prepare_output_dir(dir: &Path) -> Result<()> {
    if dir.is_dir() {
        return Ok(());
    }
    fs::create_dir_all(dir).map_err(|e| {
        AnalyzerError::IoError(format!("output directory {}: {}", dir.display(), e))
    })?;
    println!("output will be written to: {}", dir.display());
    Ok(())
}

/// load -> filter -> analyze -> graph + report. The first error ends the run.
pub fn run(input: &Path, config: &AnalyzerConfig) -> Result<RunOutput> {
    if !input.is_file() {
        return Err(AnalyzerError::FileNotFound(input.display().to_string()));
    }
    prepare_output_dir(&config.output_dir)?;

    println!("[+] reading data...");
    let records = load_records(input)?;

    println!("[+] filtering IPv4");
    let records = filter_ipv4(records);
    if records.is_empty() {
        warn!("no IPv4 records left in {}", input.display());
    }

    let analyzer = NetAnalyzer::new(&records);
    let ip_connections = analyzer.ip_connections();
    let connections = analyzer.connections();
    info!("{} ip connections, {} full connections", ip_connections.len(), connections.len());

    println!("-------------------------------------");

    let mut graph_files = Vec::new();
    if config.graph.enabled {
        println!("[+] writing connection graph");
        let mut host_graph = HostGraph::new();
        // sorted so the graph files come out identical for the same input
        let nodes: BTreeSet<String> = analyzer.unique_ips().into_iter().collect();
        let edges: BTreeSet<&Connection> = connections.iter().collect();
        host_graph.add_nodes(nodes);
        host_graph.add_edges(edges.into_iter().map(|c| (c.source_ip.as_str(), c.dest_ip.as_str())));

        let dot_files = host_graph.write_dot_files(&config.output_dir, &config.graph)?;
        if config.graph.render_png {
            for dot_file in &dot_files {
                let png = graph::render_png(dot_file)?;
                info!("rendered {}", png.display());
                graph_files.push(png);
            }
        }
        graph_files.extend(dot_files);

        let edge_csv = config.output_dir.join("graph.csv");
        host_graph.write_edge_csv(&edge_csv)?;
        graph_files.push(edge_csv);

        if config.graph.interactive {
            let html = config.output_dir.join("nx.html");
            host_graph.write_html(&html)?;
            graph_files.push(html);
        }
    }

    println!("[+] writing report");
    let report = write_report(input, &config.output_dir, &analyzer,
        &ip_connections, &connections, &config.report)?;

    Ok(RunOutput {
        report,
        graph_files,
        records_analyzed: analyzer.count_records(),
    })
}
