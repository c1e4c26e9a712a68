// Text report over the analysis results.

use std::collections::{BTreeSet, HashSet};
use std::fmt::{Display, Write as _};
use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;
use log::info;

use crate::analyzer::{Connection, IpPair, NetAnalyzer};
use crate::config::ReportConfig;
use crate::error::Result;

pub const BANNER: &str = r"
  _  _     _     _             _
 | \| |___| |_  /_\  _ _  __ _| |_  _ ______ _ _
 | .` / -_)  _|/ _ \| ' \/ _` | | || |_ / -_) '_|
 |_|\_\___|\__/_/ \_\_||_\__,_|_|\_, /__\___|_|
                                 |__/
";

const RULE: &str = "------------------------------------------------";

/// `report_<file name>.txt` inside `output_dir`.
pub fn report_path(input: &Path, output_dir: &Path) -> PathBuf {
    let name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| input.display().to_string());
    output_dir.join(format!("report_{}.txt", name))
}

fn write_single(out: &mut String, title: &str, value: impl Display) {
    let _ = writeln!(out, "{}{}", title, value);
}

/// Tab-separated block, `columns` items per line, followed by a blank line.
fn write_multiple<T: Display>(out: &mut String, title: &str, items: &[T], columns: usize) {
    let columns = columns.max(1);
    out.push_str(title);
    out.push('\n');

    for (i, item) in items.iter().enumerate() {
        let _ = write!(out, "{}\t", item);
        if (i + 1) % columns == 0 {
            out.push('\n');
        }
    }
    if items.len() % columns != 0 {
        out.push('\n');
    }
    out.push('\n');
}

fn sorted<T: Ord + Clone>(set: &HashSet<T>) -> Vec<T> {
    set.iter().cloned().collect::<BTreeSet<_>>().into_iter().collect()
}

/// Renders the full report. `ip_connections` and `connections` are taken
/// precomputed since the graph output uses them too.
pub fn render_report(
    input: &Path,
    analyzer: &NetAnalyzer<'_>,
    ip_connections: &HashSet<IpPair>,
    connections: &HashSet<Connection>,
    config: &ReportConfig,
) -> Result<String> {
    let summary = analyzer.summary()?;
    let mut out = String::new();

    out.push_str(BANNER);
    out.push_str(" Analysis Report\n");
    let _ = writeln!(out, " {}", RULE);
    let _ = writeln!(out, " input:     {}", input.display());
    let _ = writeln!(out, " generated: {}\n", Local::now().format("%Y-%m-%d %H:%M:%S"));

    write_single(&mut out, "[+] no. packets analyzed: ", summary.packets);
    out.push('\n');

    write_multiple(&mut out, "[+] unique IP addresses:",
        &sorted(&analyzer.unique_ips()), config.ip_columns);
    write_multiple(&mut out, "[+] unique ports:",
        &sorted(&analyzer.unique_ports()), config.port_columns);
    write_multiple(&mut out, "[+] well-known ports:",
        &sorted(&analyzer.well_known_ports()), config.port_columns);
    write_multiple(&mut out, "[+] unique MAC addresses:",
        &sorted(&analyzer.unique_macs()), config.mac_columns);
    write_multiple(&mut out, "[+] protocols:",
        &sorted(&analyzer.unique_protocols()), config.protocol_columns);

    write_single(&mut out, "[+] max. packet length: ", summary.max_length);
    write_single(&mut out, "[+] min. packet length: ", summary.min_length);

    out.push_str("\n[+] ip connections:\n");
    for (a, b) in sorted(ip_connections) {
        let _ = writeln!(out, "({}, {})", a, b);
    }

    out.push_str("\n[+] full connection overview:\n");
    for connection in sorted(connections) {
        let _ = writeln!(out, "{}", connection);
    }

    out.push_str("\n[+] summary:\n");
    write_single(&mut out, "    unique IP addresses:  ", summary.unique_ips);
    write_single(&mut out, "    unique ports:         ", summary.unique_ports);
    write_single(&mut out, "    well-known ports:     ", summary.well_known_ports);
    write_single(&mut out, "    unique MAC addresses: ", summary.unique_macs);
    write_single(&mut out, "    protocols:            ", summary.protocols);
    write_single(&mut out, "    ip connections:       ", summary.ip_connections);
    write_single(&mut out, "    full connections:     ", summary.connections);

    let _ = writeln!(out, "\n{}", RULE);
    Ok(out)
}

/// Renders the report and writes it next to the other outputs.
pub fn write_report(
    input: &Path,
    output_dir: &Path,
    analyzer: &NetAnalyzer<'_>,
    ip_connections: &HashSet<IpPair>,
    connections: &HashSet<Connection>,
    config: &ReportConfig,
) -> Result<PathBuf> {
    let content = render_report(input, analyzer, ip_connections, connections, config)?;
    let path = report_path(input, output_dir);
    fs::write(&path, content)?;
    info!("report written to {}", path.display());
    Ok(path)
}
