// Host graph output: Graphviz DOT files, an edge-list CSV, optional PNGs and
// a vis-network HTML page.

use std::collections::HashSet;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use log::{debug, info};
use serde::Serialize;

use crate::config::GraphConfig;
use crate::error::{AnalyzerError, Result};

#[derive(Debug, Serialize)]
struct EdgeRow<'a> {
    src: &'a str,
    dst: &'a str,
}

#[derive(Debug, Serialize)]
struct VisNode<'a> {
    id: &'a str,
    label: &'a str,
}

#[derive(Debug, Serialize)]
struct VisEdge<'a> {
    from: &'a str,
    to: &'a str,
}

const VIS_NETWORK_JS: &str =
    "https://unpkg.com/vis-network@9.1.9/standalone/umd/vis-network.min.js";

/// Undirected graph of hosts. Nodes and edges keep insertion order and are
/// deduplicated; `a -- b` and `b -- a` are the same edge.
#[derive(Debug, Default)]
pub struct HostGraph {
    nodes: Vec<String>,
    node_set: HashSet<String>,
    edges: Vec<(String, String)>,
    edge_set: HashSet<(String, String)>,
}

impl HostGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, node: &str) {
        if self.node_set.insert(node.to_string()) {
            self.nodes.push(node.to_string());
        }
    }

    pub fn add_nodes<I, S>(&mut self, nodes: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for node in nodes {
            self.add_node(node.as_ref());
        }
    }

    /// Adds an edge and, if needed, both of its endpoints.
    pub fn add_edge(&mut self, a: &str, b: &str) {
        self.add_node(a);
        self.add_node(b);

        let forward = (a.to_string(), b.to_string());
        let reverse = (b.to_string(), a.to_string());
        if self.edge_set.contains(&forward) || self.edge_set.contains(&reverse) {
            return;
        }
        self.edge_set.insert(forward.clone());
        self.edges.push(forward);
    }

    pub fn add_edges<I, S>(&mut self, edges: I)
    where
        I: IntoIterator<Item = (S, S)>,
        S: AsRef<str>,
    {
        for (a, b) in edges {
            self.add_edge(a.as_ref(), b.as_ref());
        }
    }

    pub fn nodes(&self) -> &[String] {
        &self.nodes
    }

    pub fn edges(&self) -> &[(String, String)] {
        &self.edges
    }

    /// The whole graph as one DOT document.
    pub fn to_dot(&self) -> String {
        dot_document(&self.nodes, &self.edges)
    }

    /// One DOT document per chunk of at most `max_edges` edges. Each part
    /// declares only the nodes its edges touch, except that isolated nodes
    /// go into the first part.
    pub fn to_dot_parts(&self, max_edges: usize) -> Vec<String> {
        let max_edges = max_edges.max(1);
        if self.edges.len() <= max_edges {
            return vec![self.to_dot()];
        }

        let connected: HashSet<&str> = self
            .edges
            .iter()
            .flat_map(|(a, b)| [a.as_str(), b.as_str()])
            .collect();
        let isolated: Vec<String> = self
            .nodes
            .iter()
            .filter(|n| !connected.contains(n.as_str()))
            .cloned()
            .collect();

        self.edges
            .chunks(max_edges)
            .enumerate()
            .map(|(i, chunk)| {
                let mut nodes = if i == 0 { isolated.clone() } else { Vec::new() };
                let mut seen: HashSet<&str> = HashSet::new();
                for (a, b) in chunk {
                    for n in [a, b] {
                        if seen.insert(n.as_str()) {
                            nodes.push(n.clone());
                        }
                    }
                }
                dot_document(&nodes, chunk)
            })
            .collect()
    }

    /// Writes `graph.dot`, or `graph_<i>.dot` parts when the edge count
    /// exceeds the configured limit. Returns the written paths.
    pub fn write_dot_files(&self, output_dir: &Path, config: &GraphConfig) -> Result<Vec<PathBuf>> {
        let parts = self.to_dot_parts(config.max_edges_per_file);
        if parts.len() > 1 {
            info!("splitting graph into {} parts", parts.len());
        }

        let mut paths = Vec::with_capacity(parts.len());
        for (i, dot) in parts.iter().enumerate() {
            let name = if parts.len() == 1 {
                "graph.dot".to_string()
            } else {
                format!("graph_{}.dot", i)
            };
            let path = output_dir.join(name);
            fs::write(&path, dot)?;
            debug!("wrote {}", path.display());
            paths.push(path);
        }
        Ok(paths)
    }

    /// Writes the edge list as `src,dst` rows.
    pub fn write_edge_csv(&self, path: &Path) -> Result<()> {
        let mut writer = csv::Writer::from_path(path)?;
        for (src, dst) in &self.edges {
            writer.serialize(EdgeRow { src, dst })?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Standalone HTML page drawing the graph with vis-network.
    pub fn to_html(&self) -> Result<String> {
        let nodes: Vec<VisNode> = self.nodes.iter()
            .map(|n| VisNode { id: n, label: n })
            .collect();
        let edges: Vec<VisEdge> = self.edges.iter()
            .map(|(a, b)| VisEdge { from: a, to: b })
            .collect();

        let nodes_json = script_safe(serde_json::to_string(&nodes)?);
        let edges_json = script_safe(serde_json::to_string(&edges)?);

        let mut out = String::new();
        out.push_str("<!DOCTYPE html>\n<html>\n<head>\n");
        out.push_str("<meta charset=\"utf-8\">\n<title>network</title>\n");
        let _ = writeln!(out, "<script type=\"text/javascript\" src=\"{}\"></script>", VIS_NETWORK_JS);
        out.push_str("<style>#network { width: 100%; height: 750px; border: 1px solid lightgray; }</style>\n");
        out.push_str("</head>\n<body>\n<div id=\"network\"></div>\n");
        out.push_str("<script type=\"text/javascript\">\n");
        let _ = writeln!(out, "var nodes = new vis.DataSet({});", nodes_json);
        let _ = writeln!(out, "var edges = new vis.DataSet({});", edges_json);
        out.push_str("var options = { nodes: { shape: \"dot\", color: \"lightblue\" }, physics: { stabilization: true } };\n");
        out.push_str("new vis.Network(document.getElementById(\"network\"), { nodes: nodes, edges: edges }, options);\n");
        out.push_str("</script>\n</body>\n</html>\n");
        Ok(out)
    }

    pub fn write_html(&self, path: &Path) -> Result<()> {
        fs::write(path, self.to_html()?)?;
        info!("wrote interactive graph {}", path.display());
        Ok(())
    }
}

/// Renders `dot_file` to a PNG beside it using the Graphviz `dot` binary.
pub fn render_png(dot_file: &Path) -> Result<PathBuf> {
    let png = dot_file.with_extension("png");
    let output = Command::new("dot")
        .arg("-Tpng")
        .arg(dot_file)
        .arg("-o")
        .arg(&png)
        .output()
        .map_err(|e| AnalyzerError::GraphError(format!("failed to run graphviz 'dot': {}", e)))?;

    if !output.status.success() {
        return Err(AnalyzerError::GraphError(format!(
            "graphviz 'dot' failed on {}: {}",
            dot_file.display(),
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }
    Ok(png)
}

fn dot_document(nodes: &[String], edges: &[(String, String)]) -> String {
    let mut out = String::new();
    out.push_str("graph network {\n");
    out.push_str("    size=\"6,6\";\n");
    out.push_str("    node [color=lightblue2, style=filled];\n");
    for node in nodes {
        let _ = writeln!(out, "    \"{}\";", escape(node));
    }
    for (a, b) in edges {
        let _ = writeln!(out, "    \"{}\" -- \"{}\";", escape(a), escape(b));
    }
    out.push_str("}\n");
    out
}

// A literal "</" inside JSON would close the surrounding <script> element.
fn script_safe(json: String) -> String {
    json.replace("</", "<\\/")
}

fn escape(id: &str) -> String {
    id.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nodes_and_edges_deduplicated() {
        let mut graph = HostGraph::new();
        graph.add_nodes(["10.0.0.1", "10.0.0.2", "10.0.0.1"]);
        graph.add_edges([
            ("10.0.0.1", "10.0.0.2"),
            ("10.0.0.2", "10.0.0.1"),
            ("10.0.0.1", "10.0.0.3"),
        ]);

        assert_eq!(graph.nodes(), &["10.0.0.1", "10.0.0.2", "10.0.0.3"]);
        assert_eq!(graph.edges().len(), 2);
    }

    #[test]
    fn test_to_dot() {
        let mut graph = HostGraph::new();
        graph.add_node("10.0.0.9");
        graph.add_edge("10.0.0.1", "10.0.0.2");

        let dot = graph.to_dot();
        assert!(dot.starts_with("graph network {"));
        assert!(dot.contains("node [color=lightblue2, style=filled];"));
        assert!(dot.contains("\"10.0.0.9\";"));
        assert!(dot.contains("\"10.0.0.1\" -- \"10.0.0.2\";"));
        assert!(dot.trim_end().ends_with('}'));
    }

    #[test]
    fn test_escape_quotes() {
        let mut graph = HostGraph::new();
        graph.add_node("we\"ird");
        assert!(graph.to_dot().contains("\"we\\\"ird\";"));
    }

    #[test]
    fn test_dot_parts_split() {
        let mut graph = HostGraph::new();
        graph.add_node("lonely");
        for i in 0..5 {
            graph.add_edge("10.0.0.1", &format!("10.0.1.{}", i));
        }

        let parts = graph.to_dot_parts(2);
        assert_eq!(parts.len(), 3);
        assert!(parts[0].contains("\"lonely\";"));
        assert!(!parts[1].contains("lonely"));
        let edge_lines: usize = parts.iter().map(|p| p.matches(" -- ").count()).sum();
        assert_eq!(edge_lines, 5);

        assert_eq!(graph.to_dot_parts(10).len(), 1);
    }

    #[test]
    fn test_write_dot_files_and_csv() {
        let dir = tempfile::tempdir().unwrap();
        let mut graph = HostGraph::new();
        graph.add_edges([("10.0.0.1", "10.0.0.2"), ("10.0.0.2", "10.0.0.3")]);

        let single = graph.write_dot_files(dir.path(), &GraphConfig::default()).unwrap();
        assert_eq!(single, vec![dir.path().join("graph.dot")]);

        let config = GraphConfig { max_edges_per_file: 1, ..GraphConfig::default() };
        let split = graph.write_dot_files(dir.path(), &config).unwrap();
        assert_eq!(split, vec![dir.path().join("graph_0.dot"), dir.path().join("graph_1.dot")]);

        let csv_path = dir.path().join("graph.csv");
        graph.write_edge_csv(&csv_path).unwrap();
        let content = fs::read_to_string(csv_path).unwrap();
        assert_eq!(content, "src,dst\n10.0.0.1,10.0.0.2\n10.0.0.2,10.0.0.3\n");
    }

    #[test]
    fn test_to_html_embeds_nodes_and_edges() {
        let mut graph = HostGraph::new();
        graph.add_nodes(["10.0.0.1", "10.0.0.2"]);
        graph.add_edge("10.0.0.1", "10.0.0.2");

        let html = graph.to_html().unwrap();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("vis-network"));
        assert!(html.contains(r#"{"id":"10.0.0.1","label":"10.0.0.1"}"#));
        assert!(html.contains(r#"{"from":"10.0.0.1","to":"10.0.0.2"}"#));
        assert!(html.trim_end().ends_with("</html>"));
    }

    #[test]
    fn test_html_node_cannot_close_script() {
        let mut graph = HostGraph::new();
        graph.add_node("</script><b>");
        let html = graph.to_html().unwrap();
        assert_eq!(html.matches("</script>").count(), 2);
        assert!(html.contains(r#"<\/script><b>"#));
    }

    #[test]
    fn test_write_html() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nx.html");
        let mut graph = HostGraph::new();
        graph.add_edges([("10.0.0.1", "10.0.0.2"), ("10.0.0.2", "10.0.0.3")]);

        graph.write_html(&path).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, graph.to_html().unwrap());
        assert!(content.contains(r#""to":"10.0.0.3""#));
    }
}
