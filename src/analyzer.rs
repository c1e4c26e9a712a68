use std::collections::HashSet;
use std::fmt;

use log::debug;

use crate::error::{AnalyzerError, Result};
use crate::record::{PortField, Record};

/// Ports below this value are "well known".
pub const WELL_KNOWN_PORT_LIMIT: u16 = 1024;

/// Host pair with direction discarded; see [`NetAnalyzer::ip_connections`].
pub type IpPair = (String, String);

/// Directional endpoint 4-tuple.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Connection {
    pub source_ip: String,
    pub dest_ip: String,
    pub source_port: PortField,
    pub dest_port: PortField,
}

impl fmt::Display for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t{}\t->\t{}\t{}",
            self.source_ip, self.source_port, self.dest_ip, self.dest_port)
    }
}

/// Scalar results of one analysis run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub packets: usize,
    pub unique_ips: usize,
    pub unique_ports: usize,
    pub well_known_ports: usize,
    pub unique_macs: usize,
    pub protocols: usize,
    pub ip_connections: usize,
    pub connections: usize,
    pub max_length: u32,
    pub min_length: u32,
}

/// Read-only queries over a loaded capture export.
///
/// Every method recomputes its result from the borrowed records, so calls can
/// be made in any order and any number of times.
pub struct NetAnalyzer<'a> {
    records: &'a [Record],
}

impl<'a> NetAnalyzer<'a> {
    pub fn new(records: &'a [Record]) -> Self {
        NetAnalyzer { records }
    }

    pub fn count_records(&self) -> usize {
        self.records.len()
    }

    pub fn unique_ips(&self) -> HashSet<String> {
        self.records
            .iter()
            .flat_map(|r| [r.source_ip(), r.dest_ip()])
            .map(str::to_string)
            .collect()
    }

    pub fn source_ips(&self) -> Vec<String> {
        self.records.iter().map(|r| r.source_ip().to_string()).collect()
    }

    pub fn dest_ips(&self) -> Vec<String> {
        self.records.iter().map(|r| r.dest_ip().to_string()).collect()
    }

    pub fn source_ports(&self) -> Vec<u16> {
        self.records.iter().map(Record::source_port).collect()
    }

    pub fn dest_ports(&self) -> Vec<u16> {
        self.records.iter().map(Record::dest_port).collect()
    }

    /// Non-zero source and destination ports.
    pub fn unique_ports(&self) -> HashSet<u16> {
        self.records
            .iter()
            .flat_map(|r| [r.source_port(), r.dest_port()])
            .filter(|&port| port != 0)
            .collect()
    }

    pub fn well_known_ports(&self) -> HashSet<u16> {
        self.unique_ports()
            .into_iter()
            .filter(|&port| port < WELL_KNOWN_PORT_LIMIT)
            .collect()
    }

    pub fn unique_macs(&self) -> HashSet<String> {
        self.records
            .iter()
            .flat_map(|r| [r.source_mac(), r.dest_mac()])
            .map(str::to_string)
            .collect()
    }

    pub fn unique_protocols(&self) -> HashSet<String> {
        self.records.iter().map(|r| r.protocol().to_string()).collect()
    }

    pub fn max_length(&self) -> Result<u32> {
        self.records
            .iter()
            .map(Record::length)
            .max()
            .ok_or_else(|| AnalyzerError::EmptyInput("max. packet length of zero records".to_string()))
    }

    pub fn min_length(&self) -> Result<u32> {
        self.records
            .iter()
            .map(Record::length)
            .min()
            .ok_or_else(|| AnalyzerError::EmptyInput("min. packet length of zero records".to_string()))
    }

    /// Who talks to whom, without ports.
    ///
    /// A→B and B→A fold into one entry. Whichever orientation is seen first
    /// is the one stored, so the orientation of a pair depends on row order.
    pub fn ip_connections(&self) -> HashSet<IpPair> {
        let mut pairs: HashSet<IpPair> = HashSet::new();

        for record in self.records {
            let forward = (record.source_ip().to_string(), record.dest_ip().to_string());
            let reverse = (record.dest_ip().to_string(), record.source_ip().to_string());

            if pairs.contains(&forward) || pairs.contains(&reverse) {
                continue;
            }
            debug!("new ip connection {} <-> {}", forward.0, forward.1);
            pairs.insert(forward);
        }

        pairs
    }

    /// Who talks to whom through which ports.
    ///
    /// Unlike [`ip_connections`](Self::ip_connections) this keeps direction:
    /// a reply flow is a separate entry from its request.
    pub fn connections(&self) -> HashSet<Connection> {
        self.records
            .iter()
            .map(|record| {
                let (source_port, dest_port) = record.port_pair();
                Connection {
                    source_ip: record.source_ip().to_string(),
                    dest_ip: record.dest_ip().to_string(),
                    source_port,
                    dest_port,
                }
            })
            .collect()
    }

    pub fn summary(&self) -> Result<Summary> {
        Ok(Summary {
            packets: self.count_records(),
            unique_ips: self.unique_ips().len(),
            unique_ports: self.unique_ports().len(),
            well_known_ports: self.well_known_ports().len(),
            unique_macs: self.unique_macs().len(),
            protocols: self.unique_protocols().len(),
            ip_connections: self.ip_connections().len(),
            connections: self.connections().len(),
            max_length: self.max_length()?,
            min_length: self.min_length()?,
        })
    }
}
