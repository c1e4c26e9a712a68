use std::fmt;

use crate::error::{AnalyzerError, Result};

/// Raw value stored for a field that was empty in the export.
pub const MISSING_VALUE: &str = "0";

/// A transport port, or the placeholder used when ports do not apply
/// (ICMP, ARP, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PortField {
    Port(u16),
    NotApplicable,
}

impl fmt::Display for PortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PortField::Port(port) => write!(f, "{}", port),
            PortField::NotApplicable => write!(f, "-"),
        }
    }
}

// --- Record (one row of the export) ---
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    source_ip: String,
    dest_ip: String,
    source_port: u16,
    dest_port: u16,
    protocol: String,
    length: u32,
    source_mac: String,
    dest_mac: String,
}

impl Record {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        source_ip: impl Into<String>,
        dest_ip: impl Into<String>,
        source_port: u16,
        dest_port: u16,
        protocol: impl Into<String>,
        length: u32,
        source_mac: impl Into<String>,
        dest_mac: impl Into<String>,
    ) -> Self {
        Record {
            source_ip: source_ip.into(),
            dest_ip: dest_ip.into(),
            source_port,
            dest_port,
            protocol: protocol.into(),
            length,
            source_mac: source_mac.into(),
            dest_mac: dest_mac.into(),
        }
    }

    /// Builds a record from the eight raw text fields in column order
    /// (source, destination, sport, dport, protocol, length, smac, dmac).
    ///
    /// Empty fields count as missing and become `0`. Numeric fields that are
    /// present but not integers fail with [`AnalyzerError::ParseError`].
    pub fn from_fields(fields: [&str; 8]) -> Result<Self> {
        let [sip, dip, sport, dport, proto, len, smac, dmac] = fields;

        Ok(Record {
            source_ip: text_or_missing(sip),
            dest_ip: text_or_missing(dip),
            source_port: parse_numeric(sport, "source port")?,
            dest_port: parse_numeric(dport, "destination port")?,
            protocol: text_or_missing(proto),
            length: parse_numeric(len, "length")?,
            source_mac: text_or_missing(smac),
            dest_mac: text_or_missing(dmac),
        })
    }

    pub fn source_ip(&self) -> &str {
        &self.source_ip
    }

    pub fn dest_ip(&self) -> &str {
        &self.dest_ip
    }

    /// Raw source port, `0` when not applicable.
    pub fn source_port(&self) -> u16 {
        self.source_port
    }

    /// Raw destination port, `0` when not applicable.
    pub fn dest_port(&self) -> u16 {
        self.dest_port
    }

    pub fn protocol(&self) -> &str {
        &self.protocol
    }

    pub fn length(&self) -> u32 {
        self.length
    }

    pub fn source_mac(&self) -> &str {
        &self.source_mac
    }

    pub fn dest_mac(&self) -> &str {
        &self.dest_mac
    }

    /// Port pair for the detailed connection view. A zero source port
    /// replaces both ports with the placeholder.
    pub fn port_pair(&self) -> (PortField, PortField) {
        if self.source_port == 0 {
            (PortField::NotApplicable, PortField::NotApplicable)
        } else {
            (PortField::Port(self.source_port), PortField::Port(self.dest_port))
        }
    }
}

// Text is stored verbatim; only an empty field counts as missing.
fn text_or_missing(raw: &str) -> String {
    if raw.is_empty() {
        MISSING_VALUE.to_string()
    } else {
        raw.to_string()
    }
}

fn parse_numeric<T>(raw: &str, field: &str) -> Result<T>
where
    T: std::str::FromStr + Default,
{
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(T::default());
    }
    trimmed.parse::<T>().map_err(|_| {
        AnalyzerError::ParseError(format!("invalid {} value '{}'", field, trimmed))
    })
}
