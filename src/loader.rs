// Reader for Wireshark CSV exports.
//
// Expected columns:
// "No.","Time","Source","Destination","Sport","Dport","Protocol","Length","Smac","Dmac","Info"

use std::fs::File;
use std::io::Read;
use std::path::Path;

use log::{debug, info, trace, warn};

use crate::error::{AnalyzerError, Result};
use crate::record::Record;

const FIELD_INDEX_SIP: usize = 2;
const FIELD_INDEX_DIP: usize = 3;
const FIELD_INDEX_SPORT: usize = 4;
const FIELD_INDEX_DPORT: usize = 5;
const FIELD_INDEX_PROTO: usize = 6;
const FIELD_INDEX_LEN: usize = 7;
const FIELD_INDEX_SMAC: usize = 8;
const FIELD_INDEX_DMAC: usize = 9;

/// Reads the whole export at `path` into memory.
pub fn load_records<P: AsRef<Path>>(path: P) -> Result<Vec<Record>> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(AnalyzerError::FileNotFound(path.display().to_string()));
    }

    info!("reading {}", path.display());
    let file = File::open(path)?;
    let records = read_records(file)?;
    info!("read {} records from {}", records.len(), path.display());
    Ok(records)
}

/// Reads records from any CSV source. The first line is the header.
pub fn read_records<R: Read>(source: R) -> Result<Vec<Record>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(source);

    if let Ok(headers) = reader.headers() {
        debug!("header: {:?}", headers);
    }

    let mut records = Vec::new();
    for (index, row) in reader.records().enumerate() {
        let row = row?;
        // +2: one for the header, one for 1-based line numbers
        let line = index + 2;

        if row.len() <= FIELD_INDEX_DMAC {
            warn!("line {} has only {} columns, treating the rest as missing", line, row.len());
        }

        let field = |i: usize| row.get(i).unwrap_or("");
        let record = Record::from_fields([
            field(FIELD_INDEX_SIP),
            field(FIELD_INDEX_DIP),
            field(FIELD_INDEX_SPORT),
            field(FIELD_INDEX_DPORT),
            field(FIELD_INDEX_PROTO),
            field(FIELD_INDEX_LEN),
            field(FIELD_INDEX_SMAC),
            field(FIELD_INDEX_DMAC),
        ])
        .map_err(|e| match e {
            AnalyzerError::ParseError(msg) => {
                AnalyzerError::ParseError(format!("line {}: {}", line, msg))
            }
            other => other,
        })?;

        trace!("line {}: {:?}", line, record);
        records.push(record);
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const HEADER: &str =
        "\"No.\",\"Time\",\"Source\",\"Destination\",\"Sport\",\"Dport\",\"Protocol\",\"Length\",\"Smac\",\"Dmac\",\"Info\"\n";

    #[test]
    fn test_read_positional_columns() {
        let csv = format!(
            "{}{}",
            HEADER,
            "\"1\",\"0.000000\",\"192.168.1.10\",\"93.184.216.34\",\"50514\",\"443\",\"TCP\",\"66\",\"aa:aa:aa:aa:aa:aa\",\"bb:bb:bb:bb:bb:bb\",\"50514 > 443 [SYN]\"\n"
        );

        let records = read_records(csv.as_bytes()).unwrap();
        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!(r.source_ip(), "192.168.1.10");
        assert_eq!(r.dest_ip(), "93.184.216.34");
        assert_eq!(r.source_port(), 50514);
        assert_eq!(r.dest_port(), 443);
        assert_eq!(r.protocol(), "TCP");
        assert_eq!(r.length(), 66);
        assert_eq!(r.source_mac(), "aa:aa:aa:aa:aa:aa");
        assert_eq!(r.dest_mac(), "bb:bb:bb:bb:bb:bb");
    }

    #[test]
    fn test_missing_values_and_short_rows() {
        let csv = format!(
            "{}{}{}",
            HEADER,
            "\"1\",\"0.1\",\"10.0.0.1\",\"10.0.0.2\",\"\",\"\",\"ICMP\",\"98\",\"\",\"\",\"Echo\"\n",
            "\"2\",\"0.2\",\"10.0.0.3\",\"10.0.0.4\",\"53\"\n"
        );

        let records = read_records(csv.as_bytes()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].source_port(), 0);
        assert_eq!(records[0].source_mac(), "0");
        assert_eq!(records[1].source_port(), 53);
        assert_eq!(records[1].dest_port(), 0);
        assert_eq!(records[1].protocol(), "0");
        assert_eq!(records[1].length(), 0);
    }

    #[test]
    fn test_parse_error_reports_line() {
        let csv = format!(
            "{}{}{}",
            HEADER,
            "\"1\",\"0.1\",\"10.0.0.1\",\"10.0.0.2\",\"80\",\"443\",\"TCP\",\"60\",\"aa\",\"bb\",\"\"\n",
            "\"2\",\"0.2\",\"10.0.0.1\",\"10.0.0.2\",\"80\",\"443\",\"TCP\",\"sixty\",\"aa\",\"bb\",\"\"\n"
        );

        match read_records(csv.as_bytes()) {
            Err(AnalyzerError::ParseError(msg)) => assert!(msg.starts_with("line 3:")),
            other => panic!("Expected ParseError, got {:?}", other),
        }
    }

    #[test]
    fn test_header_only_is_empty() {
        let records = read_records(HEADER.as_bytes()).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_load_records_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", HEADER).unwrap();
        writeln!(file, "\"1\",\"0.1\",\"10.0.0.1\",\"10.0.0.2\",\"80\",\"443\",\"TCP\",\"60\",\"aa\",\"bb\",\"\"").unwrap();
        file.flush().unwrap();

        let records = load_records(file.path()).unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_load_records_missing_file() {
        let result = load_records("does/not/exist.csv");
        assert!(matches!(result, Err(AnalyzerError::FileNotFound(_))));
    }
}
