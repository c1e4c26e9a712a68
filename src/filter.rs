use lazy_static::lazy_static;
use log::{debug, info};
use regex::Regex;

use crate::record::Record;

lazy_static! {
    // Shape check only; octets are not range-checked.
    static ref IPV4_PATTERN: Regex =
        Regex::new(r"^\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3}$").expect("valid IPv4 pattern");
}

/// True when `address` looks like dotted-quad IPv4 (`999.999.999.999` passes).
pub fn is_ipv4(address: &str) -> bool {
    IPV4_PATTERN.is_match(address)
}

/// Keeps the records matching `predicate`, in their original order.
pub fn filter_records<F>(records: Vec<Record>, predicate: F) -> Vec<Record>
where
    F: Fn(&Record) -> bool,
{
    records.into_iter().filter(|record| predicate(record)).collect()
}

/// Drops every record whose source IP is not IPv4. The destination is not
/// looked at, so an IPv4 -> IPv6 row survives.
pub fn filter_ipv4(records: Vec<Record>) -> Vec<Record> {
    let before = records.len();
    let kept = filter_records(records, |record| {
        let keep = is_ipv4(record.source_ip());
        if !keep {
            debug!("dropping non-IPv4 source {}", record.source_ip());
        }
        keep
    });
    info!("IPv4 filter kept {} of {} records", kept.len(), before);
    kept
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(sip: &str, dip: &str) -> Record {
        Record::new(sip, dip, 1234, 80, "TCP", 60, "aa", "bb")
    }

    #[test]
    fn test_is_ipv4_shapes() {
        assert!(is_ipv4("192.168.1.1"));
        assert!(is_ipv4("0.0.0.0"));
        assert!(is_ipv4("999.999.999.999"));

        assert!(!is_ipv4("::1"));
        assert!(!is_ipv4("fe80::1"));
        assert!(!is_ipv4("1.2.3"));
        assert!(!is_ipv4("1.2.3.4.5"));
        assert!(!is_ipv4("1234.1.1.1"));
        assert!(!is_ipv4("10.0.0.1 "));
        assert!(!is_ipv4(""));
        assert!(!is_ipv4("0"));
    }

    #[test]
    fn test_filter_ipv4_checks_source_only() {
        let records = vec![
            row("192.168.1.1", "::1"),
            row("::1", "10.0.0.1"),
            row("10.0.0.5", "2001:db8::5"),
        ];

        let kept = filter_ipv4(records);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].source_ip(), "192.168.1.1");
        assert_eq!(kept[1].source_ip(), "10.0.0.5");
    }

    #[test]
    fn test_filter_preserves_order() {
        let records: Vec<Record> = (0..20)
            .map(|i| {
                if i % 3 == 0 {
                    row("fe80::1", "fe80::2")
                } else {
                    row(&format!("10.0.0.{}", i), "10.0.0.254")
                }
            })
            .collect();

        let kept = filter_ipv4(records);
        let sources: Vec<&str> = kept.iter().map(|r| r.source_ip()).collect();
        let mut expected = Vec::new();
        for i in (0..20).filter(|i| i % 3 != 0) {
            expected.push(format!("10.0.0.{}", i));
        }
        assert_eq!(sources, expected.iter().map(|s| s.as_str()).collect::<Vec<_>>());
    }

    #[test]
    fn test_filter_records_custom_predicate() {
        let records = vec![row("10.0.0.1", "10.0.0.2"), row("10.0.0.3", "10.0.0.4")];
        let kept = filter_records(records, |r| r.dest_ip() == "10.0.0.4");
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].source_ip(), "10.0.0.3");
    }

    #[test]
    fn test_filter_empty() {
        assert!(filter_ipv4(Vec::new()).is_empty());
    }
}
