//! Detail panel field extraction.

use crate::record::{VesselRecord, PLACEHOLDER};

pub const STATUS_LABEL: &str = "Estado";
pub const CFR_LABEL: &str = "CFR";

/// Build a record from the (label, value) pairs of a detail panel.
///
/// Labels are compared exactly after trimming. A label seen twice keeps its
/// last value; empty values count as missing.
pub fn record_from_fields<I, L, V>(fields: I) -> VesselRecord
where
    I: IntoIterator<Item = (L, V)>,
    L: AsRef<str>,
    V: AsRef<str>,
{
    let mut record = VesselRecord::default();
    for (label, value) in fields {
        let value = value.as_ref().trim();
        let value = if value.is_empty() { PLACEHOLDER } else { value };
        match label.as_ref().trim() {
            STATUS_LABEL => record.status = value.to_string(),
            CFR_LABEL => record.cfr = value.to_string(),
            _ => {}
        }
    }
    record
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_status_and_cfr() {
        let record = record_from_fields(vec![
            ("Nombre", "NUEVO PILAR"),
            ("Estado", " Alta definitiva "),
            ("CFR", "ESP000024683"),
            ("Puerto base", "Vigo"),
        ]);
        assert_eq!(record.status, "Alta definitiva");
        assert_eq!(record.cfr, "ESP000024683");
    }

    #[test]
    fn test_missing_cfr_keeps_placeholder() {
        let record = record_from_fields(vec![("Estado", "Baja")]);
        assert_eq!(record.cfr, "-");
        assert_eq!(record.status, "Baja");
    }

    #[test]
    fn test_empty_value_and_no_fields() {
        let record = record_from_fields(vec![("CFR", "   ")]);
        assert_eq!(record, VesselRecord::default());

        let empty: Vec<(String, String)> = Vec::new();
        assert_eq!(record_from_fields(empty), VesselRecord::default());
    }

    #[test]
    fn test_labels_are_not_prefix_matched() {
        let record = record_from_fields(vec![("CFR anterior", "ESP1"), ("Estado:", "Alta")]);
        assert_eq!(record, VesselRecord::default());
    }
}
