use serde::{Deserialize, Serialize};

/// Value of any field the detail page did not provide.
pub const PLACEHOLDER: &str = "-";

/// Returned by the single-result lookup when no CFR could be read.
pub const NOT_FOUND_MESSAGE: &str = "No se encontró ningún resultado";

/// `estado` of the error record printed when no vessel name is given.
pub const MISSING_NAME_MESSAGE: &str = "No se proporcionó nombre de buque";

/// A vessel name as typed by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupQuery {
    pub vessel_name: String,
}

impl LookupQuery {
    pub fn new(vessel_name: impl Into<String>) -> Self {
        Self {
            vessel_name: vessel_name.into(),
        }
    }

    /// Trimmed, case-folded form used for comparisons.
    pub fn normalized(&self) -> String {
        crate::matching::normalize(&self.vessel_name)
    }
}

/// One entry of the search results list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResultLink {
    pub display_name: String,
    pub detail_url: String,
}

/// CFR and status read from one vessel detail page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VesselRecord {
    pub cfr: String,
    #[serde(rename = "estado")]
    pub status: String,
}

impl VesselRecord {
    /// Record printed in place of results when the vessel name is missing.
    pub fn missing_name() -> Self {
        Self {
            cfr: "error".to_string(),
            status: MISSING_NAME_MESSAGE.to_string(),
        }
    }
}

impl Default for VesselRecord {
    fn default() -> Self {
        Self {
            cfr: PLACEHOLDER.to_string(),
            status: PLACEHOLDER.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_record_uses_placeholders() {
        let record = VesselRecord::default();
        assert_eq!(record.cfr, "-");
        assert_eq!(record.status, "-");
    }

    #[test]
    fn test_record_serializes_status_as_estado() {
        let record = VesselRecord {
            cfr: "ESP000012345".into(),
            status: "Alta".into(),
        };
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"cfr":"ESP000012345","estado":"Alta"}"#);
    }

    #[test]
    fn test_query_normalized() {
        assert_eq!(LookupQuery::new("  Nuevo Pilar ").normalized(), "nuevo pilar");
    }
}
