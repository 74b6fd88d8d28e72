//! Exact-name filter for search results.

use crate::record::{LookupQuery, SearchResultLink};

/// Trim surrounding whitespace and case-fold.
pub fn normalize(s: &str) -> String {
    s.trim().to_lowercase()
}

/// Keep only links whose visible text equals the query, in page order.
///
/// Case-insensitive, whitespace-trimmed equality. No partial matching.
pub fn filter_exact_matches(query: &LookupQuery, links: Vec<SearchResultLink>) -> Vec<SearchResultLink> {
    let wanted = query.normalized();
    links
        .into_iter()
        .filter(|link| normalize(&link.display_name) == wanted)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn link(name: &str, url: &str) -> SearchResultLink {
        SearchResultLink {
            display_name: name.to_string(),
            detail_url: url.to_string(),
        }
    }

    fn sample_links() -> Vec<SearchResultLink> {
        vec![
            link("CFR BUQUE", "https://census/1"),
            link("CFR BUQUE DOS", "https://census/2"),
            link("  cfr buque\n", "https://census/3"),
            link("OTRO", "https://census/4"),
        ]
    }

    #[test]
    fn test_case_and_whitespace_variants_match_same_links() {
        let a = filter_exact_matches(&LookupQuery::new("CFR Buque"), sample_links());
        let b = filter_exact_matches(&LookupQuery::new(" cfr buque "), sample_links());
        assert_eq!(a, b);
        let urls: Vec<&str> = a.iter().map(|l| l.detail_url.as_str()).collect();
        assert_eq!(urls, vec!["https://census/1", "https://census/3"]);
    }

    #[test]
    fn test_no_partial_matches() {
        let query = LookupQuery::new("CFR");
        assert!(filter_exact_matches(&query, vec![link("CFR BUQUE", "https://census/1")]).is_empty());
        assert!(filter_exact_matches(&query, sample_links()).is_empty());
    }

    #[test]
    fn test_non_ascii_case_folding() {
        let query = LookupQuery::new("nuestra señora del carmen");
        let links = vec![link("NUESTRA SEÑORA DEL CARMEN", "https://census/7")];
        assert_eq!(filter_exact_matches(&query, links).len(), 1);
    }
}
