//! Exact-match lookup printed as a JSON array.

use cfrscan_browser::DriverLauncher;
use cfrscan_census::output::{render_missing_name, render_records};
use cfrscan_census::VesselLookup;
use tracing::error;

/// Output when anything goes wrong: an empty result list.
pub const EMPTY_OUTPUT: &str = "[]";

/// The line `buscar-cfr` prints for `name`.
///
/// Without a name no browser is launched.
pub async fn render<L: DriverLauncher>(name: Option<&str>, lookup: &VesselLookup<L>) -> String {
    let Some(name) = name else {
        return missing_name_line();
    };

    let records = lookup.lookup(name).await;
    render_records(&records).unwrap_or_else(|e| {
        error!("Failed to render results: {}", e);
        EMPTY_OUTPUT.to_string()
    })
}

pub fn missing_name_line() -> String {
    render_missing_name().unwrap_or_else(|e| {
        error!("Failed to render error record: {}", e);
        EMPTY_OUTPUT.to_string()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use cfrscan_census::testing::{FakeLauncher, FakeSite};
    use cfrscan_core::CensusConfig;

    fn config() -> CensusConfig {
        CensusConfig {
            wait_timeout_secs: 1,
            ..CensusConfig::default()
        }
    }

    fn site() -> FakeSite {
        FakeSite::new()
            .with_result("NUESTRA SEÑORA DEL CARMEN", "https://census/buque/7")
            .with_detail(
                "https://census/buque/7",
                &[("Estado", "Alta definitiva"), ("CFR", "ESP000012345")],
            )
    }

    #[tokio::test]
    async fn test_no_name_prints_error_record_without_browser() {
        let launcher = FakeLauncher::new(site());
        let stats = launcher.stats();
        let lookup = VesselLookup::new(launcher, config());

        assert_eq!(
            render(None, &lookup).await,
            r#"[{"cfr": "error", "estado": "No se proporcionó nombre de buque"}]"#
        );
        assert_eq!(stats.lock().unwrap().launches, 0);
    }

    #[tokio::test]
    async fn test_match_prints_records() {
        let lookup = VesselLookup::new(FakeLauncher::new(site()), config());
        assert_eq!(
            render(Some("nuestra señora del carmen"), &lookup).await,
            r#"[{"cfr": "ESP000012345", "estado": "Alta definitiva"}]"#
        );
    }

    #[tokio::test]
    async fn test_site_failure_prints_empty_array() {
        let lookup = VesselLookup::new(FakeLauncher::new(site().unreachable()), config());
        assert_eq!(render(Some("NUESTRA SEÑORA DEL CARMEN"), &lookup).await, "[]");
    }

    #[tokio::test]
    async fn test_browser_missing_prints_empty_array() {
        let lookup = VesselLookup::new(FakeLauncher::failing(), config());
        assert_eq!(render(Some("ARGOS"), &lookup).await, "[]");
    }
}
