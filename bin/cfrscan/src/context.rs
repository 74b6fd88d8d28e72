use cfrscan_browser::{CdpLauncher, LaunchOptions};
use cfrscan_census::VesselLookup;
use cfrscan_core::{Config, Paths, Result};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// Load the config from `explicit` if given, else from the default location.
pub fn load_config(paths: &Paths, explicit: Option<&Path>) -> Result<Config> {
    match explicit {
        Some(path) => {
            debug!(path = %path.display(), "Loading config");
            Config::load(path)
        }
        None => Config::load_or_default(paths),
    }
}

/// A census lookup driving real Chrome/Edge sessions.
pub fn census_lookup(config: &Config, paths: &Paths, headed: bool) -> VesselLookup<CdpLauncher> {
    let mut browser = config.browser.clone();
    if headed {
        browser.headless = false;
    }
    let options = LaunchOptions::from_config(&browser, paths.browser_profiles_dir());
    let launcher = CdpLauncher::new(options, Duration::from_secs(browser.navigation_timeout_secs));
    VesselLookup::new(launcher, config.census.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_config_explicit_path() {
        let dir = TempDir::new().unwrap();
        let paths = Paths::with_base(dir.path().join("home"));
        let path = dir.path().join("custom.json");
        std::fs::write(&path, r#"{"census": {"waitTimeoutSecs": 3}}"#).unwrap();

        let config = load_config(&paths, Some(&path)).unwrap();
        assert_eq!(config.census.wait_timeout_secs, 3);

        let default = load_config(&paths, None).unwrap();
        assert_eq!(default.census.wait_timeout_secs, 15);
    }

    #[test]
    fn test_load_config_missing_explicit_path_is_error() {
        let dir = TempDir::new().unwrap();
        let paths = Paths::with_base(dir.path().to_path_buf());
        assert!(load_config(&paths, Some(&dir.path().join("missing.json"))).is_err());
    }

    #[test]
    fn test_census_lookup_uses_census_config() {
        let mut config = Config::default();
        config.census.wait_timeout_secs = 7;
        let lookup = census_lookup(&config, &Paths::with_base("/tmp/cfrscan".into()), true);
        assert_eq!(lookup.config().wait_timeout_secs, 7);
    }
}
