use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Paths {
    pub base: PathBuf,
}

impl Paths {
    pub fn new() -> Self {
        let base = dirs::home_dir()
            .map(|h| h.join(".cfrscan"))
            .unwrap_or_else(|| PathBuf::from(".cfrscan"));
        Self { base }
    }

    pub fn with_base(base: PathBuf) -> Self {
        Self { base }
    }

    pub fn config_file(&self) -> PathBuf {
        self.base.join("config.json")
    }

    /// Parent directory for the throwaway browser profiles, one per session.
    pub fn browser_profiles_dir(&self) -> PathBuf {
        self.base.join("browser").join("profiles")
    }
}

impl Default for Paths {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_layout() {
        let paths = Paths::with_base(PathBuf::from("/tmp/cfrscan-test"));
        assert_eq!(paths.config_file(), PathBuf::from("/tmp/cfrscan-test/config.json"));
        assert_eq!(
            paths.browser_profiles_dir(),
            PathBuf::from("/tmp/cfrscan-test/browser/profiles")
        );
    }
}
