use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

use crate::error::{Error, Result};
use crate::paths::Paths;

/// CSS selectors and labels of the census website.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectorConfig {
    #[serde(default = "default_search_input")]
    pub search_input: String,
    #[serde(default = "default_submit_button")]
    pub submit_button: String,
    #[serde(default = "default_results_list")]
    pub results_list: String,
    #[serde(default = "default_result_link")]
    pub result_link: String,
    #[serde(default = "default_info_panel")]
    pub info_panel: String,
    #[serde(default = "default_info_field")]
    pub info_field: String,
    #[serde(default = "default_field_label")]
    pub field_label: String,
    #[serde(default = "default_field_value")]
    pub field_value: String,
    #[serde(default = "default_items_found")]
    pub items_found: String,
    #[serde(default = "default_cfr_label")]
    pub cfr_label: String,
    #[serde(default = "default_cfr_label_text")]
    pub cfr_label_text: String,
    #[serde(default = "default_cfr_value")]
    pub cfr_value: String,
}

fn default_search_input() -> String {
    "#text".to_string()
}

fn default_submit_button() -> String {
    "button.btn".to_string()
}

fn default_results_list() -> String {
    ".list--search-result".to_string()
}

fn default_result_link() -> String {
    "h3.list-item--search-result-title a".to_string()
}

fn default_info_panel() -> String {
    "dl.info-fields-panel".to_string()
}

fn default_info_field() -> String {
    "dl.info-fields-panel div".to_string()
}

fn default_field_label() -> String {
    "dt".to_string()
}

fn default_field_value() -> String {
    "dd".to_string()
}

fn default_items_found() -> String {
    ".txt--items-found-count".to_string()
}

fn default_cfr_label() -> String {
    "label".to_string()
}

fn default_cfr_label_text() -> String {
    "CFR:".to_string()
}

fn default_cfr_value() -> String {
    "span".to_string()
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            search_input: default_search_input(),
            submit_button: default_submit_button(),
            results_list: default_results_list(),
            result_link: default_result_link(),
            info_panel: default_info_panel(),
            info_field: default_info_field(),
            field_label: default_field_label(),
            field_value: default_field_value(),
            items_found: default_items_found(),
            cfr_label: default_cfr_label(),
            cfr_label_text: default_cfr_label_text(),
            cfr_value: default_cfr_value(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CensusConfig {
    #[serde(default = "default_search_url")]
    pub search_url: String,
    /// Upper bound for every element wait, in seconds.
    #[serde(default = "default_wait_timeout_secs")]
    pub wait_timeout_secs: u64,
    #[serde(default)]
    pub selectors: SelectorConfig,
}

fn default_search_url() -> String {
    "https://servicio.pesca.mapama.es/censo/ConsultaBuqueRegistro/Buques/Search".to_string()
}

fn default_wait_timeout_secs() -> u64 {
    15
}

impl Default for CensusConfig {
    fn default() -> Self {
        Self {
            search_url: default_search_url(),
            wait_timeout_secs: default_wait_timeout_secs(),
            selectors: SelectorConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrowserConfig {
    /// "chrome" or "edge".
    #[serde(default = "default_engine")]
    pub engine: String,
    /// Explicit browser binary; skips discovery when set.
    #[serde(default)]
    pub executable: Option<String>,
    #[serde(default = "default_headless")]
    pub headless: bool,
    #[serde(default = "default_launch_timeout_secs")]
    pub launch_timeout_secs: u64,
    #[serde(default = "default_command_timeout_secs")]
    pub command_timeout_secs: u64,
    #[serde(default = "default_navigation_timeout_secs")]
    pub navigation_timeout_secs: u64,
    #[serde(default = "default_window_size")]
    pub window_size: String,
}

fn default_engine() -> String {
    "chrome".to_string()
}

fn default_headless() -> bool {
    true
}

fn default_launch_timeout_secs() -> u64 {
    15
}

fn default_command_timeout_secs() -> u64 {
    30
}

fn default_navigation_timeout_secs() -> u64 {
    30
}

fn default_window_size() -> String {
    "1280,720".to_string()
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            engine: default_engine(),
            executable: None,
            headless: default_headless(),
            launch_timeout_secs: default_launch_timeout_secs(),
            command_timeout_secs: default_command_timeout_secs(),
            navigation_timeout_secs: default_navigation_timeout_secs(),
            window_size: default_window_size(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpreadsheetConfig {
    /// Zero-based sheet index; the registry workbook keeps vessels on the second sheet.
    #[serde(default = "default_sheet_index")]
    pub sheet_index: usize,
    #[serde(default = "default_name_column")]
    pub name_column: String,
    #[serde(default = "default_cfr_column")]
    pub cfr_column: String,
    #[serde(default = "default_output_file")]
    pub output_file: String,
}

fn default_sheet_index() -> usize {
    1
}

fn default_name_column() -> String {
    "BUQUE".to_string()
}

fn default_cfr_column() -> String {
    "CodigoCFR".to_string()
}

fn default_output_file() -> String {
    "archivo_actualizado.xlsx".to_string()
}

impl Default for SpreadsheetConfig {
    fn default() -> Self {
        Self {
            sheet_index: default_sheet_index(),
            name_column: default_name_column(),
            cfr_column: default_cfr_column(),
            output_file: default_output_file(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default)]
    pub census: CensusConfig,
    #[serde(default)]
    pub browser: BrowserConfig,
    #[serde(default)]
    pub spreadsheet: SpreadsheetConfig,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load_or_default(paths: &Paths) -> Result<Self> {
        let config_path = paths.config_file();
        if config_path.exists() {
            debug!(path = %config_path.display(), "Loading config");
            Self::load(&config_path)
        } else {
            debug!(path = %config_path.display(), "No config file, using defaults");
            Ok(Self::default())
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.census.search_url.trim().is_empty() {
            return Err(Error::Config("census.searchUrl must not be empty".into()));
        }
        if self.census.wait_timeout_secs == 0 {
            return Err(Error::Config("census.waitTimeoutSecs must be positive".into()));
        }
        if !matches!(self.browser.engine.to_lowercase().as_str(), "chrome" | "chromium" | "edge" | "msedge") {
            return Err(Error::Config(format!(
                "unsupported browser engine '{}'",
                self.browser.engine
            )));
        }
        if self.spreadsheet.name_column.trim().is_empty() || self.spreadsheet.cfr_column.trim().is_empty() {
            return Err(Error::Config("spreadsheet column names must not be empty".into()));
        }
        Ok(())
    }
}
