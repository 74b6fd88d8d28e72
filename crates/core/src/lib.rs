pub mod config;
pub mod error;
pub mod paths;

pub use config::{BrowserConfig, CensusConfig, Config, SelectorConfig, SpreadsheetConfig};
pub use error::{Error, Result};
pub use paths::Paths;
