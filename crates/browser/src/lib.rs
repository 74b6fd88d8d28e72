//! Chrome DevTools Protocol browser automation for the census lookups.
//!
//! - `cdp`: raw CDP client over the page target's WebSocket
//! - `session`: browser process launch, discovery and teardown
//! - `driver`: the `BrowserDriver` seam the lookup logic is written against

pub mod cdp;
pub mod driver;
pub mod session;

pub use driver::{BrowserDriver, CdpDriver, CdpLauncher, DriverLauncher, NodeId};
pub use session::{BrowserEngine, BrowserSession, LaunchOptions};
