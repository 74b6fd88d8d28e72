//! Browser process lifecycle.
//!
//! Every session gets its own Chrome process, debugging port and throwaway
//! profile directory. The process is killed when the session is dropped, so a
//! lookup that bails out early still releases the browser.

use super::cdp::CdpClient;
use cfrscan_core::{BrowserConfig, Error, Result};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::{Child, Command};
use tracing::{debug, info};

/// Supported browser engines. Both speak CDP natively.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BrowserEngine {
    Chrome,
    Edge,
}

impl BrowserEngine {
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "edge" | "msedge" => Self::Edge,
            _ => Self::Chrome,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Chrome => "chrome",
            Self::Edge => "edge",
        }
    }
}

/// Everything needed to start one browser session.
#[derive(Debug, Clone)]
pub struct LaunchOptions {
    pub engine: BrowserEngine,
    pub executable: Option<String>,
    pub headless: bool,
    pub window_size: String,
    pub profiles_dir: PathBuf,
    pub launch_timeout: Duration,
    pub command_timeout: Duration,
}

impl LaunchOptions {
    pub fn from_config(config: &BrowserConfig, profiles_dir: PathBuf) -> Self {
        Self {
            engine: BrowserEngine::parse(&config.engine),
            executable: config.executable.clone(),
            headless: config.headless,
            window_size: config.window_size.clone(),
            profiles_dir,
            launch_timeout: Duration::from_secs(config.launch_timeout_secs),
            command_timeout: Duration::from_secs(config.command_timeout_secs),
        }
    }
}

/// A single browser session with its Chrome process and CDP client.
pub struct BrowserSession {
    pub engine: BrowserEngine,
    process: Child,
    pub cdp: CdpClient,
    profile_dir: PathBuf,
}

impl BrowserSession {
    /// Launch a browser instance and connect to its page target via CDP.
    pub async fn launch(options: &LaunchOptions) -> Result<Self> {
        let browser_path = match &options.executable {
            Some(path) => path.clone(),
            None => find_browser_binary(options.engine).ok_or_else(|| {
                Error::Browser(format!("{} not found. Please install it.", options.engine.name()))
            })?,
        };

        let profile_dir = options
            .profiles_dir
            .join(format!("session-{}", uuid::Uuid::new_v4().simple()));
        std::fs::create_dir_all(&profile_dir)?;

        let debug_port = find_free_port().await?;
        let args = build_browser_args(debug_port, &profile_dir, options.headless, &options.window_size);

        info!(
            port = debug_port,
            headless = options.headless,
            browser = options.engine.name(),
            "Launching browser"
        );

        let process = Command::new(&browser_path)
            .args(&args)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| Error::Browser(format!("Failed to launch {}: {}", browser_path, e)))?;

        // From here on the child is owned by the guard below until the
        // session takes it, so a failed handshake still kills the process.
        let mut guard = LaunchGuard {
            process: Some(process),
            profile_dir: profile_dir.clone(),
        };

        wait_for_cdp_ready(debug_port, options.launch_timeout).await?;
        let page_ws_url = get_page_ws_url(debug_port).await?;
        let cdp = CdpClient::connect(&page_ws_url, options.command_timeout).await?;

        cdp.enable_domain("Page").await?;
        cdp.enable_domain("Runtime").await?;
        cdp.enable_domain("DOM").await?;

        debug!(ws_url = %page_ws_url, "CDP connection established (page target)");

        let process = guard.process.take().ok_or_else(|| {
            Error::Browser("browser process handle lost during launch".to_string())
        })?;

        Ok(Self {
            engine: options.engine,
            process,
            cdp,
            profile_dir,
        })
    }

    /// Close the browser session and remove its profile directory.
    pub async fn close(&mut self) {
        // Try graceful close via CDP first
        if let Err(e) = self.cdp.send_command("Browser.close", json!({})).await {
            debug!("CDP Browser.close failed (may already be closed): {}", e);
        }
        let _ = self.process.kill().await;
        remove_profile_dir(&self.profile_dir);
        info!(browser = self.engine.name(), "Browser session closed");
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        // Best-effort kill on drop
        let _ = self.process.start_kill();
    }
}

struct LaunchGuard {
    process: Option<Child>,
    profile_dir: PathBuf,
}

impl Drop for LaunchGuard {
    fn drop(&mut self) {
        if let Some(mut process) = self.process.take() {
            let _ = process.start_kill();
            remove_profile_dir(&self.profile_dir);
        }
    }
}

fn remove_profile_dir(dir: &Path) {
    if let Err(e) = std::fs::remove_dir_all(dir) {
        debug!("Could not remove browser profile {}: {}", dir.display(), e);
    }
}

/// Build Chromium command line arguments.
fn build_browser_args(
    debug_port: u16,
    user_data_dir: &Path,
    headless: bool,
    window_size: &str,
) -> Vec<String> {
    let mut args = vec![
        format!("--remote-debugging-port={}", debug_port),
        format!("--user-data-dir={}", user_data_dir.display()),
        "--no-first-run".to_string(),
        "--no-default-browser-check".to_string(),
        "--disable-background-networking".to_string(),
        "--disable-extensions".to_string(),
        "--disable-sync".to_string(),
        "--disable-translate".to_string(),
        "--metrics-recording-only".to_string(),
        "--safebrowsing-disable-auto-update".to_string(),
        "--password-store=basic".to_string(),
    ];
    if headless {
        args.push("--headless=new".to_string());
    } else {
        args.push("--start-maximized".to_string());
    }
    args.push(format!("--window-size={}", window_size));
    args.push("about:blank".to_string());
    args
}

/// Find a browser binary on the system for the given engine.
fn find_browser_binary(engine: BrowserEngine) -> Option<String> {
    let candidates = match engine {
        BrowserEngine::Chrome => {
            if cfg!(target_os = "macos") {
                vec![
                    "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
                    "/Applications/Chromium.app/Contents/MacOS/Chromium",
                    "/Applications/Brave Browser.app/Contents/MacOS/Brave Browser",
                ]
            } else if cfg!(target_os = "linux") {
                vec![
                    "google-chrome", "google-chrome-stable",
                    "chromium", "chromium-browser",
                    "/usr/bin/google-chrome", "/usr/bin/chromium",
                ]
            } else {
                vec![
                    r"C:\Program Files\Google\Chrome\Application\chrome.exe",
                    r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe",
                ]
            }
        }
        BrowserEngine::Edge => {
            if cfg!(target_os = "macos") {
                vec!["/Applications/Microsoft Edge.app/Contents/MacOS/Microsoft Edge"]
            } else if cfg!(target_os = "linux") {
                vec!["microsoft-edge", "microsoft-edge-stable", "/usr/bin/microsoft-edge"]
            } else {
                vec![
                    r"C:\Program Files (x86)\Microsoft\Edge\Application\msedge.exe",
                    r"C:\Program Files\Microsoft\Edge\Application\msedge.exe",
                ]
            }
        }
    };

    for candidate in candidates {
        if Path::new(candidate).exists() {
            return Some(candidate.to_string());
        }
        if !candidate.contains('/') && !candidate.contains('\\') && which::which(candidate).is_ok() {
            return Some(candidate.to_string());
        }
    }
    None
}

/// Find a free TCP port.
async fn find_free_port() -> Result<u16> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let port = listener.local_addr()?.port();
    drop(listener);
    Ok(port)
}

/// Wait for Chrome's CDP endpoint to become available.
/// Polls /json/version until it responds, up to `timeout`.
async fn wait_for_cdp_ready(port: u16, timeout: Duration) -> Result<String> {
    let start = Instant::now();
    let url = format!("http://127.0.0.1:{}/json/version", port);

    loop {
        if start.elapsed() > timeout {
            return Err(Error::Timeout(format!(
                "Browser CDP not ready after {}s on port {}",
                timeout.as_secs(),
                port
            )));
        }

        if let Ok(resp) = reqwest::get(&url).await {
            if let Ok(body) = resp.json::<Value>().await {
                if let Some(ws_url) = body.get("webSocketDebuggerUrl").and_then(|v| v.as_str()) {
                    return Ok(ws_url.to_string());
                }
            }
        }

        tokio::time::sleep(Duration::from_millis(200)).await;
    }
}

/// Find the first page target's WebSocket URL via /json/list.
/// Retries a few times since the page target may not appear immediately.
async fn get_page_ws_url(port: u16) -> Result<String> {
    let url = format!("http://127.0.0.1:{}/json/list", port);

    for attempt in 0..10 {
        if attempt > 0 {
            tokio::time::sleep(Duration::from_millis(300)).await;
        }

        let resp = match reqwest::get(&url).await {
            Ok(r) => r,
            Err(_) => continue,
        };
        let targets: Vec<Value> = match resp.json().await {
            Ok(t) => t,
            Err(_) => continue,
        };

        if let Some(ws_url) = first_page_ws_url(&targets) {
            return Ok(ws_url);
        }
    }

    Err(Error::Browser("No page target found after retries".to_string()))
}

fn first_page_ws_url(targets: &[Value]) -> Option<String> {
    targets
        .iter()
        .filter(|t| t.get("type").and_then(|v| v.as_str()) == Some("page"))
        .find_map(|t| t.get("webSocketDebuggerUrl").and_then(|v| v.as_str()))
        .map(|s| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_browser_engine_parse() {
        assert_eq!(BrowserEngine::parse("chrome"), BrowserEngine::Chrome);
        assert_eq!(BrowserEngine::parse("Chrome"), BrowserEngine::Chrome);
        assert_eq!(BrowserEngine::parse("edge"), BrowserEngine::Edge);
        assert_eq!(BrowserEngine::parse("msedge"), BrowserEngine::Edge);
        assert_eq!(BrowserEngine::parse("unknown"), BrowserEngine::Chrome); // default
        assert_eq!(BrowserEngine::Edge.name(), "edge");
    }

    #[test]
    fn test_build_browser_args_headless() {
        let args = build_browser_args(9222, Path::new("/tmp/profile"), true, "1280,720");
        assert!(args.contains(&"--remote-debugging-port=9222".to_string()));
        assert!(args.contains(&"--user-data-dir=/tmp/profile".to_string()));
        assert!(args.contains(&"--headless=new".to_string()));
        assert!(!args.contains(&"--start-maximized".to_string()));
        assert_eq!(args.last().map(|s| s.as_str()), Some("about:blank"));
    }

    #[test]
    fn test_build_browser_args_headed() {
        let args = build_browser_args(9222, Path::new("/tmp/profile"), false, "1920,1080");
        assert!(!args.iter().any(|a| a.starts_with("--headless")));
        assert!(args.contains(&"--start-maximized".to_string()));
        assert!(args.contains(&"--window-size=1920,1080".to_string()));
    }

    #[test]
    fn test_first_page_ws_url_skips_non_pages() {
        let targets = vec![
            json!({"type": "service_worker", "webSocketDebuggerUrl": "ws://sw"}),
            json!({"type": "page"}),
            json!({"type": "page", "webSocketDebuggerUrl": "ws://page-1"}),
            json!({"type": "page", "webSocketDebuggerUrl": "ws://page-2"}),
        ];
        assert_eq!(first_page_ws_url(&targets).as_deref(), Some("ws://page-1"));
        assert_eq!(first_page_ws_url(&[]), None);
    }

    #[test]
    fn test_launch_options_from_config() {
        let mut config = BrowserConfig::default();
        config.engine = "edge".into();
        config.headless = false;
        let options = LaunchOptions::from_config(&config, PathBuf::from("/tmp/profiles"));
        assert_eq!(options.engine, BrowserEngine::Edge);
        assert!(!options.headless);
        assert_eq!(options.launch_timeout, Duration::from_secs(15));
        assert_eq!(options.command_timeout, Duration::from_secs(30));
    }

    #[tokio::test]
    async fn test_find_free_port() {
        let port = find_free_port().await.unwrap();
        assert!(port > 0);
    }
}
