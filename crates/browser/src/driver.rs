//! The browser operations a census lookup needs, and their CDP implementation.

use async_trait::async_trait;
use cfrscan_core::{Error, Result};
use serde_json::{json, Value};
use std::time::{Duration, Instant};
use tracing::debug;

use super::session::{BrowserSession, LaunchOptions};

/// Opaque handle to an element on the current page.
pub type NodeId = i64;

/// Browser capability the lookups are written against.
///
/// Handles stay valid until the next `navigate`, `click` or `wait_for`.
#[async_trait]
pub trait BrowserDriver: Send {
    async fn navigate(&mut self, url: &str) -> Result<()>;

    /// Replace the value of the input matched by `selector`.
    async fn fill(&mut self, selector: &str, text: &str) -> Result<()>;

    async fn click(&mut self, selector: &str) -> Result<()>;

    /// Poll until `selector` matches. `Ok(None)` means the wait timed out.
    async fn wait_for(&mut self, selector: &str, timeout: Duration) -> Result<Option<NodeId>>;

    async fn query_all(&mut self, selector: &str) -> Result<Vec<NodeId>>;

    /// First descendant of `node` matching `selector`.
    async fn query_within(&mut self, node: NodeId, selector: &str) -> Result<Option<NodeId>>;

    /// First following sibling element of `node` with the given tag name.
    async fn following_sibling(&mut self, node: NodeId, tag: &str) -> Result<Option<NodeId>>;

    /// Rendered text of the element.
    async fn read_text(&mut self, node: NodeId) -> Result<String>;

    /// DOM property (falling back to the attribute) of the element, so
    /// `href` comes back as an absolute URL.
    async fn read_attribute(&mut self, node: NodeId, name: &str) -> Result<Option<String>>;

    /// Release the browser. Must be safe to call after any failure.
    async fn close(&mut self);
}

/// Creates one fresh driver per lookup.
#[async_trait]
pub trait DriverLauncher: Send + Sync {
    async fn launch(&self) -> Result<Box<dyn BrowserDriver>>;
}

const POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Rendered text only; hidden elements read as empty.
const READ_TEXT_FN: &str = "function() { return this.innerText || ''; }";

/// `BrowserDriver` over a live Chrome/Edge session.
pub struct CdpDriver {
    session: BrowserSession,
    navigation_timeout: Duration,
    /// Document root of the current page; dropped whenever the page may change.
    root: Option<NodeId>,
}

impl CdpDriver {
    pub fn new(session: BrowserSession, navigation_timeout: Duration) -> Self {
        Self {
            session,
            navigation_timeout,
            root: None,
        }
    }

    async fn root(&mut self) -> Result<NodeId> {
        if let Some(root) = self.root {
            return Ok(root);
        }
        let root = self.session.cdp.document_root().await?;
        self.root = Some(root);
        Ok(root)
    }

    async fn run_bool_js(&self, js: &str) -> Result<bool> {
        let result = self.session.cdp.evaluate_js(js).await?;
        Ok(result
            .get("result")
            .and_then(|r| r.get("value"))
            .and_then(|v| v.as_bool())
            .unwrap_or(false))
    }
}

#[async_trait]
impl BrowserDriver for CdpDriver {
    async fn navigate(&mut self, url: &str) -> Result<()> {
        self.root = None;
        let mut loaded = self.session.cdp.subscribe_event("Page.loadEventFired").await;

        let result = self.session.cdp.navigate(url).await?;
        if let Some(error_text) = result.get("errorText").and_then(|v| v.as_str()) {
            return Err(Error::Browser(format!("Navigation to {} failed: {}", url, error_text)));
        }

        let waited = tokio::time::timeout(self.navigation_timeout, loaded.recv()).await.ok();
        load_outcome(url, waited, self.navigation_timeout)?;
        debug!(url, "Page loaded");
        Ok(())
    }

    async fn fill(&mut self, selector: &str, text: &str) -> Result<()> {
        let focus = format!(
            concat!(
                "(function() {{ var el = document.querySelector({});",
                " if (!el) return false;",
                " el.focus(); el.value = ''; return true; }})()"
            ),
            js_string(selector)
        );
        if !self.run_bool_js(&focus).await? {
            return Err(Error::NotFound(format!("Element not found: {}", selector)));
        }

        self.session.cdp.insert_text(text).await?;

        // Dispatch input event for frameworks
        self.session
            .cdp
            .evaluate_js(
                "document.activeElement && document.activeElement.dispatchEvent(new Event('input', {bubbles: true}))",
            )
            .await?;
        Ok(())
    }

    async fn click(&mut self, selector: &str) -> Result<()> {
        self.root = None;
        let js = format!(
            concat!(
                "(function() {{ var el = document.querySelector({});",
                " if (!el) return false;",
                " el.scrollIntoView({{block: 'center'}});",
                " el.click(); return true; }})()"
            ),
            js_string(selector)
        );
        if !self.run_bool_js(&js).await? {
            return Err(Error::NotFound(format!("Element not found: {}", selector)));
        }
        Ok(())
    }

    async fn wait_for(&mut self, selector: &str, timeout: Duration) -> Result<Option<NodeId>> {
        let start = Instant::now();
        loop {
            // The page may be mid-navigation; a failed query just means "not yet".
            self.root = None;
            let found = match self.root().await {
                Ok(root) => self.session.cdp.query_selector(root, selector).await,
                Err(e) => Err(e),
            };
            match found {
                Ok(Some(node)) => {
                    debug!(selector, waited_ms = start.elapsed().as_millis() as u64, "Element present");
                    return Ok(Some(node));
                }
                Ok(None) => {}
                Err(e) => debug!(selector, "Query failed while waiting: {}", e),
            }

            if start.elapsed() >= timeout {
                debug!(selector, "Wait timed out");
                return Ok(None);
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    async fn query_all(&mut self, selector: &str) -> Result<Vec<NodeId>> {
        let root = self.root().await?;
        self.session.cdp.query_selector_all(root, selector).await
    }

    async fn query_within(&mut self, node: NodeId, selector: &str) -> Result<Option<NodeId>> {
        self.session.cdp.query_selector(node, selector).await
    }

    async fn following_sibling(&mut self, node: NodeId, tag: &str) -> Result<Option<NodeId>> {
        let object_id = self.session.cdp.resolve_node(node).await?;
        let result = self
            .session
            .cdp
            .call_function_on(
                &object_id,
                concat!(
                    "function(tag) { var el = this.nextElementSibling;",
                    " while (el && el.tagName.toLowerCase() !== tag.toLowerCase()) { el = el.nextElementSibling; }",
                    " return el; }"
                ),
                vec![json!(tag)],
                false,
            )
            .await?;

        match result
            .get("result")
            .and_then(|r| r.get("objectId"))
            .and_then(|v| v.as_str())
        {
            Some(sibling) => Ok(Some(self.session.cdp.request_node(sibling).await?)),
            None => Ok(None),
        }
    }

    async fn read_text(&mut self, node: NodeId) -> Result<String> {
        let object_id = self.session.cdp.resolve_node(node).await?;
        let result = self
            .session
            .cdp
            .call_function_on(
                &object_id,
                READ_TEXT_FN,
                vec![],
                true,
            )
            .await?;
        Ok(remote_string(&result).unwrap_or_default())
    }

    async fn read_attribute(&mut self, node: NodeId, name: &str) -> Result<Option<String>> {
        let object_id = self.session.cdp.resolve_node(node).await?;
        let result = self
            .session
            .cdp
            .call_function_on(
                &object_id,
                concat!(
                    "function(name) { var v = this[name];",
                    " if (typeof v === 'string') return v;",
                    " return this.getAttribute(name); }"
                ),
                vec![json!(name)],
                true,
            )
            .await?;
        Ok(remote_string(&result))
    }

    async fn close(&mut self) {
        self.root = None;
        self.session.close().await;
    }
}

/// Launches a fresh Chrome/Edge session per lookup.
pub struct CdpLauncher {
    options: LaunchOptions,
    navigation_timeout: Duration,
}

impl CdpLauncher {
    pub fn new(options: LaunchOptions, navigation_timeout: Duration) -> Self {
        Self {
            options,
            navigation_timeout,
        }
    }
}

#[async_trait]
impl DriverLauncher for CdpLauncher {
    async fn launch(&self) -> Result<Box<dyn BrowserDriver>> {
        let session = BrowserSession::launch(&self.options).await?;
        Ok(Box::new(CdpDriver::new(session, self.navigation_timeout)))
    }
}

/// Interpret the wait for `Page.loadEventFired`: `None` means the wait timed
/// out, `Some(None)` that the event stream closed before the page loaded.
fn load_outcome(url: &str, waited: Option<Option<Value>>, timeout: Duration) -> Result<()> {
    match waited {
        Some(Some(_)) => Ok(()),
        Some(None) => Err(Error::Browser(format!(
            "Connection closed while loading {}",
            url
        ))),
        None => Err(Error::Timeout(format!(
            "{} did not finish loading within {}s",
            url,
            timeout.as_secs()
        ))),
    }
}

/// Quote a value as a JavaScript string literal.
fn js_string(s: &str) -> String {
    Value::String(s.to_string()).to_string()
}

/// Pull a string out of a `Runtime.callFunctionOn` result.
fn remote_string(result: &Value) -> Option<String> {
    result
        .get("result")
        .and_then(|r| r.get("value"))
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_js_string_escapes_quotes() {
        assert_eq!(js_string("#text"), "\"#text\"");
        assert_eq!(js_string("a[title=\"x\"]"), r#""a[title=\"x\"]""#);
        assert_eq!(js_string("it's"), "\"it's\"");
    }

    #[test]
    fn test_load_outcome() {
        let timeout = Duration::from_secs(30);
        assert!(load_outcome("https://census/", Some(Some(json!({"timestamp": 1.0}))), timeout).is_ok());
        assert!(matches!(
            load_outcome("https://census/", Some(None), timeout),
            Err(Error::Browser(_))
        ));
        assert!(matches!(
            load_outcome("https://census/", None, timeout),
            Err(Error::Timeout(_))
        ));
    }

    #[test]
    fn test_read_text_uses_rendered_text_only() {
        assert!(READ_TEXT_FN.contains("this.innerText"));
        assert!(!READ_TEXT_FN.contains("textContent"));
    }

    #[test]
    fn test_remote_string() {
        let value = json!({"result": {"type": "string", "value": "PESQUERO UNO"}});
        assert_eq!(remote_string(&value).as_deref(), Some("PESQUERO UNO"));

        let null = json!({"result": {"type": "object", "subtype": "null", "value": null}});
        assert_eq!(remote_string(&null), None);
    }
}
