//! In-memory stand-in for the census website.
//!
//! `FakeSite` describes what the site would serve; `FakeLauncher` hands out
//! `FakeDriver`s that render it as a tiny node tree matched against the
//! default selectors. Waits never sleep: an absent element times out at once.

use async_trait::async_trait;
use cfrscan_browser::{BrowserDriver, DriverLauncher, NodeId};
use cfrscan_core::{CensusConfig, Error, Result, SelectorConfig};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct FakeSite {
    search_url: String,
    reachable: bool,
    show_results_list: bool,
    show_items_found: bool,
    results: Vec<(String, String)>,
    labelled_cfr: Option<String>,
    details: HashMap<String, Vec<(String, String)>>,
}

impl FakeSite {
    pub fn new() -> Self {
        Self {
            search_url: CensusConfig::default().search_url,
            reachable: true,
            show_results_list: true,
            show_items_found: true,
            results: Vec::new(),
            labelled_cfr: None,
            details: HashMap::new(),
        }
    }

    /// Add a search result link. An empty `url` renders a link without href.
    pub fn with_result(mut self, name: &str, url: &str) -> Self {
        self.results.push((name.to_string(), url.to_string()));
        self
    }

    pub fn with_detail(mut self, url: &str, fields: &[(&str, &str)]) -> Self {
        self.details.insert(
            url.to_string(),
            fields
                .iter()
                .map(|(l, v)| (l.to_string(), v.to_string()))
                .collect(),
        );
        self
    }

    /// Show a `CFR:` label followed by a span on the results page.
    pub fn with_labelled_cfr(mut self, cfr: &str) -> Self {
        self.labelled_cfr = Some(cfr.to_string());
        self
    }

    pub fn without_results_list(mut self) -> Self {
        self.show_results_list = false;
        self
    }

    pub fn without_items_found(mut self) -> Self {
        self.show_items_found = false;
        self
    }

    pub fn unreachable(mut self) -> Self {
        self.reachable = false;
        self
    }
}

impl Default for FakeSite {
    fn default() -> Self {
        Self::new()
    }
}

/// What the fake browsers were asked to do.
#[derive(Debug, Default)]
pub struct FakeStats {
    pub launches: usize,
    pub closes: usize,
    /// Text submitted through the search form, per search.
    pub searches: Vec<String>,
    pub visited: Vec<String>,
}

pub struct FakeLauncher {
    site: Option<FakeSite>,
    stats: Arc<Mutex<FakeStats>>,
}

impl FakeLauncher {
    pub fn new(site: FakeSite) -> Self {
        Self {
            site: Some(site),
            stats: Arc::new(Mutex::new(FakeStats::default())),
        }
    }

    /// A launcher whose browser never starts.
    pub fn failing() -> Self {
        Self {
            site: None,
            stats: Arc::new(Mutex::new(FakeStats::default())),
        }
    }

    pub fn stats(&self) -> Arc<Mutex<FakeStats>> {
        self.stats.clone()
    }
}

#[async_trait]
impl DriverLauncher for FakeLauncher {
    async fn launch(&self) -> Result<Box<dyn BrowserDriver>> {
        let site = self
            .site
            .clone()
            .ok_or_else(|| Error::Browser("chrome not found. Please install it.".into()))?;
        lock(&self.stats).launches += 1;
        Ok(Box::new(FakeDriver {
            site,
            selectors: SelectorConfig::default(),
            stats: self.stats.clone(),
            nodes: Vec::new(),
            on_search_page: false,
            typed: String::new(),
        }))
    }
}

#[derive(Debug, Clone)]
struct FakeNode {
    selector: String,
    text: String,
    href: Option<String>,
    children: Vec<NodeId>,
    next_sibling: Option<NodeId>,
}

pub struct FakeDriver {
    site: FakeSite,
    selectors: SelectorConfig,
    stats: Arc<Mutex<FakeStats>>,
    nodes: Vec<FakeNode>,
    on_search_page: bool,
    typed: String,
}

impl FakeDriver {
    fn add(&mut self, selector: &str, text: &str) -> NodeId {
        self.nodes.push(FakeNode {
            selector: selector.to_string(),
            text: text.to_string(),
            href: None,
            children: Vec::new(),
            next_sibling: None,
        });
        (self.nodes.len() - 1) as NodeId
    }

    fn node(&self, id: NodeId) -> Result<&FakeNode> {
        usize::try_from(id)
            .ok()
            .and_then(|i| self.nodes.get(i))
            .ok_or_else(|| Error::Browser(format!("stale node {}", id)))
    }

    fn find(&self, selector: &str) -> Vec<NodeId> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.selector == selector)
            .map(|(i, _)| i as NodeId)
            .collect()
    }

    fn render_search_page(&mut self) {
        let sel = self.selectors.clone();
        self.add(&sel.search_input, "");
        self.add(&sel.submit_button, "Buscar");
        self.on_search_page = true;
    }

    fn render_results_page(&mut self) {
        let sel = self.selectors.clone();
        if self.site.show_items_found {
            let count = format!("{} resultados encontrados", self.site.results.len());
            self.add(&sel.items_found, &count);
        }
        if let Some(cfr) = self.site.labelled_cfr.clone() {
            let label = self.add(&sel.cfr_label, "CFR:");
            let value = self.add(&sel.cfr_value, &cfr);
            self.nodes[label as usize].next_sibling = Some(value);
        }
        if self.site.show_results_list {
            self.add(&sel.results_list, "");
            for (name, url) in self.site.results.clone() {
                let link = self.add(&sel.result_link, &name);
                if !url.is_empty() {
                    self.nodes[link as usize].href = Some(url);
                }
            }
        }
    }

    fn render_detail_page(&mut self, fields: &[(String, String)]) {
        let sel = self.selectors.clone();
        self.add(&sel.info_panel, "");
        for (label, value) in fields {
            let field = self.add(&sel.info_field, "");
            let dt = self.add(&sel.field_label, label);
            let dd = self.add(&sel.field_value, value);
            self.nodes[field as usize].children = vec![dt, dd];
        }
    }
}

#[async_trait]
impl BrowserDriver for FakeDriver {
    async fn navigate(&mut self, url: &str) -> Result<()> {
        if !self.site.reachable {
            return Err(Error::Browser(format!(
                "Navigation to {} failed: net::ERR_NAME_NOT_RESOLVED",
                url
            )));
        }
        lock(&self.stats).visited.push(url.to_string());
        self.nodes.clear();
        self.on_search_page = false;
        if url == self.site.search_url {
            self.render_search_page();
        } else if let Some(fields) = self.site.details.get(url).cloned() {
            self.render_detail_page(&fields);
        }
        Ok(())
    }

    async fn fill(&mut self, selector: &str, text: &str) -> Result<()> {
        if self.find(selector).is_empty() {
            return Err(Error::NotFound(format!("Element not found: {}", selector)));
        }
        self.typed = text.to_string();
        Ok(())
    }

    async fn click(&mut self, selector: &str) -> Result<()> {
        if self.find(selector).is_empty() {
            return Err(Error::NotFound(format!("Element not found: {}", selector)));
        }
        if self.on_search_page && selector == self.selectors.submit_button {
            lock(&self.stats).searches.push(self.typed.clone());
            self.nodes.clear();
            self.on_search_page = false;
            self.render_results_page();
        }
        Ok(())
    }

    async fn wait_for(&mut self, selector: &str, _timeout: Duration) -> Result<Option<NodeId>> {
        Ok(self.find(selector).first().copied())
    }

    async fn query_all(&mut self, selector: &str) -> Result<Vec<NodeId>> {
        Ok(self.find(selector))
    }

    async fn query_within(&mut self, node: NodeId, selector: &str) -> Result<Option<NodeId>> {
        let children = self.node(node)?.children.clone();
        for child in children {
            if self.node(child)?.selector == selector {
                return Ok(Some(child));
            }
        }
        Ok(None)
    }

    async fn following_sibling(&mut self, node: NodeId, tag: &str) -> Result<Option<NodeId>> {
        match self.node(node)?.next_sibling {
            Some(sibling) if self.node(sibling)?.selector == tag => Ok(Some(sibling)),
            _ => Ok(None),
        }
    }

    async fn read_text(&mut self, node: NodeId) -> Result<String> {
        Ok(self.node(node)?.text.clone())
    }

    async fn read_attribute(&mut self, node: NodeId, name: &str) -> Result<Option<String>> {
        let node = self.node(node)?;
        Ok(match name {
            "href" => node.href.clone(),
            _ => None,
        })
    }

    async fn close(&mut self) {
        self.nodes.clear();
        lock(&self.stats).closes += 1;
    }
}

fn lock(stats: &Mutex<FakeStats>) -> std::sync::MutexGuard<'_, FakeStats> {
    stats.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
