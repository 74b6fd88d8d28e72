//! The vessel lookup procedure.
//!
//! Each call launches its own browser session and closes it before returning,
//! whatever the outcome. Nothing is retried.

use cfrscan_browser::{BrowserDriver, DriverLauncher};
use cfrscan_core::{CensusConfig, Error, Result, SelectorConfig};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::extract::record_from_fields;
use crate::matching::filter_exact_matches;
use crate::record::{LookupQuery, SearchResultLink, VesselRecord, NOT_FOUND_MESSAGE};

const LABEL_POLL_INTERVAL: Duration = Duration::from_millis(200);

pub struct VesselLookup<L> {
    launcher: L,
    config: CensusConfig,
}

impl<L: DriverLauncher> VesselLookup<L> {
    pub fn new(launcher: L, config: CensusConfig) -> Self {
        Self { launcher, config }
    }

    pub fn config(&self) -> &CensusConfig {
        &self.config
    }

    /// All exact-name matches, in the order the site lists them.
    ///
    /// Never fails: any error is logged and yields an empty list.
    pub async fn lookup(&self, vessel_name: &str) -> Vec<VesselRecord> {
        match self.search_exact(vessel_name).await {
            Ok(records) => records,
            Err(e) => {
                warn!(vessel = vessel_name, "Lookup failed: {}", e);
                Vec::new()
            }
        }
    }

    /// CFR of the first vessel the site reports, or [`NOT_FOUND_MESSAGE`].
    pub async fn lookup_single_cfr(&self, vessel_name: &str) -> String {
        match self.search_single_cfr(vessel_name).await {
            Ok(cfr) => {
                info!(vessel = vessel_name, cfr = %cfr, "CFR found");
                cfr
            }
            Err(e) => {
                warn!(vessel = vessel_name, "CFR lookup failed: {}", e);
                NOT_FOUND_MESSAGE.to_string()
            }
        }
    }

    pub async fn search_exact(&self, vessel_name: &str) -> Result<Vec<VesselRecord>> {
        let query = LookupQuery::new(vessel_name);
        let mut driver = self.launcher.launch().await?;
        let result = self.exact_matches(driver.as_mut(), &query).await;
        driver.close().await;
        result
    }

    pub async fn search_single_cfr(&self, vessel_name: &str) -> Result<String> {
        let query = LookupQuery::new(vessel_name);
        let mut driver = self.launcher.launch().await?;
        let result = self.first_cfr(driver.as_mut(), &query).await;
        driver.close().await;
        result
    }

    fn wait_timeout(&self) -> Duration {
        Duration::from_secs(self.config.wait_timeout_secs)
    }

    fn selectors(&self) -> &SelectorConfig {
        &self.config.selectors
    }

    /// Open the search page, type the name and submit.
    async fn submit_search(&self, driver: &mut dyn BrowserDriver, query: &LookupQuery) -> Result<()> {
        let sel = self.selectors();
        info!(vessel = %query.vessel_name, "Searching census");

        driver.navigate(&self.config.search_url).await?;
        if driver.wait_for(&sel.search_input, self.wait_timeout()).await?.is_none() {
            return Err(Error::Timeout(format!(
                "search input '{}' did not appear",
                sel.search_input
            )));
        }
        driver.fill(&sel.search_input, &query.vessel_name).await?;
        driver.click(&sel.submit_button).await
    }

    async fn exact_matches(
        &self,
        driver: &mut dyn BrowserDriver,
        query: &LookupQuery,
    ) -> Result<Vec<VesselRecord>> {
        let sel = self.selectors();
        self.submit_search(driver, query).await?;

        if driver.wait_for(&sel.results_list, self.wait_timeout()).await?.is_none() {
            info!(vessel = %query.vessel_name, "No results list, treating as no matches");
            return Ok(Vec::new());
        }

        let links = self.result_links(driver).await?;
        let total = links.len();
        let matches = filter_exact_matches(query, links);
        debug!(total, matched = matches.len(), "Filtered search results");

        let mut records = Vec::with_capacity(matches.len());
        for link in &matches {
            records.push(self.read_detail(driver, link).await?);
        }
        Ok(records)
    }

    async fn result_links(&self, driver: &mut dyn BrowserDriver) -> Result<Vec<SearchResultLink>> {
        let nodes = driver.query_all(&self.selectors().result_link).await?;
        let mut links = Vec::with_capacity(nodes.len());
        for node in nodes {
            let display_name = driver.read_text(node).await?;
            match driver.read_attribute(node, "href").await? {
                Some(detail_url) if !detail_url.is_empty() => links.push(SearchResultLink {
                    display_name,
                    detail_url,
                }),
                _ => debug!(name = %display_name, "Result link without href skipped"),
            }
        }
        Ok(links)
    }

    async fn read_detail(
        &self,
        driver: &mut dyn BrowserDriver,
        link: &SearchResultLink,
    ) -> Result<VesselRecord> {
        let sel = self.selectors();
        driver.navigate(&link.detail_url).await?;
        if driver.wait_for(&sel.info_panel, self.wait_timeout()).await?.is_none() {
            return Err(Error::Timeout(format!(
                "detail panel '{}' did not appear on {}",
                sel.info_panel, link.detail_url
            )));
        }

        let mut fields = Vec::new();
        for field in driver.query_all(&sel.info_field).await? {
            let label = driver.query_within(field, &sel.field_label).await?;
            let value = driver.query_within(field, &sel.field_value).await?;
            let (Some(label), Some(value)) = (label, value) else {
                continue;
            };
            fields.push((driver.read_text(label).await?, driver.read_text(value).await?));
        }

        let record = record_from_fields(fields);
        debug!(url = %link.detail_url, cfr = %record.cfr, status = %record.status, "Detail read");
        Ok(record)
    }

    async fn first_cfr(&self, driver: &mut dyn BrowserDriver, query: &LookupQuery) -> Result<String> {
        let sel = self.selectors();
        self.submit_search(driver, query).await?;

        if driver.wait_for(&sel.items_found, self.wait_timeout()).await?.is_none() {
            return Err(Error::Timeout(format!(
                "results count '{}' did not appear",
                sel.items_found
            )));
        }

        let start = Instant::now();
        loop {
            if let Some(cfr) = self.labelled_cfr(driver).await? {
                return Ok(cfr);
            }
            if start.elapsed() >= self.wait_timeout() {
                return Err(Error::NotFound(format!(
                    "no '{}' label followed by '{}'",
                    sel.cfr_label_text, sel.cfr_value
                )));
            }
            tokio::time::sleep(LABEL_POLL_INTERVAL).await;
        }
    }

    /// Text of the element right after the first "CFR:" label, if present.
    async fn labelled_cfr(&self, driver: &mut dyn BrowserDriver) -> Result<Option<String>> {
        let sel = self.selectors();
        for label in driver.query_all(&sel.cfr_label).await? {
            if !driver.read_text(label).await?.contains(&sel.cfr_label_text) {
                continue;
            }
            if let Some(value) = driver.following_sibling(label, &sel.cfr_value).await? {
                return Ok(Some(driver.read_text(value).await?.trim().to_string()));
            }
        }
        Ok(None)
    }
}
