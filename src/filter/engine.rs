use anyhow::{Context, Result};
use arc_swap::ArcSwap;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::Mutex;

use super::addr;
use super::set::{BuildReport, RangeSet, RangeSetBuilder};
use crate::config::FilterConfig;
use crate::error::AppResult;

/// A fully built deny list, published as one unit.
#[derive(Debug)]
pub struct DenyList {
    pub ranges: RangeSet,
    pub report: BuildReport,
    pub max_denied_addresses: u64,
    pub built_at: DateTime<Utc>,
}

impl DenyList {
    fn build(cfg: &FilterConfig) -> Self {
        let builder = RangeSetBuilder::new(cfg.max_denied_addresses);
        let (ranges, report) = builder.build(&cfg.deny);
        Self {
            ranges,
            report,
            max_denied_addresses: builder.max_denied_addresses(),
            built_at: Utc::now(),
        }
    }
}

/// Shared between all request handlers. Queries read the current [`DenyList`]
/// without locking; a reload builds a new list off to the side and swaps it in.
pub struct FilterEngine {
    deny: ArcSwap<DenyList>,
    rebuild: Mutex<()>,
}

impl FilterEngine {
    pub fn new(cfg: &FilterConfig) -> Self {
        let list = DenyList::build(cfg);
        tracing::info!(
            "Filter engine ready: {} deny ranges covering {} addresses",
            list.ranges.len(),
            list.ranges.covered_addresses(),
        );
        Self {
            deny: ArcSwap::from_pointee(list),
            rebuild: Mutex::new(()),
        }
    }

    /// Rebuild the deny list from a full configuration and publish it.
    /// Concurrent reloads run one after another. The parse and sort run on the
    /// blocking pool; if the build does not complete, the current list stays.
    pub async fn reload(&self, cfg: &FilterConfig) -> Result<BuildReport> {
        let _guard = self.rebuild.lock().await;

        let cfg = cfg.clone();
        let list = tokio::task::spawn_blocking(move || DenyList::build(&cfg))
            .await
            .context("Deny list build did not complete")?;
        let report = list.report.clone();
        tracing::info!(
            "Filter engine reloaded: {} deny ranges covering {} addresses ({} entries skipped{})",
            list.ranges.len(),
            list.ranges.covered_addresses(),
            report.skipped.len(),
            if report.truncated.is_some() { ", truncated" } else { "" },
        );
        self.deny.store(Arc::new(list));
        Ok(report)
    }

    /// The deny list currently in effect.
    pub fn snapshot(&self) -> Arc<DenyList> {
        self.deny.load_full()
    }

    /// Returns `true` if `address` falls inside a deny range.
    pub fn is_denied(&self, address: addr::Address) -> bool {
        self.deny.load().ranges.contains(address)
    }

    /// Check a client address string. `Ok(true)` means the client is allowed,
    /// `Ok(false)` denied; a malformed address is a format error.
    pub fn has_auth(&self, client_ip: &str) -> AppResult<bool> {
        let address = addr::parse_address(client_ip)?;
        let allowed = !self.is_denied(address);
        tracing::debug!("has_auth({}) = {}", client_ip, allowed);
        Ok(allowed)
    }
}
