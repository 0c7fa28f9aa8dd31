use std::sync::atomic::{AtomicU64, Ordering};

use crate::filter::DenyList;

/// Address-check counters shared by the request handlers.
#[derive(Default)]
pub struct FilterMetrics {
    pub checks_total: AtomicU64,
    pub checks_allowed: AtomicU64,
    pub checks_denied: AtomicU64,
    pub checks_invalid: AtomicU64,
}

impl FilterMetrics {
    pub fn inc_allowed(&self) {
        self.checks_total.fetch_add(1, Ordering::Relaxed);
        self.checks_allowed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_denied(&self) {
        self.checks_total.fetch_add(1, Ordering::Relaxed);
        self.checks_denied.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_invalid(&self) {
        self.checks_total.fetch_add(1, Ordering::Relaxed);
        self.checks_invalid.fetch_add(1, Ordering::Relaxed);
    }

    /// Serialize to Prometheus text exposition format, including gauges for
    /// the deny list currently in effect.
    pub fn to_prometheus_text(&self, deny: &DenyList) -> String {
        let total = self.checks_total.load(Ordering::Relaxed);
        let allowed = self.checks_allowed.load(Ordering::Relaxed);
        let denied = self.checks_denied.load(Ordering::Relaxed);
        let invalid = self.checks_invalid.load(Ordering::Relaxed);
        let ranges = deny.ranges.len();
        let covered = deny.ranges.covered_addresses();
        let skipped = deny.report.skipped.len();

        format!(
            "# HELP ip_filter_checks_total Client address checks processed\n\
             # TYPE ip_filter_checks_total counter\n\
             ip_filter_checks_total{{result=\"allow\"}} {allowed}\n\
             ip_filter_checks_total{{result=\"deny\"}} {denied}\n\
             ip_filter_checks_total{{result=\"invalid\"}} {invalid}\n\
             ip_filter_checks_total{{result=\"total\"}} {total}\n\
             # HELP ip_filter_deny_ranges Deny ranges currently in effect\n\
             # TYPE ip_filter_deny_ranges gauge\n\
             ip_filter_deny_ranges {ranges}\n\
             # HELP ip_filter_denied_addresses Addresses covered by the deny ranges\n\
             # TYPE ip_filter_denied_addresses gauge\n\
             ip_filter_denied_addresses {covered}\n\
             # HELP ip_filter_skipped_entries Deny entries skipped in the last build\n\
             # TYPE ip_filter_skipped_entries gauge\n\
             ip_filter_skipped_entries {skipped}\n"
        )
    }
}
