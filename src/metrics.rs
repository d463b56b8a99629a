//! Metrics collection and export for recycling pools

use std::collections::HashMap;

#[cfg(feature = "serde")]
use serde::Serialize;

#[cfg(feature = "metrics")]
use crate::errors::{PoolError, PoolResult};

/// Metrics snapshot for a single pool
///
/// # Examples
///
/// ```
/// use prefab_pool::RecyclingPool;
///
/// let mut pool = RecyclingPool::new(4);
/// let item = pool.borrow_with(|| Ok(7u32)).unwrap();
///
/// let metrics = pool.get_metrics();
/// assert_eq!(metrics.total_created, 1);
/// assert_eq!(metrics.borrowed_items, 1);
///
/// pool.revert(item).unwrap();
/// assert_eq!(pool.get_metrics().total_reverted, 1);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct PoolMetrics {
    /// Successful borrows, reused or created
    pub total_borrowed: usize,

    /// Accepted reverts
    pub total_reverted: usize,

    /// Items from the construction callback that the pool accepted
    pub total_created: usize,

    /// Borrows refused because the pool was exhausted
    pub exhausted_events: usize,

    /// Reverts rejected because the item was not borrowed
    pub invalid_reverts: usize,

    /// Items currently lent out
    pub borrowed_items: usize,

    /// Items waiting in the available queue
    pub available_items: usize,

    /// Configured maximum size
    pub max_size: usize,

    /// Borrowed items relative to the maximum size (0.0 to 1.0)
    pub utilization: f64,
}

impl PoolMetrics {
    /// Export metrics as a HashMap
    pub fn export(&self) -> HashMap<String, String> {
        let mut metrics = HashMap::new();
        metrics.insert("total_borrowed".to_string(), self.total_borrowed.to_string());
        metrics.insert("total_reverted".to_string(), self.total_reverted.to_string());
        metrics.insert("total_created".to_string(), self.total_created.to_string());
        metrics.insert("exhausted_events".to_string(), self.exhausted_events.to_string());
        metrics.insert("invalid_reverts".to_string(), self.invalid_reverts.to_string());
        metrics.insert("borrowed_items".to_string(), self.borrowed_items.to_string());
        metrics.insert("available_items".to_string(), self.available_items.to_string());
        metrics.insert("max_size".to_string(), self.max_size.to_string());
        metrics.insert("utilization".to_string(), format!("{:.2}", self.utilization));
        metrics
    }
}

/// Metrics exporter for Prometheus format
pub struct MetricsExporter;

#[cfg(feature = "metrics")]
impl MetricsExporter {
    /// Render pool snapshots in the Prometheus text exposition format.
    ///
    /// Each entry becomes one `pool` label value; `tags` are attached to
    /// every series as constant labels.
    ///
    /// # Examples
    ///
    /// ```
    /// use prefab_pool::{MetricsExporter, RecyclingPool};
    /// use std::collections::HashMap;
    ///
    /// let mut pool = RecyclingPool::new(2);
    /// let _item = pool.borrow_with(|| Ok(1u8)).unwrap();
    ///
    /// let mut tags = HashMap::new();
    /// tags.insert("service".to_string(), "arena".to_string());
    ///
    /// let output = MetricsExporter::export_prometheus(
    ///     &[("bullet".to_string(), pool.get_metrics())],
    ///     Some(&tags),
    /// )
    /// .unwrap();
    /// assert!(output.contains("prefab_pool_items_borrowed"));
    /// assert!(output.contains("service=\"arena\""));
    /// ```
    pub fn export_prometheus(
        pools: &[(String, PoolMetrics)],
        tags: Option<&HashMap<String, String>>,
    ) -> PoolResult<String> {
        use prometheus::{
            Encoder, GaugeVec, IntCounterVec, IntGaugeVec, Opts, Registry, TextEncoder,
        };

        let registry = Registry::new_custom(Some("prefab_pool".to_string()), tags.cloned())?;
        let labels = &["pool"];

        // Gauge metrics
        let borrowed = IntGaugeVec::new(Opts::new("items_borrowed", "Items currently lent out"), labels)?;
        let available = IntGaugeVec::new(Opts::new("items_available", "Items waiting for reuse"), labels)?;
        let max_size = IntGaugeVec::new(Opts::new("max_size", "Configured maximum pool size"), labels)?;
        let utilization = GaugeVec::new(Opts::new("utilization", "Borrowed items relative to maximum size"), labels)?;

        // Counter metrics
        let borrowed_total = IntCounterVec::new(Opts::new("borrows_total", "Successful borrows"), labels)?;
        let reverted_total = IntCounterVec::new(Opts::new("reverts_total", "Accepted reverts"), labels)?;
        let created_total = IntCounterVec::new(Opts::new("items_created_total", "Items constructed"), labels)?;
        let exhausted_total = IntCounterVec::new(Opts::new("exhausted_total", "Borrows refused by exhaustion"), labels)?;
        let invalid_total = IntCounterVec::new(Opts::new("invalid_reverts_total", "Rejected reverts"), labels)?;

        registry.register(Box::new(borrowed.clone()))?;
        registry.register(Box::new(available.clone()))?;
        registry.register(Box::new(max_size.clone()))?;
        registry.register(Box::new(utilization.clone()))?;
        registry.register(Box::new(borrowed_total.clone()))?;
        registry.register(Box::new(reverted_total.clone()))?;
        registry.register(Box::new(created_total.clone()))?;
        registry.register(Box::new(exhausted_total.clone()))?;
        registry.register(Box::new(invalid_total.clone()))?;

        for (name, metrics) in pools {
            let pool = &[name.as_str()];
            borrowed.with_label_values(pool).set(metrics.borrowed_items as i64);
            available.with_label_values(pool).set(metrics.available_items as i64);
            max_size.with_label_values(pool).set(metrics.max_size as i64);
            utilization.with_label_values(pool).set(metrics.utilization);
            borrowed_total.with_label_values(pool).inc_by(metrics.total_borrowed as u64);
            reverted_total.with_label_values(pool).inc_by(metrics.total_reverted as u64);
            created_total.with_label_values(pool).inc_by(metrics.total_created as u64);
            exhausted_total.with_label_values(pool).inc_by(metrics.exhausted_events as u64);
            invalid_total.with_label_values(pool).inc_by(metrics.invalid_reverts as u64);
        }

        let mut buffer = Vec::new();
        TextEncoder::new().encode(&registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|err| PoolError::MetricsExport(err.to_string()))
    }
}

/// Internal counters kept by each pool
#[derive(Debug, Default, Clone)]
pub(crate) struct MetricsTracker {
    total_borrowed: usize,
    total_reverted: usize,
    total_created: usize,
    exhausted_events: usize,
    invalid_reverts: usize,
}

impl MetricsTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_borrow(&mut self) {
        self.total_borrowed += 1;
    }

    pub fn record_revert(&mut self) {
        self.total_reverted += 1;
    }

    pub fn record_created(&mut self) {
        self.total_created += 1;
    }

    pub fn record_exhausted(&mut self) {
        self.exhausted_events += 1;
    }

    pub fn record_invalid_revert(&mut self) {
        self.invalid_reverts += 1;
    }

    pub fn get_metrics(&self, borrowed: usize, available: usize, max_size: usize) -> PoolMetrics {
        let utilization = if max_size > 0 {
            borrowed as f64 / max_size as f64
        } else {
            0.0
        };

        PoolMetrics {
            total_borrowed: self.total_borrowed,
            total_reverted: self.total_reverted,
            total_created: self.total_created,
            exhausted_events: self.exhausted_events,
            invalid_reverts: self.invalid_reverts,
            borrowed_items: borrowed,
            available_items: available,
            max_size,
            utilization,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracker_snapshot() {
        let mut tracker = MetricsTracker::new();
        tracker.record_created();
        tracker.record_borrow();
        tracker.record_exhausted();

        let metrics = tracker.get_metrics(1, 0, 4);
        assert_eq!(metrics.total_created, 1);
        assert_eq!(metrics.total_borrowed, 1);
        assert_eq!(metrics.exhausted_events, 1);
        assert_eq!(metrics.utilization, 0.25);

        let exported = metrics.export();
        assert_eq!(exported["utilization"], "0.25");
        assert_eq!(exported["max_size"], "4");
    }

    #[test]
    fn test_zero_max_size_utilization() {
        let metrics = MetricsTracker::new().get_metrics(0, 0, 0);
        assert_eq!(metrics.utilization, 0.0);
    }

    #[cfg(feature = "metrics")]
    #[test]
    fn test_prometheus_export_labels_each_pool() {
        let mut tracker = MetricsTracker::new();
        tracker.record_created();
        tracker.record_borrow();

        let pools = vec![
            ("bullet".to_string(), tracker.get_metrics(1, 0, 10)),
            ("spark".to_string(), MetricsTracker::new().get_metrics(0, 3, 10)),
        ];
        let output = MetricsExporter::export_prometheus(&pools, None).unwrap();

        assert!(output.contains("# TYPE prefab_pool_items_borrowed gauge"));
        assert!(output.contains("# TYPE prefab_pool_borrows_total counter"));
        assert!(output.contains("pool=\"bullet\""));
        assert!(output.contains("pool=\"spark\""));
    }
}
