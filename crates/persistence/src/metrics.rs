//! Store metrics collection.
//!
//! Provides functions for recording store-related metrics.

use metrics::{gauge, histogram};
use sqlx::PgPool;
use std::time::Instant;

/// Record the duration of one store operation on one collection.
pub fn record_operation_duration(operation: &str, collection: &str, duration_secs: f64) {
    histogram!(
        "store_operation_duration_seconds",
        "operation" => operation.to_string(),
        "collection" => collection.to_string()
    )
    .record(duration_secs);
}

/// Record database connection pool metrics.
///
/// Call this function periodically to track pool health.
pub fn record_pool_metrics(pool: &PgPool) {
    let size = pool.size() as usize;
    let idle = pool.num_idle();
    let active = size.saturating_sub(idle);

    gauge!("database_connections_active").set(active as f64);
    gauge!("database_connections_idle").set(idle as f64);
    gauge!("database_connections_total").set(size as f64);
}

/// A helper to time store operations and record metrics.
///
/// Usage:
/// ```ignore
/// let timer = QueryTimer::new("find", "devices");
/// let result = sqlx::query_scalar::<_, Value>(...).fetch_all(&mut *conn).await;
/// timer.record();
/// result
/// ```
pub struct QueryTimer {
    operation: &'static str,
    collection: String,
    start: Instant,
}

impl QueryTimer {
    /// Create a new timer for an operation on a collection.
    pub fn new(operation: &'static str, collection: impl Into<String>) -> Self {
        Self {
            operation,
            collection: collection.into(),
            start: Instant::now(),
        }
    }

    /// Record the elapsed duration to metrics.
    pub fn record(self) {
        let duration = self.start.elapsed().as_secs_f64();
        record_operation_duration(self.operation, &self.collection, duration);
    }
}
