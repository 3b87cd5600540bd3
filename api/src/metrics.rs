use once_cell::sync::Lazy;
use prometheus::{
    opts, Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Registry, TextEncoder,
};

macro_rules! counter_vec {
    ($name:expr, $help:expr, $labels:expr) => {
        Lazy::new(|| IntCounterVec::new(opts!($name, $help), $labels).unwrap())
    };
}
macro_rules! histogram_vec {
    ($name:expr, $help:expr, $labels:expr) => {
        Lazy::new(|| {
            HistogramVec::new(HistogramOpts::new($name, $help).buckets(LATENCY_BUCKETS.to_vec()), $labels)
                .unwrap()
        })
    };
}
macro_rules! counter {
    ($name:expr, $help:expr) => {
        Lazy::new(|| IntCounter::new($name, $help).unwrap())
    };
}

const LATENCY_BUCKETS: [f64; 12] = [
    0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
];

// ── HTTP ────────────────────────────────────────────────────────────────────
pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> =
    counter_vec!("http_requests_total", "Total HTTP requests", &["method", "path", "status"]);
pub static HTTP_REQUEST_DURATION: Lazy<HistogramVec> =
    histogram_vec!("http_request_duration_seconds", "HTTP request latency", &["method", "path"]);

// ── Storage ─────────────────────────────────────────────────────────────────
pub static DB_QUERY_DURATION: Lazy<HistogramVec> =
    histogram_vec!("db_query_duration_seconds", "Storage call latency", &["operation"]);
pub static DB_QUERY_ERRORS: Lazy<IntCounterVec> =
    counter_vec!("db_query_errors_total", "Failed storage calls", &["operation", "kind"]);

// ── Blogs ───────────────────────────────────────────────────────────────────
pub static BLOGS_CREATED: Lazy<IntCounter> = counter!("blogs_created_total", "Blogs created");
pub static BLOGS_DELETED: Lazy<IntCounter> = counter!("blogs_deleted_total", "Blogs deleted");

pub fn register_all(r: &Registry) -> prometheus::Result<()> {
    r.register(Box::new(HTTP_REQUESTS_TOTAL.clone()))?;
    r.register(Box::new(HTTP_REQUEST_DURATION.clone()))?;
    r.register(Box::new(DB_QUERY_DURATION.clone()))?;
    r.register(Box::new(DB_QUERY_ERRORS.clone()))?;
    r.register(Box::new(BLOGS_CREATED.clone()))?;
    r.register(Box::new(BLOGS_DELETED.clone()))?;
    Ok(())
}

pub fn gather_metrics(r: &Registry) -> String {
    let encoder = TextEncoder::new();
    let families = r.gather();
    let mut buf = Vec::new();
    encoder.encode(&families, &mut buf).unwrap_or_default();
    String::from_utf8(buf).unwrap_or_default()
}

pub fn observe_http(method: &str, path: &str, status: u16, duration_secs: f64) {
    HTTP_REQUESTS_TOTAL
        .with_label_values(&[method, path, &status.to_string()])
        .inc();
    HTTP_REQUEST_DURATION
        .with_label_values(&[method, path])
        .observe(duration_secs);
}

pub fn observe_storage(operation: &str, duration_secs: f64, error_kind: Option<&str>) {
    DB_QUERY_DURATION
        .with_label_values(&[operation])
        .observe(duration_secs);
    if let Some(kind) = error_kind {
        DB_QUERY_ERRORS.with_label_values(&[operation, kind]).inc();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_prefixes_every_family() {
        let registry = Registry::new_custom(Some("test".into()), None).unwrap();
        register_all(&registry).unwrap();
        observe_http("GET", "/v1/blogs", 200, 0.01);
        observe_storage("list", 0.002, None);
        BLOGS_CREATED.inc();

        let families = registry.gather();
        assert!(!families.is_empty());
        for fam in &families {
            assert!(
                fam.get_name().starts_with("test_"),
                "metric {} missing prefix",
                fam.get_name()
            );
        }
    }

    #[test]
    fn test_gather_renders_text_format() {
        let registry = Registry::new_custom(Some("render".into()), None).unwrap();
        register_all(&registry).unwrap();
        observe_storage("get", 0.001, Some("not_found"));

        let text = gather_metrics(&registry);
        assert!(text.contains("render_db_query_errors_total"));
        assert!(text.contains("operation=\"get\""));
    }
}
