use once_cell::sync::Lazy;
use prometheus::{register_int_counter, register_int_counter_vec, Encoder, IntCounter, IntCounterVec, TextEncoder};

// Prometheus metrics (default registry)
pub static RECORDS_CREATED_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "remote_storage_retrieval_records_created_total",
        "Retrieval queue records created, by source",
        &["source"]
    )
    .expect("register records_created_total")
});

pub static RECORDS_RETRIEVED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "remote_storage_retrieval_records_retrieved_total",
        "Retrieval queue records marked as retrieved"
    )
    .expect("register records_retrieved_total")
});

pub static MOVED_EVENTS_IGNORED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "remote_storage_moved_events_ignored_total",
        "Item moved events that did not produce a record"
    )
    .expect("register moved_events_ignored_total")
});

pub static RETURNS_PROCESSED_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "remote_storage_returns_processed_total",
        "Returned items checked in, by whether a hold or recall was waiting",
        &["hold_or_recall"]
    )
    .expect("register returns_processed_total")
});

pub const SOURCE_ITEM_MOVED: &str = "item_moved";
pub const SOURCE_RETURN: &str = "return";

pub fn encode_metrics() -> (axum::http::StatusCode, String) {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        return (
            axum::http::StatusCode::INTERNAL_SERVER_ERROR,
            format!("metrics encode error: {e}"),
        );
    }
    (
        axum::http::StatusCode::OK,
        String::from_utf8(buffer).unwrap_or_default(),
    )
}
