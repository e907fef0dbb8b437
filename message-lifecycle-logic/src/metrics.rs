use lazy_static::lazy_static;
use prometheus::{IntCounterVec, register_int_counter_vec};

// Labels stay low-cardinality: event kind and message state only.
lazy_static! {
    /// Events handed to the consumer, per event kind.
    pub static ref EVENTS_CONSUMED_TOTAL: IntCounterVec = register_int_counter_vec!(
        "message_lifecycle_events_consumed_total",
        "events consumed by the lifecycle consumer",
        &["kind"],
    )
    .unwrap();

    /// Events that matched no known message and went to the pool.
    pub static ref EVENTS_BUFFERED_TOTAL: IntCounterVec = register_int_counter_vec!(
        "message_lifecycle_events_buffered_total",
        "events stored in the pending event pool",
        &["kind"],
    )
    .unwrap();

    pub static ref TRANSITIONS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "message_lifecycle_transitions_total",
        "message state transitions applied",
        &["state"],
    )
    .unwrap();
}
