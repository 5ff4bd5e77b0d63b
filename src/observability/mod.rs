// Observability: metrics for the batch run

pub mod metrics;

pub use metrics::{init, write_snapshot};
