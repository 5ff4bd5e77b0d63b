pub mod csv_sink;
pub mod csv_source;
pub mod tracing_reporter;

pub use csv_sink::CsvDatasetSink;
pub use csv_source::CsvTableSource;
pub use tracing_reporter::TracingReporter;
