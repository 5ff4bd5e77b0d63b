pub mod join_use_case;
pub mod ports;

pub use join_use_case::{DatasetReport, JoinUseCase, PipelineSummary};
