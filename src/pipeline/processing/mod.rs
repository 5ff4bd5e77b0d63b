// Pipeline processing: pure table transformations, one module per stage

pub mod aggregate;
pub mod duplicates;
pub mod join;
pub mod normalize;
pub mod partition;

pub use aggregate::count_events_per_user;
pub use duplicates::{find_duplicates, DuplicatePolicy};
pub use join::left_join;
pub use partition::{partition, Partitioned};
