pub mod feed_job;
pub mod job;

pub use feed_job::*;
pub use job::*;
