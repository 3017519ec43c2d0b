pub mod employer;
pub mod job_seeker;
pub mod resume;

pub use employer::*;
pub use job_seeker::*;
pub use resume::*;
