pub mod category;
pub mod custom_field;
pub mod job_type;

pub use category::*;
pub use custom_field::*;
pub use job_type::*;
