pub mod slug;
pub mod validation;

pub use slug::*;
pub use validation::*;
