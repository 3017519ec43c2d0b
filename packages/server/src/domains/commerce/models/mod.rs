pub mod discount;
pub mod order;
pub mod payment_method;
pub mod product;

pub use discount::*;
pub use order::*;
pub use payment_method::*;
pub use product::*;
