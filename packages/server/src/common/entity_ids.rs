//! Typed ID definitions for all domain entities.
//!
//! ```rust
//! use server_core::common::{EmployerId, JobId};
//!
//! let employer_id = EmployerId::new();
//! let job_id = JobId::new();
//!
//! // This would be a compile error:
//! // let wrong: JobId = employer_id;
//! ```

pub use super::id::Id;

// ============================================================================
// Entity marker types
// ============================================================================

pub struct Category;
pub struct JobType;
pub struct CustomField;
pub struct Discount;
pub struct PaymentMethod;
pub struct Product;
pub struct Order;
pub struct Employer;
pub struct JobSeeker;
pub struct Resume;

/// Marker type for job listings.
pub struct Job;

// ============================================================================
// Type aliases - the primary API
// ============================================================================

pub type CategoryId = Id<Category>;
pub type JobTypeId = Id<JobType>;
pub type CustomFieldId = Id<CustomField>;
pub type DiscountId = Id<Discount>;
pub type PaymentMethodId = Id<PaymentMethod>;
pub type ProductId = Id<Product>;
pub type OrderId = Id<Order>;
pub type EmployerId = Id<Employer>;
pub type JobSeekerId = Id<JobSeeker>;
pub type ResumeId = Id<Resume>;
pub type JobId = Id<Job>;
