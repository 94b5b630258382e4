pub mod manager;
mod mirror;
pub mod submission;

pub use manager::{LifecycleError, QuoteLifecycleManager};
pub use submission::SubmissionForm;
