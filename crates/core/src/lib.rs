pub mod config;
pub mod domain;
pub mod errors;
pub mod rating;

pub use domain::customer::CustomerInfo;
pub use domain::policy::{InsuranceType, PolicyDetails};
pub use domain::quote::{ModificationRecord, Quote, QuoteId, QuoteStatus};
pub use errors::{ApplicationError, DomainError};
pub use rating::{calculate_premium, Premium, PremiumFactor};
