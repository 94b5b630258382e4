use thiserror::Error;

use crate::domain::quote::QuoteStatus;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("invalid quote transition from {from:?} to {to:?}")]
    InvalidQuoteTransition { from: QuoteStatus, to: QuoteStatus },
    #[error("domain invariant violation: {0}")]
    InvariantViolation(String),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("persistence failure: {0}")]
    Persistence(String),
    #[error("configuration failure: {0}")]
    Configuration(String),
}

#[cfg(test)]
mod tests {
    use super::{ApplicationError, DomainError};

    #[test]
    fn domain_errors_wrap_into_application_errors() {
        let error =
            ApplicationError::from(DomainError::InvariantViolation("empty quote id".to_owned()));
        assert!(matches!(error, ApplicationError::Domain(_)));
    }

    #[test]
    fn persistence_errors_render_their_cause() {
        let error = ApplicationError::Persistence("bucket write denied".to_owned());
        assert_eq!(error.to_string(), "persistence failure: bucket write denied");
    }
}
