use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::customer::CustomerInfo;
use crate::domain::policy::{InsuranceType, PolicyDetails};
use crate::errors::DomainError;
use crate::rating::Premium;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QuoteId(pub String);

impl QuoteId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl std::fmt::Display for QuoteId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuoteStatus {
    New,
    Modified,
    Accepted,
}

/// Pre-modification snapshot. Entries are appended by `modify_quote` and
/// never rewritten afterwards.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ModificationRecord {
    pub timestamp: DateTime<Utc>,
    pub notes: Option<String>,
    pub premium: Premium,
    pub policy_details: PolicyDetails,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub id: QuoteId,
    pub created_at: DateTime<Utc>,
    pub insurance_type: InsuranceType,
    pub customer_info: CustomerInfo,
    pub policy_details: PolicyDetails,
    pub premium: Premium,
    pub status: QuoteStatus,
    pub modification_history: Vec<ModificationRecord>,
}

impl Quote {
    /// `New` is set only at creation; every other move is allowed, including
    /// re-opening an accepted quote for modification.
    pub fn can_transition_to(&self, next: QuoteStatus) -> bool {
        !matches!(next, QuoteStatus::New)
    }

    pub fn transition_to(&mut self, next: QuoteStatus) -> Result<(), DomainError> {
        if self.can_transition_to(next) {
            self.status = next;
            return Ok(());
        }

        Err(DomainError::InvalidQuoteTransition { from: self.status, to: next })
    }

    /// Snapshot of the current premium and details, taken immediately before
    /// a modification replaces them.
    pub fn snapshot(&self, notes: Option<String>) -> ModificationRecord {
        ModificationRecord {
            timestamp: Utc::now(),
            notes,
            premium: self.premium.clone(),
            policy_details: self.policy_details.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rust_decimal::Decimal;

    use crate::domain::customer::CustomerInfo;
    use crate::domain::policy::{InsuranceType, PolicyDetails};
    use crate::rating::Premium;

    use super::{Quote, QuoteId, QuoteStatus};

    fn quote(status: QuoteStatus) -> Quote {
        Quote {
            id: QuoteId("q-1".to_string()),
            created_at: Utc::now(),
            insurance_type: InsuranceType::WorkersComp,
            customer_info: CustomerInfo {
                name: "Acme Staffing".to_string(),
                email: "ops@acme.example".to_string(),
                phone: "555-0100".to_string(),
                location: "Austin, TX".to_string(),
            },
            policy_details: PolicyDetails::WorkersComp {
                number_of_employees: 10,
                annual_payroll: Decimal::from(200_000),
                safety_training: true,
            },
            premium: Premium {
                monthly_premium: Decimal::new(46250, 2),
                annual_premium: Decimal::new(555000, 2),
                factors: vec![],
            },
            status,
            modification_history: vec![],
        }
    }

    #[test]
    fn new_quote_can_be_modified_then_accepted() {
        let mut quote = quote(QuoteStatus::New);
        quote.transition_to(QuoteStatus::Modified).expect("new -> modified");
        quote.transition_to(QuoteStatus::Accepted).expect("modified -> accepted");
        assert_eq!(quote.status, QuoteStatus::Accepted);
    }

    #[test]
    fn accepted_quote_reopens_as_modified() {
        let mut quote = quote(QuoteStatus::Accepted);
        quote.transition_to(QuoteStatus::Modified).expect("accepted -> modified");
        assert_eq!(quote.status, QuoteStatus::Modified);
    }

    #[test]
    fn no_transition_back_to_new() {
        let mut quote = quote(QuoteStatus::Modified);
        let error = quote.transition_to(QuoteStatus::New).expect_err("modified -> new");
        assert!(matches!(error, crate::errors::DomainError::InvalidQuoteTransition { .. }));
        assert_eq!(quote.status, QuoteStatus::Modified);
    }

    #[test]
    fn snapshot_captures_current_premium_and_details() {
        let quote = quote(QuoteStatus::New);
        let record = quote.snapshot(Some("before renewal tweak".to_string()));

        assert_eq!(record.premium, quote.premium);
        assert_eq!(record.policy_details, quote.policy_details);
        assert_eq!(record.notes.as_deref(), Some("before renewal tweak"));
    }
}
