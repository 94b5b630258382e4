use serde::{Deserialize, Serialize};

use coverquote_core::domain::customer::CustomerInfo;
use coverquote_core::domain::policy::PolicyDetails;

/// Validated form payload. Field validation happens upstream in the form
/// layer; this type trusts its contents.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SubmissionForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    pub policy_details: PolicyDetails,
}

impl SubmissionForm {
    /// The contact subset that gets denormalized onto the quote.
    pub fn customer_info(&self) -> CustomerInfo {
        CustomerInfo {
            name: self.name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            location: self.location.clone(),
        }
    }
}
