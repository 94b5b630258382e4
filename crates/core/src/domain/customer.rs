use serde::{Deserialize, Serialize};

/// Contact fields copied verbatim from the submission form. The modification
/// flow never touches these; only a fresh submission can change them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerInfo {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub location: String,
}
