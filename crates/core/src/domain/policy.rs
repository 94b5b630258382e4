use std::collections::BTreeMap;
use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Line of business a quote covers. Unknown labels are preserved in `Other`
/// so records written by a newer release still round-trip.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum InsuranceType {
    WorkersComp,
    TempStaffing,
    Trucking,
    Other(String),
}

impl InsuranceType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::WorkersComp => "workers-comp",
            Self::TempStaffing => "temp-staffing",
            Self::Trucking => "trucking",
            Self::Other(label) => label.as_str(),
        }
    }

    /// Parsing never fails: anything unrecognized becomes `Other`.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "workers-comp" | "workers_comp" | "workers comp" | "workers' comp" => Self::WorkersComp,
            "temp-staffing" | "temp_staffing" | "temp staffing" => Self::TempStaffing,
            "trucking" => Self::Trucking,
            _ => Self::Other(value.trim().to_string()),
        }
    }
}

impl fmt::Display for InsuranceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for InsuranceType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for InsuranceType {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse(&raw))
    }
}

/// Per-type policy inputs. One struct variant per supported line, plus an
/// open bag for types this build does not rate.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum PolicyDetails {
    WorkersComp {
        number_of_employees: u32,
        annual_payroll: Decimal,
        safety_training: bool,
    },
    TempStaffing {
        number_of_placements: u32,
        annual_payroll: Decimal,
        background_checks: bool,
    },
    Trucking {
        fleet_size: u32,
        average_annual_miles: u32,
        drivers: u32,
        safety_program: bool,
    },
    Unknown {
        #[serde(flatten)]
        fields: BTreeMap<String, serde_json::Value>,
    },
}

impl PolicyDetails {
    pub fn unknown() -> Self {
        Self::Unknown { fields: BTreeMap::new() }
    }
}

#[cfg(test)]
mod tests {
    use super::{InsuranceType, PolicyDetails};

    #[test]
    fn insurance_type_parse_accepts_display_labels() {
        assert_eq!(InsuranceType::parse("Workers' Comp"), InsuranceType::WorkersComp);
        assert_eq!(InsuranceType::parse("temp_staffing"), InsuranceType::TempStaffing);
        assert_eq!(InsuranceType::parse("Trucking"), InsuranceType::Trucking);
    }

    #[test]
    fn unknown_insurance_type_round_trips_through_other() {
        let parsed = InsuranceType::parse("cyber-liability");
        assert_eq!(parsed, InsuranceType::Other("cyber-liability".to_string()));

        let json = serde_json::to_string(&parsed).expect("serialize");
        let back: InsuranceType = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, parsed);
    }

    #[test]
    fn policy_details_are_tagged_by_kind() {
        let details = PolicyDetails::Trucking {
            fleet_size: 4,
            average_annual_miles: 80_000,
            drivers: 6,
            safety_program: true,
        };

        let json = serde_json::to_value(&details).expect("serialize");
        assert_eq!(json["kind"], "trucking");
        assert_eq!(json["fleet_size"], 4);
    }

    #[test]
    fn unknown_details_keep_unmodeled_fields() {
        let json = r#"{"kind":"unknown","coverage_tier":"gold","seats":12}"#;
        let details: PolicyDetails = serde_json::from_str(json).expect("deserialize");

        match details {
            PolicyDetails::Unknown { fields } => {
                assert_eq!(fields["coverage_tier"], "gold");
                assert_eq!(fields["seats"], 12);
            }
            other => panic!("expected unknown variant, got {other:?}"),
        }
    }
}
