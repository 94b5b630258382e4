//! Premium rating.
//!
//! Pure arithmetic over the submitted policy details: no I/O, no clock, no
//! randomness, so identical inputs always produce identical premiums. Each
//! supported line of business selects a base rate and a short schedule of
//! named factors; the factor impacts sum into a single multiplier applied to
//! the base rate. The sum is deliberately not clamped, so a schedule summing
//! below -1 yields a negative premium.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::domain::policy::{InsuranceType, PolicyDetails};

/// One named adjustment. `impact` is a signed fraction of the base rate.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PremiumFactor {
    pub name: String,
    pub impact: Decimal,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Premium {
    pub monthly_premium: Decimal,
    pub annual_premium: Decimal,
    pub factors: Vec<PremiumFactor>,
}

const DEFAULT_BASE_RATE: Decimal = Decimal::from_parts(1000, 0, 0, false, 0);

/// Rate a quote. Lines this build does not model fall back to the default
/// base rate with an empty factor schedule; this never errors.
pub fn calculate_premium(insurance_type: &InsuranceType, details: &PolicyDetails) -> Premium {
    let (base_rate, factors) = match (insurance_type, details) {
        (
            InsuranceType::WorkersComp,
            PolicyDetails::WorkersComp { number_of_employees, annual_payroll, safety_training },
        ) => {
            let base = annual_payroll / Decimal::ONE_HUNDRED * Decimal::new(15, 1);
            let factors = vec![
                proportional("employee_count", *number_of_employees, Decimal::new(1, 1)),
                gated("safety_training", *safety_training, Decimal::new(-15, 2)),
            ];
            (base, factors)
        }
        (
            InsuranceType::TempStaffing,
            PolicyDetails::TempStaffing { number_of_placements, annual_payroll, background_checks },
        ) => {
            let base = annual_payroll / Decimal::ONE_HUNDRED * Decimal::new(12, 1);
            let factors = vec![
                proportional("placement_volume", *number_of_placements, Decimal::new(5, 2)),
                gated("background_checks", *background_checks, Decimal::new(-10, 2)),
            ];
            (base, factors)
        }
        (
            InsuranceType::Trucking,
            PolicyDetails::Trucking { fleet_size, average_annual_miles, drivers, safety_program },
        ) => {
            let exposure = Decimal::from(*fleet_size) * Decimal::from(*average_annual_miles);
            let base = exposure * Decimal::new(5, 2);
            let factors = vec![
                proportional("driver_count", *drivers, Decimal::new(5, 2)),
                gated("safety_program", *safety_program, Decimal::new(-15, 2)),
            ];
            (base, factors)
        }
        // Unknown lines and type/details mismatches rate at the default.
        _ => (DEFAULT_BASE_RATE, Vec::new()),
    };

    let total_impact: Decimal = factors.iter().map(|factor| factor.impact).sum();
    let annual_premium = round_money(base_rate * (Decimal::ONE + total_impact));
    let monthly_premium = round_money(annual_premium / Decimal::from(12));

    Premium { monthly_premium, annual_premium, factors }
}

fn proportional(name: &str, count: u32, per_unit: Decimal) -> PremiumFactor {
    PremiumFactor { name: name.to_string(), impact: Decimal::from(count) * per_unit }
}

fn gated(name: &str, enabled: bool, impact: Decimal) -> PremiumFactor {
    PremiumFactor { name: name.to_string(), impact: if enabled { impact } else { Decimal::ZERO } }
}

fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use crate::domain::policy::{InsuranceType, PolicyDetails};

    use super::calculate_premium;

    fn workers_comp(safety_training: bool) -> PolicyDetails {
        PolicyDetails::WorkersComp {
            number_of_employees: 10,
            annual_payroll: Decimal::from(200_000),
            safety_training,
        }
    }

    #[test]
    fn workers_comp_reference_rate() {
        let premium = calculate_premium(&InsuranceType::WorkersComp, &workers_comp(true));

        // base (200000 / 100) * 1.5 = 3000; impacts 1.0 - 0.15 = 0.85
        assert_eq!(premium.annual_premium, Decimal::new(555000, 2));
        assert_eq!(premium.monthly_premium, Decimal::new(46250, 2));
        assert_eq!(premium.factors.len(), 2);
        assert_eq!(premium.factors[0].name, "employee_count");
        assert_eq!(premium.factors[0].impact, Decimal::new(10, 1));
        assert_eq!(premium.factors[1].impact, Decimal::new(-15, 2));
    }

    #[test]
    fn disabled_gate_contributes_zero_not_absence() {
        let premium = calculate_premium(&InsuranceType::WorkersComp, &workers_comp(false));

        assert_eq!(premium.factors.len(), 2);
        assert_eq!(premium.factors[1].impact, Decimal::ZERO);
        assert_eq!(premium.annual_premium, Decimal::new(600000, 2));
    }

    #[test]
    fn rating_is_deterministic() {
        let first = calculate_premium(&InsuranceType::Trucking, &trucking());
        let second = calculate_premium(&InsuranceType::Trucking, &trucking());
        assert_eq!(first, second);
    }

    fn trucking() -> PolicyDetails {
        PolicyDetails::Trucking {
            fleet_size: 4,
            average_annual_miles: 80_000,
            drivers: 6,
            safety_program: true,
        }
    }

    #[test]
    fn trucking_base_rate_scales_with_fleet_exposure() {
        let premium = calculate_premium(&InsuranceType::Trucking, &trucking());

        // base 4 * 80000 * 0.05 = 16000; impacts 0.30 - 0.15 = 0.15
        assert_eq!(premium.annual_premium, Decimal::new(18400_00, 2));
        assert_eq!(premium.monthly_premium, Decimal::new(1533_33, 2));
    }

    #[test]
    fn temp_staffing_schedule() {
        let details = PolicyDetails::TempStaffing {
            number_of_placements: 8,
            annual_payroll: Decimal::from(150_000),
            background_checks: true,
        };
        let premium = calculate_premium(&InsuranceType::TempStaffing, &details);

        // base 1500 * 1.2 = 1800; impacts 0.40 - 0.10 = 0.30
        assert_eq!(premium.annual_premium, Decimal::new(2340_00, 2));
        assert_eq!(premium.monthly_premium, Decimal::new(195_00, 2));
    }

    #[test]
    fn unknown_line_falls_back_to_default_base_rate() {
        let premium = calculate_premium(
            &InsuranceType::Other("cyber-liability".to_string()),
            &PolicyDetails::unknown(),
        );

        assert_eq!(premium.annual_premium, Decimal::new(1000_00, 2));
        assert_eq!(premium.monthly_premium, Decimal::new(83_33, 2));
        assert!(premium.factors.is_empty());
    }

    #[test]
    fn monthly_is_the_rounded_twelfth_of_annual() {
        let premium = calculate_premium(&InsuranceType::Trucking, &trucking());
        let expected = (premium.annual_premium / Decimal::from(12))
            .round_dp_with_strategy(2, rust_decimal::RoundingStrategy::MidpointAwayFromZero);
        assert_eq!(premium.monthly_premium, expected);
    }

    #[test]
    fn zero_count_schedule_still_applies_the_gate() {
        let details = PolicyDetails::WorkersComp {
            number_of_employees: 0,
            annual_payroll: Decimal::from(100),
            safety_training: true,
        };
        let premium = calculate_premium(&InsuranceType::WorkersComp, &details);

        // base 1.5, multiplier 1 - 0.15 = 0.85
        assert_eq!(premium.annual_premium, Decimal::new(128, 2));
    }

    #[test]
    fn impact_sum_below_minus_one_goes_negative_unclamped() {
        let base = Decimal::from(1000);
        let multiplier = Decimal::ONE + Decimal::new(-130, 2);
        let annual = super::round_money(base * multiplier);

        assert_eq!(annual, Decimal::new(-300_00, 2));
        assert!(annual < Decimal::ZERO);
    }
}
