use serde::Serialize;

use super::error::InputError;

/// Flat federal marginal income-tax rate applied to pre-tax contributions.
pub const MARGINAL_TAX_RATE: f64 = 0.22;
/// Employer share of FICA payroll tax.
pub const FICA_RATE: f64 = 0.0765;

/// Upper bound for a rate-based plan's contribution rate.
pub const MAX_CONTRIBUTION_RATE: f64 = 0.15;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlanKind {
    RateBased,
    FixedAmount,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", tag = "type", content = "value")]
pub enum Contribution {
    /// Fraction of income, 401(k)/HSA style.
    Rate(f64),
    /// Dollars per participant, FSA style.
    Amount(f64),
}

impl Contribution {
    pub fn kind(self) -> PlanKind {
        match self {
            Contribution::Rate(_) => PlanKind::RateBased,
            Contribution::Amount(_) => PlanKind::FixedAmount,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanInputs {
    pub employee_count: u32,
    pub avg_income: f64,
    pub participation_rate: f64,
    pub contribution: Contribution,
}

impl PlanInputs {
    /// Validated constructor used by the CLI and HTTP API.
    pub fn new(
        employee_count: u32,
        avg_income: f64,
        participation_rate: f64,
        contribution: Contribution,
    ) -> Result<Self, InputError> {
        if !avg_income.is_finite() || avg_income < 0.0 {
            return Err(InputError::AvgIncome(avg_income));
        }
        if !(0.0..=1.0).contains(&participation_rate) {
            return Err(InputError::ParticipationRate(participation_rate));
        }
        match contribution {
            Contribution::Rate(rate) => {
                if !(0.0..=MAX_CONTRIBUTION_RATE).contains(&rate) {
                    return Err(InputError::ContributionRate(rate));
                }
            }
            Contribution::Amount(amount) => {
                if !amount.is_finite() || amount < 0.0 {
                    return Err(InputError::ContributionAmount(amount));
                }
            }
        }

        Ok(Self {
            employee_count,
            avg_income,
            participation_rate,
            contribution,
        })
    }

    pub fn kind(&self) -> PlanKind {
        self.contribution.kind()
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavingsResult {
    pub participants: u32,
    pub total_contributions: f64,
    pub employee_tax_savings: f64,
    pub employer_tax_savings: f64,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SweepPoint {
    pub x: f64,
    pub employee_savings: f64,
    pub employer_savings: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_accepts_widget_ranges() {
        let inputs = PlanInputs::new(100, 50_000.0, 0.5, Contribution::Rate(0.05))
            .expect("valid rate plan");
        assert_eq!(inputs.kind(), PlanKind::RateBased);

        let inputs = PlanInputs::new(0, 0.0, 1.0, Contribution::Amount(0.0))
            .expect("valid fixed plan");
        assert_eq!(inputs.kind(), PlanKind::FixedAmount);

        PlanInputs::new(10, 1.0, 0.0, Contribution::Rate(MAX_CONTRIBUTION_RATE))
            .expect("rate upper bound is inclusive");
    }

    #[test]
    fn new_rejects_out_of_range_fractions() {
        let err = PlanInputs::new(100, 50_000.0, 1.01, Contribution::Rate(0.05))
            .expect_err("participation above 1");
        assert_eq!(err, InputError::ParticipationRate(1.01));

        let err = PlanInputs::new(100, 50_000.0, 0.5, Contribution::Rate(0.2))
            .expect_err("rate above 15%");
        assert_eq!(err, InputError::ContributionRate(0.2));

        let err = PlanInputs::new(100, 50_000.0, 0.5, Contribution::Rate(-0.01))
            .expect_err("negative rate");
        assert!(err.to_string().contains("contribution rate"));
    }

    #[test]
    fn new_rejects_negative_or_non_finite_amounts() {
        assert!(matches!(
            PlanInputs::new(100, -1.0, 0.5, Contribution::Amount(3_000.0)),
            Err(InputError::AvgIncome(_))
        ));
        assert!(matches!(
            PlanInputs::new(100, f64::INFINITY, 0.5, Contribution::Amount(3_000.0)),
            Err(InputError::AvgIncome(_))
        ));
        assert!(matches!(
            PlanInputs::new(100, 50_000.0, 0.5, Contribution::Amount(-100.0)),
            Err(InputError::ContributionAmount(_))
        ));
        assert!(matches!(
            PlanInputs::new(100, 50_000.0, f64::NAN, Contribution::Amount(100.0)),
            Err(InputError::ParticipationRate(_))
        ));
    }

    #[test]
    fn contribution_serializes_with_type_tag() {
        let json = serde_json::to_string(&Contribution::Amount(3_000.0)).expect("serialize");
        assert_eq!(json, r#"{"type":"amount","value":3000.0}"#);
    }
}
