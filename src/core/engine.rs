use std::iter::FusedIterator;

use tracing::debug;

use super::types::{
    Contribution, FICA_RATE, MARGINAL_TAX_RATE, MAX_CONTRIBUTION_RATE, PlanInputs, PlanKind,
    SavingsResult, SweepPoint,
};

/// Number of evenly spaced contribution rates in a rate-based sweep.
pub const RATE_SWEEP_POINTS: usize = 100;
/// Step between contribution amounts in a fixed-amount sweep.
pub const AMOUNT_SWEEP_STEP: f64 = 100.0;
/// Exclusive upper bound of a fixed-amount sweep.
pub const AMOUNT_SWEEP_END: f64 = 4_000.0;

const AMOUNT_SWEEP_POINTS: usize = 40;

/// Enrolled headcount, truncated to whole employees.
pub fn participants(inputs: &PlanInputs) -> u32 {
    (f64::from(inputs.employee_count) * inputs.participation_rate).floor() as u32
}

fn reduced_taxable_income(avg_income: f64, rate: f64) -> f64 {
    avg_income - avg_income * rate
}

pub fn compute_result(inputs: &PlanInputs) -> SavingsResult {
    let participants = participants(inputs);
    let headcount = f64::from(participants);

    let result = match inputs.contribution {
        Contribution::Rate(rate) => {
            // Subtract-then-scale; must stay bit-identical to the published calculator.
            let reduced = reduced_taxable_income(inputs.avg_income, rate);
            SavingsResult {
                participants,
                total_contributions: headcount * inputs.avg_income * rate,
                employee_tax_savings: headcount
                    * (inputs.avg_income * MARGINAL_TAX_RATE - reduced * MARGINAL_TAX_RATE),
                employer_tax_savings: headcount
                    * (inputs.avg_income * FICA_RATE - reduced * FICA_RATE),
            }
        }
        Contribution::Amount(amount) => {
            debug!(
                reduced_taxable_income = inputs.avg_income - amount,
                "fixed-amount plan"
            );
            SavingsResult {
                participants,
                total_contributions: headcount * amount,
                employee_tax_savings: headcount * amount * MARGINAL_TAX_RATE,
                employer_tax_savings: headcount * amount * FICA_RATE,
            }
        }
    };

    debug!(
        employees = inputs.employee_count,
        participants,
        total_contributions = result.total_contributions,
        employee_tax_savings = result.employee_tax_savings,
        employer_tax_savings = result.employer_tax_savings,
        "computed plan savings"
    );
    result
}

pub fn generate_sweep(inputs: &PlanInputs) -> Sweep {
    let kind = inputs.kind();
    Sweep {
        kind,
        headcount: f64::from(participants(inputs)),
        avg_income: inputs.avg_income,
        index: 0,
        len: match kind {
            PlanKind::RateBased => RATE_SWEEP_POINTS,
            PlanKind::FixedAmount => AMOUNT_SWEEP_POINTS,
        },
    }
}

/// Savings curve over the plan's contribution variable, with the
/// participant count fixed at the value derived from the inputs.
///
/// Cloning yields an independent cursor, so a sweep can be replayed.
#[derive(Clone, Debug)]
pub struct Sweep {
    kind: PlanKind,
    headcount: f64,
    avg_income: f64,
    index: usize,
    len: usize,
}

impl Sweep {
    pub fn kind(&self) -> PlanKind {
        self.kind
    }

    fn x_at(&self, index: usize) -> f64 {
        match self.kind {
            PlanKind::RateBased => {
                if index + 1 == self.len {
                    MAX_CONTRIBUTION_RATE
                } else {
                    index as f64 * (MAX_CONTRIBUTION_RATE / (self.len - 1) as f64)
                }
            }
            PlanKind::FixedAmount => index as f64 * AMOUNT_SWEEP_STEP,
        }
    }

    fn point_at(&self, index: usize) -> SweepPoint {
        let x = self.x_at(index);
        match self.kind {
            PlanKind::RateBased => SweepPoint {
                x,
                employee_savings: self.headcount * self.avg_income * MARGINAL_TAX_RATE * x,
                employer_savings: self.headcount * self.avg_income * FICA_RATE * x,
            },
            PlanKind::FixedAmount => SweepPoint {
                x,
                employee_savings: self.headcount * x * MARGINAL_TAX_RATE,
                employer_savings: self.headcount * x * FICA_RATE,
            },
        }
    }
}

impl Iterator for Sweep {
    type Item = SweepPoint;

    fn next(&mut self) -> Option<SweepPoint> {
        if self.index >= self.len {
            return None;
        }
        let point = self.point_at(self.index);
        self.index += 1;
        Some(point)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.len - self.index;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Sweep {}

impl FusedIterator for Sweep {}
