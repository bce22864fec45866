mod engine;
mod error;
mod types;

pub use engine::{
    AMOUNT_SWEEP_END, AMOUNT_SWEEP_STEP, RATE_SWEEP_POINTS, Sweep, compute_result,
    generate_sweep, participants,
};
pub use error::InputError;
pub use types::{
    Contribution, FICA_RATE, MARGINAL_TAX_RATE, MAX_CONTRIBUTION_RATE, PlanInputs, PlanKind,
    SavingsResult, SweepPoint,
};
