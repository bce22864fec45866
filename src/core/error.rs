use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum InputError {
    #[error("average income must be a finite amount >= 0, got {0}")]
    AvgIncome(f64),
    #[error("participation rate must be between 0 and 1, got {0}")]
    ParticipationRate(f64),
    #[error("contribution rate must be between 0 and 0.15, got {0}")]
    ContributionRate(f64),
    #[error("contribution amount must be a finite amount >= 0, got {0}")]
    ContributionAmount(f64),
}
