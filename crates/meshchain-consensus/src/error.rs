use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConsensusError {
    #[error("unknown validator {0}")]
    UnknownValidator(String),
    #[error("no active validator has positive weight")]
    NoEligibleValidator,
    #[error("insufficient approvals: {approvals}/{threshold}")]
    InsufficientApprovals { approvals: usize, threshold: usize },
}

pub type Result<T> = std::result::Result<T, ConsensusError>;
