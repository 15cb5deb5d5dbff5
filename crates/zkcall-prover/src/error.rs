use thiserror::Error;
use zkcall_primitives::PrimitivesError;

#[derive(Debug, Error)]
pub enum ProverError {
    #[error("Inputs do not satisfy the circuit: {0}")]
    WitnessError(String),
    #[error("Unusable circuit artifact: {0}")]
    ArtifactError(String),
    #[error("Failed to execute prover: {0}")]
    ExecutionFailed(String),
    #[error("Failed to read prover output: {0}")]
    OutputError(String),
    #[error("Scheme not supported by this prover: {0}")]
    UnsupportedScheme(String),
    #[error("Primitives error: {0}")]
    PrimitivesError(#[from] PrimitivesError),
}

pub type Result<T> = core::result::Result<T, ProverError>;
