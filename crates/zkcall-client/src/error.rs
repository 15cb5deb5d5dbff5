use std::time::Duration;
use thiserror::Error;
use zkcall_primitives::PrimitivesError;
use zkcall_prover::ProverError;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Config error: {0}")]
    ConfigError(String),
    #[error("Failed to deploy verifier: {0}")]
    DeploymentError(String),
    #[error("Verifier arguments do not fit the call signature: {0}")]
    ArgumentEncodingError(String),
    #[error("Verifier call failed: {0}")]
    VerifierCallError(String),
    #[error("Failed to decode verifier result: {0}")]
    ResultDecodingError(String),
    #[error("Scenario assertion failed: {0}")]
    AssertionFailed(String),
    #[error("Scenario timed out after {0:?}")]
    Timeout(Duration),
    #[error("Primitives error: {0}")]
    PrimitivesError(#[from] PrimitivesError),
    #[error("Prover error: {0}")]
    ProverError(#[from] ProverError),
}

pub type Result<T> = core::result::Result<T, ClientError>;
