//! Verifier calls and end-to-end proof scenarios.

pub mod config;
pub mod error;
pub mod harness;
pub mod verifier;

pub use config::{CircuitConfig, HarnessConfig};
pub use error::{ClientError, Result};
pub use harness::{Scenario, ScenarioHarness, ScenarioKind, ScenarioReport, ScenarioState};
pub use verifier::{OnchainDeployer, OnchainVerifier, Verifier, VerifierDeployer, VerifierSignature};
