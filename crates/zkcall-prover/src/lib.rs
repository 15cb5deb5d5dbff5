//! Proof producers: turn named inputs plus circuit artifacts into a proof and
//! its public signals.

pub mod arkworks;
pub mod error;
pub mod producer;
pub mod snarkjs;

pub use arkworks::ArkworksProducer;
pub use error::{ProverError, Result};
pub use producer::{CircuitArtifacts, ProducerManager, ProofOutput, ProofProducer};
pub use snarkjs::SnarkjsProducer;
