use crate::error::{ProverError, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use zkcall_primitives::normalize::normalize_json;
use zkcall_primitives::{formatter_for, CanonicalValue, NamedInputSet, ProvingScheme};

/// Compiled witness generator and finalized proving key for one circuit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CircuitArtifacts {
    pub wasm: PathBuf,
    pub zkey: PathBuf,
}

impl CircuitArtifacts {
    pub fn new(wasm: impl Into<PathBuf>, zkey: impl Into<PathBuf>) -> Self {
        Self {
            wasm: wasm.into(),
            zkey: zkey.into(),
        }
    }

    /// Fails with an artifact error if either file cannot be opened.
    pub fn check_readable(&self) -> Result<()> {
        for path in [&self.wasm, &self.zkey] {
            check_file(path)?;
        }
        Ok(())
    }
}

fn check_file(path: &Path) -> Result<()> {
    std::fs::File::open(path)
        .map(|_| ())
        .map_err(|e| ProverError::ArtifactError(format!("{}: {e}", path.display())))
}

/// Raw prover output, with numbers still in their textual form.
#[derive(Clone, Debug, PartialEq)]
pub struct ProofOutput {
    pub proof: Value,
    pub public_signals: Value,
}

impl ProofOutput {
    pub fn normalized(&self) -> (CanonicalValue, CanonicalValue) {
        (
            normalize_json(&self.proof),
            normalize_json(&self.public_signals),
        )
    }
}

/// Generates a proof for one scheme.
///
/// A call blocks its task until proving finishes or fails and is never retried.
#[async_trait]
pub trait ProofProducer: Send + Sync {
    fn scheme(&self) -> ProvingScheme;

    async fn full_prove(
        &self,
        inputs: &NamedInputSet,
        artifacts: &CircuitArtifacts,
    ) -> Result<ProofOutput>;

    /// Delimited calldata text for a finished proof, as verifier export
    /// tooling prints it.
    async fn export_calldata(&self, output: &ProofOutput) -> Result<String> {
        let (proof, public_signals) = output.normalized();
        Ok(formatter_for(self.scheme()).export(&proof, &public_signals)?)
    }
}

#[derive(Clone, Default)]
pub struct ProducerManager {
    pub producers: HashMap<ProvingScheme, Arc<dyn ProofProducer>>,
}

impl ProducerManager {
    pub fn with_producer(mut self, producer: impl ProofProducer + 'static) -> Self {
        self.producers.insert(producer.scheme(), Arc::new(producer));
        self
    }

    pub fn get(&self, scheme: ProvingScheme) -> Result<Arc<dyn ProofProducer>> {
        self.producers.get(&scheme).cloned().ok_or_else(|| {
            ProverError::UnsupportedScheme(format!("no producer set for scheme: {scheme}"))
        })
    }
}

impl std::fmt::Debug for ProducerManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProducerManager")
            .field("schemes", &self.producers.keys().collect::<Vec<_>>())
            .finish()
    }
}
