use crate::error::{ProverError, Result};
use crate::producer::{CircuitArtifacts, ProofOutput, ProofProducer};
use async_trait::async_trait;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::process::Output;
use tempfile::TempDir;
use zkcall_primitives::{NamedInputSet, ProvingScheme};

/// Messages the witness calculator prints when inputs violate the circuit.
const WITNESS_FAILURE_MARKERS: [&str; 4] = [
    "Assert Failed",
    "Not all inputs have been set",
    "Too many values for input signal",
    "Signal not found",
];

/// Proves through the `snarkjs` command line tool.
#[derive(Clone, Debug)]
pub struct SnarkjsProducer {
    scheme: ProvingScheme,
    binary: PathBuf,
}

impl SnarkjsProducer {
    pub fn new(scheme: ProvingScheme) -> Self {
        Self::with_binary(scheme, "snarkjs")
    }

    pub fn with_binary(scheme: ProvingScheme, binary: impl Into<PathBuf>) -> Self {
        Self {
            scheme,
            binary: binary.into(),
        }
    }

    async fn run(&self, args: &[&Path]) -> Result<Output> {
        let output = tokio::process::Command::new(&self.binary)
            .args(args)
            .output()
            .await
            .map_err(|e| {
                ProverError::ExecutionFailed(format!("{}: {e}", self.binary.display()))
            })?;

        if !output.status.success() {
            return Err(classify_failure(&output));
        }
        Ok(output)
    }
}

fn workdir() -> Result<TempDir> {
    tempfile::tempdir().map_err(|e| ProverError::ExecutionFailed(e.to_string()))
}

async fn write_json(path: &Path, value: &Value) -> Result<()> {
    let bytes =
        serde_json::to_vec(value).map_err(|e| ProverError::ExecutionFailed(e.to_string()))?;
    tokio::fs::write(path, bytes)
        .await
        .map_err(|e| ProverError::ExecutionFailed(e.to_string()))
}

async fn read_json(path: &Path) -> Result<Value> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| ProverError::OutputError(format!("{}: {e}", path.display())))?;
    serde_json::from_slice(&bytes)
        .map_err(|e| ProverError::OutputError(format!("{}: {e}", path.display())))
}

fn classify_failure(output: &Output) -> ProverError {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);
    let message = format!("{} {}", stderr.trim(), stdout.trim()).trim().to_string();
    if WITNESS_FAILURE_MARKERS
        .iter()
        .any(|marker| message.contains(marker))
    {
        ProverError::WitnessError(message)
    } else {
        ProverError::ExecutionFailed(message)
    }
}

#[async_trait]
impl ProofProducer for SnarkjsProducer {
    fn scheme(&self) -> ProvingScheme {
        self.scheme
    }

    async fn full_prove(
        &self,
        inputs: &NamedInputSet,
        artifacts: &CircuitArtifacts,
    ) -> Result<ProofOutput> {
        artifacts.check_readable()?;
        tracing::info!(scheme = %self.scheme, "snarkjs producer: fullprove started");

        let workdir = workdir()?;
        let input_path = workdir.path().join("input.json");
        let proof_path = workdir.path().join("proof.json");
        let public_path = workdir.path().join("public.json");
        write_json(&input_path, &inputs.to_json()).await?;

        self.run(&[
            Path::new(self.scheme.as_str()),
            Path::new("fullprove"),
            &input_path,
            &artifacts.wasm,
            &artifacts.zkey,
            &proof_path,
            &public_path,
        ])
        .await?;

        let output = ProofOutput {
            proof: read_json(&proof_path).await?,
            public_signals: read_json(&public_path).await?,
        };
        tracing::info!(scheme = %self.scheme, "snarkjs producer: fullprove done");
        Ok(output)
    }

    /// Runs `snarkjs zkey export soliditycalldata` on a finished proof and
    /// returns the delimited calldata text it prints.
    async fn export_calldata(&self, output: &ProofOutput) -> Result<String> {
        let workdir = workdir()?;
        let public_path = workdir.path().join("public.json");
        let proof_path = workdir.path().join("proof.json");
        write_json(&public_path, &output.public_signals).await?;
        write_json(&proof_path, &output.proof).await?;

        let result = self
            .run(&[
                Path::new("zkey"),
                Path::new("export"),
                Path::new("soliditycalldata"),
                &public_path,
                &proof_path,
            ])
            .await?;

        let text = String::from_utf8_lossy(&result.stdout).trim().to_string();
        if text.is_empty() {
            return Err(ProverError::OutputError(
                "snarkjs printed no calldata".to_string(),
            ));
        }
        Ok(text)
    }
}
