//! Harness configuration, loaded from a JSON file.

use crate::error::ClientError;
use crate::harness::Scenario;
use num_bigint::BigUint;
use serde::Deserialize;
use serde_json::Value;
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use tracing::Level;
use url::Url;
use zkcall_primitives::normalize::parse_numeric;
use zkcall_primitives::{NamedInputSet, ProvingScheme};
use zkcall_prover::{ArkworksProducer, CircuitArtifacts, ProducerManager, SnarkjsProducer};

#[derive(Debug, Clone, Deserialize)]
pub struct HarnessConfig {
    pub rpc_url: String,
    pub log_level: String,
    #[serde(default)]
    pub prover: ProverBackend,
    #[serde(default = "default_snarkjs_bin")]
    pub snarkjs_bin: PathBuf,
    #[serde(default)]
    pub scenario_timeout_seconds: Option<u64>,
    pub circuits: Vec<CircuitConfig>,
}

/// Which backend produces Groth16 proofs. PLONK always goes through snarkjs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProverBackend {
    #[default]
    Arkworks,
    Snarkjs,
}

/// Shape of the Groth16 verifier's public input parameter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PublicInputArray {
    /// `uint256[N]`, as generated verifier templates declare it.
    #[default]
    Fixed,
    /// `uint256[]`
    Dynamic,
}

/// How call arguments are derived from a proof.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CalldataPath {
    /// Map the typed proof straight into call arguments.
    #[default]
    Typed,
    /// Go through the delimited export text.
    Exported,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CircuitConfig {
    pub name: String,
    pub scheme: ProvingScheme,
    pub wasm: PathBuf,
    pub zkey: PathBuf,
    pub verifier_artifact: PathBuf,
    pub inputs: Value,
    #[serde(default = "default_public_inputs")]
    pub public_inputs: usize,
    #[serde(default)]
    pub expected_public_signals: Option<Vec<String>>,
    #[serde(default)]
    pub public_input_array: PublicInputArray,
    #[serde(default)]
    pub calldata_path: CalldataPath,
}

fn default_snarkjs_bin() -> PathBuf {
    PathBuf::from("snarkjs")
}

fn default_public_inputs() -> usize {
    1
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileReadError(#[from] std::io::Error),
    #[error("Failed to parse JSON: {0}")]
    JsonParseError(#[from] serde_json::Error),
    #[error("Failed to parse URL: {0}")]
    UrlParseError(#[from] url::ParseError),
    #[error("Failed to parse log level: {0}")]
    LogLevelParseError(String),
    #[error("Invalid circuit config: {0}")]
    CircuitError(String),
}

impl From<ConfigError> for ClientError {
    fn from(err: ConfigError) -> Self {
        ClientError::ConfigError(err.to_string())
    }
}

impl HarnessConfig {
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let data = fs::read_to_string(path)?;
        Self::from_json_str(&data)
    }

    pub fn from_json_str(data: &str) -> Result<Self, ConfigError> {
        let config: HarnessConfig = serde_json::from_str(data)?;
        for circuit in &config.circuits {
            circuit.validate()?;
        }
        Ok(config)
    }

    pub fn rpc_url(&self) -> Result<Url, ConfigError> {
        Url::parse(&self.rpc_url).map_err(ConfigError::from)
    }

    pub fn log_level(&self) -> Result<Level, ConfigError> {
        Level::from_str(&self.log_level)
            .map_err(|_| ConfigError::LogLevelParseError(self.log_level.clone()))
    }

    pub fn scenario_timeout(&self) -> Option<Duration> {
        self.scenario_timeout_seconds.map(Duration::from_secs)
    }

    pub fn producer_manager(&self) -> ProducerManager {
        let plonk = SnarkjsProducer::with_binary(ProvingScheme::Plonk, &self.snarkjs_bin);
        let manager = ProducerManager::default().with_producer(plonk);
        match self.prover {
            ProverBackend::Arkworks => manager.with_producer(ArkworksProducer::new()),
            ProverBackend::Snarkjs => manager.with_producer(SnarkjsProducer::with_binary(
                ProvingScheme::Groth16,
                &self.snarkjs_bin,
            )),
        }
    }

    /// A genuine and a sentinel scenario for every configured circuit.
    pub fn scenarios(&self) -> Vec<Scenario> {
        self.circuits
            .iter()
            .flat_map(|circuit| Scenario::pair(circuit.clone()))
            .collect()
    }
}

impl CircuitConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.named_inputs()?;
        if let Some(expected) = &self.expected_public_signals {
            if expected.len() != self.public_inputs {
                return Err(ConfigError::CircuitError(format!(
                    "{}: {} expected public signals but public_inputs is {}",
                    self.name,
                    expected.len(),
                    self.public_inputs
                )));
            }
            self.expected_signal_values()?;
        }
        Ok(())
    }

    pub fn artifacts(&self) -> CircuitArtifacts {
        CircuitArtifacts::new(&self.wasm, &self.zkey)
    }

    pub fn named_inputs(&self) -> Result<NamedInputSet, ConfigError> {
        NamedInputSet::from_json(&self.inputs)
            .map_err(|e| ConfigError::CircuitError(format!("{}: {e}", self.name)))
    }

    pub fn expected_signal_values(&self) -> Result<Option<Vec<BigUint>>, ConfigError> {
        self.expected_public_signals
            .as_ref()
            .map(|signals| {
                signals
                    .iter()
                    .map(|s| {
                        parse_numeric(s).ok_or_else(|| {
                            ConfigError::CircuitError(format!(
                                "{}: expected public signal is not an integer: {s:?}",
                                self.name
                            ))
                        })
                    })
                    .collect()
            })
            .transpose()
    }
}
