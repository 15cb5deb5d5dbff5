//! Per-circuit prove-and-verify scenarios.
//!
//! Every scenario walks `Init -> Deploy -> Prove -> Normalize -> Format ->
//! Verify -> Assert -> Terminal`. The sentinel scenario skips the three
//! proof states and sends all-zero arguments of the right arity instead.
//! Nothing is retried: the first failing state ends the scenario.

use crate::config::{CalldataPath, CircuitConfig};
use crate::error::{ClientError, Result};
use crate::verifier::VerifierDeployer;
use futures::future::join_all;
use num_bigint::BigUint;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use zkcall_primitives::{
    formatter_for, CalldataArgs, CanonicalValue, PrimitivesError, ProvingScheme,
};
use zkcall_prover::ProducerManager;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScenarioKind {
    /// A real proof that must verify.
    Genuine,
    /// All-zero arguments that must be rejected.
    Sentinel,
}

impl fmt::Display for ScenarioKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScenarioKind::Genuine => write!(f, "genuine"),
            ScenarioKind::Sentinel => write!(f, "sentinel"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScenarioState {
    Init,
    Deploy,
    Prove,
    Normalize,
    Format,
    Verify,
    Assert,
    Terminal,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Scenario {
    pub circuit: CircuitConfig,
    pub kind: ScenarioKind,
}

impl Scenario {
    pub fn genuine(circuit: CircuitConfig) -> Self {
        Self {
            circuit,
            kind: ScenarioKind::Genuine,
        }
    }

    pub fn sentinel(circuit: CircuitConfig) -> Self {
        Self {
            circuit,
            kind: ScenarioKind::Sentinel,
        }
    }

    /// The genuine and sentinel scenario for one circuit.
    pub fn pair(circuit: CircuitConfig) -> [Scenario; 2] {
        [Self::genuine(circuit.clone()), Self::sentinel(circuit)]
    }

    pub fn name(&self) -> String {
        format!("{}/{}/{}", self.circuit.name, self.circuit.scheme, self.kind)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ScenarioReport {
    pub name: String,
    pub scheme: ProvingScheme,
    pub kind: ScenarioKind,
    pub verified: bool,
    /// Empty for sentinel scenarios.
    pub public_signals: Vec<BigUint>,
    pub states: Vec<ScenarioState>,
}

struct Progress {
    name: String,
    scheme: ProvingScheme,
    states: Vec<ScenarioState>,
}

impl Progress {
    fn new(scenario: &Scenario) -> Self {
        let mut progress = Self {
            name: scenario.name(),
            scheme: scenario.circuit.scheme,
            states: Vec::new(),
        };
        progress.enter(ScenarioState::Init);
        progress
    }

    fn enter(&mut self, state: ScenarioState) {
        tracing::info!(scenario = %self.name, scheme = %self.scheme, ?state, "entering state");
        self.states.push(state);
    }
}

/// Runs scenarios against freshly deployed verifiers.
pub struct ScenarioHarness {
    producers: ProducerManager,
    deployer: Arc<dyn VerifierDeployer>,
    timeout: Option<Duration>,
}

impl fmt::Debug for ScenarioHarness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScenarioHarness")
            .field("producers", &self.producers)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ScenarioHarness {
    pub fn new(producers: ProducerManager, deployer: Arc<dyn VerifierDeployer>) -> Self {
        Self {
            producers,
            deployer,
            timeout: None,
        }
    }

    /// Bounds each scenario as a whole. A timed out scenario is abandoned,
    /// but a proof already running in the background still completes.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub async fn run(&self, scenario: &Scenario) -> Result<ScenarioReport> {
        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, self.execute(scenario))
                .await
                .map_err(|_| ClientError::Timeout(limit))?,
            None => self.execute(scenario).await,
        }
    }

    /// Runs all scenarios concurrently. Results keep the input order.
    pub async fn run_all(&self, scenarios: &[Scenario]) -> Vec<(String, Result<ScenarioReport>)> {
        join_all(scenarios.iter().map(|scenario| async move {
            let result = self.run(scenario).await;
            match &result {
                Ok(report) => tracing::info!(
                    scenario = %report.name,
                    verified = report.verified,
                    "scenario passed"
                ),
                Err(e) => tracing::error!(scenario = %scenario.name(), "scenario failed: {e}"),
            }
            (scenario.name(), result)
        }))
        .await
    }

    async fn execute(&self, scenario: &Scenario) -> Result<ScenarioReport> {
        let circuit = &scenario.circuit;
        let mut progress = Progress::new(scenario);

        progress.enter(ScenarioState::Deploy);
        let verifier = self.deployer.deploy(circuit).await?;

        let (args, public_signals) = match scenario.kind {
            ScenarioKind::Genuine => self.prove_and_format(circuit, &mut progress).await?,
            ScenarioKind::Sentinel => (
                CalldataArgs::sentinel(circuit.scheme, circuit.public_inputs),
                Vec::new(),
            ),
        };

        progress.enter(ScenarioState::Verify);
        let verified = verifier.verify(&args).await?;

        progress.enter(ScenarioState::Assert);
        match scenario.kind {
            ScenarioKind::Genuine => {
                if !verified {
                    return Err(ClientError::AssertionFailed(format!(
                        "{}: verifier rejected a genuine proof",
                        progress.name
                    )));
                }
                if let Some(expected) = circuit.expected_signal_values()? {
                    if expected != public_signals {
                        return Err(ClientError::AssertionFailed(format!(
                            "{}: public signals {public_signals:?}, expected {expected:?}",
                            progress.name
                        )));
                    }
                }
            }
            ScenarioKind::Sentinel => {
                if verified {
                    return Err(ClientError::AssertionFailed(format!(
                        "{}: verifier accepted the all-zero sentinel",
                        progress.name
                    )));
                }
            }
        }

        progress.enter(ScenarioState::Terminal);
        Ok(ScenarioReport {
            name: progress.name,
            scheme: circuit.scheme,
            kind: scenario.kind,
            verified,
            public_signals,
            states: progress.states,
        })
    }

    async fn prove_and_format(
        &self,
        circuit: &CircuitConfig,
        progress: &mut Progress,
    ) -> Result<(CalldataArgs, Vec<BigUint>)> {
        progress.enter(ScenarioState::Prove);
        let producer = self
            .producers
            .get(circuit.scheme)
            .map_err(|e| ClientError::ConfigError(e.to_string()))?;
        let inputs = circuit.named_inputs()?;
        let output = producer.full_prove(&inputs, &circuit.artifacts()).await?;

        progress.enter(ScenarioState::Normalize);
        let (proof, signals) = output.normalized();
        let public_signals = signal_values(&signals)?;
        tracing::debug!(scenario = %progress.name, ?public_signals, "public signals");

        progress.enter(ScenarioState::Format);
        let formatter = formatter_for(circuit.scheme);
        let args = match circuit.calldata_path {
            CalldataPath::Typed => formatter.format(&proof, &signals)?,
            CalldataPath::Exported => {
                let text = producer.export_calldata(&output).await?;
                tracing::debug!(scenario = %progress.name, %text, "exported calldata");
                formatter.format_exported(&text)?
            }
        };
        Ok((args, public_signals))
    }
}

fn signal_values(signals: &CanonicalValue) -> Result<Vec<BigUint>> {
    let items = signals.as_sequence().ok_or_else(|| {
        PrimitivesError::FormatError(format!("public signals are not a sequence: {signals:?}"))
    })?;
    let values = items
        .iter()
        .map(|item| {
            item.as_integer().cloned().ok_or_else(|| {
                PrimitivesError::FormatError(format!("public signal is not an integer: {item:?}"))
            })
        })
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn circuit() -> CircuitConfig {
        serde_json::from_value(json!({
            "name": "Multiplier3",
            "scheme": "plonk",
            "wasm": "Multiplier3.wasm",
            "zkey": "circuit_final.zkey",
            "verifier_artifact": "PlonkVerifier.json",
            "inputs": {"a": "1", "b": "2", "c": "3"}
        }))
        .unwrap()
    }

    #[test]
    fn test_scenario_pair() {
        let [genuine, sentinel] = Scenario::pair(circuit());
        assert_eq!(genuine.kind, ScenarioKind::Genuine);
        assert_eq!(sentinel.kind, ScenarioKind::Sentinel);
        assert_eq!(genuine.name(), "Multiplier3/plonk/genuine");
        assert_eq!(sentinel.name(), "Multiplier3/plonk/sentinel");
    }

    #[test]
    fn test_signal_values() {
        let signals = CanonicalValue::Sequence(vec![
            CanonicalValue::Integer(6u32.into()),
            CanonicalValue::Integer(0u32.into()),
        ]);
        assert_eq!(
            signal_values(&signals).unwrap(),
            vec![BigUint::from(6u32), BigUint::from(0u32)]
        );
        assert!(signal_values(&CanonicalValue::Sequence(vec![])).unwrap().is_empty());
    }

    #[test]
    fn test_non_integer_signal_is_format_error() {
        let signals = CanonicalValue::Sequence(vec![
            CanonicalValue::Integer(6u32.into()),
            CanonicalValue::String("six".to_string()),
        ]);
        let err = signal_values(&signals).unwrap_err();
        assert!(matches!(
            err,
            ClientError::PrimitivesError(PrimitivesError::FormatError(msg)) if msg.contains("six")
        ));
        assert!(matches!(
            signal_values(&CanonicalValue::Null),
            Err(ClientError::PrimitivesError(PrimitivesError::FormatError(_)))
        ));
    }
}
