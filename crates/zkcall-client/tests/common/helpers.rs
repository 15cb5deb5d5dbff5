use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use zkcall_client::{CircuitConfig, ClientError, Verifier, VerifierDeployer};
use zkcall_primitives::{CalldataArgs, NamedInputSet, ProvingScheme};
use zkcall_prover::{CircuitArtifacts, ProofOutput, ProofProducer, ProverError};

/// Producer returning a canned output, or a witness error.
#[derive(Clone)]
pub struct MockProducer {
    scheme: ProvingScheme,
    output: Result<ProofOutput, String>,
    delay: Option<Duration>,
    pub calls: Arc<AtomicUsize>,
}

impl MockProducer {
    pub fn new(scheme: ProvingScheme, output: ProofOutput) -> Self {
        Self {
            scheme,
            output: Ok(output),
            delay: None,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn failing(scheme: ProvingScheme, message: &str) -> Self {
        Self {
            output: Err(message.to_string()),
            ..Self::new(
                scheme,
                ProofOutput {
                    proof: serde_json::Value::Null,
                    public_signals: serde_json::Value::Null,
                },
            )
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProofProducer for MockProducer {
    fn scheme(&self) -> ProvingScheme {
        self.scheme
    }

    async fn full_prove(
        &self,
        _inputs: &NamedInputSet,
        _artifacts: &CircuitArtifacts,
    ) -> zkcall_prover::Result<ProofOutput> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.output.clone().map_err(ProverError::WitnessError)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VerifierBehaviour {
    /// Accepts anything that is not all zeros.
    Honest,
    AcceptAll,
    RejectAll,
    Revert,
}

pub fn is_all_zero(args: &CalldataArgs) -> bool {
    match args {
        CalldataArgs::Groth16(c) => c
            .a
            .iter()
            .chain(c.b.iter().flatten())
            .chain(c.c.iter())
            .chain(c.inputs.iter())
            .all(|w| w.is_zero()),
        CalldataArgs::Plonk(c) => c.proof.trim_start_matches("0x").chars().all(|ch| ch == '0'),
    }
}

pub struct MockVerifier {
    behaviour: VerifierBehaviour,
    calls: Arc<Mutex<Vec<CalldataArgs>>>,
}

#[async_trait]
impl Verifier for MockVerifier {
    async fn verify(&self, args: &CalldataArgs) -> zkcall_client::Result<bool> {
        self.calls.lock().unwrap().push(args.clone());
        match self.behaviour {
            VerifierBehaviour::Honest => Ok(!is_all_zero(args)),
            VerifierBehaviour::AcceptAll => Ok(true),
            VerifierBehaviour::RejectAll => Ok(false),
            VerifierBehaviour::Revert => Err(ClientError::VerifierCallError(
                "execution reverted".to_string(),
            )),
        }
    }
}

/// Hands out a new [`MockVerifier`] per deployment and records every call.
#[derive(Clone)]
pub struct MockDeployer {
    behaviour: VerifierBehaviour,
    pub deployments: Arc<Mutex<Vec<String>>>,
    pub calls: Arc<Mutex<Vec<CalldataArgs>>>,
}

impl MockDeployer {
    pub fn new(behaviour: VerifierBehaviour) -> Self {
        Self {
            behaviour,
            deployments: Arc::default(),
            calls: Arc::default(),
        }
    }

    pub fn deployment_count(&self) -> usize {
        self.deployments.lock().unwrap().len()
    }

    pub fn verified_args(&self) -> Vec<CalldataArgs> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl VerifierDeployer for MockDeployer {
    async fn deploy(&self, circuit: &CircuitConfig) -> zkcall_client::Result<Arc<dyn Verifier>> {
        self.deployments.lock().unwrap().push(circuit.name.clone());
        Ok(Arc::new(MockVerifier {
            behaviour: self.behaviour,
            calls: self.calls.clone(),
        }))
    }
}
