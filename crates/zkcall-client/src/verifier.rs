//! On-chain verifier calls.
//!
//! A deployed verifier exposes a single `verifyProof` view function whose
//! parameter list depends on the proving scheme. [`VerifierSignature`] builds
//! that function for a circuit and encodes [`CalldataArgs`] against it;
//! [`OnchainVerifier`] sends the encoded call with `eth_call`.

use crate::config::{CircuitConfig, PublicInputArray};
use crate::error::{ClientError, Result};
use alloy::network::{Ethereum, TransactionBuilder};
use alloy::providers::Provider;
use alloy::rpc::types::TransactionRequest;
use alloy::transports::Transport;
use async_trait::async_trait;
use serde_json::Value;
use std::marker::PhantomData;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use zkcall_primitives::alloy::dyn_abi::{DynSolValue, FunctionExt, JsonAbiExt};
use zkcall_primitives::alloy::json_abi::Function;
use zkcall_primitives::alloy::primitives::{Address, Bytes, U256};
use zkcall_primitives::calldata::{Groth16Calldata, PlonkCalldata};
use zkcall_primitives::{CalldataArgs, ProvingScheme};

#[async_trait]
pub trait Verifier: Send + Sync {
    /// `Ok(false)` means the verifier ran and rejected the proof.
    async fn verify(&self, args: &CalldataArgs) -> Result<bool>;
}

#[async_trait]
pub trait VerifierDeployer: Send + Sync {
    /// Deploys a fresh verifier for `circuit`.
    async fn deploy(&self, circuit: &CircuitConfig) -> Result<Arc<dyn Verifier>>;
}

/// The `verifyProof` signature a circuit's verifier exposes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VerifierSignature {
    pub scheme: ProvingScheme,
    pub public_inputs: usize,
    pub public_input_array: PublicInputArray,
}

impl VerifierSignature {
    pub fn new(
        scheme: ProvingScheme,
        public_inputs: usize,
        public_input_array: PublicInputArray,
    ) -> Self {
        Self {
            scheme,
            public_inputs,
            public_input_array,
        }
    }

    pub fn for_circuit(circuit: &CircuitConfig) -> Self {
        Self::new(
            circuit.scheme,
            circuit.public_inputs,
            circuit.public_input_array,
        )
    }

    pub fn declaration(&self) -> String {
        match self.scheme {
            ProvingScheme::Groth16 => {
                let input = match self.public_input_array {
                    PublicInputArray::Fixed => format!("uint256[{}]", self.public_inputs),
                    PublicInputArray::Dynamic => "uint256[]".to_string(),
                };
                format!(
                    "function verifyProof(uint256[2] a, uint256[2][2] b, uint256[2] c, {input} input) external view returns (bool)"
                )
            }
            ProvingScheme::Plonk => {
                "function verifyProof(bytes proof, uint256[] pubSignals) external view returns (bool)"
                    .to_string()
            }
        }
    }

    pub fn function(&self) -> Result<Function> {
        Function::parse(&self.declaration())
            .map_err(|e| ClientError::ArgumentEncodingError(e.to_string()))
    }

    /// Selector-prefixed ABI encoding of a `verifyProof` call.
    pub fn encode_call(&self, args: &CalldataArgs) -> Result<Bytes> {
        if args.scheme() != self.scheme {
            return Err(ClientError::ArgumentEncodingError(format!(
                "{} arguments passed to a {} verifier",
                args.scheme(),
                self.scheme
            )));
        }
        let values = match args {
            CalldataArgs::Groth16(calldata) => self.groth16_values(calldata),
            CalldataArgs::Plonk(calldata) => plonk_values(calldata)?,
        };
        let encoded = self
            .function()?
            .abi_encode_input(&values)
            .map_err(|e| ClientError::ArgumentEncodingError(e.to_string()))?;
        Ok(Bytes::from(encoded))
    }

    pub fn decode_result(&self, data: &[u8]) -> Result<bool> {
        let values = self
            .function()?
            .abi_decode_output(data, true)
            .map_err(|e| ClientError::ResultDecodingError(e.to_string()))?;
        values
            .first()
            .and_then(DynSolValue::as_bool)
            .ok_or_else(|| ClientError::ResultDecodingError(format!("not a bool: {values:?}")))
    }

    fn groth16_values(&self, calldata: &Groth16Calldata) -> Vec<DynSolValue> {
        let inputs = calldata.inputs.iter().map(uint).collect();
        vec![
            pair(&calldata.a),
            DynSolValue::FixedArray(calldata.b.iter().map(pair).collect()),
            pair(&calldata.c),
            match self.public_input_array {
                PublicInputArray::Fixed => DynSolValue::FixedArray(inputs),
                PublicInputArray::Dynamic => DynSolValue::Array(inputs),
            },
        ]
    }
}

fn uint(word: &U256) -> DynSolValue {
    DynSolValue::Uint(*word, 256)
}

fn pair(words: &[U256; 2]) -> DynSolValue {
    DynSolValue::FixedArray(words.iter().map(uint).collect())
}

/// The blob is hex-decoded and each signal read as an integer here, at the
/// call boundary.
fn plonk_values(calldata: &PlonkCalldata) -> Result<Vec<DynSolValue>> {
    let blob = calldata.proof.strip_prefix("0x").unwrap_or(&calldata.proof);
    let proof = hex::decode(blob).map_err(|e| {
        ClientError::ArgumentEncodingError(format!("proof blob {:?}: {e}", calldata.proof))
    })?;

    let signals = calldata
        .public_signals
        .iter()
        .map(|s| {
            U256::from_str(s)
                .map(|w| uint(&w))
                .map_err(|e| ClientError::ArgumentEncodingError(format!("signal {s:?}: {e}")))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(vec![DynSolValue::Bytes(proof), DynSolValue::Array(signals)])
}

/// A deployed verifier reached through an RPC provider.
pub struct OnchainVerifier<T, P>
where
    T: Transport + Clone,
    P: Provider<T, Ethereum> + Clone,
{
    rpc_provider: P,
    address: Address,
    signature: VerifierSignature,
    phantom_data: PhantomData<T>,
}

impl<T, P> OnchainVerifier<T, P>
where
    T: Transport + Clone,
    P: Provider<T, Ethereum> + Clone,
{
    pub fn new(rpc_provider: P, address: Address, signature: VerifierSignature) -> Self {
        Self {
            rpc_provider,
            address,
            signature,
            phantom_data: PhantomData,
        }
    }
}

#[async_trait]
impl<T, P> Verifier for OnchainVerifier<T, P>
where
    T: Transport + Clone,
    P: Provider<T, Ethereum> + Clone,
{
    async fn verify(&self, args: &CalldataArgs) -> Result<bool> {
        let calldata = self.signature.encode_call(args)?;
        let tx = TransactionRequest::default()
            .with_to(self.address)
            .with_input(calldata);

        let output = self
            .rpc_provider
            .call(&tx)
            .await
            .map_err(|e| ClientError::VerifierCallError(e.to_string()))?;

        let verified = self.signature.decode_result(&output)?;
        tracing::debug!(verifier = %self.address, verified, "verifyProof returned");
        Ok(verified)
    }
}

/// How often a pending creation transaction is checked for a receipt.
const RECEIPT_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Deploys verifier bytecode from a Hardhat or Foundry build artifact.
///
/// Creation transactions from one deployer are sent one at a time: each is
/// mined before the next is signed, so concurrent scenarios sharing a wallet
/// never reuse a nonce.
pub struct OnchainDeployer<T, P>
where
    T: Transport + Clone,
    P: Provider<T, Ethereum> + Clone,
{
    rpc_provider: P,
    send_lock: Mutex<()>,
    phantom_data: PhantomData<T>,
}

impl<T, P> OnchainDeployer<T, P>
where
    T: Transport + Clone,
    P: Provider<T, Ethereum> + Clone,
{
    pub fn new(rpc_provider: P) -> Self {
        Self {
            rpc_provider,
            send_lock: Mutex::new(()),
            phantom_data: PhantomData,
        }
    }

    pub async fn deploy_bytecode(&self, bytecode: Bytes) -> Result<Address> {
        let _guard = self.send_lock.lock().await;

        let tx = TransactionRequest::default().with_deploy_code(bytecode);
        let pending = self
            .rpc_provider
            .send_transaction(tx)
            .await
            .map_err(|e| ClientError::DeploymentError(e.to_string()))?;
        let tx_hash = *pending.tx_hash();
        tracing::debug!(%tx_hash, "creation transaction sent");

        let receipt = loop {
            let receipt = self
                .rpc_provider
                .get_transaction_receipt(tx_hash)
                .await
                .map_err(|e| ClientError::DeploymentError(e.to_string()))?;
            match receipt {
                Some(receipt) => break receipt,
                None => tokio::time::sleep(RECEIPT_POLL_INTERVAL).await,
            }
        };

        if !receipt.status() {
            return Err(ClientError::DeploymentError(format!(
                "creation transaction reverted: {}",
                receipt.transaction_hash
            )));
        }
        receipt.contract_address.ok_or_else(|| {
            ClientError::DeploymentError("receipt has no contract address".to_string())
        })
    }
}

#[async_trait]
impl<T, P> VerifierDeployer for OnchainDeployer<T, P>
where
    T: Transport + Clone,
    P: Provider<T, Ethereum> + Clone + 'static,
{
    async fn deploy(&self, circuit: &CircuitConfig) -> Result<Arc<dyn Verifier>> {
        let bytecode = load_bytecode(&circuit.verifier_artifact)?;
        let address = self.deploy_bytecode(bytecode).await?;
        tracing::info!(circuit = %circuit.name, %address, "verifier deployed");

        Ok(Arc::new(OnchainVerifier::new(
            self.rpc_provider.clone(),
            address,
            VerifierSignature::for_circuit(circuit),
        )))
    }
}

/// Reads creation bytecode from `{"bytecode": "0x.."}` (Hardhat) or
/// `{"bytecode": {"object": "0x.."}}` (Foundry).
pub fn load_bytecode(artifact: &Path) -> Result<Bytes> {
    let data = std::fs::read_to_string(artifact).map_err(|e| {
        ClientError::DeploymentError(format!("{}: {e}", artifact.display()))
    })?;
    let json: Value = serde_json::from_str(&data).map_err(|e| {
        ClientError::DeploymentError(format!("{}: {e}", artifact.display()))
    })?;

    let bytecode = match &json["bytecode"] {
        Value::String(s) => s.as_str(),
        Value::Object(obj) => obj.get("object").and_then(Value::as_str).unwrap_or_default(),
        _ => "",
    };
    let bytecode = bytecode.strip_prefix("0x").unwrap_or(bytecode);
    if bytecode.is_empty() {
        return Err(ClientError::DeploymentError(format!(
            "{}: artifact has no bytecode",
            artifact.display()
        )));
    }

    hex::decode(bytecode)
        .map(Bytes::from)
        .map_err(|e| ClientError::DeploymentError(format!("{}: {e}", artifact.display())))
}
