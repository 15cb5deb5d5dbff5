use crate::error::{ProverError, Result};
use crate::producer::{CircuitArtifacts, ProofOutput, ProofProducer};
use ark_bn254::{Bn254, Fr};
use ark_circom::{read_zkey, CircomReduction, WitnessCalculator};
use ark_ff::PrimeField;
use ark_groth16::{Groth16, Proof};
use ark_std::rand::thread_rng;
use ark_std::UniformRand;
use async_trait::async_trait;
use num_bigint::{BigInt, BigUint};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::fs::File;
use wasmer::Store;
use zkcall_primitives::{NamedInputSet, ProvingScheme};

/// In-process Groth16 prover over circom wasm and zkey artifacts.
#[derive(Clone, Debug, Default)]
pub struct ArkworksProducer;

impl ArkworksProducer {
    pub fn new() -> Self {
        Self
    }

    fn prove(inputs: &NamedInputSet, artifacts: &CircuitArtifacts) -> Result<ProofOutput> {
        artifacts.check_readable()?;

        // Create a new store for the WASM runtime
        let mut store = Store::default();
        let mut witness_calculator = WitnessCalculator::new(&mut store, &artifacts.wasm)
            .map_err(|e| ProverError::ArtifactError(e.to_string()))?;

        let inputs: HashMap<String, Vec<BigInt>> = inputs
            .iter()
            .map(|(name, value)| (name.to_string(), value.values()))
            .collect();

        // Circuit assertions surface here when the inputs have no witness
        let witness = witness_calculator
            .calculate_witness_element::<Fr, _>(&mut store, inputs, false)
            .map_err(|e| ProverError::WitnessError(e.to_string()))?;

        let mut zkey = File::open(&artifacts.zkey)
            .map_err(|e| ProverError::ArtifactError(e.to_string()))?;
        let (proving_key, matrices) =
            read_zkey(&mut zkey).map_err(|e| ProverError::ArtifactError(e.to_string()))?;

        let num_inputs = matrices.num_instance_variables;
        let num_constraints = matrices.num_constraints;
        if witness.len() < num_inputs + matrices.num_witness_variables {
            return Err(ProverError::ArtifactError(format!(
                "proving key expects {} variables but the witness has {}",
                num_inputs + matrices.num_witness_variables,
                witness.len()
            )));
        }

        let mut rng = thread_rng();
        let r = Fr::rand(&mut rng);
        let s = Fr::rand(&mut rng);
        let proof = Groth16::<Bn254, CircomReduction>::create_proof_with_reduction_and_matrices(
            &proving_key,
            r,
            s,
            &matrices,
            num_inputs,
            num_constraints,
            witness.as_slice(),
        )
        .map_err(|e| ProverError::ExecutionFailed(e.to_string()))?;

        // Index 0 of the witness is the constant one
        let public_signals = witness[1..num_inputs]
            .iter()
            .map(|f| Value::String(decimal(*f)))
            .collect();

        Ok(ProofOutput {
            proof: proof_to_json(&proof),
            public_signals: Value::Array(public_signals),
        })
    }
}

fn decimal<F: PrimeField>(f: F) -> String {
    let n: BigUint = f.into_bigint().into();
    n.to_str_radix(10)
}

/// Renders a proof in the JSON layout snarkjs writes to `proof.json`.
pub fn proof_to_json(proof: &Proof<Bn254>) -> Value {
    json!({
        "pi_a": [decimal(proof.a.x), decimal(proof.a.y), "1"],
        "pi_b": [
            [decimal(proof.b.x.c0), decimal(proof.b.x.c1)],
            [decimal(proof.b.y.c0), decimal(proof.b.y.c1)],
            ["1", "0"]
        ],
        "pi_c": [decimal(proof.c.x), decimal(proof.c.y), "1"],
        "protocol": "groth16",
        "curve": "bn128"
    })
}

#[async_trait]
impl ProofProducer for ArkworksProducer {
    fn scheme(&self) -> ProvingScheme {
        ProvingScheme::Groth16
    }

    async fn full_prove(
        &self,
        inputs: &NamedInputSet,
        artifacts: &CircuitArtifacts,
    ) -> Result<ProofOutput> {
        tracing::info!(wasm = %artifacts.wasm.display(), "arkworks producer: proving started");

        let inputs = inputs.clone();
        let artifacts = artifacts.clone();
        let output = tokio::task::spawn_blocking(move || Self::prove(&inputs, &artifacts))
            .await
            .map_err(|e| ProverError::ExecutionFailed(e.to_string()))??;

        tracing::info!("arkworks producer: proving done");
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ark_bn254::{Fq, Fq2, G1Affine, G2Affine};
    use zkcall_primitives::calldata::Groth16Calldata;
    use zkcall_primitives::alloy::primitives::U256;
    use zkcall_primitives::{formatter_for, CalldataArgs};

    fn fq(n: u64) -> Fq {
        Fq::from(n)
    }

    fn w(n: u64) -> U256 {
        U256::from(n)
    }

    fn sample_proof() -> Proof<Bn254> {
        Proof::<Bn254> {
            a: G1Affine::new_unchecked(fq(1), fq(2)),
            b: G2Affine::new_unchecked(Fq2::new(fq(3), fq(4)), Fq2::new(fq(5), fq(6))),
            c: G1Affine::new_unchecked(fq(7), fq(0)),
        }
    }

    #[test]
    fn test_proof_json_feeds_groth16_formatter() {
        let json = proof_to_json(&sample_proof());
        assert_eq!(json["pi_b"][0], json!(["3", "4"]));
        assert_eq!(json["pi_c"][1], json!("0"));

        let output = ProofOutput {
            proof: json,
            public_signals: json!(["6"]),
        };
        let (proof, signals) = output.normalized();
        let args = formatter_for(ProvingScheme::Groth16)
            .format(&proof, &signals)
            .unwrap();
        assert_eq!(
            args,
            CalldataArgs::Groth16(Groth16Calldata {
                a: [w(1), w(2)],
                b: [[w(4), w(3)], [w(6), w(5)]],
                c: [w(7), w(0)],
                inputs: vec![w(6)],
            })
        );
    }

    #[test]
    fn test_decimal_is_canonical_form() {
        assert_eq!(decimal(Fr::from(0u64)), "0");
        assert_eq!(decimal(Fr::from(6u64)), "6");
        assert_eq!(
            decimal(-Fr::from(1u64)),
            "21888242871839275222246405745257275088548364400416034343698204186575808495616"
        );
    }

    #[tokio::test]
    async fn test_default_export_parses_back() {
        let output = ProofOutput {
            proof: proof_to_json(&sample_proof()),
            public_signals: json!(["2"]),
        };
        let producer = ArkworksProducer::new();
        let text = producer.export_calldata(&output).await.unwrap();
        assert!(text.starts_with("[\"0x"));

        let formatter = formatter_for(ProvingScheme::Groth16);
        let (proof, signals) = output.normalized();
        assert_eq!(
            formatter.format_exported(&text).unwrap(),
            formatter.format(&proof, &signals).unwrap()
        );
    }

    #[tokio::test]
    async fn test_missing_artifacts_are_reported() {
        let artifacts =
            CircuitArtifacts::new("/nonexistent/HelloWorld.wasm", "/nonexistent/x.zkey");
        let inputs = NamedInputSet::new().with("a", 1).with("b", 2);
        let err = ArkworksProducer::new()
            .full_prove(&inputs, &artifacts)
            .await
            .unwrap_err();
        assert!(matches!(err, ProverError::ArtifactError(_)));
    }
}
