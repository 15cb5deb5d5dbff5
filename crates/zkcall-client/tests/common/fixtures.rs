use serde_json::{json, Value};
use zkcall_client::CircuitConfig;
use zkcall_prover::ProofOutput;

fn circuit(name: &str, scheme: &str, inputs: Value, expected: &str) -> CircuitConfig {
    serde_json::from_value(json!({
        "name": name,
        "scheme": scheme,
        "wasm": format!("contracts/circuits/{name}/{name}_js/{name}.wasm"),
        "zkey": format!("contracts/circuits/{name}/circuit_final.zkey"),
        "verifier_artifact": format!("artifacts/contracts/{name}Verifier.sol/{name}Verifier.json"),
        "inputs": inputs,
        "expected_public_signals": [expected]
    }))
    .unwrap()
}

/// `a * b` with a = 1, b = 2.
pub fn hello_world() -> CircuitConfig {
    circuit("HelloWorld", "groth16", json!({"a": "1", "b": "2"}), "2")
}

/// `a * b * c` with a = 1, b = 2, c = 3.
pub fn multiplier3_groth16() -> CircuitConfig {
    circuit(
        "Multiplier3",
        "groth16",
        json!({"a": "1", "b": "2", "c": "3"}),
        "6",
    )
}

pub fn multiplier3_plonk() -> CircuitConfig {
    circuit("Multiplier3", "plonk", json!({"a": "1", "b": "2", "c": "3"}), "6")
}

/// Groth16 prover output in snarkjs layout.
pub fn groth16_output(signal: &str) -> ProofOutput {
    ProofOutput {
        proof: json!({
            "pi_a": ["11", "12", "1"],
            "pi_b": [["21", "22"], ["23", "24"], ["1", "0"]],
            "pi_c": ["31", "0x20", "1"],
            "protocol": "groth16",
            "curve": "bn128"
        }),
        public_signals: json!([signal]),
    }
}

/// PLONK prover output in snarkjs layout.
pub fn plonk_output(signal: &str) -> ProofOutput {
    ProofOutput {
        proof: json!({
            "A": ["1", "2", "1"],
            "B": ["3", "4", "1"],
            "C": ["5", "6", "1"],
            "Z": ["7", "8", "1"],
            "T1": ["9", "10", "1"],
            "T2": ["11", "12", "1"],
            "T3": ["13", "14", "1"],
            "Wxi": ["15", "16", "1"],
            "Wxiw": ["17", "18", "1"],
            "eval_a": "19",
            "eval_b": "20",
            "eval_c": "21",
            "eval_s1": "22",
            "eval_s2": "23",
            "eval_zw": "24",
            "protocol": "plonk",
            "curve": "bn128"
        }),
        public_signals: json!([signal]),
    }
}
