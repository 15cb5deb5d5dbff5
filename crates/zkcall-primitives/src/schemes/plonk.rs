use crate::alloy::primitives::U256;
use crate::calldata::{
    field, sequence, signal_words, word_at, word_hex, CalldataArgs, CalldataFormatter,
    PlonkCalldata,
};
use crate::error::{PrimitivesError, Result};
use crate::normalize::CanonicalValue;
use crate::schemes::ProvingScheme;

/// G1 commitments in the order they are packed into the proof blob.
pub const COMMITMENTS: [&str; 9] = ["A", "B", "C", "Z", "T1", "T2", "T3", "Wxi", "Wxiw"];

/// Evaluations in blob order. `eval_r` is only present in older proof layouts.
pub const EVALUATIONS: [&str; 6] = ["eval_a", "eval_b", "eval_c", "eval_s1", "eval_s2", "eval_zw"];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlonkProof {
    pub commitments: Vec<[U256; 2]>,
    pub evaluations: Vec<U256>,
}

impl PlonkProof {
    pub fn from_canonical(proof: &CanonicalValue) -> Result<Self> {
        let commitments = COMMITMENTS
            .iter()
            .map(|name| {
                let point = sequence(field(proof, name)?, name)?;
                Ok([word_at(point, 0, name)?, word_at(point, 1, name)?])
            })
            .collect::<Result<Vec<_>>>()?;

        let mut evaluations = EVALUATIONS
            .iter()
            .map(|name| evaluation(field(proof, name)?, name))
            .collect::<Result<Vec<_>>>()?;
        if let Some(eval_r) = proof.get("eval_r") {
            evaluations.push(evaluation(eval_r, "eval_r")?);
        }

        Ok(Self {
            commitments,
            evaluations,
        })
    }

    /// Concatenates every word as 32 big-endian bytes behind a `0x` prefix.
    pub fn blob(&self) -> String {
        let bytes: Vec<u8> = self
            .commitments
            .iter()
            .flatten()
            .chain(self.evaluations.iter())
            .flat_map(|w| w.to_be_bytes::<32>())
            .collect();
        format!("0x{}", hex::encode(bytes))
    }
}

fn evaluation(value: &CanonicalValue, name: &str) -> Result<U256> {
    let n = value.as_integer().ok_or_else(|| {
        PrimitivesError::FormatError(format!("{name} is not an integer: {value:?}"))
    })?;
    crate::calldata::to_word(n)
}

#[derive(Clone, Copy, Debug, Default)]
pub struct PlonkFormatter;

impl CalldataFormatter for PlonkFormatter {
    fn scheme(&self) -> ProvingScheme {
        ProvingScheme::Plonk
    }

    fn format(
        &self,
        proof: &CanonicalValue,
        public_signals: &CanonicalValue,
    ) -> Result<CalldataArgs> {
        let proof = PlonkProof::from_canonical(proof)?;
        let public_signals = signal_words(public_signals)?.iter().map(word_hex).collect();
        Ok(CalldataArgs::Plonk(PlonkCalldata {
            proof: proof.blob(),
            public_signals,
        }))
    }

    fn export(&self, proof: &CanonicalValue, public_signals: &CanonicalValue) -> Result<String> {
        let blob = PlonkProof::from_canonical(proof)?.blob();
        let signals = signal_words(public_signals)?
            .iter()
            .map(|w| format!("\"{}\"", word_hex(w)))
            .collect::<Vec<_>>()
            .join(",");
        Ok(format!("{blob},[{signals}]"))
    }

    /// The blob is everything before the first comma, untouched. The rest is
    /// the signal array; its brackets and quotes are stripped and each entry
    /// is kept as text.
    fn format_exported(&self, exported: &str) -> Result<CalldataArgs> {
        let (blob, signals) = exported.split_once(',').ok_or_else(|| {
            PrimitivesError::FormatError("plonk calldata has no public signal field".to_string())
        })?;

        let signals = signals.trim();
        let inner = signals
            .strip_prefix('[')
            .and_then(|s| s.strip_suffix(']'))
            .ok_or_else(|| {
                PrimitivesError::FormatError(format!(
                    "plonk public signals are not a bracketed list: {signals:?}"
                ))
            })?;

        let public_signals = inner
            .split(',')
            .map(|s| s.trim().trim_matches('"').to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Ok(CalldataArgs::Plonk(PlonkCalldata {
            proof: blob.trim().to_string(),
            public_signals,
        }))
    }
}
