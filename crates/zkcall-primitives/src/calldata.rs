//! Verifier call arguments and the formatters that build them.
//!
//! Each proving scheme has its own verifier call shape. A [`CalldataFormatter`]
//! maps normalized prover output into that shape, either directly from the
//! typed proof ([`CalldataFormatter::format`]) or by parsing the delimited text
//! that verifier export tooling prints ([`CalldataFormatter::format_exported`]).

use crate::alloy::primitives::U256;
use crate::error::{PrimitivesError, Result};
use crate::normalize::{parse_numeric, CanonicalValue};
use crate::schemes::groth16::Groth16Formatter;
use crate::schemes::plonk::PlonkFormatter;
use crate::schemes::ProvingScheme;
use num_bigint::BigUint;
use std::fmt::Debug;

/// Number of words ahead of the public inputs in a flat Groth16 export.
pub const GROTH16_PROOF_WORDS: usize = 8;

/// Positional arguments for `verifyProof(a, b, c, input)`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Groth16Calldata {
    pub a: [U256; 2],
    pub b: [[U256; 2]; 2],
    pub c: [U256; 2],
    pub inputs: Vec<U256>,
}

impl Groth16Calldata {
    /// Splits `8 + N` words into `a = [0,1]`, `b = [[2,3],[4,5]]`, `c = [6,7]`
    /// and `inputs = [8..8+N)`.
    pub fn from_flat(words: &[U256]) -> Result<Self> {
        if words.len() < GROTH16_PROOF_WORDS {
            return Err(PrimitivesError::FormatError(format!(
                "groth16 calldata needs at least {GROTH16_PROOF_WORDS} words, got {}",
                words.len()
            )));
        }
        Ok(Self {
            a: [words[0], words[1]],
            b: [[words[2], words[3]], [words[4], words[5]]],
            c: [words[6], words[7]],
            inputs: words[GROTH16_PROOF_WORDS..].to_vec(),
        })
    }

    /// All-zero arguments of the right arity.
    pub fn sentinel(public_inputs: usize) -> Self {
        Self {
            a: [U256::ZERO; 2],
            b: [[U256::ZERO; 2]; 2],
            c: [U256::ZERO; 2],
            inputs: vec![U256::ZERO; public_inputs],
        }
    }
}

/// Arguments for `verifyProof(proof, pubSignals)`.
///
/// Both fields stay textual; integer conversion happens at the call boundary.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlonkCalldata {
    pub proof: String,
    pub public_signals: Vec<String>,
}

impl PlonkCalldata {
    pub fn sentinel() -> Self {
        Self {
            proof: "0x00".to_string(),
            public_signals: vec!["0x00".to_string()],
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CalldataArgs {
    Groth16(Groth16Calldata),
    Plonk(PlonkCalldata),
}

impl CalldataArgs {
    pub fn scheme(&self) -> ProvingScheme {
        match self {
            Self::Groth16(_) => ProvingScheme::Groth16,
            Self::Plonk(_) => ProvingScheme::Plonk,
        }
    }

    /// The fixed sentinel used to check that a verifier rejects an empty proof.
    pub fn sentinel(scheme: ProvingScheme, public_inputs: usize) -> Self {
        match scheme {
            ProvingScheme::Groth16 => Self::Groth16(Groth16Calldata::sentinel(public_inputs)),
            ProvingScheme::Plonk => Self::Plonk(PlonkCalldata::sentinel()),
        }
    }
}

pub trait CalldataFormatter: Send + Sync + Debug {
    fn scheme(&self) -> ProvingScheme;

    /// Maps a normalized proof and its public signals straight into call arguments.
    fn format(&self, proof: &CanonicalValue, public_signals: &CanonicalValue)
        -> Result<CalldataArgs>;

    /// Renders the delimited calldata text for a normalized proof.
    fn export(&self, proof: &CanonicalValue, public_signals: &CanonicalValue) -> Result<String>;

    /// Parses delimited calldata text into call arguments.
    fn format_exported(&self, exported: &str) -> Result<CalldataArgs>;
}

static GROTH16_FORMATTER: Groth16Formatter = Groth16Formatter;
static PLONK_FORMATTER: PlonkFormatter = PlonkFormatter;

pub fn formatter_for(scheme: ProvingScheme) -> &'static dyn CalldataFormatter {
    match scheme {
        ProvingScheme::Groth16 => &GROTH16_FORMATTER,
        ProvingScheme::Plonk => &PLONK_FORMATTER,
    }
}

pub(crate) fn to_word(n: &BigUint) -> Result<U256> {
    if n.bits() > 256 {
        return Err(PrimitivesError::ValueOutOfRange(n.to_str_radix(10)));
    }
    Ok(U256::from_be_slice(&n.to_bytes_be()))
}

/// `0x` followed by the 32 byte big-endian hex of `word`.
pub(crate) fn word_hex(word: &U256) -> String {
    format!("0x{}", hex::encode(word.to_be_bytes::<32>()))
}

/// Parses one exported token (decimal or `0x` hex) into a word.
pub(crate) fn token_to_word(token: &str) -> Result<U256> {
    let n = parse_numeric(token).ok_or_else(|| {
        PrimitivesError::FormatError(format!("calldata token is not an integer: {token:?}"))
    })?;
    to_word(&n)
}

pub(crate) fn field<'a>(value: &'a CanonicalValue, key: &str) -> Result<&'a CanonicalValue> {
    value
        .get(key)
        .ok_or_else(|| PrimitivesError::FormatError(format!("proof is missing field {key:?}")))
}

pub(crate) fn sequence<'a>(value: &'a CanonicalValue, what: &str) -> Result<&'a [CanonicalValue]> {
    value
        .as_sequence()
        .ok_or_else(|| PrimitivesError::FormatError(format!("{what} is not a sequence")))
}

pub(crate) fn word_at(items: &[CanonicalValue], index: usize, what: &str) -> Result<U256> {
    let item = items.get(index).ok_or_else(|| {
        PrimitivesError::FormatError(format!("{what} has no element {index}"))
    })?;
    let n = item.as_integer().ok_or_else(|| {
        PrimitivesError::FormatError(format!("{what}[{index}] is not an integer: {item:?}"))
    })?;
    to_word(n)
}

/// Public signals as words, in their original order.
pub(crate) fn signal_words(public_signals: &CanonicalValue) -> Result<Vec<U256>> {
    let items = sequence(public_signals, "public signals")?;
    (0..items.len())
        .map(|i| word_at(items, i, "public signals"))
        .collect()
}
