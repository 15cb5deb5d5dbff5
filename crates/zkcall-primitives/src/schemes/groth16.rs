use crate::alloy::primitives::U256;
use crate::calldata::{
    field, sequence, signal_words, token_to_word, word_at, word_hex, CalldataArgs,
    CalldataFormatter, Groth16Calldata,
};
use crate::error::Result;
use crate::normalize::CanonicalValue;
use crate::schemes::ProvingScheme;

/// A normalized Groth16 proof in affine coordinates.
///
/// `b` keeps the prover's coordinate order, `[[x.c0, x.c1], [y.c0, y.c1]]`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Groth16Proof {
    pub a: [U256; 2],
    pub b: [[U256; 2]; 2],
    pub c: [U256; 2],
}

impl Groth16Proof {
    /// Reads `pi_a`, `pi_b` and `pi_c` out of a normalized proof object.
    pub fn from_canonical(proof: &CanonicalValue) -> Result<Self> {
        let pi_a = sequence(field(proof, "pi_a")?, "pi_a")?;
        let pi_b = sequence(field(proof, "pi_b")?, "pi_b")?;
        let pi_c = sequence(field(proof, "pi_c")?, "pi_c")?;

        let b_x = pi_b
            .first()
            .map(|v| sequence(v, "pi_b[0]"))
            .transpose()?
            .unwrap_or_default();
        let b_y = pi_b
            .get(1)
            .map(|v| sequence(v, "pi_b[1]"))
            .transpose()?
            .unwrap_or_default();

        Ok(Self {
            a: [word_at(pi_a, 0, "pi_a")?, word_at(pi_a, 1, "pi_a")?],
            b: [
                [word_at(b_x, 0, "pi_b[0]")?, word_at(b_x, 1, "pi_b[0]")?],
                [word_at(b_y, 0, "pi_b[1]")?, word_at(b_y, 1, "pi_b[1]")?],
            ],
            c: [word_at(pi_c, 0, "pi_c")?, word_at(pi_c, 1, "pi_c")?],
        })
    }

    /// The verifier takes each G2 coordinate pair as `(c1, c0)`.
    pub fn into_calldata(self, inputs: Vec<U256>) -> Groth16Calldata {
        let [[x0, x1], [y0, y1]] = self.b;
        Groth16Calldata {
            a: self.a,
            b: [[x1, x0], [y1, y0]],
            c: self.c,
            inputs,
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct Groth16Formatter;

impl CalldataFormatter for Groth16Formatter {
    fn scheme(&self) -> ProvingScheme {
        ProvingScheme::Groth16
    }

    fn format(
        &self,
        proof: &CanonicalValue,
        public_signals: &CanonicalValue,
    ) -> Result<CalldataArgs> {
        let proof = Groth16Proof::from_canonical(proof)?;
        let inputs = signal_words(public_signals)?;
        Ok(CalldataArgs::Groth16(proof.into_calldata(inputs)))
    }

    fn export(&self, proof: &CanonicalValue, public_signals: &CanonicalValue) -> Result<String> {
        let calldata =
            Groth16Proof::from_canonical(proof)?.into_calldata(signal_words(public_signals)?);
        let quoted = |w: &U256| format!("\"{}\"", word_hex(w));
        let inputs = calldata
            .inputs
            .iter()
            .map(quoted)
            .collect::<Vec<_>>()
            .join(",");

        Ok(format!(
            "[{}, {}],[[{}, {}],[{}, {}]],[{}, {}],[{}]",
            quoted(&calldata.a[0]),
            quoted(&calldata.a[1]),
            quoted(&calldata.b[0][0]),
            quoted(&calldata.b[0][1]),
            quoted(&calldata.b[1][0]),
            quoted(&calldata.b[1][1]),
            quoted(&calldata.c[0]),
            quoted(&calldata.c[1]),
            inputs
        ))
    }

    /// Strips brackets, quotes and whitespace, splits on commas, reads every
    /// token as an integer, then partitions the words positionally.
    fn format_exported(&self, exported: &str) -> Result<CalldataArgs> {
        let stripped: String = exported
            .chars()
            .filter(|c| !matches!(c, '"' | '[' | ']') && !c.is_whitespace())
            .collect();

        let words = stripped
            .split(',')
            .filter(|token| !token.is_empty())
            .map(token_to_word)
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!(words = words.len(), "groth16 calldata tokens parsed");

        Ok(CalldataArgs::Groth16(Groth16Calldata::from_flat(&words)?))
    }
}
