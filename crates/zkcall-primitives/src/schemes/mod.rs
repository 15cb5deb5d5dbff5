use crate::error::PrimitivesError;
use serde::{Deserialize, Serialize};
use std::fmt;

pub mod groth16;
pub mod plonk;

// Helper macro to count the number of variants - define this first
macro_rules! count {
    () => (0usize);
    ($head:tt $(,$tail:tt)*) => (1usize + count!($($tail),*));
}

// Macro for generating scheme ids and their string forms
macro_rules! proving_schemes {
    (
        $(
            $(#[$attr:meta])*
            ($variant:ident, $str:literal)
        ),* $(,)?
    ) => {
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum ProvingScheme {
            $(
                $(#[$attr])*
                #[serde(rename = $str)]
                $variant
            ),*
        }

        impl ProvingScheme {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $str),*
                }
            }

            pub const fn all() -> [ProvingScheme; {count!($($variant),*)}] {
                [
                    $(ProvingScheme::$variant),*
                ]
            }
        }

        pub const SCHEMES: [ProvingScheme; {count!($($variant),*)}] = ProvingScheme::all();

        impl TryFrom<&str> for ProvingScheme {
            type Error = PrimitivesError;

            fn try_from(s: &str) -> core::result::Result<Self, Self::Error> {
                match s.to_lowercase().as_str() {
                    $($str => Ok(Self::$variant),)*
                    _ => Err(PrimitivesError::InvalidScheme(s.to_string()))
                }
            }
        }
    }
}

proving_schemes! {
    /// Pairing-based scheme, verified on chain with a pairing check.
    (Groth16, "groth16"),
    /// Polynomial-commitment scheme, verified on chain by opening checks.
    (Plonk, "plonk"),
}

impl fmt::Display for ProvingScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
