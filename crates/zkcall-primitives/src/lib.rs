//! Core types for turning prover output into verifier calldata
//!
//! This crate re-exports the alloy types used at the calldata boundary so
//! downstream crates agree on a single version of them.

pub mod alloy {
    pub mod primitives {
        pub use alloy::primitives::{keccak256, Address, Bytes, U256};
    }

    pub mod dyn_abi {
        pub use alloy::dyn_abi::{DynSolValue, FunctionExt, JsonAbiExt};
    }

    pub mod json_abi {
        pub use alloy::json_abi::Function;
    }
}

pub mod calldata;
pub mod error;
pub mod inputs;
pub mod normalize;
pub mod schemes;

pub use calldata::{formatter_for, CalldataArgs, CalldataFormatter};
pub use error::{PrimitivesError, Result};
pub use inputs::NamedInputSet;
pub use normalize::{normalize, CanonicalValue};
pub use schemes::ProvingScheme;
