use thiserror::Error;

#[derive(Error, Debug)]
pub enum PrimitivesError {
    #[error("Invalid named input: {0}")]
    InputError(String),
    #[error("Calldata format error: {0}")]
    FormatError(String),
    #[error("Value does not fit in a 256 bit word: {0}")]
    ValueOutOfRange(String),
    #[error("Invalid proving scheme: {0}")]
    InvalidScheme(String),
}

pub type Result<T> = core::result::Result<T, PrimitivesError>;
