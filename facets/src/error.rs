//! Errors for the fallible edges of the engine. Filtering and ranking never fail.

#[derive(Debug, thiserror::Error)]
pub enum FacetError {
    #[error("failed to decode base64: {0}")]
    Decode(#[from] base64::DecodeError),

    #[error("failed to deserialize: {0}")]
    Deserialize(#[from] ciborium::de::Error<std::io::Error>),

    #[error("failed to serialize: {0}")]
    Encode(#[from] ciborium::ser::Error<std::io::Error>),

    #[error("invalid value for {name}: {value:?}")]
    InvalidConfig { name: &'static str, value: String },
}

pub type Result<T> = std::result::Result<T, FacetError>;
