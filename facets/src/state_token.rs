//! Compact string form of filter and pin state, for links and for handing
//! pins to whatever stores them.

use std::{fmt::Display, str::FromStr};

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE;
use serde::{Deserialize, Serialize};

use crate::error::{FacetError, Result};


/// URL-safe base64 of the CBOR encoding of `T`.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct StateToken<T>(pub T);

impl<T> From<T> for StateToken<T> {
    fn from(value: T) -> Self {
        StateToken(value)
    }
}

impl<T: Serialize> StateToken<T> {
    pub fn encode(&self) -> Result<String> {
        let mut serialized = Vec::new();
        ciborium::into_writer(&self.0, &mut serialized)?;
        Ok(URL_SAFE.encode(serialized))
    }
}

// an empty string stands in for a value that failed to encode
impl<T: Serialize> Display for StateToken<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.encode() {
            Ok(token) => write!(f, "{}", token),
            Err(err) => {
                tracing::warn!(error = %err, "failed to encode state token");
                Ok(())
            }
        }
    }
}

impl<T: for<'de> Deserialize<'de>> FromStr for StateToken<T> {
    type Err = FacetError;

    fn from_str(s: &str) -> Result<Self> {
        let decoded = URL_SAFE.decode(s.trim().as_bytes())?;
        let parsed = ciborium::from_reader(std::io::Cursor::new(decoded))?;
        Ok(StateToken(parsed))
    }
}
