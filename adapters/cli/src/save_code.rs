//! Single-line save codes that carry a [`SaveRecord`] between sessions.

use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use idle_defence_core::SaveRecord;
use thiserror::Error;

const CODE_DOMAIN: &str = "idle";
const CODE_VERSION: &str = "v1";

/// Identifier prefix emitted before the wave and payload segments.
pub(crate) const CODE_HEADER: &str = "idle:v1";
const FIELD_DELIMITER: char = ':';

/// Errors raised while producing or reading a save code.
#[derive(Debug, Error)]
pub(crate) enum SaveCodeError {
    /// The provided string was empty or contained only whitespace.
    #[error("save code was empty")]
    Empty,
    /// A segment of the code was missing.
    #[error("save code is missing the {0} segment")]
    MissingSegment(&'static str),
    /// The code did not start with the expected domain.
    #[error("save code prefix '{0}' is not supported")]
    InvalidPrefix(String),
    /// The code used an unsupported version identifier.
    #[error("save code version '{0}' is not supported")]
    UnsupportedVersion(String),
    /// The wave segment was not a number.
    #[error("could not parse wave '{0}'")]
    InvalidWave(String),
    /// The wave segment disagrees with the payload.
    #[error("save code claims wave {claimed} but the record holds wave {recorded}")]
    WaveMismatch {
        /// Wave named by the header.
        claimed: u32,
        /// Wave stored in the payload.
        recorded: u32,
    },
    /// The base64 payload could not be decoded.
    #[error("could not decode save payload")]
    InvalidEncoding(#[source] base64::DecodeError),
    /// The record could not be serialised or deserialised.
    #[error("could not process save payload")]
    InvalidPayload(#[source] serde_json::Error),
}

/// Encodes `record` as `idle:v1:<wave>:<payload>`.
pub(crate) fn encode(record: &SaveRecord) -> Result<String, SaveCodeError> {
    let json = serde_json::to_vec(record).map_err(SaveCodeError::InvalidPayload)?;
    let payload = STANDARD_NO_PAD.encode(json);
    Ok(format!("{CODE_HEADER}:{}:{payload}", record.current_wave))
}

/// Decodes a code produced by [`encode`].
pub(crate) fn decode(value: &str) -> Result<SaveRecord, SaveCodeError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(SaveCodeError::Empty);
    }

    let mut parts = trimmed.split(FIELD_DELIMITER);
    let domain = parts.next().ok_or(SaveCodeError::MissingSegment("prefix"))?;
    let version = parts
        .next()
        .ok_or(SaveCodeError::MissingSegment("version"))?;
    let wave = parts.next().ok_or(SaveCodeError::MissingSegment("wave"))?;
    let payload = parts
        .next()
        .ok_or(SaveCodeError::MissingSegment("payload"))?;

    if domain != CODE_DOMAIN {
        return Err(SaveCodeError::InvalidPrefix(domain.to_owned()));
    }
    if version != CODE_VERSION {
        return Err(SaveCodeError::UnsupportedVersion(version.to_owned()));
    }

    let claimed = wave
        .trim()
        .parse::<u32>()
        .map_err(|_| SaveCodeError::InvalidWave(wave.to_owned()))?;
    let bytes = STANDARD_NO_PAD
        .decode(payload.as_bytes())
        .map_err(SaveCodeError::InvalidEncoding)?;
    let record: SaveRecord =
        serde_json::from_slice(&bytes).map_err(SaveCodeError::InvalidPayload)?;

    if record.current_wave != claimed {
        return Err(SaveCodeError::WaveMismatch {
            claimed,
            recorded: record.current_wave,
        });
    }
    Ok(record)
}
