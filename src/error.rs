use core::fmt;

/// Result alias used by the small corner of this crate that has a real
/// error channel (configuration validation, platform capability probing).
///
/// Everything else — `Reserver`, the containers, `ALE` — follows §7 of the
/// design: no in-band error channel, just `bool`/`Option`/sentinel values.
pub type QResult<T> = Result<T, Error>;

#[derive(Debug)]
pub enum Error {
    InvalidConfig(String),
    PlatformUnavailable(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidConfig(msg) => write!(f, "invalid configuration: {msg}"),
            Self::PlatformUnavailable(what) => write!(f, "platform primitive unavailable: {what}"),
        }
    }
}

impl std::error::Error for Error {}
