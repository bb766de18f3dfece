use thiserror::Error;

/// Failure talking to the identity service.
///
/// The sync service treats every variant the same way — "remote
/// unavailable" — so the split exists for logging and for callers of the
/// delete operation.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("identity service responded with HTTP {0}")]
    Status(u16),

    #[error("identity service unreachable: {0}")]
    Transport(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, RemoteError>;
