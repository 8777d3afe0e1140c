use thiserror::Error;

/// Result type alias for history store operations.
pub type HistoryResult<T> = Result<T, HistoryError>;

type Cause = Box<dyn std::error::Error + Send + Sync>;

/// Failure taxonomy of the history store.
///
/// Each variant is terminal for the operation that produced it; the store
/// never retries on its own.
#[derive(Error, Debug)]
pub enum HistoryError {
    /// The database file or schema could not be prepared.
    #[error("history store unavailable: {message}")]
    Init {
        message: String,
        #[source]
        source: Option<Cause>,
    },

    /// An append, delete or clear failed after the store was ready.
    #[error("history write failed: {message}")]
    Write {
        message: String,
        #[source]
        source: Option<Cause>,
    },

    /// A retrieval failed after the store was ready.
    #[error("history read failed: {message}")]
    Read {
        message: String,
        #[source]
        source: Option<Cause>,
    },
}

impl HistoryError {
    pub(crate) fn init(message: impl Into<String>, source: impl Into<Cause>) -> Self {
        Self::Init {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    pub(crate) fn write(message: impl Into<String>, source: impl Into<Cause>) -> Self {
        Self::Write {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    pub(crate) fn read(message: impl Into<String>, source: impl Into<Cause>) -> Self {
        Self::Read {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// A write rejected before reaching the database.
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::Write {
            message: message.into(),
            source: None,
        }
    }

    /// Message plus the underlying cause on one line.
    pub fn summary(&self) -> String {
        let (Self::Init { message, source }
        | Self::Write { message, source }
        | Self::Read { message, source }) = self;
        match source {
            Some(cause) => format!("{message}: {cause}"),
            None => message.clone(),
        }
    }

    pub const fn is_init(&self) -> bool {
        matches!(self, Self::Init { .. })
    }

    pub const fn is_write(&self) -> bool {
        matches!(self, Self::Write { .. })
    }

    pub const fn is_read(&self) -> bool {
        matches!(self, Self::Read { .. })
    }
}
