use stasher_core_types::RequestId;
use thiserror::Error;

/// Result type alias using ExError
pub type Result<T> = std::result::Result<T, ExError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code that can be used for programmatic
/// error handling, testing, and reporting to an alerting collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Input
    InvalidEvent,
    InvalidConfig,

    // Integration/IO
    Io,
    Serialization,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::InvalidEvent => "ERR_INVALID_EVENT",
            ExErrorKind::InvalidConfig => "ERR_INVALID_CONFIG",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }
}

/// Canonical structured error type
///
/// Carries a classification for programmatic handling plus the context
/// needed when the error is reported out of band.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    request_id: Option<RequestId>,
    sequence_id: Option<u64>,
    message: String,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            request_id: None,
            sequence_id: None,
            message: String::new(),
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add request ID context
    pub fn with_request_id(mut self, request_id: RequestId) -> Self {
        self.request_id = Some(request_id);
        self
    }

    /// Add the sequence id of the event being handled
    pub fn with_sequence_id(mut self, sequence_id: u64) -> Self {
        self.sequence_id = Some(sequence_id);
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Get the operation context, if any
    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    /// Get the request ID context, if any
    pub fn request_id(&self) -> Option<&RequestId> {
        self.request_id.as_ref()
    }

    /// Get the event sequence id, if any
    pub fn sequence_id(&self) -> Option<u64> {
        self.sequence_id
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(sequence_id) = self.sequence_id {
            write!(f, " (sequence_id: {})", sequence_id)?;
        }
        if let Some(request_id) = &self.request_id {
            write!(f, " (request_id: {})", request_id)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {}

// ========== End Error Facility ==========

/// Concrete failures raised inside Stasher
#[derive(Error, Debug)]
pub enum StasherError {
    /// The record sink refused the line
    #[error("Sink write failed: {source}")]
    SinkWrite {
        #[source]
        source: std::io::Error,
    },

    /// The record could not be rendered to JSON
    #[error("Record rendering failed: {source}")]
    Render {
        #[source]
        source: serde_json::Error,
    },

    /// Configuration file could not be read
    #[error("Cannot read configuration {path}: {source}")]
    ConfigRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Configuration is syntactically or semantically invalid
    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    /// The event stream could not be read
    #[error("Cannot read events: {source}")]
    EventRead {
        #[source]
        source: std::io::Error,
    },

    /// An inbound event line could not be decoded
    #[error("Invalid event at line {line}: {reason}")]
    InvalidEvent { line: usize, reason: String },
}

impl From<StasherError> for ExError {
    fn from(err: StasherError) -> Self {
        let message = err.to_string();
        match err {
            StasherError::SinkWrite { .. } => ExError::new(ExErrorKind::Io)
                .with_op("sink_write")
                .with_message(message),

            StasherError::Render { .. } => ExError::new(ExErrorKind::Serialization)
                .with_op("render")
                .with_message(message),

            StasherError::ConfigRead { .. } => ExError::new(ExErrorKind::Io)
                .with_op("config_read")
                .with_message(message),

            StasherError::InvalidConfig { .. } => ExError::new(ExErrorKind::InvalidConfig)
                .with_op("config_parse")
                .with_message(message),

            StasherError::EventRead { .. } => ExError::new(ExErrorKind::Io)
                .with_op("event_read")
                .with_message(message),

            StasherError::InvalidEvent { .. } => ExError::new(ExErrorKind::InvalidEvent)
                .with_op("event_decode")
                .with_message(message),
        }
    }
}
