//! Error types for reader-driver operations.

/// Result type alias for driver operations.
pub type Result<T> = std::result::Result<T, DriverError>;

/// Errors that can occur at the reader-driver boundary.
///
/// Setup failures (`ContextInit`, `DeviceOpen`, `InitiatorInit`) are
/// surfaced once per run as a single error event and never retried; the
/// remaining variants cover polling-time I/O.
#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    /// Reader context could not be initialized.
    #[error("Failed to initialize reader context: {message}")]
    ContextInit { message: String },

    /// No reader device could be opened.
    #[error("Failed to open reader device: {message}")]
    DeviceOpen { message: String },

    /// Device refused to enter initiator (polling) mode.
    #[error("Failed to configure initiator mode: {message}")]
    InitiatorInit { message: String },

    /// Device went away mid-run.
    #[error("Reader disconnected: {device}")]
    Disconnected { device: String },

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl DriverError {
    /// Create a new context initialization error.
    pub fn context_init(message: impl Into<String>) -> Self {
        Self::ContextInit {
            message: message.into(),
        }
    }

    /// Create a new device open error.
    pub fn device_open(message: impl Into<String>) -> Self {
        Self::DeviceOpen {
            message: message.into(),
        }
    }

    /// Create a new initiator configuration error.
    pub fn initiator_init(message: impl Into<String>) -> Self {
        Self::InitiatorInit {
            message: message.into(),
        }
    }

    /// Create a new disconnected error.
    pub fn disconnected(device: impl Into<String>) -> Self {
        Self::Disconnected {
            device: device.into(),
        }
    }
}
