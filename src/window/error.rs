use thiserror::Error;
use x11rb::errors::{ConnectError, ConnectionError, ReplyError, ReplyOrIdError};

/// Manager-level failures. Protocol errors for unchecked requests do not
/// show up here; they arrive in the event stream and are logged there.
#[derive(Debug, Error)]
pub enum WmError {
    #[error("another window manager is already running")]
    AlreadyManaged,

    #[error("failed to connect to X server: {0}")]
    Connect(#[from] ConnectError),

    #[error("X11 connection error: {0}")]
    Connection(#[from] ConnectionError),

    #[error("X11 request failed: {0}")]
    Reply(#[from] ReplyError),

    #[error("X11 id allocation failed: {0}")]
    IdAllocation(#[from] ReplyOrIdError),
}
