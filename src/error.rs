use engine::EngineError;
use std::fmt::{self, Display};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The engine rejected the input.
    Engine(EngineError),
    /// The background context couldn't be started.
    Spawn(String),
    /// The background context went away without sending a response.
    Disconnected,
    /// The background context reported an error instead of a response.
    Crashed(String),
    /// The background context answered with a response meant for another task.
    UnexpectedResponse { task: &'static str, got: &'static str },
}

impl Error {
    /// Whether the failure came from the background context rather than the input.
    pub fn is_background_failure(&self) -> bool {
        !matches!(self, Error::Engine(_))
    }
}

impl From<EngineError> for Error {
    fn from(other: EngineError) -> Self {
        Self::Engine(other)
    }
}

impl Display for Error {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Engine(err) => write!(fmt, "{}", err),
            Error::Spawn(err) => write!(fmt, "Could not start background context: {}", err),
            Error::Disconnected => write!(fmt, "Background context exited before sending a response."),
            Error::Crashed(msg) => write!(fmt, "Background context failed: {}", msg),
            Error::UnexpectedResponse { task, got } => {
                write!(fmt, "Expected a {} response, got a {} response.", task, got)
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Engine(err) => Some(err),
            _ => None,
        }
    }
}
