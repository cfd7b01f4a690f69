use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum SessionError {
    SessionCreationError(String),
    MediaAcquisitionError(String),
    IceCandidateError(String),
    AnswerProcessingError(String),
    EngineError(String),
    InvalidState(String),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SessionError::SessionCreationError(msg) => {
                write!(f, "Session creation error: {}", msg)
            }
            SessionError::MediaAcquisitionError(msg) => {
                write!(f, "Media acquisition error: {}", msg)
            }
            SessionError::IceCandidateError(msg) => write!(f, "ICE candidate error: {}", msg),
            SessionError::AnswerProcessingError(msg) => {
                write!(f, "Answer processing error: {}", msg)
            }
            SessionError::EngineError(msg) => write!(f, "Signaling engine error: {}", msg),
            SessionError::InvalidState(msg) => write!(f, "Invalid session state: {}", msg),
        }
    }
}

impl std::error::Error for SessionError {}
