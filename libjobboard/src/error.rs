//! Error types for Jobboard

use thiserror::Error;

use crate::types::{Feedback, FeedbackLevel};

pub type Result<T> = std::result::Result<T, JobBoardError>;

/// Message shown when an authenticated action runs without a session.
pub const UNAUTHENTICATED_MSG: &str = "Usuario no autenticado: registrate o inicia sesión";

#[derive(Error, Debug)]
pub enum JobBoardError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("HTTP client error: {0}")]
    Transport(#[from] TransportError),

    #[error("{0}")]
    Action(#[from] ActionError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl JobBoardError {
    /// Returns the appropriate exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            JobBoardError::InvalidInput(_) => 3,
            JobBoardError::Action(e) => e.exit_code(),
            JobBoardError::Config(_) => 1,
            JobBoardError::Storage(_) => 1,
            JobBoardError::Transport(_) => 1,
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing required field: {0}")]
    MissingField(String),
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Stored session is corrupt: {0}")]
    Corrupt(String),

    #[error("OS keyring not accessible: {0}")]
    KeyringUnavailable(String),

    #[error("Keyring error: {0}")]
    Keyring(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Failed to build HTTP client: {0}")]
    Build(String),
}

/// The one error type returned by every store action.
///
/// Each variant maps to a user-facing [`Feedback`] record through
/// [`ActionError::feedback`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ActionError {
    /// No bearer token was available; no request was sent.
    #[error("{}", UNAUTHENTICATED_MSG)]
    Unauthenticated,

    /// The request never produced an HTTP response.
    #[error("{message}")]
    Network { message: String, cause: String },

    /// The server answered with a non-2xx status.
    #[error("{message}")]
    Http { status: u16, message: String },

    /// Input was rejected before any request was sent.
    #[error("{0}")]
    Validation(String),

    /// The server answered 2xx with a body the client cannot use.
    #[error("Respuesta inesperada del servidor: {0}")]
    Decode(String),

    /// The durable session storage failed.
    #[error("Error al guardar la sesión: {0}")]
    Storage(String),
}

impl ActionError {
    /// Severity used when the error is shown to the user.
    ///
    /// Server rejections are warnings; everything the user cannot fix by
    /// changing the request is an error.
    pub fn level(&self) -> FeedbackLevel {
        match self {
            ActionError::Http { .. } | ActionError::Validation(_) => FeedbackLevel::Warning,
            _ => FeedbackLevel::Error,
        }
    }

    pub fn feedback(&self) -> Feedback {
        Feedback {
            msg: self.to_string(),
            level: self.level(),
        }
    }

    /// Process exit code for command-line front ends
    pub fn exit_code(&self) -> i32 {
        match self {
            ActionError::Unauthenticated => 2,
            ActionError::Validation(_) => 3,
            _ => 1,
        }
    }

    pub fn is_unauthenticated(&self) -> bool {
        matches!(self, ActionError::Unauthenticated)
    }
}

impl From<StorageError> for ActionError {
    fn from(err: StorageError) -> Self {
        ActionError::Storage(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code_invalid_input() {
        let error = JobBoardError::InvalidInput("missing offer id".to_string());
        assert_eq!(error.exit_code(), 3);
    }

    #[test]
    fn test_exit_code_unauthenticated() {
        let error = JobBoardError::Action(ActionError::Unauthenticated);
        assert_eq!(error.exit_code(), 2);
    }

    #[test]
    fn test_exit_code_validation_is_input_error() {
        let error: JobBoardError = ActionError::Validation("Faltan campos".to_string()).into();
        assert_eq!(error.exit_code(), 3);
    }

    #[test]
    fn test_exit_code_http_and_network() {
        let http: JobBoardError = ActionError::Http {
            status: 500,
            message: "boom".to_string(),
        }
        .into();
        let network: JobBoardError = ActionError::Network {
            message: "Error en la solicitud".to_string(),
            cause: "connection refused".to_string(),
        }
        .into();
        assert_eq!(http.exit_code(), 1);
        assert_eq!(network.exit_code(), 1);
    }

    #[test]
    fn test_exit_code_config_and_storage() {
        let config = JobBoardError::Config(ConfigError::MissingField("api.base_url".to_string()));
        let storage = JobBoardError::Storage(StorageError::Corrupt("bad json".to_string()));
        assert_eq!(config.exit_code(), 1);
        assert_eq!(storage.exit_code(), 1);
    }

    #[test]
    fn test_unauthenticated_feedback() {
        let feedback = ActionError::Unauthenticated.feedback();
        assert_eq!(feedback.msg, UNAUTHENTICATED_MSG);
        assert_eq!(feedback.level, FeedbackLevel::Error);
    }

    #[test]
    fn test_http_error_is_warning_with_server_message() {
        let error = ActionError::Http {
            status: 409,
            message: "Ya estás inscrito en esta oferta".to_string(),
        };
        let feedback = error.feedback();
        assert_eq!(feedback.msg, "Ya estás inscrito en esta oferta");
        assert_eq!(feedback.level, FeedbackLevel::Warning);
    }

    #[test]
    fn test_network_error_shows_action_message_not_cause() {
        let error = ActionError::Network {
            message: "Error en la solicitud de inscripcion.".to_string(),
            cause: "dns error".to_string(),
        };
        assert_eq!(error.to_string(), "Error en la solicitud de inscripcion.");
        assert_eq!(error.level(), FeedbackLevel::Error);
    }

    #[test]
    fn test_error_message_formatting_config() {
        let error = JobBoardError::Config(ConfigError::MissingField("storage.path".to_string()));
        assert_eq!(
            error.to_string(),
            "Configuration error: Missing required field: storage.path"
        );
    }

    #[test]
    fn test_action_error_displays_transparently() {
        let error: JobBoardError =
            ActionError::Validation("Las contraseñas no coinciden".to_string()).into();
        assert_eq!(error.to_string(), "Las contraseñas no coinciden");
    }

    #[test]
    fn test_storage_error_converts_into_action_error() {
        let error: ActionError = StorageError::Keyring("locked".to_string()).into();
        match error {
            ActionError::Storage(message) => assert!(message.contains("locked")),
            other => panic!("Expected ActionError::Storage, got {:?}", other),
        }
    }

    #[test]
    fn test_transport_error_formatting() {
        let error = TransportError::Network("connection refused".to_string());
        assert_eq!(error.to_string(), "Network error: connection refused");
    }
}
