//! Core data types for Jobboard
//!
//! Records returned by the backend are typed on the identifiers the client
//! relies on; every other attribute is kept in a flattened JSON map so it
//! survives a round trip through the store untouched.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Free-form form fields sent to the backend (registration, profile edits,
/// new offers, projects).
pub type Form = Map<String, Value>;

/// Build a [`Form`] from `key=value` pairs
///
/// Values that parse as JSON (`42`, `true`, `["a"]`) keep their type; anything
/// else is sent as a string.
pub fn form_from_pairs<I, S>(pairs: I) -> crate::error::Result<Form>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut form = Form::new();
    for pair in pairs {
        let pair = pair.as_ref();
        let (key, raw) = pair.split_once('=').ok_or_else(|| {
            crate::error::JobBoardError::InvalidInput(format!(
                "Expected key=value, got '{}'",
                pair
            ))
        })?;
        let key = key.trim();
        if key.is_empty() {
            return Err(crate::error::JobBoardError::InvalidInput(format!(
                "Missing field name in '{}'",
                pair
            )));
        }
        let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
        form.insert(key.to_string(), value);
    }
    Ok(form)
}

/// Authenticated user profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl User {
    pub fn new(id: i64) -> Self {
        Self {
            id,
            email: None,
            attributes: Map::new(),
        }
    }
}

/// Job posting (`oferta`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobOffer {
    pub id: i64,

    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl JobOffer {
    pub fn new(id: i64) -> Self {
        Self {
            id,
            attributes: Map::new(),
        }
    }

    /// Builder-style attribute setter, mostly useful in tests and fixtures
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.to_string(), value.into());
        self
    }

    /// Title of the offer, if the backend sent one
    pub fn title(&self) -> Option<&str> {
        ["titulo", "title", "nombre"]
            .iter()
            .find_map(|key| self.attributes.get(*key).and_then(Value::as_str))
    }
}

/// A user's application (`postulación`) to a job offer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Application {
    pub user_id: i64,

    #[serde(rename = "oferta_id")]
    pub offer_id: i64,

    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl Application {
    pub fn new(user_id: i64, offer_id: i64) -> Self {
        Self {
            user_id,
            offer_id,
            attributes: Map::new(),
        }
    }
}

/// Portfolio project attached to a programmer profile (`proyecto`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,

    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

/// Role profile (`empleador` / `programador`) returned next to the user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,

    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

/// Severity of a user-facing message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackLevel {
    Success,
    Warning,
    Error,
}

impl std::fmt::Display for FeedbackLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FeedbackLevel::Success => write!(f, "success"),
            FeedbackLevel::Warning => write!(f, "warning"),
            FeedbackLevel::Error => write!(f, "error"),
        }
    }
}

/// `{msg, type}` record shown to the user after an action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feedback {
    pub msg: String,

    #[serde(rename = "type")]
    pub level: FeedbackLevel,
}

impl Feedback {
    pub fn success(msg: impl Into<String>) -> Self {
        Self {
            msg: msg.into(),
            level: FeedbackLevel::Success,
        }
    }
}

// ============================================================================
// Request and response payloads
// ============================================================================

/// Login credentials
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct OffersResponse {
    pub ofertas: Vec<JobOffer>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct OfferResponse {
    pub oferta: JobOffer,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApplicationsResponse {
    pub postulados: Vec<Application>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApplicantCountResponse {
    pub numero_postulados: u64,
}

/// Response of `GET /api/hello`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HelloResponse {
    pub message: String,
}

/// Response of a successful login
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

/// Response of registration and profile edits
///
/// Every field is optional: whatever the server sends is merged into the
/// store, whatever it omits is left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub msg: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,

    #[serde(default, rename = "empleador", skip_serializing_if = "Option::is_none")]
    pub employer: Option<Profile>,

    #[serde(default, rename = "programador", skip_serializing_if = "Option::is_none")]
    pub programmer: Option<Profile>,
}

/// Response of `POST /api/user/programador/addProjects`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectsResponse {
    #[serde(rename = "proyectos")]
    pub project: Project,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub msg: Option<String>,
}
