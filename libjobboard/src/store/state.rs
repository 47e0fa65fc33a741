//! Job board client state
//!
//! All transitions happen through the reducer (see `reducer.rs`).

use crate::types::{Application, JobOffer, Profile, Project, User};

/// Root client state for the job board
///
/// This is the single source of truth for the session and for every
/// collection cached from the server.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClientState {
    /// Bearer credential, mirrored from durable storage on hydration
    pub token: Option<String>,

    /// Logged-in user
    pub user: Option<User>,

    /// Greeting from `/api/hello`
    pub message: Option<String>,

    /// Last status message from registration or profile edits
    pub msg: Option<String>,

    /// Last status flag from registration or profile edits
    pub success: Option<bool>,

    pub employer: Option<Profile>,

    pub programmer: Option<Profile>,

    /// All offers, in server order
    pub job_offers: Vec<JobOffer>,

    /// Offer opened in the detail view
    pub selected_job_offer: Option<JobOffer>,

    /// Offers the current user applied to
    pub user_applications: Vec<Application>,

    pub projects: Vec<Project>,
}

/// Field identifiers used for load tickets and change notifications
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Token,
    User,
    Message,
    Msg,
    Success,
    Employer,
    Programmer,
    JobOffers,
    SelectedJobOffer,
    UserApplications,
    Projects,
}

impl ClientState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a bearer token is present
    pub fn is_authenticated(&self) -> bool {
        self.token.as_deref().is_some_and(|token| !token.is_empty())
    }

    /// Whether the current user applied to `offer_id`
    pub fn has_applied(&self, offer_id: i64) -> bool {
        self.user_applications
            .iter()
            .any(|application| application.offer_id == offer_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_state_is_empty() {
        let state = ClientState::new();
        assert!(state.token.is_none());
        assert!(state.user.is_none());
        assert!(state.job_offers.is_empty());
        assert!(state.user_applications.is_empty());
        assert!(state.projects.is_empty());
        assert!(!state.is_authenticated());
    }

    #[test]
    fn test_empty_token_is_not_authenticated() {
        let state = ClientState {
            token: Some(String::new()),
            ..ClientState::default()
        };
        assert!(!state.is_authenticated());
    }

    #[test]
    fn test_has_applied() {
        let state = ClientState {
            user_applications: vec![Application::new(7, 42)],
            ..ClientState::default()
        };
        assert!(state.has_applied(42));
        assert!(!state.has_applied(43));
    }
}
