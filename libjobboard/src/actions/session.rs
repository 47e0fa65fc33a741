//! Session and profile actions

use serde_json::{json, Value};

use super::JobBoard;
use crate::api::{decode, http_error};
use crate::error::ActionError;
use crate::store::Mutation;
use crate::transport::ApiRequest;
use crate::types::{AuthResponse, Credentials, Form, LoginResponse, ProjectsResponse, User};

const REGISTER_FAILED: &str = "Error al conectarse con el backend.";
const LOGIN_FAILED: &str = "Error al conectarse con el backend.";
const EDIT_FAILED: &str = "Error al conectarse con el backend.";
const ADD_PROJECTS_FAILED: &str = "Error al conectarse con el backend.";
const RESET_PASSWORD_FAILED: &str = "Error al cambiar contraseña.";

pub const MISSING_FIELDS: &str = "Faltan campos";
pub const PASSWORDS_DIFFER: &str = "Las contraseñas no coinciden";

impl JobBoard {
    /// Copy the stored session into the store
    ///
    /// Storage is only read. Nothing is dispatched when no token is stored.
    pub fn hydrate(&self) -> Result<Option<String>, ActionError> {
        let Some(token) = self
            .storage
            .load(&self.token_key)?
            .filter(|token| !token.is_empty())
        else {
            tracing::debug!("No stored session");
            return Ok(None);
        };

        let user = match self.storage.load(&self.user_key)? {
            Some(raw) => match serde_json::from_str::<User>(&raw) {
                Ok(user) => Some(user),
                Err(e) => {
                    tracing::warn!("Ignoring unreadable stored user: {}", e);
                    None
                }
            },
            None => None,
        };

        tracing::debug!(
            "Restored session{}",
            user.as_ref()
                .map(|user| format!(" for user {}", user.id))
                .unwrap_or_default()
        );
        self.store.dispatch(Mutation::Hydrated {
            token: token.clone(),
            user,
        });
        Ok(Some(token))
    }

    /// `POST /api/register`
    ///
    /// The response is merged into the store and its token persisted. A
    /// rejected registration still records the server's `msg` and `success`
    /// so the form can show them, then returns the `Http` error.
    pub async fn register(&self, form: Form) -> Result<AuthResponse, ActionError> {
        let response = self
            .api
            .exchange(
                ApiRequest::post("/api/register", Value::Object(form)),
                REGISTER_FAILED,
            )
            .await?;

        if !response.is_success() {
            let err = http_error(&response);
            tracing::warn!("Registration rejected ({}): {}", response.status, err);
            if let Ok(status) = decode::<AuthResponse>(response.body) {
                self.store.dispatch(Mutation::AuthMerged(AuthResponse {
                    msg: status.msg,
                    success: status.success,
                    ..AuthResponse::default()
                }));
            }
            return Err(err);
        }

        let auth: AuthResponse = decode(response.body)?;
        self.persist_session(auth.token.as_deref(), auth.user.as_ref())?;
        self.store.dispatch(Mutation::AuthMerged(auth.clone()));
        tracing::info!("Registered new account");
        Ok(auth)
    }

    /// `POST /api/login`, then reload the user's applications
    ///
    /// The login stands even if the applications cannot be loaded; that
    /// failure is logged and `user_applications` keeps its previous value.
    pub async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, ActionError> {
        let body = json!({
            "email": credentials.email,
            "password": credentials.password,
        });

        let response: LoginResponse = self
            .api
            .fetch(ApiRequest::post("/api/login", body), LOGIN_FAILED)
            .await?;

        self.persist_session(Some(&response.token), Some(&response.user))?;
        self.store.dispatch(Mutation::LoggedIn {
            token: response.token.clone(),
            user: response.user.clone(),
        });
        tracing::info!("Logged in as user {}", response.user.id);

        if let Err(e) = self.load_user_applications().await {
            tracing::warn!("Logged in, but applications could not be loaded: {}", e);
        }

        Ok(response)
    }

    /// `PUT /api/user/edit{suffix}`
    ///
    /// `suffix` selects the profile being edited, e.g. `""` for the base user
    /// or `"/programador"`. The response is merged like a registration.
    pub async fn edit_user(&self, form: Form, suffix: &str) -> Result<AuthResponse, ActionError> {
        let token = self.require_token()?;

        let auth: AuthResponse = self
            .api
            .fetch(
                ApiRequest::put(format!("/api/user/edit{}", suffix), Value::Object(form))
                    .bearer(token),
                EDIT_FAILED,
            )
            .await?;

        self.persist_session(auth.token.as_deref(), auth.user.as_ref())?;
        self.store.dispatch(Mutation::AuthMerged(auth.clone()));
        tracing::info!("Profile updated");
        Ok(auth)
    }

    /// `POST /api/user/programador/addProjects`; appends to `projects`
    pub async fn add_projects(&self, form: Form) -> Result<ProjectsResponse, ActionError> {
        let token = self.require_token()?;

        let response: ProjectsResponse = self
            .api
            .fetch(
                ApiRequest::post("/api/user/programador/addProjects", Value::Object(form))
                    .bearer(token),
                ADD_PROJECTS_FAILED,
            )
            .await?;

        self.store.dispatch(Mutation::ProjectAdded(response.project.clone()));
        Ok(response)
    }

    /// `POST /reset-password` with the reset token from the emailed link
    ///
    /// Both passwords must be non-empty and equal once trimmed; the first
    /// one is sent exactly as typed.
    pub async fn reset_password(
        &self,
        reset_token: &str,
        password: &str,
        confirmation: &str,
    ) -> Result<(), ActionError> {
        if password.trim().is_empty() || confirmation.trim().is_empty() {
            return Err(ActionError::Validation(MISSING_FIELDS.to_string()));
        }
        if password.trim() != confirmation.trim() {
            return Err(ActionError::Validation(PASSWORDS_DIFFER.to_string()));
        }
        if reset_token.is_empty() {
            return Err(ActionError::Unauthenticated);
        }

        self.api
            .send(
                ApiRequest::post("/reset-password", json!({ "password": password }))
                    .bearer(reset_token),
                RESET_PASSWORD_FAILED,
            )
            .await?;

        tracing::info!("Password changed");
        Ok(())
    }

    /// Clear the last status message and flag
    pub fn reset_status(&self) {
        self.store.dispatch(Mutation::StatusCleared);
    }

    /// Forget the session, in storage and in the store
    ///
    /// The store is cleared even if storage removal fails; the storage error
    /// is returned afterwards.
    pub fn log_out(&self) -> Result<(), ActionError> {
        let token_removed = self.storage.remove(&self.token_key);
        let user_removed = self.storage.remove(&self.user_key);
        let removed = token_removed.and(user_removed);

        self.store.dispatch(Mutation::LoggedOut);
        tracing::info!("Logged out");

        removed.map_err(ActionError::from)
    }

    /// Save the token and user as one session
    ///
    /// A new token without a user drops the stored user, which belonged to
    /// the previous session.
    fn persist_session(&self, token: Option<&str>, user: Option<&User>) -> Result<(), ActionError> {
        if let Some(token) = token {
            self.storage.save(&self.token_key, token)?;
            if user.is_none() {
                self.storage.remove(&self.user_key)?;
            }
        }
        if let Some(user) = user {
            let raw = serde_json::to_string(user)
                .map_err(|e| ActionError::Storage(e.to_string()))?;
            self.storage.save(&self.user_key, &raw)?;
        }
        Ok(())
    }
}
