//! Applying to offers and listing the user's applications

use serde_json::json;

use super::JobBoard;
use crate::error::ActionError;
use crate::store::{Field, Mutation};
use crate::transport::ApiRequest;
use crate::types::{Application, ApplicationsResponse, Feedback};

pub const APPLY_SUCCEEDED: &str = "Inscripcion realizada con exito.";
pub const APPLY_FAILED: &str = "Error en la solicitud de inscripcion.";
pub const UNAPPLY_SUCCEEDED: &str = "Desinscripción realizada con éxito.";
pub const UNAPPLY_FAILED: &str = "Error en la solicitud de desinscripción.";
const LOAD_APPLICATIONS_FAILED: &str = "Error al obtener postulaciones.";

impl JobBoard {
    /// `POST /api/postulados`
    ///
    /// Needs both a token and the logged-in user's id, since the new
    /// application is recorded locally as `{user_id, oferta_id}`.
    pub async fn apply_to_job_offer(&self, offer_id: i64) -> Result<Feedback, ActionError> {
        let token = self.require_token()?;
        let user_id = self
            .store
            .read(|state| state.user.as_ref().map(|user| user.id))
            .ok_or_else(|| {
                tracing::debug!("Token present but no user loaded");
                ActionError::Unauthenticated
            })?;

        self.api
            .send(
                ApiRequest::post("/api/postulados", json!({ "oferta_id": offer_id })).bearer(token),
                APPLY_FAILED,
            )
            .await?;

        self.store.dispatch(Mutation::ApplicationAdded(Application::new(user_id, offer_id)));
        tracing::info!("User {} applied to offer {}", user_id, offer_id);
        Ok(Feedback::success(APPLY_SUCCEEDED))
    }

    /// `DELETE /api/postulados/{offer_id}`; the matching application is
    /// removed locally
    pub async fn unapply_from_job_offer(&self, offer_id: i64) -> Result<Feedback, ActionError> {
        let token = self.require_token()?;

        self.api
            .send(
                ApiRequest::delete(format!("/api/postulados/{}", offer_id)).bearer(token),
                UNAPPLY_FAILED,
            )
            .await?;

        self.store.dispatch(Mutation::ApplicationRemoved { offer_id });
        tracing::info!("Withdrew application to offer {}", offer_id);
        Ok(Feedback::success(UNAPPLY_SUCCEEDED))
    }

    /// `GET /api/user/postulados`; replaces `user_applications`
    pub async fn load_user_applications(&self) -> Result<Vec<Application>, ActionError> {
        let ticket = self.store.ticket(Field::UserApplications);
        let token = self.require_token()?;

        let response: ApplicationsResponse = self
            .api
            .fetch(
                ApiRequest::get("/api/user/postulados").bearer(token),
                LOAD_APPLICATIONS_FAILED,
            )
            .await?;

        let applications = response.postulados;
        if self
            .store
            .dispatch_fresh(ticket, Mutation::ApplicationsLoaded(applications.clone()))
        {
            tracing::info!("Loaded {} applications", applications.len());
        }
        Ok(applications)
    }
}
