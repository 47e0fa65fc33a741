//! Job offer actions

use serde_json::Value;

use super::JobBoard;
use crate::error::ActionError;
use crate::store::{Field, Mutation};
use crate::transport::ApiRequest;
use crate::types::{
    ApplicantCountResponse, Form, HelloResponse, JobOffer, OfferResponse, OffersResponse,
};

const LOAD_OFFERS_FAILED: &str = "Error al cargar ofertas.";
const LOAD_OFFER_FAILED: &str = "Error al cargar la oferta.";
const CREATE_OFFER_FAILED: &str = "Error al conectarse con el backend.";
const COUNT_FAILED: &str = "Error al obtener número de postulaciones.";
const HELLO_FAILED: &str = "Error loading message from backend.";

impl JobBoard {
    /// `GET /api/ofertas`; replaces `job_offers`
    pub async fn load_all_job_offers(&self) -> Result<Vec<JobOffer>, ActionError> {
        let ticket = self.store.ticket(Field::JobOffers);

        let response: OffersResponse = self
            .api
            .fetch(ApiRequest::get("/api/ofertas"), LOAD_OFFERS_FAILED)
            .await?;

        let offers = response.ofertas;
        if self
            .store
            .dispatch_fresh(ticket, Mutation::JobOffersLoaded(offers.clone()))
        {
            tracing::info!("Loaded {} job offers", offers.len());
        }
        Ok(offers)
    }

    /// `GET /api/oferta/{id}`; replaces `selected_job_offer`
    pub async fn load_job_offer_by_id(&self, id: i64) -> Result<JobOffer, ActionError> {
        let ticket = self.store.ticket(Field::SelectedJobOffer);

        let response: OfferResponse = self
            .api
            .fetch(ApiRequest::get(format!("/api/oferta/{}", id)), LOAD_OFFER_FAILED)
            .await?;

        let offer = response.oferta;
        self.store.dispatch_fresh(ticket, Mutation::JobOfferSelected(offer.clone()));
        Ok(offer)
    }

    /// `POST /api/crearOferta`; the created offer is appended to `job_offers`
    pub async fn create_job_offer(&self, fields: Form) -> Result<JobOffer, ActionError> {
        let token = self.require_token()?;

        let response: OfferResponse = self
            .api
            .fetch(
                ApiRequest::post("/api/crearOferta", Value::Object(fields)).bearer(token),
                CREATE_OFFER_FAILED,
            )
            .await?;

        let offer = response.oferta;
        self.store.dispatch(Mutation::JobOfferCreated(offer.clone()));
        tracing::info!("Created job offer {}", offer.id);
        Ok(offer)
    }

    /// `GET /api/ofertas/{id}/postulados`; number of applicants, store untouched
    pub async fn applicant_count(&self, offer_id: i64) -> Result<u64, ActionError> {
        let token = self.require_token()?;

        let response: ApplicantCountResponse = self
            .api
            .fetch(
                ApiRequest::get(format!("/api/ofertas/{}/postulados", offer_id)).bearer(token),
                COUNT_FAILED,
            )
            .await?;

        Ok(response.numero_postulados)
    }

    /// `GET /api/hello`; replaces `message`
    pub async fn get_message(&self) -> Result<HelloResponse, ActionError> {
        let ticket = self.store.ticket(Field::Message);

        let response: HelloResponse = self
            .api
            .fetch(ApiRequest::get("/api/hello"), HELLO_FAILED)
            .await?;

        self.store.dispatch_fresh(ticket, Mutation::MessageLoaded(response.message.clone()));
        Ok(response)
    }
}
