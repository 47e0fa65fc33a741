//! Mutations accepted by the job board store
//!
//! A mutation describes a write; the reducer (see `reducer.rs`) applies it.
//! Each variant names exactly the fields it replaces, which is what store
//! subscribers are told about.

use super::state::Field;
use crate::types::{Application, AuthResponse, JobOffer, Project, User};

#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    // === Session ===
    /// Session copied from durable storage at startup
    Hydrated { token: String, user: Option<User> },

    /// Login succeeded
    LoggedIn { token: String, user: User },

    /// Registration or profile edit response; present fields replace
    AuthMerged(AuthResponse),

    /// Status message and flag cleared
    StatusCleared,

    /// Session ended
    LoggedOut,

    // === Offers ===
    JobOffersLoaded(Vec<JobOffer>),

    JobOfferSelected(JobOffer),

    /// New offer appended to the list
    JobOfferCreated(JobOffer),

    // === Applications ===
    ApplicationsLoaded(Vec<Application>),

    ApplicationAdded(Application),

    ApplicationRemoved { offer_id: i64 },

    // === Profile ===
    ProjectAdded(Project),

    MessageLoaded(String),
}

impl Mutation {
    /// Fields this mutation replaces
    pub fn touched(&self) -> Vec<Field> {
        match self {
            Mutation::Hydrated { .. } | Mutation::LoggedIn { .. } => {
                vec![Field::Token, Field::User]
            }
            Mutation::AuthMerged(response) => {
                let mut fields = Vec::new();
                if response.token.is_some() {
                    fields.push(Field::Token);
                }
                if response.token.is_some() || response.user.is_some() {
                    fields.push(Field::User);
                }
                if response.msg.is_some() {
                    fields.push(Field::Msg);
                }
                if response.success.is_some() {
                    fields.push(Field::Success);
                }
                if response.employer.is_some() {
                    fields.push(Field::Employer);
                }
                if response.programmer.is_some() {
                    fields.push(Field::Programmer);
                }
                fields
            }
            Mutation::StatusCleared => vec![Field::Msg, Field::Success],
            Mutation::LoggedOut => vec![
                Field::Token,
                Field::User,
                Field::Msg,
                Field::Success,
                Field::Employer,
                Field::Programmer,
            ],
            Mutation::JobOffersLoaded(_) | Mutation::JobOfferCreated(_) => vec![Field::JobOffers],
            Mutation::JobOfferSelected(_) => vec![Field::SelectedJobOffer],
            Mutation::ApplicationsLoaded(_)
            | Mutation::ApplicationAdded(_)
            | Mutation::ApplicationRemoved { .. } => vec![Field::UserApplications],
            Mutation::ProjectAdded(_) => vec![Field::Projects],
            Mutation::MessageLoaded(_) => vec![Field::Message],
        }
    }
}
