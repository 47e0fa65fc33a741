//! Pure reducer for the job board store
//!
//! `(ClientState, Mutation) -> ClientState` with no side effects: no network,
//! no storage, no logging. All I/O happens in the actions before a mutation
//! is dispatched.

use super::mutation::Mutation;
use super::state::{ClientState, Field};
use super::Reducer;

/// Pure reducer function
pub fn reduce(state: ClientState, mutation: Mutation) -> ClientState {
    match mutation {
        // === Session ===
        Mutation::Hydrated { token, user } => ClientState {
            token: Some(token),
            user,
            ..state
        },

        Mutation::LoggedIn { token, user } => ClientState {
            token: Some(token),
            user: Some(user),
            ..state
        },

        Mutation::AuthMerged(response) => {
            // A new token starts a new session: the previous user never carries over
            let user = if response.token.is_some() {
                response.user
            } else {
                response.user.or(state.user)
            };
            ClientState {
                token: response.token.or(state.token),
                user,
                msg: response.msg.or(state.msg),
                success: response.success.or(state.success),
                employer: response.employer.or(state.employer),
                programmer: response.programmer.or(state.programmer),
                ..state
            }
        }

        Mutation::StatusCleared => ClientState {
            msg: None,
            success: None,
            ..state
        },

        Mutation::LoggedOut => ClientState {
            token: None,
            user: None,
            msg: None,
            success: None,
            employer: None,
            programmer: None,
            ..state
        },

        // === Offers ===
        Mutation::JobOffersLoaded(job_offers) => ClientState { job_offers, ..state },

        Mutation::JobOfferSelected(offer) => ClientState {
            selected_job_offer: Some(offer),
            ..state
        },

        Mutation::JobOfferCreated(offer) => {
            let mut job_offers = state.job_offers;
            job_offers.push(offer);
            ClientState { job_offers, ..state }
        }

        // === Applications ===
        Mutation::ApplicationsLoaded(user_applications) => ClientState {
            user_applications,
            ..state
        },

        Mutation::ApplicationAdded(application) => {
            let mut user_applications = state.user_applications;
            user_applications.push(application);
            ClientState {
                user_applications,
                ..state
            }
        }

        Mutation::ApplicationRemoved { offer_id } => {
            let mut user_applications = state.user_applications;
            user_applications.retain(|application| application.offer_id != offer_id);
            ClientState {
                user_applications,
                ..state
            }
        }

        // === Profile ===
        Mutation::ProjectAdded(project) => {
            let mut projects = state.projects;
            projects.push(project);
            ClientState { projects, ..state }
        }

        Mutation::MessageLoaded(message) => ClientState {
            message: Some(message),
            ..state
        },
    }
}

impl Reducer for ClientState {
    type Mutation = Mutation;
    type Field = Field;

    fn reduce(self, mutation: Mutation) -> Self {
        reduce(self, mutation)
    }

    fn touched(mutation: &Mutation) -> Vec<Field> {
        mutation.touched()
    }
}
