use std::fmt::Display;

use crate::{data_types::route::Route, route_service::ServiceError};

use self::{selection::SelectionError, session::Phase};

pub mod controller;
pub mod preview;
pub mod selection;
pub mod session;
pub mod snapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecalculateStage {
    /// Writing the current selection so the service recomputes from it.
    Persist,
    /// Asking for the new geometry and distance.
    Recompute,
}

impl Display for RecalculateStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecalculateStage::Persist => write!(f, "saving the selected stops"),
            RecalculateStage::Recompute => write!(f, "computing the new path"),
        }
    }
}

/// Failures of the draft editor. Each one leaves the session in a different state, so
/// each has its own message for the user.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EditorError {
    #[error("Could not load the route: {0}")]
    LoadFailed(ServiceError),

    /// Stops written during `Persist` stay written.
    #[error("Could not recalculate the route while {stage}: {source}")]
    RecalculateFailed {
        stage: RecalculateStage,
        source: ServiceError,
    },

    #[error("Could not save the route, your changes are kept: {0}")]
    SaveFailed(ServiceError),

    /// The edits were discarded locally but the server still holds them.
    #[error("Changes were discarded here but not on the server: {0}")]
    CancelPersistFailed(ServiceError),

    #[error("Could not delete the route: {0}")]
    DeleteFailed(ServiceError),

    #[error("Not available while the editor is {0:?}")]
    NotReady(Phase),

    #[error("The path does not match the selected stops, recalculate before saving")]
    StaleGeometry,

    #[error(transparent)]
    Selection(#[from] SelectionError),

    #[error("The editing session was closed before the response arrived")]
    SessionAbandoned,
}

/// Asks the user to confirm a destructive action.
pub trait Confirmation: Sync {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F> Confirmation for F
where
    F: Fn(&str) -> bool + Sync,
{
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// Editable route metadata, as typed by the user.
#[derive(Debug, Clone, PartialEq)]
pub enum RouteField {
    Name(String),
    /// Raw input; anything that isn't a non-negative integer counts as 0.
    DurationDays(String),
    Season(String),
}

impl RouteField {
    pub fn apply(self, route: &mut Route) {
        match self {
            RouteField::Name(name) => route.name = name,
            RouteField::DurationDays(raw) => route.duration_days = raw.trim().parse().unwrap_or(0),
            RouteField::Season(season) => route.season = season,
        }
    }
}
