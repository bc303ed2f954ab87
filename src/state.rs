//! Prediction request lifecycle.
//!
//! ```text
//! Idle --submit--> Loading --2xx--> Success
//!                     \--error--> Failed
//! Success | Failed --reset--> Idle
//! Success | Failed --submit--> Loading
//! ```

use std::sync::Arc;

use crate::error::StateError;
use crate::model::PredictionResult;

#[derive(Debug, Clone, Default, PartialEq)]
pub enum RequestState {
    #[default]
    Idle,
    Loading,
    Success(Arc<PredictionResult>),
    Failed(String),
}

impl RequestState {
    pub fn name(&self) -> &'static str {
        match self {
            RequestState::Idle => "idle",
            RequestState::Loading => "loading",
            RequestState::Success(_) => "success",
            RequestState::Failed(_) => "failed",
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, RequestState::Loading)
    }

    /// Starts a request. Rejected while one is already outstanding.
    pub fn begin(&mut self) -> Result<(), StateError> {
        if self.is_loading() {
            return Err(self.illegal("submit"));
        }
        *self = RequestState::Loading;
        Ok(())
    }

    pub fn succeed(&mut self, result: Arc<PredictionResult>) -> Result<(), StateError> {
        if !self.is_loading() {
            return Err(self.illegal("complete"));
        }
        *self = RequestState::Success(result);
        Ok(())
    }

    pub fn fail(&mut self, reason: impl Into<String>) -> Result<(), StateError> {
        if !self.is_loading() {
            return Err(self.illegal("fail"));
        }
        *self = RequestState::Failed(reason.into());
        Ok(())
    }

    /// Returns a finished request to idle. A request in flight cannot be
    /// reset.
    pub fn reset(&mut self) -> Result<(), StateError> {
        if self.is_loading() {
            return Err(self.illegal("reset"));
        }
        *self = RequestState::Idle;
        Ok(())
    }

    fn illegal(&self, action: &'static str) -> StateError {
        StateError {
            action,
            state: self.name(),
        }
    }
}
