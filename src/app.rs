//! Page navigation and the search-to-result flow.
//!
//! [`App`] owns the state of the page currently on screen. Leaving a page
//! drops its state: the search form is cleared, the result page forgets its
//! prediction, and a request still in flight is abandoned so its response is
//! discarded when it arrives.

use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::error::{
    DataIntegrityError, MissingResultStateError, PredictionError, RouteError, SubmitError,
};
use crate::form::{FormField, FormInput, PredictionRequest};
use crate::model::PredictionResult;
use crate::routes::Route;
use crate::services::PredictionApi;
use crate::state::RequestState;
use crate::view::{self, RecommendedPropertyRow, YearChartSeries};

/// Everything the result page shows, derived once from a prediction.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultPage {
    result: Arc<PredictionResult>,
    request: PredictionRequest,
    markers: Vec<RecommendedPropertyRow>,
    years: Vec<i32>,
    selected_year: Option<i32>,
    series: YearChartSeries,
}

impl ResultPage {
    pub fn new(
        request: PredictionRequest,
        result: Arc<PredictionResult>,
    ) -> Result<Self, DataIntegrityError> {
        let markers = view::to_markers(&result.recommended_properties)?;
        let years = view::distinct_years(&result.median_price_series);

        Ok(Self {
            result,
            request,
            markers,
            years,
            selected_year: None,
            series: YearChartSeries::default(),
        })
    }

    pub fn result(&self) -> &PredictionResult {
        &self.result
    }

    /// The form values the prediction was made for.
    pub fn request(&self) -> &PredictionRequest {
        &self.request
    }

    pub fn markers(&self) -> &[RecommendedPropertyRow] {
        &self.markers
    }

    /// Years offered by the year selector.
    pub fn years(&self) -> &[i32] {
        &self.years
    }

    pub fn selected_year(&self) -> Option<i32> {
        self.selected_year
    }

    pub fn select_year(&mut self, year: i32) {
        self.selected_year = Some(year);
        self.series = view::series_for_year(&self.result.median_price_series, year);
        debug!(year, points = self.series.prices.len(), "Year selected");
    }

    /// The price chart for the selected year, if there is anything to plot.
    pub fn chart(&self) -> Option<&YearChartSeries> {
        self.selected_year?;
        (!self.series.is_empty()).then_some(&self.series)
    }

    pub fn feature_breakdown(&self) -> (Vec<String>, Vec<f64>) {
        view::feature_breakdown(&self.result.feature_importance)
    }
}

/// A submission that has left the form and awaits its response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    generation: u64,
    pub request: PredictionRequest,
}

#[derive(Debug, Default)]
pub struct App {
    route: Route,
    generation: u64,
    form: FormInput,
    show_error: bool,
    request: RequestState,
    result_page: Option<ResultPage>,
}

impl App {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(&self) -> Route {
        self.route
    }

    pub fn request_state(&self) -> &RequestState {
        &self.request
    }

    pub fn form(&self) -> &FormInput {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut FormInput {
        &mut self.form
    }

    /// Whether the required-fields message is shown.
    pub fn show_error(&self) -> bool {
        self.show_error
    }

    /// Inputs outlined as missing: empty fields, once a submit was rejected.
    pub fn highlighted_fields(&self) -> Vec<FormField> {
        if self.show_error {
            self.form.missing_fields()
        } else {
            Vec::new()
        }
    }

    pub fn result_page(&self) -> Option<&ResultPage> {
        self.result_page.as_ref()
    }

    pub fn result_page_mut(&mut self) -> Option<&mut ResultPage> {
        self.result_page.as_mut()
    }

    /// Follows a link by path.
    pub fn open(&mut self, path: &str) -> Result<Route, RouteError> {
        let route = path.parse()?;
        Ok(self.navigate(route))
    }

    /// Navigates without handing over any state and returns the page that
    /// ends up on screen.
    ///
    /// The result page cannot be entered this way; it redirects to search.
    pub fn navigate(&mut self, route: Route) -> Route {
        self.enter(route, None)
    }

    /// Checks that the result page has state to show.
    pub fn require_result(&self) -> Result<&ResultPage, MissingResultStateError> {
        self.result_page.as_ref().ok_or(MissingResultStateError)
    }

    fn enter(&mut self, route: Route, handoff: Option<ResultPage>) -> Route {
        if route == self.route && handoff.is_none() {
            return route;
        }

        if self.request.is_loading() {
            debug!(generation = self.generation, "Abandoning in-flight prediction");
            self.request = RequestState::Idle;
        }
        match self.route {
            Route::Search => {
                self.form = FormInput::new();
                self.show_error = false;
            }
            Route::Predict => self.result_page = None,
            _ => {}
        }

        self.generation += 1;
        self.route = route;
        if handoff.is_some() {
            self.result_page = handoff;
        }
        if route == Route::Predict && self.result_page.is_none() {
            warn!(error = %MissingResultStateError, "Redirecting to search");
            self.route = Route::Search;
        }
        if self.route == Route::Search {
            // Fresh form, fresh request.
            if let Err(e) = self.request.reset() {
                warn!(error = %e, "Request state not reset");
            }
        }

        debug!(route = %self.route, generation = self.generation, "Navigated");
        self.route
    }

    /// Validates the form and starts a request.
    ///
    /// An incomplete form keeps its values, stays on screen and highlights the
    /// empty inputs.
    pub fn begin_submit(&mut self) -> Result<Submission, SubmitError> {
        if self.request.is_loading() {
            return Err(SubmitError::InFlight);
        }

        let request = match self.form.submit() {
            Ok(request) => request,
            Err(e) => {
                self.show_error = true;
                info!(missing = %e, "Form incomplete");
                return Err(e.into());
            }
        };

        self.show_error = false;
        self.request.begin().map_err(|_| SubmitError::InFlight)?;
        Ok(Submission {
            generation: self.generation,
            request,
        })
    }

    /// Applies a response. Returns the page now on screen, or `None` when the
    /// page that sent the request is gone and the response was dropped.
    pub fn finish_submit(
        &mut self,
        submission: Submission,
        outcome: Result<PredictionResult, PredictionError>,
    ) -> Option<Route> {
        if submission.generation != self.generation || !self.request.is_loading() {
            debug!(
                sent = submission.generation,
                current = self.generation,
                "Discarding response for a page no longer shown"
            );
            return None;
        }

        let page = outcome.map_err(|e| e.to_string()).and_then(|result| {
            let result = Arc::new(result);
            ResultPage::new(submission.request, result.clone())
                .map(|page| (page, result))
                .map_err(|e| e.to_string())
        });

        match page {
            Ok((page, result)) => {
                if let Err(e) = self.request.succeed(result) {
                    warn!(error = %e, "Request state not updated");
                }
                Some(self.enter(Route::Predict, Some(page)))
            }
            Err(reason) => {
                error!(error = %reason, "Prediction failed");
                if let Err(e) = self.request.fail(reason) {
                    warn!(error = %e, "Request state not updated");
                }
                Some(self.enter(Route::Error, None))
            }
        }
    }

    /// Submits the form and waits for the prediction.
    pub async fn submit<P: PredictionApi + ?Sized>(&mut self, api: &P) -> Result<Route, SubmitError> {
        let submission = self.begin_submit()?;
        let outcome = api.predict(&submission.request).await;
        Ok(self.finish_submit(submission, outcome).unwrap_or(self.route))
    }
}
