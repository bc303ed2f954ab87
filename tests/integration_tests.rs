use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use vanga_predict::app::App;
use vanga_predict::error::SubmitError;
use vanga_predict::export::{Exporter, REPORT_FILE_NAME};
use vanga_predict::fetch::HttpClient;
use vanga_predict::form::{FormField, FormInput, HouseType, REQUIRED_FIELDS_MESSAGE};
use vanga_predict::infra::prediction::PredictionClient;
use vanga_predict::model::PredictionResult;
use vanga_predict::output::{render_form, render_result};
use vanga_predict::routes::Route;
use vanga_predict::state::RequestState;
use vanga_predict::view::{PriceDisplay, UNKNOWN_ADDRESS};

const FIXTURE: &str = include_str!("fixtures/predict_response.json");

/// Transport that answers every request with the same canned response.
struct Canned {
    status: u16,
    body: &'static str,
    calls: AtomicUsize,
}

impl Canned {
    fn new(status: u16, body: &'static str) -> Self {
        Self {
            status,
            body,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl HttpClient for Canned {
    async fn execute(&self, _req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let resp = http::Response::builder()
            .status(self.status)
            .header("content-type", "application/json")
            .body(self.body)
            .unwrap();
        Ok(reqwest::Response::from(resp))
    }
}

fn client(transport: Canned) -> PredictionClient<Canned> {
    PredictionClient::new(transport, "http://localhost:8000/predict", Duration::from_secs(5))
        .expect("valid endpoint")
}

fn filled_form() -> FormInput {
    let mut form = FormInput::new();
    form.set_field(FormField::Address, "7 Orrong Rd, Toorak VIC 3142");
    form.set_field(FormField::Bathrooms, "2");
    form.set_field(FormField::Bedrooms, "4");
    form.set_field(FormField::Carpark, "2");
    form.set_field(FormField::HouseType, HouseType::House.as_str());
    form.set_field(FormField::BuildingArea, "210");
    form.set_field(FormField::Landsize, "560");
    form
}

fn app_with(form: FormInput) -> App {
    let mut app = App::new();
    assert_eq!(app.open("/search").unwrap(), Route::Search);
    *app.form_mut() = form;
    app
}

#[tokio::test]
async fn test_successful_prediction_shows_result() {
    let api = client(Canned::new(200, FIXTURE));
    let mut app = app_with(filled_form());

    assert_eq!(app.submit(&api).await.unwrap(), Route::Predict);

    let expected: PredictionResult = serde_json::from_str(FIXTURE).unwrap();
    let page = app.require_result().unwrap();
    assert_eq!(page.result(), &expected);
    assert_eq!(page.request().address, "7 Orrong Rd, Toorak VIC 3142");

    let markers = page.markers();
    assert_eq!(markers.len(), 3);
    assert_eq!(markers[0].latitude, -37.8475);
    assert_eq!(markers[0].price, PriceDisplay::Amount(765500.0));
    assert_eq!(markers[2].longitude, 145.0170);
    assert_eq!(markers[2].latitude, -37.8512);
    assert_eq!(markers[2].address, UNKNOWN_ADDRESS);

    let text = render_result(page);
    assert!(text.contains("Predicted Price: $750,000"));
    assert!(text.contains("Distance to City Center: 6.81 kilometers"));
}

#[tokio::test]
async fn test_year_selection_on_result_page() {
    let api = client(Canned::new(200, FIXTURE));
    let mut app = app_with(filled_form());
    app.submit(&api).await.unwrap();

    let page = app.result_page_mut().unwrap();
    assert_eq!(page.years(), &[2021, 2022]);

    page.select_year(2022);
    let chart = page.chart().unwrap();
    assert_eq!(chart.month_labels, vec!["Month 3", "Month 9"]);
    assert_eq!(chart.prices, vec![520000.0, 535000.5]);

    let (labels, values) = page.feature_breakdown();
    assert_eq!(labels.first().map(String::as_str), Some("Type"));
    assert_eq!(values.len(), 8);
}

#[tokio::test]
async fn test_server_error_routes_to_error_page() {
    let api = client(Canned::new(500, r#"{"detail":"No results found for the given address."}"#));
    let mut app = app_with(filled_form());

    assert_eq!(app.submit(&api).await.unwrap(), Route::Error);
    assert!(matches!(app.request_state(), RequestState::Failed(_)));
    assert!(app.result_page().is_none());
}

#[tokio::test]
async fn test_malformed_payload_routes_to_error_page() {
    let api = client(Canned::new(200, r#"{"predicted_price": 1}"#));
    let mut app = app_with(filled_form());

    assert_eq!(app.submit(&api).await.unwrap(), Route::Error);
}

#[tokio::test]
async fn test_incomplete_form_never_reaches_the_network() {
    let api = client(Canned::new(200, FIXTURE));
    let mut form = filled_form();
    form.set_field(FormField::Address, "");
    form.set_field(FormField::BuildingArea, "");
    let mut app = app_with(form);

    match app.submit(&api).await {
        Err(SubmitError::Validation(e)) => {
            assert_eq!(e.missing, vec![FormField::Address, FormField::BuildingArea]);
        }
        other => panic!("expected validation error, got {other:?}"),
    }
    assert_eq!(app.route(), Route::Search);
    assert_eq!(
        app.highlighted_fields(),
        vec![FormField::Address, FormField::BuildingArea]
    );
    assert!(render_form(&app).contains(REQUIRED_FIELDS_MESSAGE));
    assert_eq!(app.form().get(FormField::Bedrooms), "4");
}

#[test]
fn test_result_route_without_state_redirects() {
    let mut app = App::new();
    assert_eq!(app.open("/predict").unwrap(), Route::Search);
    assert!(app.require_result().is_err());
}

#[tokio::test]
async fn test_export_after_prediction() {
    let api = client(Canned::new(200, FIXTURE));
    let mut app = app_with(filled_form());
    app.submit(&api).await.unwrap();
    app.result_page_mut().unwrap().select_year(2021);

    let dir = tempfile::tempdir().unwrap();
    let exporter = Exporter::new(dir.path()).with_view_size(400, 300);
    let path = exporter
        .export_current_view(app.require_result().unwrap())
        .await
        .unwrap();

    assert_eq!(path.file_name().unwrap(), REPORT_FILE_NAME);
    let bytes = std::fs::read(path).unwrap();
    assert!(bytes.starts_with(b"%PDF"));

    let doc = lopdf::Document::load_mem(&bytes).unwrap();
    let text = doc.extract_text(&[1]).unwrap();
    assert!(text.contains("Predicted Price: $750,000"));
    assert!(text.contains("Address: 7 Orrong Rd, Toorak VIC 3142"));
}
