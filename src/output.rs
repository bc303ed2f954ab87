//! Text rendering of the search form and the prediction result.

use anyhow::Result;
use std::fmt;
use tracing::info;

use crate::app::{App, ResultPage};
use crate::form::{FormField, REQUIRED_FIELDS_MESSAGE};
use crate::model::PredictionResult;
use crate::pages;
use crate::view::{
    self, CITY_CENTER_MARKER, HOUSE_MARKER, PriceDisplay, RECOMMENDED_MARKER, TILE_ATTRIBUTION,
};

/// Logs the raw prediction as pretty-printed JSON.
pub fn print_json(result: &PredictionResult) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(result)?);
    Ok(())
}

/// Renders the search form; missing inputs are marked once a submit was
/// rejected.
pub fn render_form(app: &App) -> String {
    FormView(app).to_string()
}

/// Renders the result page: details, map, feature importance and the
/// price chart for the selected year.
pub fn render_result(page: &ResultPage) -> String {
    ResultView(page).to_string()
}

struct FormView<'a>(&'a App);

impl fmt::Display for FormView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let app = self.0;
        let highlighted = app.highlighted_fields();
        writeln!(f, "{}", pages::search_intro())?;

        for field in FormField::ALL {
            let mark = if highlighted.contains(&field) { " <- required" } else { "" };
            writeln!(f, "{:>14}: {}{mark}", field.label(), app.form().get(field))?;
        }
        if app.show_error() {
            writeln!(f, "\n{REQUIRED_FIELDS_MESSAGE}")?;
        }
        Ok(())
    }
}

struct ResultView<'a>(&'a ResultPage);

impl fmt::Display for ResultView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let page = self.0;
        let result = page.result();
        let request = page.request();
        let predicted = PriceDisplay::Amount(result.predicted_price);

        writeln!(f, "Prediction Result")?;
        writeln!(f, "Predicted Price: {predicted}")?;
        writeln!(f, "\nDetails Entered:")?;
        for field in FormField::ALL {
            writeln!(f, "  {}: {}", field.label(), request.get(field))?;
        }
        writeln!(
            f,
            "\nDistance to City Center: {} kilometers",
            result.distance_to_city_km
        )?;

        writeln!(f, "\nMap ({TILE_ATTRIBUTION})")?;
        writeln!(
            f,
            "  [{}] House at ({}, {}): {predicted}, {}",
            HOUSE_MARKER.name, result.house_location.lat, result.house_location.lng, request.address
        )?;
        writeln!(
            f,
            "  [{}] City Center CBD at ({}, {})",
            CITY_CENTER_MARKER.name, result.city_center_location.lat, result.city_center_location.lng
        )?;
        for row in page.markers() {
            writeln!(
                f,
                "  [{}] Recommended Property at ({}, {}): {}, {}",
                RECOMMENDED_MARKER.name, row.latitude, row.longitude, row.price, row.address
            )?;
        }

        writeln!(f, "\nFactors Influencing the Price")?;
        for (feature, pct) in view::feature_shares(&result.feature_importance) {
            writeln!(f, "  {feature}: {pct:.1}%")?;
        }

        let years: Vec<String> = page.years().iter().map(|y| y.to_string()).collect();
        writeln!(f, "\nSelect Year to View Median Price per Month: {}", years.join(", "))?;
        match (page.selected_year(), page.chart()) {
            (Some(year), Some(series)) => {
                writeln!(f, "Median Price by Month - {year}")?;
                for (label, price) in series.month_labels.iter().zip(&series.prices) {
                    writeln!(
                        f,
                        "  {label:>9}: {}  (predicted {predicted})",
                        PriceDisplay::Amount(*price)
                    )?;
                }
            }
            (Some(year), None) => writeln!(f, "No median prices recorded for {year}")?,
            _ => {}
        }
        Ok(())
    }
}
