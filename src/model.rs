//! Payload returned by the prediction service.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A latitude/longitude pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

/// One `[year, month, price]` entry of the median price series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "(f64, f64, f64)", into = "(i32, u32, f64)")]
pub struct MedianPricePoint {
    pub year: i32,
    pub month: u32,
    pub price: f64,
}

impl TryFrom<(f64, f64, f64)> for MedianPricePoint {
    type Error = String;

    // Years and months arrive as JSON numbers, sometimes with a `.0` suffix.
    fn try_from((year, month, price): (f64, f64, f64)) -> Result<Self, Self::Error> {
        if year.fract() != 0.0 || month.fract() != 0.0 || month < 0.0 {
            return Err(format!("invalid year/month pair [{year}, {month}]"));
        }
        Ok(Self {
            year: year as i32,
            month: month as u32,
            price,
        })
    }
}

impl From<MedianPricePoint> for (i32, u32, f64) {
    fn from(p: MedianPricePoint) -> Self {
        (p.year, p.month, p.price)
    }
}

/// Comparable properties in column-oriented form.
///
/// Each column maps a shared row id to that row's value. Row order follows
/// the `Longitude` column.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecommendedProperties {
    #[serde(rename = "Longitude")]
    pub longitude: IndexMap<String, f64>,
    #[serde(rename = "Latitude")]
    pub latitude: IndexMap<String, f64>,
    #[serde(rename = "Price", default)]
    pub price: IndexMap<String, Option<f64>>,
    #[serde(rename = "Address", default)]
    pub address: IndexMap<String, Option<String>>,
}

/// One feature's contribution to the prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapValue {
    #[serde(rename = "Feature")]
    pub feature: String,
    #[serde(rename = "SHAP Value")]
    pub value: f64,
}

/// A successful prediction, exactly as returned by the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub predicted_price: f64,
    #[serde(rename = "distance_between_cities")]
    pub distance_to_city_km: f64,
    pub house_location: LatLng,
    pub city_center_location: LatLng,
    #[serde(rename = "median_price")]
    pub median_price_series: Vec<MedianPricePoint>,
    pub recommended_properties: RecommendedProperties,
    #[serde(rename = "shap_values")]
    pub feature_importance: Vec<ShapValue>,
}

impl PredictionResult {
    /// Decodes a response body.
    pub fn from_slice(bytes: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(bytes)
    }
}

#[cfg(test)]
pub(crate) const SAMPLE_RESPONSE: &str = r#"{
    "predicted_price": 750000,
    "distance_between_cities": 4.27,
    "house_location": {"lat": -37.8183, "lng": 144.9981},
    "city_center_location": {"lat": -37.8136, "lng": 144.9631},
    "median_price": [[2021, 1, 500000], [2022, 3, 520000], [2021, 6, 510000]],
    "recommended_properties": {
        "Longitude": {"12": 144.99, "7": 145.01},
        "Latitude": {"7": -37.82, "12": -37.81},
        "Price": {"12": 730000.0, "7": null},
        "Address": {"12": "3 Nearby Rd, Richmond"}
    },
    "shap_values": [
        {"Feature": "bedrooms", "SHAP Value": 0.3},
        {"Feature": "location", "SHAP Value": 0.5}
    ]
}"#;
