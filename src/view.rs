//! Result view model.
//!
//! Pure functions that reshape an already fetched
//! [`PredictionResult`](crate::model::PredictionResult) into
//! the data each result panel renders. Nothing here performs I/O.

use std::collections::HashSet;
use std::fmt;

use crate::error::DataIntegrityError;
use crate::model::{LatLng, MedianPricePoint, RecommendedProperties, ShapValue};

/// Placeholder for a recommended property without an address.
pub const UNKNOWN_ADDRESS: &str = "Unknown";

/// A price that may be missing from the payload.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PriceDisplay {
    Amount(f64),
    NotAvailable,
}

impl fmt::Display for PriceDisplay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PriceDisplay::Amount(v) => write!(f, "${}", format_number(*v)),
            PriceDisplay::NotAvailable => f.write_str("$N/A"),
        }
    }
}

/// One recommended property, ready to place on the map.
#[derive(Debug, Clone, PartialEq)]
pub struct RecommendedPropertyRow {
    pub latitude: f64,
    pub longitude: f64,
    pub price: PriceDisplay,
    pub address: String,
}

/// Months and prices of one year of the median price series.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct YearChartSeries {
    pub month_labels: Vec<String>,
    pub prices: Vec<f64>,
}

impl YearChartSeries {
    /// An empty series has no chart.
    pub fn is_empty(&self) -> bool {
        self.month_labels.is_empty()
    }
}

/// Static appearance of a map marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkerStyle {
    pub name: &'static str,
    pub rgb: [u8; 3],
}

pub static HOUSE_MARKER: MarkerStyle = MarkerStyle {
    name: "red",
    rgb: [0xcb, 0x2b, 0x3e],
};

pub static CITY_CENTER_MARKER: MarkerStyle = MarkerStyle {
    name: "green",
    rgb: [0x2a, 0xad, 0x27],
};

pub static RECOMMENDED_MARKER: MarkerStyle = MarkerStyle {
    name: "blue",
    rgb: [0x2a, 0x81, 0xcb],
};

/// Attribution required by the map tile source.
pub const TILE_ATTRIBUTION: &str = "© OpenStreetMap contributors";

/// Converts the column-oriented recommended properties into rows.
///
/// Rows follow the key order of the longitude column and are joined by key,
/// never by position.
///
/// # Errors
///
/// Returns [`DataIntegrityError`] when a longitude key has no latitude, or
/// when another column carries a key the longitude column lacks.
pub fn to_markers(
    props: &RecommendedProperties,
) -> Result<Vec<RecommendedPropertyRow>, DataIntegrityError> {
    check_keys("Latitude", props.latitude.keys(), props)?;
    check_keys("Price", props.price.keys(), props)?;
    check_keys("Address", props.address.keys(), props)?;

    props
        .longitude
        .iter()
        .map(|(key, &longitude)| {
            let latitude =
                *props
                    .latitude
                    .get(key)
                    .ok_or_else(|| DataIntegrityError::MissingValue {
                        column: "Latitude",
                        key: key.clone(),
                    })?;

            let price = match props.price.get(key) {
                Some(Some(p)) => PriceDisplay::Amount(*p),
                _ => PriceDisplay::NotAvailable,
            };

            let address = props
                .address
                .get(key)
                .and_then(|a| a.as_deref())
                .filter(|a| !a.is_empty())
                .unwrap_or(UNKNOWN_ADDRESS)
                .to_string();

            Ok(RecommendedPropertyRow {
                latitude,
                longitude,
                price,
                address,
            })
        })
        .collect()
}

fn check_keys<'a>(
    column: &'static str,
    mut keys: impl Iterator<Item = &'a String>,
    props: &RecommendedProperties,
) -> Result<(), DataIntegrityError> {
    match keys.find(|k| !props.longitude.contains_key(*k)) {
        Some(key) => Err(DataIntegrityError::UnexpectedKey {
            column,
            key: key.clone(),
        }),
        None => Ok(()),
    }
}

/// Years present in the series, in order of first appearance.
pub fn distinct_years(series: &[MedianPricePoint]) -> Vec<i32> {
    let mut seen = HashSet::new();
    series
        .iter()
        .map(|p| p.year)
        .filter(|y| seen.insert(*y))
        .collect()
}

/// Monthly median prices for one year, in source order.
pub fn series_for_year(series: &[MedianPricePoint], year: i32) -> YearChartSeries {
    let (month_labels, prices) = series
        .iter()
        .filter(|p| p.year == year)
        .map(|p| (format!("Month {}", p.month), p.price))
        .unzip();

    YearChartSeries {
        month_labels,
        prices,
    }
}

/// Splits feature contributions into parallel labels and values.
pub fn feature_breakdown(shap: &[ShapValue]) -> (Vec<String>, Vec<f64>) {
    shap.iter().map(|s| (s.feature.clone(), s.value)).unzip()
}

/// Percentage of the whole pie taken by each feature.
///
/// Shares are computed over magnitudes; an all-zero breakdown yields zeros.
pub fn feature_shares(shap: &[ShapValue]) -> Vec<(String, f64)> {
    let total: f64 = shap.iter().map(|s| s.value.abs()).sum();
    shap.iter()
        .map(|s| {
            let pct = if total == 0.0 {
                0.0
            } else {
                s.value.abs() / total * 100.0
            };
            (s.feature.clone(), pct)
        })
        .collect()
}

/// Smallest box containing every point, as `(south_west, north_east)`.
pub fn bounds<'a>(points: impl IntoIterator<Item = &'a LatLng>) -> Option<(LatLng, LatLng)> {
    points.into_iter().fold(None, |acc, p| match acc {
        None => Some((*p, *p)),
        Some((sw, ne)) => Some((
            LatLng {
                lat: sw.lat.min(p.lat),
                lng: sw.lng.min(p.lng),
            },
            LatLng {
                lat: ne.lat.max(p.lat),
                lng: ne.lng.max(p.lng),
            },
        )),
    })
}

/// Formats a number with thousands separators and at most three decimals.
pub fn format_number(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    let rounded = (value.abs() * 1000.0).round() / 1000.0;
    let text = format!("{rounded:.3}");
    let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), ""));
    let frac_part = frac_part.trim_end_matches('0');

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 && rounded != 0.0 { "-" } else { "" };
    if frac_part.is_empty() {
        format!("{sign}{grouped}")
    } else {
        format!("{sign}{grouped}.{frac_part}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;

    fn series() -> Vec<MedianPricePoint> {
        [(2021, 1, 500000.0), (2022, 3, 520000.0), (2021, 6, 510000.0)]
            .into_iter()
            .map(|(year, month, price)| MedianPricePoint { year, month, price })
            .collect()
    }

    fn columns<V: Clone>(pairs: &[(&str, V)]) -> IndexMap<String, V> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn props() -> RecommendedProperties {
        RecommendedProperties {
            longitude: columns(&[("0", 145.0), ("1", 145.1), ("2", 145.2)]),
            latitude: columns(&[("2", -37.2), ("0", -37.0), ("1", -37.1)]),
            price: columns(&[("1", Some(610000.0)), ("2", None), ("0", Some(600000.0))]),
            address: columns(&[("1", Some("1 B St".to_string())), ("0", Some("0 A St".to_string()))]),
        }
    }

    #[test]
    fn test_to_markers_joins_by_key() {
        let rows = to_markers(&props()).unwrap();

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].longitude, 145.0);
        assert_eq!(rows[0].latitude, -37.0);
        assert_eq!(rows[0].price, PriceDisplay::Amount(600000.0));
        assert_eq!(rows[0].address, "0 A St");
        assert_eq!(rows[1].latitude, -37.1);
        assert_eq!(rows[1].address, "1 B St");
        assert_eq!(rows[2].latitude, -37.2);
    }

    #[test]
    fn test_to_markers_defaults() {
        let rows = to_markers(&props()).unwrap();
        assert_eq!(rows[2].address, UNKNOWN_ADDRESS);
        assert_eq!(rows[2].price, PriceDisplay::NotAvailable);
        assert_eq!(rows[2].price.to_string(), "$N/A");
    }

    #[test]
    fn test_to_markers_null_address_is_unknown() {
        let mut p = props();
        p.address.insert("2".to_string(), None);
        let rows = to_markers(&p).unwrap();
        assert_eq!(rows[2].address, UNKNOWN_ADDRESS);
    }

    #[test]
    fn test_to_markers_extra_latitude_key_is_error() {
        let mut p = props();
        p.latitude.insert("9".to_string(), -38.0);
        assert_eq!(
            to_markers(&p),
            Err(DataIntegrityError::UnexpectedKey {
                column: "Latitude",
                key: "9".to_string()
            })
        );
    }

    #[test]
    fn test_to_markers_missing_latitude_is_error() {
        let mut p = props();
        p.latitude.shift_remove("1");
        assert_eq!(
            to_markers(&p),
            Err(DataIntegrityError::MissingValue {
                column: "Latitude",
                key: "1".to_string()
            })
        );
    }

    #[test]
    fn test_to_markers_empty() {
        let rows = to_markers(&RecommendedProperties::default()).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn test_distinct_years_first_appearance() {
        assert_eq!(distinct_years(&series()), vec![2021, 2022]);
        assert!(distinct_years(&[]).is_empty());
    }

    #[test]
    fn test_series_for_year() {
        let s = series_for_year(&series(), 2021);
        assert_eq!(s.month_labels, vec!["Month 1", "Month 6"]);
        assert_eq!(s.prices, vec![500000.0, 510000.0]);
        assert!(!s.is_empty());
    }

    #[test]
    fn test_series_for_absent_year_is_empty() {
        let s = series_for_year(&series(), 1999);
        assert!(s.is_empty());
        assert!(s.prices.is_empty());
    }

    #[test]
    fn test_feature_breakdown_preserves_order() {
        let shap = vec![
            ShapValue {
                feature: "bedrooms".to_string(),
                value: 0.3,
            },
            ShapValue {
                feature: "location".to_string(),
                value: 0.5,
            },
        ];
        let (labels, values) = feature_breakdown(&shap);
        assert_eq!(labels, vec!["bedrooms", "location"]);
        assert_eq!(values, vec![0.3, 0.5]);

        let shares = feature_shares(&shap);
        assert!((shares[0].1 - 37.5).abs() < 1e-9);
        assert!((shares[1].1 - 62.5).abs() < 1e-9);
    }

    #[test]
    fn test_feature_shares_all_zero() {
        let shap = vec![ShapValue {
            feature: "Car".to_string(),
            value: 0.0,
        }];
        assert_eq!(feature_shares(&shap), vec![("Car".to_string(), 0.0)]);
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(750000.0), "750,000");
        assert_eq!(format_number(1234567.891), "1,234,567.891");
        assert_eq!(format_number(999.5), "999.5");
        assert_eq!(format_number(0.0), "0");
        assert_eq!(format_number(-1500.25), "-1,500.25");
        assert_eq!(PriceDisplay::Amount(750000.0).to_string(), "$750,000");
    }

    #[test]
    fn test_bounds() {
        let pts = [
            LatLng { lat: -37.8, lng: 144.9 },
            LatLng { lat: -37.7, lng: 145.1 },
        ];
        let (sw, ne) = bounds(&pts).unwrap();
        assert_eq!(sw, LatLng { lat: -37.8, lng: 144.9 });
        assert_eq!(ne, LatLng { lat: -37.7, lng: 145.1 });
        assert!(bounds(std::iter::empty()).is_none());
    }
}
