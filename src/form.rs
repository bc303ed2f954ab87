//! Property description form.
//!
//! Values are kept as entered; the only check applied before submission is
//! that every field is non-empty.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

/// Message shown under the form when a submission is rejected.
pub const REQUIRED_FIELDS_MESSAGE: &str = "* Please Enter All Required Fields.";

/// The seven required inputs, in the order they appear on the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FormField {
    Address,
    Bathrooms,
    Bedrooms,
    Carpark,
    HouseType,
    BuildingArea,
    Landsize,
}

impl FormField {
    pub const ALL: [FormField; 7] = [
        FormField::Address,
        FormField::Bathrooms,
        FormField::Bedrooms,
        FormField::Carpark,
        FormField::HouseType,
        FormField::BuildingArea,
        FormField::Landsize,
    ];

    /// Key used in the request body.
    pub fn key(self) -> &'static str {
        match self {
            FormField::Address => "address",
            FormField::Bathrooms => "bathrooms",
            FormField::Bedrooms => "bedrooms",
            FormField::Carpark => "carpark",
            FormField::HouseType => "houseType",
            FormField::BuildingArea => "buildingArea",
            FormField::Landsize => "landsize",
        }
    }

    /// Label shown next to the input.
    pub fn label(self) -> &'static str {
        match self {
            FormField::Address => "Address",
            FormField::Bathrooms => "Bathrooms",
            FormField::Bedrooms => "Bedrooms",
            FormField::Carpark => "Carpark",
            FormField::HouseType => "House Type",
            FormField::BuildingArea => "Building Area",
            FormField::Landsize => "Landsize",
        }
    }
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown form field '{0}'")]
pub struct UnknownField(pub String);

impl FromStr for FormField {
    type Err = UnknownField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FormField::ALL
            .into_iter()
            .find(|f| f.key() == s)
            .ok_or_else(|| UnknownField(s.to_string()))
    }
}

/// Property type offered by the house type selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HouseType {
    Townhouse,
    House,
    Unit,
}

impl HouseType {
    /// Value submitted to the prediction service.
    pub fn as_str(self) -> &'static str {
        match self {
            HouseType::Townhouse => "Townhouse",
            HouseType::House => "House",
            HouseType::Unit => "Unit",
        }
    }

    /// Text shown in the selector.
    pub fn display_label(self) -> &'static str {
        match self {
            HouseType::Unit => "Unit/Apartment",
            other => other.as_str(),
        }
    }
}

/// Request body sent to the prediction endpoint.
///
/// Field values are forwarded exactly as entered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionRequest {
    pub address: String,
    pub bathrooms: String,
    pub bedrooms: String,
    pub carpark: String,
    pub house_type: String,
    pub building_area: String,
    pub landsize: String,
}

impl PredictionRequest {
    pub fn get(&self, field: FormField) -> &str {
        match field {
            FormField::Address => &self.address,
            FormField::Bathrooms => &self.bathrooms,
            FormField::Bedrooms => &self.bedrooms,
            FormField::Carpark => &self.carpark,
            FormField::HouseType => &self.house_type,
            FormField::BuildingArea => &self.building_area,
            FormField::Landsize => &self.landsize,
        }
    }
}

/// Form state as the user fills it in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormInput {
    values: [String; 7],
}

impl FormInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_field(&mut self, field: FormField, value: impl Into<String>) {
        self.values[field as usize] = value.into();
    }

    /// Sets a field by its request-body key.
    pub fn set_named(&mut self, name: &str, value: impl Into<String>) -> Result<(), UnknownField> {
        let field: FormField = name.parse()?;
        self.set_field(field, value);
        Ok(())
    }

    pub fn with(mut self, field: FormField, value: impl Into<String>) -> Self {
        self.set_field(field, value);
        self
    }

    pub fn get(&self, field: FormField) -> &str {
        &self.values[field as usize]
    }

    pub fn is_complete(&self) -> bool {
        self.values.iter().all(|v| !v.is_empty())
    }

    /// Fields that are still empty, in form order.
    pub fn missing_fields(&self) -> Vec<FormField> {
        FormField::ALL
            .into_iter()
            .filter(|f| self.get(*f).is_empty())
            .collect()
    }

    /// Builds the request body, or reports every empty field.
    ///
    /// The form keeps its values either way.
    pub fn submit(&self) -> Result<PredictionRequest, ValidationError> {
        let missing = self.missing_fields();
        if !missing.is_empty() {
            return Err(ValidationError { missing });
        }

        Ok(PredictionRequest {
            address: self.get(FormField::Address).to_string(),
            bathrooms: self.get(FormField::Bathrooms).to_string(),
            bedrooms: self.get(FormField::Bedrooms).to_string(),
            carpark: self.get(FormField::Carpark).to_string(),
            house_type: self.get(FormField::HouseType).to_string(),
            building_area: self.get(FormField::BuildingArea).to_string(),
            landsize: self.get(FormField::Landsize).to_string(),
        })
    }
}

#[cfg(test)]
pub(crate) fn complete_form() -> FormInput {
    FormInput::new()
        .with(FormField::Address, "12 Example St, Richmond VIC")
        .with(FormField::Bathrooms, "2")
        .with(FormField::Bedrooms, "3")
        .with(FormField::Carpark, "1")
        .with(FormField::HouseType, HouseType::House.as_str())
        .with(FormField::BuildingArea, "150")
        .with(FormField::Landsize, "400")
}
