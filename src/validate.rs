//! The single place request bodies are turned into typed inputs.
//!
//! Numbers may arrive as JSON numbers or as numeric strings (HTML forms send strings). Anything
//! that comes out of here is fully typed, so nothing past this module parses text.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;
use thiserror::Error;

use crate::db::MineFields;
use crate::db_types::{OperationalStatus, Role};
use crate::emissions::{EmissionInput, EmissionSubmission, EmissionUpdate};
use crate::operations::{Energy, Equipment, Excavation, OperationDetails, OperationSubmission, Transportation, Waste};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    Missing { field: String },

    #[error("{field} must be a number")]
    NotANumber { field: String },

    #[error("{field} must be a finite number")]
    NotFinite { field: String },

    #[error("{field} must not be negative")]
    Negative { field: String },

    #[error("{field} {reason}")]
    Invalid { field: String, reason: String },
}

impl ValidationError {
    /// The offending field, as a dotted path into the request body.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::Missing { field } |
            ValidationError::NotANumber { field } |
            ValidationError::NotFinite { field } |
            ValidationError::Negative { field } |
            ValidationError::Invalid { field, .. } => field,
        }
    }

    fn invalid(field: &str, reason: impl Into<String>) -> Self {
        ValidationError::Invalid { field: field.to_string(), reason: reason.into() }
    }
}

pub type ValidationResult<T> = Result<T, ValidationError>;

/// Read-only view over a JSON request body, addressed by dotted paths like `excavationData.fuelConsumption`.
pub struct Fields<'a> {
    body: &'a Value,
}

impl<'a> Fields<'a> {
    pub fn new(body: &'a Value) -> Self {
        Self { body }
    }

    // null and "" count as absent, the same as a missing key
    fn lookup(&self, path: &str) -> Option<&'a Value> {
        let value = path.split('.')
            .try_fold(self.body, |value, key| value.get(key))?;

        match value {
            Value::Null => None,
            Value::String(s) if s.trim().is_empty() => None,
            value => Some(value),
        }
    }

    pub fn optional_number(&self, path: &str) -> ValidationResult<Option<f64>> {
        let value = match self.lookup(path) {
            None => return Ok(None),
            Some(value) => value,
        };

        let number = match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }.ok_or_else(|| ValidationError::NotANumber { field: path.to_string() })?;

        if !number.is_finite() {
            return Err(ValidationError::NotFinite { field: path.to_string() });
        }
        if number < 0.0 {
            return Err(ValidationError::Negative { field: path.to_string() });
        }

        Ok(Some(number))
    }

    pub fn number(&self, path: &str) -> ValidationResult<f64> {
        self.optional_number(path)?
            .ok_or_else(|| ValidationError::Missing { field: path.to_string() })
    }

    pub fn number_or(&self, path: &str, default: f64) -> ValidationResult<f64> {
        Ok(self.optional_number(path)?.unwrap_or(default))
    }

    pub fn positive_number(&self, path: &str) -> ValidationResult<f64> {
        let number = self.number(path)?;
        if number <= 0.0 {
            return Err(ValidationError::invalid(path, "must be greater than zero"));
        }
        Ok(number)
    }

    pub fn text(&self, path: &str) -> ValidationResult<String> {
        match self.lookup(path) {
            None => Err(ValidationError::Missing { field: path.to_string() }),
            Some(Value::String(s)) => Ok(s.trim().to_string()),
            Some(_) => Err(ValidationError::invalid(path, "must be text")),
        }
    }

    pub fn id(&self, path: &str) -> ValidationResult<i32> {
        let value = self.lookup(path)
            .ok_or_else(|| ValidationError::Missing { field: path.to_string() })?;

        let id = match value {
            Value::Number(n) => n.as_i64().and_then(|n| i32::try_from(n).ok()),
            Value::String(s) => s.trim().parse::<i32>().ok(),
            _ => None,
        };

        id.filter(|id| *id > 0)
            .ok_or_else(|| ValidationError::invalid(path, "must be a positive integer id"))
    }

    /// Accepts RFC 3339 timestamps and bare `YYYY-MM-DD` dates (taken as midnight UTC).
    pub fn optional_date(&self, path: &str) -> ValidationResult<Option<DateTime<Utc>>> {
        let text = match self.lookup(path) {
            None => return Ok(None),
            Some(Value::String(s)) => s.trim(),
            Some(_) => return Err(ValidationError::invalid(path, "must be a date string")),
        };

        if let Ok(date) = DateTime::parse_from_rfc3339(text) {
            return Ok(Some(date.with_timezone(&Utc)));
        }

        NaiveDate::parse_from_str(text, "%Y-%m-%d").ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|midnight| Some(DateTime::from_naive_utc_and_offset(midnight, Utc)))
            .ok_or_else(|| ValidationError::invalid(path, "must be an RFC 3339 timestamp or YYYY-MM-DD date"))
    }

    pub fn date(&self, path: &str) -> ValidationResult<DateTime<Utc>> {
        self.optional_date(path)?
            .ok_or_else(|| ValidationError::Missing { field: path.to_string() })
    }

    pub fn parsed<T: FromStr>(&self, path: &str, expected: &str) -> ValidationResult<T> {
        let text = self.text(path)?;
        text.parse()
            .map_err(|_| ValidationError::invalid(path, format!("must be one of {}", expected)))
    }
}

/// An id taken from a query string. Absent or blank means no filter; anything else has to be a
/// positive integer.
pub fn optional_id_param(field: &str, raw: Option<&str>) -> ValidationResult<Option<i32>> {
    let text = match raw.map(str::trim).filter(|text| !text.is_empty()) {
        None => return Ok(None),
        Some(text) => text,
    };

    let id = text.parse::<i32>()
        .map_err(|_| ValidationError::NotANumber { field: field.to_string() })?;
    if id <= 0 {
        return Err(ValidationError::invalid(field, "must be a positive integer id"));
    }
    Ok(Some(id))
}

/// The five raw inputs of an emission record. The last two default to zero.
pub fn emission_input(body: &Value) -> ValidationResult<EmissionInput> {
    let fields = Fields::new(body);
    Ok(EmissionInput {
        coal_output: fields.number("coal_output")?,
        electricity_usage: fields.number("electricity_usage")?,
        fuel_consumption: fields.number("fuel_consumption")?,
        methane_leaks: fields.number_or("methane_leaks", 0.0)?,
        stockpile_emissions: fields.number_or("stockpile_emissions", 0.0)?,
    })
}

/// Any `total_emissions` in the body is ignored; it's always recomputed.
pub fn emission_submission(body: &Value) -> ValidationResult<EmissionSubmission> {
    let fields = Fields::new(body);
    Ok(EmissionSubmission {
        mine_id: fields.id("mine_id")?,
        date: fields.optional_date("date")?,
        input: emission_input(body)?,
    })
}

/// Like [emission_submission] without `mine_id`, which can't change after creation.
pub fn emission_update(body: &Value) -> ValidationResult<EmissionUpdate> {
    Ok(EmissionUpdate {
        date: Fields::new(body).optional_date("date")?,
        input: emission_input(body)?,
    })
}

pub fn mine_fields(body: &Value) -> ValidationResult<MineFields> {
    let fields = Fields::new(body);
    Ok(MineFields {
        name: fields.text("name")?,
        location: fields.text("location")?,
        area_size: fields.positive_number("area_size")?,
        operational_status: fields.parsed::<OperationalStatus>(
            "operational_status", "active, inactive, maintenance, closed")?,
    })
}

pub fn operation_details(body: &Value) -> ValidationResult<OperationDetails> {
    let fields = Fields::new(body);
    Ok(OperationDetails {
        excavation: Excavation {
            material_volume: fields.number("excavationData.materialVolume")?,
            equipment_hours: fields.number("excavationData.equipmentHours")?,
            fuel_consumption: fields.number("excavationData.fuelConsumption")?,
        },
        transportation: Transportation {
            distance: fields.number("transportationData.distance")?,
            vehicle_types: fields.text("transportationData.vehicleTypes")?,
            fuel_consumption: fields.number("transportationData.fuelConsumption")?,
        },
        equipment: Equipment {
            equipment_type: fields.text("equipmentData.type")?,
            operating_hours: fields.number("equipmentData.operatingHours")?,
            energy_consumption: fields.number("equipmentData.energyConsumption")?,
        },
        energy: Energy {
            electricity: fields.number("energyConsumption.electricity")?,
            diesel: fields.number("energyConsumption.diesel")?,
            other: fields.optional_number("energyConsumption.other")?,
        },
        waste: Waste {
            overburden: fields.number("wasteManagement.overburden")?,
            waste_rock: fields.number("wasteManagement.wasteRock")?,
            treatment: fields.text("wasteManagement.treatment")?,
        },
    })
}

pub fn operation_submission(body: &Value) -> ValidationResult<OperationSubmission> {
    let fields = Fields::new(body);
    Ok(OperationSubmission {
        mine_id: fields.id("mine_id")?,
        date: fields.date("date")?,
        details: operation_details(body)?,
    })
}

pub struct Credentials {
    pub username: String,
    pub password: String,
}

pub fn credentials(body: &Value) -> ValidationResult<Credentials> {
    let fields = Fields::new(body);
    let username = fields.text("username")?;
    let password = match fields.lookup("password") {
        Some(Value::String(s)) => s.clone(),
        Some(_) => return Err(ValidationError::invalid("password", "must be text")),
        None => return Err(ValidationError::Missing { field: "password".to_string() }),
    };
    Ok(Credentials { username, password })
}

pub fn role(body: &Value) -> ValidationResult<Role> {
    Fields::new(body).parsed("role", "admin, environmental_officer, analyst")
}
