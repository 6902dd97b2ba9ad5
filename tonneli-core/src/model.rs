//! Domain data structures for cities, addresses, and pickup schedules.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Built-in cities supported by the application.
pub enum Cities {
    /// Lexington, Massachusetts.
    Lexington,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// Identifier for a city known to tonneli.
pub struct CityId(pub String);

impl fmt::Display for Cities {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slug = match self {
            Cities::Lexington => "lexington",
        };
        write!(formatter, "{slug}")
    }
}

impl From<Cities> for CityId {
    fn from(city: Cities) -> Self {
        CityId(city.to_string())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Metadata describing a city and its human-friendly name.
pub struct CityMeta {
    /// Unique identifier.
    pub id: CityId,
    /// Display name.
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// Identifier for a concrete address.
///
/// Street-level providers use the canonical street name as identifier.
pub struct AddressId(pub String);

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Address returned from a provider search.
pub struct Address {
    /// Unique identifier used by a provider when requesting schedules.
    pub id: AddressId,
    /// City the address belongs to.
    pub city: CityId,
    /// Human-friendly label.
    pub label: String,
    /// Street name.
    pub street: String,
    /// How closely the street matched the search query, `1.0` for an exact match.
    pub confidence: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
/// Curbside collection streams.
pub enum Fraction {
    /// Household trash.
    Trash,
    /// Single-stream recycling.
    Recycling,
    /// Yard waste and food scraps.
    Compost,
}

impl Fraction {
    /// All streams in presentation order.
    pub const ALL: [Fraction; 3] = [Fraction::Trash, Fraction::Recycling, Fraction::Compost];

    /// Human readable label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Fraction::Trash => "Trash",
            Fraction::Recycling => "Recycling",
            Fraction::Compost => "Compost",
        }
    }
}

impl fmt::Display for Fraction {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Scheduled pickup for a specific day.
pub struct PickupEvent {
    /// Date of the pickup.
    pub date: NaiveDate,
    /// Stream collected.
    pub fraction: Fraction,
    /// Optional provider note describing the pickup.
    pub note: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
/// Inclusive start/end range for requested schedules.
pub struct DateRange {
    /// Start date (inclusive).
    pub start: NaiveDate,
    /// End date (inclusive).
    pub end: NaiveDate,
}

impl DateRange {
    /// Whether `date` falls inside the range.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}
