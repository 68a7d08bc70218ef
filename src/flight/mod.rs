mod repository;

pub use repository::*;

use std::cmp::Ordering;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Flight as saved on database.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Flight {
    pub id: Uuid,
    pub origin: String,
    pub destination: String,
    pub price: f64,
    pub departure_time: Option<DateTime<Utc>>,
    pub arrival_time: Option<DateTime<Utc>>,
    /// User referenced when the flight was created. Not re-checked later.
    pub user_id: Uuid,
}

/// Data required to insert a [`Flight`].
#[derive(Clone, Debug, PartialEq)]
pub struct NewFlight {
    pub origin: String,
    pub destination: String,
    pub price: f64,
    pub departure_time: Option<DateTime<Utc>>,
    pub arrival_time: Option<DateTime<Utc>>,
    pub user_id: Uuid,
}

/// Fields replaced on update.
#[derive(Clone, Debug, PartialEq)]
pub struct FlightChanges {
    pub origin: String,
    pub destination: String,
    pub price: f64,
    pub departure_time: Option<DateTime<Utc>>,
    pub arrival_time: Option<DateTime<Utc>>,
}

/// Sort direction on price.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortOrder::Ascending),
            "desc" | "descending" => Ok(SortOrder::Descending),
            other => Err(format!("unknown sort order `{other}`")),
        }
    }
}

impl SortOrder {
    /// SQL keyword.
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Ascending => "ASC",
            SortOrder::Descending => "DESC",
        }
    }

    /// Order two flights by price.
    pub fn compare(&self, a: &Flight, b: &Flight) -> Ordering {
        let ord = a.price.total_cmp(&b.price);
        match self {
            SortOrder::Ascending => ord,
            SortOrder::Descending => ord.reverse(),
        }
    }
}

/// Listing filters.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FlightFilter {
    pub origin: Option<String>,
    pub destination: Option<String>,
    pub sort_by_price: Option<SortOrder>,
}

impl FlightFilter {
    /// Whether `flight` passes every set filter.
    pub fn matches(&self, flight: &Flight) -> bool {
        self.origin.as_ref().is_none_or(|o| *o == flight.origin)
            && self
                .destination
                .as_ref()
                .is_none_or(|d| *d == flight.destination)
    }
}

/// Column used to group flights when averaging prices.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupBy {
    #[default]
    Origin,
    Destination,
}

impl GroupBy {
    /// Column name.
    pub fn column(&self) -> &'static str {
        match self {
            GroupBy::Origin => "origin",
            GroupBy::Destination => "destination",
        }
    }

    /// Grouping key of `flight`.
    pub fn key<'a>(&self, flight: &'a Flight) -> &'a str {
        match self {
            GroupBy::Origin => &flight.origin,
            GroupBy::Destination => &flight.destination,
        }
    }
}

/// Average price of one group.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AveragePrice {
    pub key: String,
    pub average_price: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flight(origin: &str, price: f64) -> Flight {
        Flight {
            id: Uuid::new_v4(),
            origin: origin.into(),
            destination: "CDG".into(),
            price,
            departure_time: None,
            arrival_time: None,
            user_id: Uuid::new_v4(),
        }
    }

    #[test]
    fn test_sort_order_parse() {
        assert_eq!("asc".parse::<SortOrder>(), Ok(SortOrder::Ascending));
        assert_eq!("Descending".parse::<SortOrder>(), Ok(SortOrder::Descending));
        assert!("sideways".parse::<SortOrder>().is_err());
    }

    #[test]
    fn test_sort_and_filter() {
        let mut flights = vec![flight("JFK", 420.0), flight("LHR", 90.5)];
        flights.sort_by(|a, b| SortOrder::Ascending.compare(a, b));
        assert_eq!(flights[0].origin, "LHR");

        let filter = FlightFilter {
            origin: Some("JFK".into()),
            ..Default::default()
        };
        assert!(filter.matches(&flights[1]));
        assert!(!filter.matches(&flights[0]));
    }

    #[test]
    fn test_flight_json_is_camel_case() {
        let json = serde_json::to_value(flight("JFK", 10.0)).unwrap();
        assert!(json.get("userId").is_some());
        assert!(json.get("departureTime").is_some());
    }
}
