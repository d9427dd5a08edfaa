use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::aircraft::Aircraft;

/// A seat voucher issued to a crew member for one flight/date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Voucher {
    pub id: Uuid,
    pub crew_name: String,
    pub crew_id: String,
    pub flight_number: String,
    pub flight_date: NaiveDate,
    pub aircraft: Aircraft,
    pub seats: [String; 3],
    pub created_at: DateTime<Utc>,
}

impl Voucher {
    pub fn new(
        crew_name: String,
        crew_id: String,
        flight_number: String,
        flight_date: NaiveDate,
        aircraft: Aircraft,
        seats: [String; 3],
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            crew_name,
            crew_id,
            flight_number,
            flight_date,
            aircraft,
            seats,
            created_at: Utc::now(),
        }
    }
}

/// Request payload for voucher generation and regeneration.
///
/// Every field defaults so a partial body deserializes and fails validation
/// with a domain error rather than a rejection at the JSON layer.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssignmentRequest {
    #[serde(rename = "name", default)]
    pub crew_name: Option<String>,
    #[serde(rename = "id", default)]
    pub crew_id: Option<String>,
    #[serde(rename = "flightNumber", default)]
    pub flight_number: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub aircraft: String,
    #[serde(default)]
    pub is_regenerate: bool,
    #[serde(rename = "updated_seat", default)]
    pub updated_seats: Vec<String>,
}
