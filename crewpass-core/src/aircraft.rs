use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Aircraft types supported for voucher issuance. A closed set: adding a
/// type means adding a variant and its layout here.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Aircraft {
    #[serde(rename = "ATR")]
    Atr,
    #[serde(rename = "Airbus 320")]
    Airbus320,
    #[serde(rename = "Boeing 737 Max")]
    Boeing737Max,
}

/// Cabin layout: row count and ordered column letters.
struct Layout {
    rows: u32,
    columns: &'static [char],
}

impl Aircraft {
    pub const ALL: [Aircraft; 3] = [Aircraft::Atr, Aircraft::Airbus320, Aircraft::Boeing737Max];

    fn layout(&self) -> Layout {
        match self {
            Aircraft::Atr => Layout {
                rows: 18,
                columns: &['A', 'C', 'D', 'F'],
            },
            Aircraft::Airbus320 | Aircraft::Boeing737Max => Layout {
                rows: 32,
                columns: &['A', 'B', 'C', 'D', 'E', 'F'],
            },
        }
    }

    /// The wire string used in requests and in the aircraft_type column.
    pub fn code(&self) -> &'static str {
        match self {
            Aircraft::Atr => "ATR",
            Aircraft::Airbus320 => "Airbus 320",
            Aircraft::Boeing737Max => "Boeing 737 Max",
        }
    }

    pub fn seat_count(&self) -> usize {
        let layout = self.layout();
        layout.rows as usize * layout.columns.len()
    }

    /// Full ordered seat map for this aircraft, row-major: row number followed
    /// by column letter, e.g. "12C". Recomputed on demand, never persisted.
    pub fn seat_map(&self) -> Vec<String> {
        let layout = self.layout();
        let mut seats = Vec::with_capacity(self.seat_count());
        for row in 1..=layout.rows {
            for column in layout.columns {
                seats.push(format!("{}{}", row, column));
            }
        }
        seats
    }
}

impl fmt::Display for Aircraft {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Invalid aircraft type. Supported types: ATR, Airbus 320, Boeing 737 Max")]
pub struct UnknownAircraft(pub String);

impl FromStr for Aircraft {
    type Err = UnknownAircraft;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ATR" => Ok(Aircraft::Atr),
            "Airbus 320" => Ok(Aircraft::Airbus320),
            "Boeing 737 Max" => Ok(Aircraft::Boeing737Max),
            other => Err(UnknownAircraft(other.to_string())),
        }
    }
}
