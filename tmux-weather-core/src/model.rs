use serde::{Deserialize, Serialize};

/// Coordinates printed by the location command.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLon {
    pub latitude: f64,
    pub longitude: f64,
}

/// The subset of the forecast service's response that the widget uses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub daily: Daily,
    pub currently: Currently,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Daily {
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Currently {
    pub icon: String,
    pub temperature: Temperature,
}

/// Temperature as sent by the service, either a JSON number or a string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Temperature {
    Number(f64),
    Text(String),
}

impl Temperature {
    /// Whole degrees: numbers truncate toward zero, strings use their leading
    /// integer (`"72.6F"` → 72). `None` when there is no integer to take.
    pub fn degrees(&self) -> Option<i64> {
        match self {
            Temperature::Number(n) if n.is_finite() => Some(n.trunc() as i64),
            Temperature::Number(_) => None,
            Temperature::Text(s) => leading_integer(s),
        }
    }
}

fn leading_integer(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let sign_len = usize::from(s.starts_with(['-', '+']));
    let digits = s[sign_len..].bytes().take_while(u8::is_ascii_digit).count();

    if digits == 0 {
        return None;
    }
    s[..sign_len + digits].parse().ok()
}
