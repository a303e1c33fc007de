//! Status-line rendering for tmux.

/// Symbol for a forecast icon code; unknown codes are shown as-is.
pub fn icon(code: &str) -> &str {
    match code {
        "clear-day" => "☀️",
        "clear-night" => "🌙",
        "sleet" | "rain" => "☔",
        "snow" => "❄️",
        "wind" => "💨",
        "fog" => "🌁",
        "cloudy" => "☁️",
        "partly-cloudy-night" | "partly-cloudy-day" => "⛅️",
        other => other,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum TemperatureBand {
    Freezing,
    Cold,
    Cool,
    Mild,
    Warm,
    Hot,
    Scorching,
}

impl TemperatureBand {
    pub fn for_degrees(degrees: i64) -> Self {
        match degrees {
            ..40 => Self::Freezing,
            40..50 => Self::Cold,
            50..60 => Self::Cool,
            60..70 => Self::Mild,
            70..80 => Self::Warm,
            80..90 => Self::Hot,
            _ => Self::Scorching,
        }
    }

    /// tmux 256-colour index.
    pub fn colour(self) -> u8 {
        match self {
            Self::Freezing => 27,
            Self::Cold => 39,
            Self::Cool => 50,
            Self::Mild => 220,
            Self::Warm => 208,
            Self::Hot => 202,
            Self::Scorching => 196,
        }
    }
}

/// `#[fg=colourN]<degrees>`
pub fn temperature(degrees: i64) -> String {
    let colour = TemperatureBand::for_degrees(degrees).colour();
    format!("#[fg=colour{colour}]{degrees}")
}

pub fn status_line(icon_code: &str, degrees: i64) -> String {
    format!("{} {}", icon(icon_code), temperature(degrees))
}
