use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Server-assigned bin identifier.
pub type BinId = String;

/// Collection priority of a bin.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    #[default]
    Low,
    Medium,
    High,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::Low, Priority::Medium, Priority::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            _ => Err(format!("unknown priority: {}", s)),
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Backends written against enum names send "HIGH" as often as "high".
impl<'de> Deserialize<'de> for Priority {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Integer fill percentage, always within `0..=100`.
///
/// Deserializes from any JSON number: fractions are rounded, out-of-range
/// values are clamped and NaN becomes zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "f64", into = "u8")]
pub struct FillLevel(u8);

impl FillLevel {
    pub const MAX: FillLevel = FillLevel(100);

    /// Creates a fill level, clamping to 100.
    pub fn new(percent: u8) -> Self {
        FillLevel(percent.min(100))
    }

    pub fn percent(&self) -> u8 {
        self.0
    }

    pub fn status(&self) -> FillStatus {
        match self.0 {
            80.. => FillStatus::Critical,
            60.. => FillStatus::Warning,
            _ => FillStatus::Normal,
        }
    }

    /// Draws a uniformly random fill level, used for bins placed from the map.
    pub fn random() -> Self {
        use rand::Rng;
        FillLevel(rand::rng().random_range(0..=100))
    }
}

impl From<f64> for FillLevel {
    fn from(value: f64) -> Self {
        if value.is_nan() {
            return FillLevel(0);
        }
        FillLevel(value.round().clamp(0.0, 100.0) as u8)
    }
}

impl From<FillLevel> for u8 {
    fn from(level: FillLevel) -> Self {
        level.0
    }
}

impl fmt::Display for FillLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

/// Severity band derived from the fill level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillStatus {
    Normal,
    Warning,
    Critical,
}

impl FillStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FillStatus::Normal => "normal",
            FillStatus::Warning => "warning",
            FillStatus::Critical => "critical",
        }
    }
}

/// A waste bin as known to the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bin {
    #[serde(with = "crate::serde_helpers::id_string")]
    pub id: BinId,
    pub lat: f64,
    pub lng: f64,
    #[serde(default)]
    pub fill_level: FillLevel,
    #[serde(default)]
    pub priority: Priority,
}

impl Bin {
    /// Tooltip text shown on the bin's marker.
    pub fn tooltip(&self) -> String {
        format!(
            "Bin {}\nFill level: {} ({})\nPriority: {}",
            self.id,
            self.fill_level,
            self.fill_level.status().as_str(),
            self.priority
        )
    }

    pub fn with_priority(&self, priority: Priority) -> Bin {
        Bin {
            priority,
            ..self.clone()
        }
    }
}

/// Payload for creating a bin; the server assigns the id.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBin {
    pub lat: f64,
    pub lng: f64,
    pub fill_level: FillLevel,
    pub priority: Priority,
}
