use serde::{Deserialize, Serialize};
use std::fmt;

/// Magnitude bins: (-inf, 6.5], (6.5, 7.0], (7.0, 7.5], (7.5, inf).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MagnitudeCategory {
    Moderate,
    Strong,
    Major,
    Great,
}

impl MagnitudeCategory {
    pub const ALL: [MagnitudeCategory; 4] =
        [Self::Moderate, Self::Strong, Self::Major, Self::Great];

    /// Bin a magnitude. NaN falls outside every bin.
    pub fn from_magnitude(magnitude: f64) -> Option<Self> {
        if magnitude.is_nan() {
            None
        } else if magnitude <= 6.5 {
            Some(Self::Moderate)
        } else if magnitude <= 7.0 {
            Some(Self::Strong)
        } else if magnitude <= 7.5 {
            Some(Self::Major)
        } else {
            Some(Self::Great)
        }
    }

    /// Value stored in the `magnitude_category` column.
    pub fn label(self) -> &'static str {
        match self {
            Self::Moderate => "<= 6.5",
            Self::Strong => "6.5-7.0",
            Self::Major => "7.0-7.5",
            Self::Great => "> 7.5",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.label() == label)
    }
}

impl fmt::Display for MagnitudeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Depth bins in km: (0, 50], (50, 150], (150, 300], (300, 700].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DepthCategory {
    Shallow,
    Intermediate,
    Deep,
    VeryDeep,
}

impl DepthCategory {
    pub const ALL: [DepthCategory; 4] =
        [Self::Shallow, Self::Intermediate, Self::Deep, Self::VeryDeep];

    /// Bin a depth. Depths of 0 km or less, above 700 km, or NaN are unbinned.
    pub fn from_depth(depth: f64) -> Option<Self> {
        if depth.is_nan() || depth <= 0.0 || depth > 700.0 {
            None
        } else if depth <= 50.0 {
            Some(Self::Shallow)
        } else if depth <= 150.0 {
            Some(Self::Intermediate)
        } else if depth <= 300.0 {
            Some(Self::Deep)
        } else {
            Some(Self::VeryDeep)
        }
    }

    /// Value stored in the `depth_category` column.
    pub fn label(self) -> &'static str {
        match self {
            Self::Shallow => "Shallow (0-50km)",
            Self::Intermediate => "Intermediate (50-150km)",
            Self::Deep => "Deep (150-300km)",
            Self::VeryDeep => "Very Deep (>300km)",
        }
    }
}

impl fmt::Display for DepthCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Which tsunami outcome to keep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TsunamiFilter {
    #[default]
    All,
    OnlyWith,
    OnlyWithout,
}

/// Geographic hemisphere labels.
///
/// North is latitude >= 0, South latitude < 0, East longitude >= 0 and
/// West longitude < 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Hemisphere {
    North,
    South,
    East,
    West,
}

impl Hemisphere {
    pub const ALL: [Hemisphere; 4] = [Self::North, Self::South, Self::East, Self::West];

    /// Whether an epicenter lies in this hemisphere. Missing coordinates
    /// belong to no hemisphere.
    pub fn contains(self, latitude: Option<f64>, longitude: Option<f64>) -> bool {
        match self {
            Self::North => latitude.is_some_and(|lat| lat >= 0.0),
            Self::South => latitude.is_some_and(|lat| lat < 0.0),
            Self::East => longitude.is_some_and(|lon| lon >= 0.0),
            Self::West => longitude.is_some_and(|lon| lon < 0.0),
        }
    }
}

/// Header metrics for a loaded dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetSummary {
    pub total_events: usize,
    pub tsunami_events: usize,
    /// Percentage of rows with a tsunami (0 for an empty table).
    pub tsunami_percentage: f64,
    pub year_min: Option<i32>,
    pub year_max: Option<i32>,
    /// Inclusive span such as `"2001-2022"`, or `"n/a"` when empty.
    pub years_span: String,
    pub magnitude_min: Option<f64>,
    pub magnitude_max: Option<f64>,
    pub magnitude_range: String,
    pub depth_min: Option<f64>,
    pub depth_max: Option<f64>,
    pub depth_range: String,
}

/// Before/after statistics for one filter application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterSummary {
    pub original_count: usize,
    pub filtered_count: usize,
    /// Percentage of original rows retained (0 when the original is empty).
    pub retained_percentage: f64,
    pub removed_count: usize,
    pub tsunami_count: usize,
    /// Tsunami share of the filtered rows (0 when nothing is left).
    pub tsunami_percentage: f64,
}

/// Percentage helper that defines `x / 0` as 0.
pub(crate) fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64 * 100.0
    }
}
