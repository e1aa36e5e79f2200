//! Column names of the raw and enriched event tables.
//!
//! Downstream chart code addresses columns by these exact names.

// Required raw columns
pub const MAGNITUDE: &str = "magnitude";
pub const DEPTH: &str = "depth";
pub const LATITUDE: &str = "latitude";
pub const LONGITUDE: &str = "longitude";
pub const TSUNAMI: &str = "tsunami";
pub const YEAR: &str = "year";
pub const MONTH: &str = "month";
pub const SIGNIFICANCE: &str = "sig";

// Optional raw columns
pub const STATION_COUNT: &str = "nst";
pub const MIN_DISTANCE: &str = "dmin";
pub const AZIMUTHAL_GAP: &str = "gap";
pub const COMMUNITY_INTENSITY: &str = "cdi";
pub const INSTRUMENTAL_INTENSITY: &str = "mmi";

// Derived columns
pub const DATE: &str = "date";
pub const IS_SHALLOW: &str = "is_shallow";
pub const HIGH_MAGNITUDE: &str = "high_magnitude";
pub const OCEANIC_EVENT: &str = "oceanic_event";
pub const TSUNAMI_LABEL: &str = "tsunami_label";
pub const MAGNITUDE_CATEGORY: &str = "magnitude_category";
pub const DEPTH_CATEGORY: &str = "depth_category";
pub const MONITORING_QUALITY: &str = "monitoring_quality";
pub const IMPACT_LEVEL: &str = "impact_level";

/// Columns every raw dataset must provide.
pub const REQUIRED_COLUMNS: [&str; 8] = [
    MAGNITUDE,
    DEPTH,
    LATITUDE,
    LONGITUDE,
    TSUNAMI,
    YEAR,
    MONTH,
    SIGNIFICANCE,
];

/// Optional raw columns that feed derived attributes.
pub const OPTIONAL_COLUMNS: [&str; 5] = [
    STATION_COUNT,
    MIN_DISTANCE,
    AZIMUTHAL_GAP,
    COMMUNITY_INTENSITY,
    INSTRUMENTAL_INTENSITY,
];

/// Columns added by the dataset preparer, in derivation order.
pub const DERIVED_COLUMNS: [&str; 9] = [
    DATE,
    IS_SHALLOW,
    HIGH_MAGNITUDE,
    OCEANIC_EVENT,
    TSUNAMI_LABEL,
    MAGNITUDE_CATEGORY,
    DEPTH_CATEGORY,
    MONITORING_QUALITY,
    IMPACT_LEVEL,
];

/// Alternative header spellings accepted for known columns (lowercased).
const ALIASES: [(&str, &str); 1] = [("significance", SIGNIFICANCE)];

/// Map a raw header to its canonical column name.
///
/// Matching is case-insensitive and ignores surrounding whitespace, so the
/// common `Year` / `Month` headers resolve to `year` / `month`. Unknown
/// headers return `None` and are left untouched.
pub fn canonical_name(header: &str) -> Option<&'static str> {
    let lower = header.trim().to_ascii_lowercase();

    REQUIRED_COLUMNS
        .iter()
        .chain(OPTIONAL_COLUMNS.iter())
        .find(|name| **name == lower)
        .copied()
        .or_else(|| {
            ALIASES
                .iter()
                .find(|(alias, _)| *alias == lower)
                .map(|(_, name)| *name)
        })
}

/// Human-readable description of a raw or derived column.
pub fn variable_description(name: &str) -> Option<&'static str> {
    let description = match name {
        MAGNITUDE => "Earthquake magnitude (Richter scale)",
        DEPTH => "Hypocenter depth (km)",
        LATITUDE => "Epicenter latitude",
        LONGITUDE => "Epicenter longitude",
        TSUNAMI => "Binary indicator (1 = generated a tsunami, 0 = did not)",
        SIGNIFICANCE => "Event significance score",
        STATION_COUNT => "Number of seismic stations that recorded the event",
        MIN_DISTANCE => "Minimum angular distance to a station (degrees)",
        AZIMUTHAL_GAP => "Azimuthal gap between stations (degrees)",
        INSTRUMENTAL_INTENSITY => "Modified Mercalli Intensity (instrumental)",
        COMMUNITY_INTENSITY => "Community-reported Mercalli intensity",
        YEAR => "Event year",
        MONTH => "Event month",
        DATE => "First day of the event month",
        IS_SHALLOW => "Shallow event (depth < 50 km)",
        HIGH_MAGNITUDE => "High magnitude (>= 7.0)",
        OCEANIC_EVENT => "Oceanic event (dmin > 5 degrees)",
        TSUNAMI_LABEL => "Tsunami outcome label",
        MAGNITUDE_CATEGORY => "Magnitude bin",
        DEPTH_CATEGORY => "Depth bin",
        MONITORING_QUALITY => "Monitoring quality index (0-1)",
        IMPACT_LEVEL => "Community impact level",
        _ => return None,
    };
    Some(description)
}
