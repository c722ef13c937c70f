use chrono::NaiveDateTime;

/// Sidecar metadata the recorder writes once per Saved/Sentry event folder.
///
/// Every field except `reason` is routinely absent or garbled in the wild, so
/// deserialization is lenient: unknown fields are ignored and a timestamp
/// that fails to parse degrades to `None` rather than rejecting the file.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Event {
    #[cfg_attr(feature = "serde", serde(default))]
    pub reason: String,
    #[cfg_attr(
        feature = "serde",
        serde(default, deserialize_with = "lenient_timestamp::deserialize")
    )]
    pub timestamp: Option<NaiveDateTime>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub city: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub est_lat: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub est_lon: Option<String>,
    /// Index of the camera that triggered the event, as written (a string).
    #[cfg_attr(feature = "serde", serde(default))]
    pub camera: Option<String>,
}

#[cfg(feature = "serde")]
mod lenient_timestamp {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer};

    const FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.and_then(|value| {
            FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(&value, fmt).ok())
        }))
    }
}
