//! Serde helpers shared across crates.

use serde::Deserialize;

/// Deserialize an optional field where a blank HTML form input arrives
/// as an empty string rather than an absent key.
pub fn empty_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref() {
        None | Some("") => Ok(None),
        Some(value) => value.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, serde::Deserialize)]
    struct Probe {
        #[serde(default, deserialize_with = "empty_as_none")]
        value: Option<f64>,
    }

    #[test]
    fn test_blank_and_missing_become_none() {
        let probe: Probe = serde_json::from_str(r#"{"value": ""}"#).unwrap();
        assert_eq!(probe.value, None);

        let probe: Probe = serde_json::from_str("{}").unwrap();
        assert_eq!(probe.value, None);
    }

    #[test]
    fn test_present_value_parses() {
        let probe: Probe = serde_json::from_str(r#"{"value": "22.5"}"#).unwrap();
        assert_eq!(probe.value, Some(22.5));
    }
}
