//! Messages exchanged with the companion over the link. Fields are keyed
//! by numeric IDs on the wire, one ID per widget.

use serde::{Deserialize, Serialize};

/// Widget values pushed by the companion. Every field is optional, so one
/// message can carry any subset. Unknown keys are ignored.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldUpdate {
    /// Tide readout, e.g. "2/4  3:18"
    #[serde(rename = "0", skip_serializing_if = "Option::is_none")]
    pub tide: Option<String>,
    /// Wind readout, e.g. "8 sse"
    #[serde(rename = "1", skip_serializing_if = "Option::is_none")]
    pub wind: Option<String>,
    /// Sunrise/sunset readout, e.g. "5:43  7:58"
    #[serde(rename = "2", skip_serializing_if = "Option::is_none")]
    pub sunset: Option<String>,
    /// Temperature readout, e.g. "71/74"
    #[serde(rename = "3", skip_serializing_if = "Option::is_none")]
    pub temperature: Option<String>,
    /// Location line for the footer bar
    #[serde(rename = "6", skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Color inversion switch. Only the exact string "true" inverts.
    #[serde(rename = "8", skip_serializing_if = "Option::is_none")]
    pub invert: Option<String>,
    /// Forecast label shown next to the temperature, e.g. "rain?"
    #[serde(rename = "13", skip_serializing_if = "Option::is_none")]
    pub forecast: Option<String>,
}

/// Ask the companion for fresh data. The zero payload is the only thing
/// the face ever sends.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RefreshRequest {
    #[serde(rename = "0")]
    pub fetch: u8,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialize_update() {
        let update = FieldUpdate {
            tide: Some("4/5  2:23".into()),
            invert: Some("true".into()),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_string(&update).unwrap(),
            r#"{"0":"4/5  2:23","8":"true"}"#
        );
    }

    #[test]
    fn test_deserialize_ignores_unknown_keys() {
        let update: FieldUpdate =
            serde_json::from_str(r#"{"3":"71/74","11":"true"}"#).unwrap();
        assert_eq!(update.temperature.as_deref(), Some("71/74"));
        assert_eq!(update.tide, None);
        assert_eq!(update.invert, None);
    }

    #[test]
    fn test_refresh_request() {
        assert_eq!(
            serde_json::to_string(&RefreshRequest::default()).unwrap(),
            r#"{"0":0}"#
        );
        let parsed: RefreshRequest =
            serde_json::from_str(r#"{"0":0}"#).unwrap();
        assert_eq!(parsed, RefreshRequest::default());
    }
}
