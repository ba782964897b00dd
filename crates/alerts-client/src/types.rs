use alertwatch_core::{ActiveAlert, RegionId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ClientError;

/// Body of `GET /v1/alerts/active.json`.
#[derive(Debug, Clone, Deserialize)]
pub struct ActiveAlertsResponse {
    #[serde(default)]
    pub alerts: Vec<AlertRecord>,
}

/// The upstream sends `location_uid` as a string; accept a bare number too.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LocationUid {
    Number(RegionId),
    Text(String),
}

impl LocationUid {
    pub fn parse(&self) -> Result<RegionId, ClientError> {
        match self {
            Self::Number(n) => Ok(*n),
            Self::Text(s) => s
                .trim()
                .parse()
                .map_err(|_| ClientError::InvalidLocationUid(s.clone())),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertRecord {
    pub location_uid: LocationUid,
    #[serde(default)]
    pub location_title: Option<String>,
    #[serde(default)]
    pub location_type: Option<String>,
    #[serde(default)]
    pub alert_type: Option<String>,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
}

impl TryFrom<&AlertRecord> for ActiveAlert {
    type Error = ClientError;

    fn try_from(record: &AlertRecord) -> Result<Self, Self::Error> {
        Ok(ActiveAlert::new(record.location_uid.parse()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_active_alerts_body() {
        let json = r#"{
            "alerts": [
                {
                    "id": 8757,
                    "location_title": "Луганська область",
                    "location_type": "oblast",
                    "started_at": "2022-04-04T16:45:39.000Z",
                    "finished_at": null,
                    "updated_at": "2022-04-08T08:04:26.316Z",
                    "alert_type": "air_raid",
                    "location_uid": "16",
                    "location_oblast": "Луганська область",
                    "location_oblast_uid": 16,
                    "notes": null,
                    "calculated": null
                },
                {"location_uid": 31}
            ],
            "meta": {"last_updated_at": "2023/01/18 20:56:02 +0000", "type": "full"},
            "disclaimer": "If you use this data on your page or in social media, please place a link to alerts.in.ua"
        }"#;
        let body: ActiveAlertsResponse = serde_json::from_str(json).unwrap();
        assert_eq!(body.alerts.len(), 2);
        assert_eq!(body.alerts[0].location_uid.parse().unwrap(), 16);
        assert_eq!(body.alerts[0].alert_type.as_deref(), Some("air_raid"));
        assert!(body.alerts[0].started_at.is_some());
        assert_eq!(body.alerts[1].location_uid.parse().unwrap(), 31);
        assert!(body.alerts[1].location_title.is_none());
    }

    #[test]
    fn missing_alerts_key_is_empty() {
        let body: ActiveAlertsResponse = serde_json::from_str("{}").unwrap();
        assert!(body.alerts.is_empty());
    }

    #[test]
    fn non_numeric_uid_is_rejected() {
        let uid = LocationUid::Text("kyiv".into());
        assert!(matches!(
            uid.parse(),
            Err(ClientError::InvalidLocationUid(s)) if s == "kyiv"
        ));
    }
}
