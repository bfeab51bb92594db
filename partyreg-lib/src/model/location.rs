use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use super::Incident;
use super::IncidentSeverity;
use super::Resource;

/// An address known to the registry, keyed by its Google place id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub id: i64,
    pub google_place_id: String,
    pub formatted_address: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Registrations at this address are blocked until then.
    #[serde(default)]
    pub hold_expiration: Option<DateTime<Utc>>,
    #[serde(default)]
    pub incidents: Vec<Incident>,
}

impl Location {
    fn count(&self, severity: IncidentSeverity) -> usize {
        self.incidents.iter().filter(|i| i.severity == severity).count()
    }

    pub fn warning_count(&self) -> usize {
        self.count(IncidentSeverity::Warning)
    }

    pub fn citation_count(&self) -> usize {
        self.count(IncidentSeverity::Citation)
    }

    pub fn complaint_count(&self) -> usize {
        self.count(IncidentSeverity::Complaint)
    }

    /// Hold expiry if it is still in the future at `now`.
    pub fn active_hold(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.hold_expiration.filter(|until| *until > now)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationPayload {
    pub google_place_id: String,
    #[serde(default)]
    pub hold_expiration: Option<DateTime<Utc>>,
}

impl From<&Location> for LocationPayload {
    fn from(l: &Location) -> Self {
        Self {
            google_place_id: l.google_place_id.clone(),
            hold_expiration: l.hold_expiration,
        }
    }
}

impl Resource for Location {
    type Payload = LocationPayload;

    const PATH: &'static str = "locations";
    const NAME: &'static str = "Location";

    fn id(&self) -> i64 {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn incident(id: i64, severity: IncidentSeverity) -> Incident {
        Incident {
            id,
            location_id: 1,
            incident_datetime: Utc.with_ymd_and_hms(2025, 3, 1, 23, 0, 0).unwrap(),
            description: String::new(),
            severity,
        }
    }

    #[test]
    fn test_counts_and_hold() {
        let json = r#"{
            "id": 1,
            "google_place_id": "ChIJ123",
            "formatted_address": "12 Rosemary St, Chapel Hill, NC",
            "latitude": 35.91,
            "longitude": -79.05,
            "hold_expiration": "2025-06-01T00:00:00Z"
        }"#;
        let mut location: Location = serde_json::from_str(json).unwrap();
        assert!(location.incidents.is_empty());

        location.incidents = vec![
            incident(1, IncidentSeverity::Warning),
            incident(2, IncidentSeverity::Citation),
            incident(3, IncidentSeverity::Warning),
        ];
        assert_eq!(location.warning_count(), 2);
        assert_eq!(location.citation_count(), 1);
        assert_eq!(location.complaint_count(), 0);

        let before = Utc.with_ymd_and_hms(2025, 5, 1, 0, 0, 0).unwrap();
        let after = Utc.with_ymd_and_hms(2025, 7, 1, 0, 0, 0).unwrap();
        assert!(location.active_hold(before).is_some());
        assert!(location.active_hold(after).is_none());
    }
}
