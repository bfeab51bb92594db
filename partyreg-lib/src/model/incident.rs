use std::fmt;

use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IncidentSeverity {
    Complaint,
    Warning,
    Citation,
}

impl IncidentSeverity {
    pub const ALL: [IncidentSeverity; 3] = [Self::Complaint, Self::Warning, Self::Citation];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Complaint => "complaint",
            Self::Warning => "warning",
            Self::Citation => "citation",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Complaint => "Complaint",
            Self::Warning => "Warning",
            Self::Citation => "Citation",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == value)
    }
}

impl fmt::Display for IncidentSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Something police logged against a location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Incident {
    pub id: i64,
    pub location_id: i64,
    pub incident_datetime: DateTime<Utc>,
    #[serde(default)]
    pub description: String,
    pub severity: IncidentSeverity,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncidentPayload {
    pub location_id: i64,
    pub incident_datetime: DateTime<Utc>,
    pub description: String,
    pub severity: IncidentSeverity,
}

impl From<&Incident> for IncidentPayload {
    fn from(i: &Incident) -> Self {
        Self {
            location_id: i.location_id,
            incident_datetime: i.incident_datetime,
            description: i.description.clone(),
            severity: i.severity,
        }
    }
}
