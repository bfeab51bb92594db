use chrono::Local;
use chrono::NaiveDate;
use partyreg_lib::model::Incident;
use partyreg_lib::model::IncidentPayload;
use partyreg_lib::model::IncidentSeverity;
use tablekit::validation::Validatable;
use tablekit::validation::ValidationResult;
use tablekit::validation::Validator;

use super::invalid;
use super::local_to_utc;
use super::parse_time;

/// Longest accepted incident description, in characters.
pub const MAX_DESCRIPTION: usize = 500;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct IncidentForm {
    pub location_id: i64,
    pub incident_date: Option<NaiveDate>,
    /// `HH:MM`, local time. Blank means midnight.
    pub incident_time: String,
    pub severity: Option<IncidentSeverity>,
    pub description: String,
}

impl From<&Incident> for IncidentForm {
    fn from(i: &Incident) -> Self {
        let local = i.incident_datetime.with_timezone(&Local);
        Self {
            location_id: i.location_id,
            incident_date: Some(local.date_naive()),
            incident_time: local.format("%H:%M").to_string(),
            severity: Some(i.severity),
            description: i.description.clone(),
        }
    }
}

impl IncidentForm {
    pub fn for_location(location_id: i64) -> Self {
        Self {
            location_id,
            ..Self::default()
        }
    }

    pub fn payload(&self) -> Result<IncidentPayload, ValidationResult> {
        let validation = self.validate();
        if validation.is_invalid() {
            return Err(validation);
        }
        let (Some(date), Some(severity)) = (self.incident_date, self.severity) else {
            return Err(invalid("form", "Form is incomplete"));
        };
        let time = if self.incident_time.trim().is_empty() {
            chrono::NaiveTime::MIN
        } else {
            parse_time(&self.incident_time)
                .ok_or_else(|| invalid("incident_time", "Enter the time as HH:MM"))?
        };
        let incident_datetime = local_to_utc(date, time)
            .ok_or_else(|| invalid("incident_time", "That time does not exist on this date"))?;

        Ok(IncidentPayload {
            location_id: self.location_id,
            incident_datetime,
            description: self.description.trim().to_string(),
            severity,
        })
    }
}

impl Validatable for IncidentForm {
    fn validate(&self) -> ValidationResult {
        Validator::new()
            .field("incident_date", self.incident_date)
            .selected("Date is required")
            .field("incident_time", self.incident_time.clone())
            .rule(
                |t| t.trim().is_empty() || parse_time(t).is_some(),
                "Enter the time as HH:MM",
            )
            .field("severity", self.severity)
            .selected("Please select a severity")
            .field("description", self.description.clone())
            .required("Description is required")
            .max_length(
                MAX_DESCRIPTION,
                format!("Description must be at most {MAX_DESCRIPTION} characters"),
            )
            .validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> IncidentForm {
        IncidentForm {
            location_id: 4,
            incident_date: NaiveDate::from_ymd_opt(2025, 3, 8),
            incident_time: "23:15".into(),
            severity: Some(IncidentSeverity::Warning),
            description: "Noise complaint from neighbours".into(),
        }
    }

    #[test]
    fn test_description_length_limit() {
        let mut long = form();
        long.description = "x".repeat(MAX_DESCRIPTION + 1);
        assert_eq!(
            long.validate().error_for("description"),
            Some("Description must be at most 500 characters")
        );

        long.description.pop();
        assert!(long.validate().is_valid());
    }

    #[test]
    fn test_payload_keeps_location() {
        let payload = form().payload().unwrap();
        assert_eq!(payload.location_id, 4);
        assert_eq!(payload.severity, IncidentSeverity::Warning);
    }

    #[test]
    fn test_severity_required() {
        let mut f = form();
        f.severity = None;
        assert_eq!(f.validate().error_for("severity"), Some("Please select a severity"));
    }
}
