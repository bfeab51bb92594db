use chrono::DateTime;
use chrono::NaiveDate;
use chrono::NaiveTime;
use chrono::Utc;
use partyreg_lib::model::Location;
use partyreg_lib::model::LocationPayload;
use tablekit::validation::Validatable;
use tablekit::validation::ValidationResult;
use tablekit::validation::Validator;

use super::invalid;
use super::local_to_utc;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocationForm {
    pub place_id: String,
    pub address: String,
    /// Last day registrations stay blocked.
    pub hold_until: Option<NaiveDate>,
}

impl From<&Location> for LocationForm {
    fn from(l: &Location) -> Self {
        Self {
            place_id: l.google_place_id.clone(),
            address: l.formatted_address.clone(),
            hold_until: l
                .hold_expiration
                .map(|at| at.with_timezone(&chrono::Local).date_naive()),
        }
    }
}

impl LocationForm {
    pub fn payload(&self) -> Result<LocationPayload, ValidationResult> {
        let validation = self.validate();
        if validation.is_invalid() {
            return Err(validation);
        }
        let hold_expiration = self.hold_until.map(end_of_day).transpose()?;
        Ok(LocationPayload {
            google_place_id: self.place_id.trim().to_string(),
            hold_expiration,
        })
    }
}

/// A hold runs through the end of its last local day.
fn end_of_day(day: NaiveDate) -> Result<DateTime<Utc>, ValidationResult> {
    let last_second = NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN);
    local_to_utc(day, last_second).ok_or_else(|| invalid("hold_until", "Invalid hold date"))
}

impl Validatable for LocationForm {
    fn validate(&self) -> ValidationResult {
        Validator::new()
            .field("address", self.place_id.clone())
            .required("Address is required")
            .validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_place_required() {
        let result = LocationForm::default().validate();
        assert_eq!(result.error_for("address"), Some("Address is required"));
    }

    #[test]
    fn test_hold_runs_to_end_of_day() {
        let form = LocationForm {
            place_id: "ChIJ-1".into(),
            address: String::new(),
            hold_until: NaiveDate::from_ymd_opt(2025, 6, 1),
        };
        let payload = form.payload().unwrap();
        let hold = payload.hold_expiration.unwrap().with_timezone(&chrono::Local);
        assert_eq!(hold.date_naive(), NaiveDate::from_ymd_opt(2025, 6, 1).unwrap());
        assert_eq!(hold.format("%H:%M").to_string(), "23:59");
    }
}
