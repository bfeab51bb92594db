//! Form schemas shown in the sidebar.
//!
//! Each form holds raw field input, validates it with
//! [`tablekit::validation::Validator`], and only then converts to the API
//! payload. Invalid input never reaches the network.

mod account;
mod incident;
mod location;
mod party;
mod student;

pub use account::AccountForm;
pub use incident::IncidentForm;
pub use location::LocationForm;
pub use party::ContactFields;
pub use party::MIN_LEAD_DAYS;
pub use party::PartyForm;
pub use student::StudentForm;

use chrono::DateTime;
use chrono::Local;
use chrono::NaiveDate;
use chrono::NaiveTime;
use chrono::TimeZone;
use chrono::Utc;
use partyreg_lib::cache::MutationState;
use tablekit::validation::FieldError;
use tablekit::validation::Validatable;
use tablekit::validation::ValidationResult;

/// Whether a panel creates a record or edits an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit(i64),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Form {
    Party(PartyForm),
    Student(StudentForm),
    Account(AccountForm),
    Location(LocationForm),
    Incident(IncidentForm),
}

impl Form {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Party(_) => "party",
            Self::Student(_) => "student",
            Self::Account(_) => "account",
            Self::Location(_) => "location",
            Self::Incident(_) => "incident",
        }
    }
}

impl Validatable for Form {
    fn validate(&self) -> ValidationResult {
        match self {
            Self::Party(f) => f.validate(),
            Self::Student(f) => f.validate(),
            Self::Account(f) => f.validate(),
            Self::Location(f) => f.validate(),
            Self::Incident(f) => f.validate(),
        }
    }
}

/// Sidebar content: a form plus its validation and submit state.
#[derive(Debug, Clone, PartialEq)]
pub struct Panel {
    pub mode: FormMode,
    pub form: Form,
    pub validation: ValidationResult,
    pub submit: MutationState<()>,
}

impl Panel {
    pub fn create(form: Form) -> Self {
        Self {
            mode: FormMode::Create,
            form,
            validation: ValidationResult::Valid,
            submit: MutationState::Idle,
        }
    }

    pub fn edit(id: i64, form: Form) -> Self {
        Self {
            mode: FormMode::Edit(id),
            ..Self::create(form)
        }
    }

    /// Sidebar key, e.g. `edit-party-42` or `new-party`.
    pub fn key(&self) -> String {
        match self.mode {
            FormMode::Create => format!("new-{}", self.form.kind()),
            FormMode::Edit(id) => format!("edit-{}-{id}", self.form.kind()),
        }
    }

    pub fn field_error(&self, field: &str) -> Option<&str> {
        self.validation.error_for(field)
    }
}

/// Parses `HH:MM` (24h).
pub fn parse_time(input: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(input.trim(), "%H:%M").ok()
}

/// Local wall-clock date and time as UTC.
///
/// Ambiguous times (DST fold) take the earlier instant; times that do not
/// exist locally yield `None`.
pub fn local_to_utc(date: NaiveDate, time: NaiveTime) -> Option<DateTime<Utc>> {
    Local
        .from_local_datetime(&date.and_time(time))
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Digits of a phone number, punctuation dropped.
pub fn digits_only(input: &str) -> String {
    input.chars().filter(char::is_ascii_digit).collect()
}

/// A single-field failure.
pub(crate) fn invalid(field: &str, message: impl Into<String>) -> ValidationResult {
    ValidationResult::Invalid(vec![FieldError {
        field_name: field.to_string(),
        message: message.into(),
    }])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panel_keys() {
        let form = Form::Location(LocationForm::default());
        assert_eq!(Panel::create(form.clone()).key(), "new-location");
        assert_eq!(Panel::edit(7, form).key(), "edit-location-7");
    }

    #[test]
    fn test_parse_time() {
        assert_eq!(parse_time("21:30"), NaiveTime::from_hms_opt(21, 30, 0));
        assert_eq!(parse_time("9pm"), None);
        assert_eq!(parse_time("24:00"), None);
    }

    #[test]
    fn test_digits_only() {
        assert_eq!(digits_only("(919) 555-0142"), "9195550142");
    }
}
