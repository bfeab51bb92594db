use partyreg_lib::model::ContactPreference;
use partyreg_lib::model::Student;
use partyreg_lib::model::StudentPayload;
use tablekit::ColumnDefinition;
use tablekit::FilterType;
use tablekit::SelectOption;
use tablekit::SortOrder;
use tablekit::validation::ValidationResult;

use super::format::format_phone;
use super::format::local_date;
use super::format::us_date;
use super::table::TableResource;
use crate::forms::Form;
use crate::forms::StudentForm;
use crate::forms::invalid;

impl TableResource for Student {
    fn columns() -> Vec<ColumnDefinition<Self>> {
        vec![
            ColumnDefinition::new("name", "Name", |s: &Student| s.full_name().into())
                .filter(FilterType::Text)
                .sort_fn(|a: &Student, b: &Student| {
                    a.last_name
                        .to_lowercase()
                        .cmp(&b.last_name.to_lowercase())
                        .then_with(|| a.first_name.to_lowercase().cmp(&b.first_name.to_lowercase()))
                }),
            ColumnDefinition::new("email", "Email", |s: &Student| s.email.clone().into())
                .filter(FilterType::Text),
            ColumnDefinition::new("phone_number", "Phone", |s: &Student| {
                s.phone_number.clone().into()
            })
            .cell(|s: &Student| format_phone(&s.phone_number))
            .filter(FilterType::Text),
            ColumnDefinition::new("pid", "PID", |s: &Student| s.pid.clone().into())
                .filter(FilterType::Text),
            ColumnDefinition::new("contact_preference", "Contact Preference", |s: &Student| {
                s.contact_preference.as_str().into()
            })
            .cell(|s: &Student| s.contact_preference.label().to_string())
            .select_options(
                ContactPreference::ALL
                    .iter()
                    .map(|p| SelectOption::new(p.as_str(), p.label()))
                    .collect(),
            ),
            ColumnDefinition::new("last_registered", "Last Registered", |s: &Student| {
                s.last_registered.map(local_date).into()
            })
            .cell(|s: &Student| {
                s.last_registered
                    .map(|at| us_date(local_date(at)))
                    .unwrap_or_else(|| "Never".to_string())
            })
            .filter(FilterType::DateRange),
        ]
    }

    fn initial_sort() -> SortOrder {
        SortOrder::asc("name")
    }

    fn describe(&self) -> Option<String> {
        Some(format!(
            "Are you sure you want to delete {}? Their registered parties are kept. This action cannot be undone.",
            self.full_name()
        ))
    }

    fn edit_form(&self) -> Form {
        Form::Student(StudentForm::from(self))
    }

    fn blank_form() -> Form {
        Form::Student(StudentForm::default())
    }

    fn payload(form: &Form) -> Result<StudentPayload, ValidationResult> {
        match form {
            Form::Student(form) => form.payload(),
            other => Err(invalid(
                "form",
                format!("expected a student form, got {}", other.kind()),
            )),
        }
    }
}
