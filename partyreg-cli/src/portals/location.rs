use chrono::Local;
use chrono::Utc;
use partyreg_lib::model::Location;
use partyreg_lib::model::LocationPayload;
use tablekit::ColumnDefinition;
use tablekit::FilterType;
use tablekit::FilterValue;
use tablekit::SelectOption;
use tablekit::SortOrder;
use tablekit::validation::ValidationResult;

use super::format::hold_text;
use super::table::TableResource;
use crate::forms::Form;
use crate::forms::LocationForm;
use crate::forms::invalid;

const HOLD_ACTIVE: &str = "active";
const HOLD_NONE: &str = "none";

impl TableResource for Location {
    fn columns() -> Vec<ColumnDefinition<Self>> {
        vec![
            ColumnDefinition::new("address", "Address", |l: &Location| {
                l.formatted_address.clone().into()
            })
            .filter(FilterType::Text),
            ColumnDefinition::new("hold", "Hold", |l: &Location| {
                l.active_hold(Utc::now())
                    .map(|at| at.with_timezone(&Local).naive_local())
                    .into()
            })
            .cell(|l: &Location| hold_text(l.active_hold(Utc::now())))
            .select_options(vec![
                SelectOption::new(HOLD_ACTIVE, "Active hold"),
                SelectOption::new(HOLD_NONE, "No active hold"),
            ])
            .filter_fn(|l: &Location, filter: &FilterValue| match filter {
                FilterValue::Select(choice) => {
                    let held = l.active_hold(Utc::now()).is_some();
                    (choice == HOLD_ACTIVE) == held
                }
                _ => true,
            }),
            ColumnDefinition::new("warnings", "Warnings", |l: &Location| l.warning_count().into()),
            ColumnDefinition::new("citations", "Citations", |l: &Location| {
                l.citation_count().into()
            }),
            ColumnDefinition::new("complaints", "Complaints", |l: &Location| {
                l.complaint_count().into()
            }),
        ]
    }

    fn initial_sort() -> SortOrder {
        SortOrder::asc("address")
    }

    fn describe(&self) -> Option<String> {
        Some(format!(
            "Are you sure you want to delete {}? Its incident history is deleted with it. This action cannot be undone.",
            self.formatted_address
        ))
    }

    fn edit_form(&self) -> Form {
        Form::Location(LocationForm::from(self))
    }

    fn blank_form() -> Form {
        Form::Location(LocationForm::default())
    }

    fn payload(form: &Form) -> Result<LocationPayload, ValidationResult> {
        match form {
            Form::Location(form) => form.payload(),
            other => Err(invalid(
                "form",
                format!("expected a location form, got {}", other.kind()),
            )),
        }
    }
}
