use partyreg_lib::model::Account;
use partyreg_lib::model::AccountPayload;
use partyreg_lib::model::AccountRole;
use tablekit::ColumnDefinition;
use tablekit::FilterType;
use tablekit::SelectOption;
use tablekit::SortOrder;
use tablekit::validation::ValidationResult;

use super::table::TableResource;
use crate::forms::AccountForm;
use crate::forms::Form;
use crate::forms::invalid;

impl TableResource for Account {
    fn columns() -> Vec<ColumnDefinition<Self>> {
        vec![
            ColumnDefinition::new("name", "Name", |a: &Account| a.full_name().into())
                .filter(FilterType::Text),
            ColumnDefinition::new("email", "Email", |a: &Account| a.email.clone().into())
                .filter(FilterType::Text),
            ColumnDefinition::new("pid", "PID", |a: &Account| a.pid.clone().into())
                .filter(FilterType::Text),
            ColumnDefinition::new("role", "Role", |a: &Account| a.role.as_str().into())
                .cell(|a: &Account| a.role.label().to_string())
                .select_options(
                    AccountRole::ALL
                        .iter()
                        .map(|r| SelectOption::new(r.as_str(), r.label()))
                        .collect(),
                ),
        ]
    }

    fn initial_sort() -> SortOrder {
        SortOrder::asc("name")
    }

    fn edit_form(&self) -> Form {
        Form::Account(AccountForm::from(self))
    }

    fn blank_form() -> Form {
        Form::Account(AccountForm::default())
    }

    fn payload(form: &Form) -> Result<AccountPayload, ValidationResult> {
        match form {
            Form::Account(form) => form.payload(),
            other => Err(invalid(
                "form",
                format!("expected an account form, got {}", other.kind()),
            )),
        }
    }
}
