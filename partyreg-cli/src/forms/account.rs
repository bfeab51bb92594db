use partyreg_lib::model::Account;
use partyreg_lib::model::AccountPayload;
use partyreg_lib::model::AccountRole;
use tablekit::validation::Validatable;
use tablekit::validation::ValidationResult;
use tablekit::validation::Validator;

use super::invalid;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AccountForm {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub pid: String,
    pub role: Option<AccountRole>,
}

impl From<&Account> for AccountForm {
    fn from(a: &Account) -> Self {
        Self {
            email: a.email.clone(),
            first_name: a.first_name.clone(),
            last_name: a.last_name.clone(),
            pid: a.pid.clone(),
            role: Some(a.role),
        }
    }
}

impl AccountForm {
    pub fn payload(&self) -> Result<AccountPayload, ValidationResult> {
        let validation = self.validate();
        if validation.is_invalid() {
            return Err(validation);
        }
        let role = self.role.ok_or_else(|| invalid("role", "Please select a role"))?;
        Ok(AccountPayload {
            email: self.email.trim().to_string(),
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            pid: self.pid.trim().to_string(),
            role,
        })
    }
}

impl Validatable for AccountForm {
    fn validate(&self) -> ValidationResult {
        Validator::new()
            .field("email", self.email.clone())
            .required("Email is required")
            .email("Please enter a valid email")
            .field("first_name", self.first_name.clone())
            .required("First name is required")
            .field("last_name", self.last_name.clone())
            .required("Last name is required")
            .field("pid", self.pid.trim().to_string())
            .required("PID is required")
            .pattern(r"^\d{9}$", "PID must be 9 digits")
            .field("role", self.role)
            .selected("Please select a role")
            .validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_required() {
        let form = AccountForm {
            email: "officer@police.chapelhill.gov".into(),
            first_name: "Pat".into(),
            last_name: "Kim".into(),
            pid: "700000001".into(),
            role: None,
        };
        assert_eq!(form.validate().error_for("role"), Some("Please select a role"));

        let form = AccountForm {
            role: Some(AccountRole::Police),
            ..form
        };
        assert_eq!(form.payload().unwrap().role, AccountRole::Police);
    }
}
