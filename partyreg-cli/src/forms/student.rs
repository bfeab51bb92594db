use partyreg_lib::model::ContactPreference;
use partyreg_lib::model::Student;
use partyreg_lib::model::StudentPayload;
use tablekit::validation::Validatable;
use tablekit::validation::ValidationResult;
use tablekit::validation::Validator;

use super::digits_only;
use super::invalid;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StudentForm {
    pub pid: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
    pub contact_preference: Option<ContactPreference>,
}

impl From<&Student> for StudentForm {
    fn from(s: &Student) -> Self {
        Self {
            pid: s.pid.clone(),
            email: s.email.clone(),
            first_name: s.first_name.clone(),
            last_name: s.last_name.clone(),
            phone_number: s.phone_number.clone(),
            contact_preference: Some(s.contact_preference),
        }
    }
}

impl StudentForm {
    pub fn payload(&self) -> Result<StudentPayload, ValidationResult> {
        let validation = self.validate();
        if validation.is_invalid() {
            return Err(validation);
        }
        let contact_preference = self
            .contact_preference
            .ok_or_else(|| invalid("contact_preference", "Please select a contact preference"))?;

        Ok(StudentPayload {
            pid: digits_only(&self.pid),
            email: self.email.trim().to_string(),
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            phone_number: digits_only(&self.phone_number),
            contact_preference,
        })
    }
}

impl Validatable for StudentForm {
    fn validate(&self) -> ValidationResult {
        Validator::new()
            .field("first_name", self.first_name.clone())
            .required("First name is required")
            .field("last_name", self.last_name.clone())
            .required("Last name is required")
            .field("email", self.email.clone())
            .required("Email is required")
            .email("Please enter a valid email")
            .field("phone_number", self.phone_number.clone())
            .required("Phone number is required")
            .digits(10, "Phone number must be 10 digits")
            .field("pid", self.pid.trim().to_string())
            .required("PID is required")
            .pattern(r"^\d{9}$", "PID must be 9 digits")
            .field("contact_preference", self.contact_preference)
            .selected("Please select a contact preference")
            .validate()
    }
}
