use super::ValidationResult;

/// Form state that can check itself before submission.
pub trait Validatable {
    fn validate(&self) -> ValidationResult;
}
