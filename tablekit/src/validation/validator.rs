//! Validator builder for fluent validation API.

use super::result::FieldError;
use super::result::ValidationResult;

type Rule<V> = Box<dyn Fn(&V) -> Result<(), String> + Send + Sync>;

/// A finalized field: its name and a check yielding the first failure.
struct FieldEntry {
    name: String,
    check: Box<dyn Fn() -> Option<String> + Send + Sync>,
}

/// Builder for validating multiple form fields.
pub struct Validator {
    fields: Vec<FieldEntry>,
}

impl Validator {
    /// Create a new validator.
    pub fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Add a field to validate.
    pub fn field<V>(self, name: impl Into<String>, value: V) -> FieldBuilder<V>
    where
        V: Send + Sync + 'static,
    {
        FieldBuilder {
            validator: self,
            value,
            name: name.into(),
            rules: Vec::new(),
        }
    }

    /// Run every field's rules.
    pub fn validate(self) -> ValidationResult {
        let errors: Vec<FieldError> = self
            .fields
            .iter()
            .filter_map(|field| {
                (field.check)().map(|message| FieldError {
                    field_name: field.name.clone(),
                    message,
                })
            })
            .collect();

        if errors.is_empty() {
            ValidationResult::Valid
        } else {
            log::debug!("validation failed for {} field(s)", errors.len());
            ValidationResult::Invalid(errors)
        }
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for adding validation rules to a single field.
pub struct FieldBuilder<V> {
    validator: Validator,
    value: V,
    name: String,
    rules: Vec<Rule<V>>,
}

impl<V> FieldBuilder<V>
where
    V: Send + Sync + 'static,
{
    /// Add a custom validation rule.
    pub fn rule<F>(mut self, f: F, msg: impl Into<String>) -> Self
    where
        F: Fn(&V) -> bool + Send + Sync + 'static,
    {
        let msg = msg.into();
        self.rules
            .push(Box::new(move |v| if f(v) { Ok(()) } else { Err(msg.clone()) }));
        self
    }

    /// Continue to the next field.
    pub fn field<V2>(self, name: impl Into<String>, value: V2) -> FieldBuilder<V2>
    where
        V2: Send + Sync + 'static,
    {
        self.finalize().field(name, value)
    }

    /// Finalize and run all validations.
    pub fn validate(self) -> ValidationResult {
        self.finalize().validate()
    }

    fn finalize(self) -> Validator {
        let value = self.value;
        let rules = self.rules;
        let check: Box<dyn Fn() -> Option<String> + Send + Sync> =
            Box::new(move || rules.iter().find_map(|rule| rule(&value).err()));

        let mut validator = self.validator;
        validator.fields.push(FieldEntry {
            name: self.name,
            check,
        });
        validator
    }
}

// Built-in rules for String values
impl FieldBuilder<String> {
    /// Require the field to be non-empty.
    pub fn required(self, msg: impl Into<String>) -> Self {
        self.rule(|v| !v.trim().is_empty(), msg)
    }

    /// Require minimum length (in characters).
    pub fn min_length(self, min: usize, msg: impl Into<String>) -> Self {
        self.rule(move |v| v.chars().count() >= min, msg)
    }

    /// Require maximum length (in characters).
    pub fn max_length(self, max: usize, msg: impl Into<String>) -> Self {
        self.rule(move |v| v.chars().count() <= max, msg)
    }

    /// Require the value to match a regex pattern.
    ///
    /// A pattern that fails to compile fails the field.
    pub fn pattern(self, pattern: &str, msg: impl Into<String>) -> Self {
        match regex::Regex::new(pattern) {
            Ok(re) => self.rule(move |v| re.is_match(v), msg),
            Err(e) => {
                log::error!("invalid validation pattern {pattern:?}: {e}");
                self.rule(|_| false, msg)
            }
        }
    }

    /// Require a valid email address. Empty passes; pair with `required`.
    pub fn email(self, msg: impl Into<String>) -> Self {
        self.rule(
            |v| v.is_empty() || email_address::EmailAddress::is_valid(v.trim()),
            msg,
        )
    }

    /// Require exactly `count` digits, allowing phone punctuation
    /// (`()-. ` and spaces) between them. Empty passes.
    pub fn digits(self, count: usize, msg: impl Into<String>) -> Self {
        self.rule(
            move |v| {
                v.is_empty()
                    || (v.chars().all(|c| c.is_ascii_digit() || "()-. ".contains(c))
                        && v.chars().filter(char::is_ascii_digit).count() == count)
            },
            msg,
        )
    }

    /// Require the value to equal another value.
    pub fn equals(self, other: String, msg: impl Into<String>) -> Self {
        self.rule(move |v| v == &other, msg)
    }

    /// Require the value to contain a substring.
    pub fn contains(self, substr: impl Into<String>, msg: impl Into<String>) -> Self {
        let substr = substr.into();
        self.rule(move |v| v.contains(&substr), msg)
    }
}

// Built-in rules for bool values
impl FieldBuilder<bool> {
    /// Require the checkbox to be checked.
    pub fn checked(self, msg: impl Into<String>) -> Self {
        self.rule(|&v| v, msg)
    }

    /// Require the checkbox to be unchecked.
    pub fn unchecked(self, msg: impl Into<String>) -> Self {
        self.rule(|&v| !v, msg)
    }
}

// Built-in rules for optional values (pickers, selects)
impl<T> FieldBuilder<Option<T>>
where
    T: Send + Sync + 'static,
{
    /// Require that a value is present.
    pub fn selected(self, msg: impl Into<String>) -> Self {
        self.rule(|v| v.is_some(), msg)
    }
}

impl<T> FieldBuilder<Option<T>>
where
    T: PartialOrd + Send + Sync + 'static,
{
    /// Require the value to be at least `min`. Absent values pass.
    pub fn at_least(self, min: T, msg: impl Into<String>) -> Self {
        self.rule(move |v| v.as_ref().is_none_or(|v| *v >= min), msg)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    #[test]
    fn test_first_failing_rule_wins() {
        let result = Validator::new()
            .field("email", String::new())
            .required("Email is required")
            .email("Invalid email")
            .validate();
        assert_eq!(result.error_for("email"), Some("Email is required"));
        assert_eq!(result.errors().len(), 1);
    }

    #[test]
    fn test_every_field_reported() {
        let result = Validator::new()
            .field("first_name", String::from(" "))
            .required("First name is required")
            .field("last_name", String::new())
            .required("Last name is required")
            .field("pid", String::from("730123456"))
            .digits(9, "PID must be 9 digits")
            .validate();
        let names: Vec<_> = result.errors().iter().map(|e| e.field_name.as_str()).collect();
        assert_eq!(names, vec!["first_name", "last_name"]);
    }

    #[test]
    fn test_digits_allows_phone_punctuation() {
        let check = |v: &str| {
            Validator::new()
                .field("phone", v.to_string())
                .digits(10, "bad")
                .validate()
                .is_valid()
        };
        assert!(check("(919) 555-0142"));
        assert!(check("9195550142"));
        assert!(!check("919555014"));
        assert!(!check("919-555-014x"));
    }

    #[test]
    fn test_bad_pattern_fails_field() {
        let result = Validator::new()
            .field("x", String::from("abc"))
            .pattern("(", "Invalid")
            .validate();
        assert!(result.is_invalid());
    }

    #[test]
    fn test_optional_rules() {
        let min = NaiveDate::from_ymd_opt(2025, 5, 3).unwrap();
        let early = NaiveDate::from_ymd_opt(2025, 5, 2);

        let result = Validator::new()
            .field("date", early)
            .selected("Date is required")
            .at_least(min, "Parties must be registered at least 2 days in advance")
            .field("contact_preference", None::<String>)
            .selected("Choose a contact preference")
            .validate();

        assert_eq!(
            result.error_for("date"),
            Some("Parties must be registered at least 2 days in advance")
        );
        assert_eq!(
            result.error_for("contact_preference"),
            Some("Choose a contact preference")
        );
    }

    #[test]
    fn test_merge_keeps_both() {
        let a = Validator::new().field("a", false).checked("a").validate();
        let b = Validator::new().field("b", true).unchecked("b").validate();
        assert_eq!(a.clone().merge(ValidationResult::Valid), a);
        assert_eq!(a.merge(b).errors().len(), 2);
    }
}
