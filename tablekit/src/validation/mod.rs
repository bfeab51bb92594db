//! Form validation.
//!
//! A fluent, value-based validator. Each field is checked against its rules
//! in order and reports the first failure.
//!
//! # Example
//!
//! ```
//! use tablekit::validation::Validator;
//!
//! let email = String::from("not-an-email");
//! let phone = String::from("(919) 555-0142");
//! let agreed = false;
//!
//! let result = Validator::new()
//!     .field("email", email)
//!         .required("Email is required")
//!         .email("Please enter a valid email")
//!     .field("phone_number", phone)
//!         .digits(10, "Phone number must be 10 digits")
//!     .field("agreed", agreed)
//!         .checked("You must accept the terms")
//!     .validate();
//!
//! assert!(result.is_invalid());
//! assert_eq!(result.error_for("email"), Some("Please enter a valid email"));
//! assert_eq!(result.error_for("phone_number"), None);
//! ```

mod result;
mod validatable;
mod validator;

pub use result::FieldError;
pub use result::ValidationResult;
pub use validatable::Validatable;
pub use validator::FieldBuilder;
pub use validator::Validator;
