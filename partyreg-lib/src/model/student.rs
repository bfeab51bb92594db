use std::fmt;

use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use super::Resource;

/// How a contact wants to be reached on the night of a party.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactPreference {
    Call,
    Text,
}

impl ContactPreference {
    pub const ALL: [ContactPreference; 2] = [Self::Call, Self::Text];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Call => "call",
            Self::Text => "text",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Call => "Call",
            Self::Text => "Text",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.as_str() == value)
    }
}

impl fmt::Display for ContactPreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub id: i64,
    pub pid: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    /// Ten digits, unformatted.
    pub phone_number: String,
    pub contact_preference: ContactPreference,
    /// When the student last registered a party.
    #[serde(default)]
    pub last_registered: Option<DateTime<Utc>>,
}

impl Student {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentPayload {
    pub pid: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
    pub contact_preference: ContactPreference,
}

impl From<&Student> for StudentPayload {
    fn from(s: &Student) -> Self {
        Self {
            pid: s.pid.clone(),
            email: s.email.clone(),
            first_name: s.first_name.clone(),
            last_name: s.last_name.clone(),
            phone_number: s.phone_number.clone(),
            contact_preference: s.contact_preference,
        }
    }
}

impl Resource for Student {
    type Payload = StudentPayload;

    const PATH: &'static str = "students";
    const NAME: &'static str = "Student";

    fn id(&self) -> i64 {
        self.id
    }
}

/// Second contact person of a party. Not necessarily a student.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
    pub contact_preference: ContactPreference,
}

impl Contact {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}
