use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use super::Resource;

/// Portal role of an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountRole {
    Student,
    Staff,
    Police,
    Admin,
}

impl AccountRole {
    pub const ALL: [AccountRole; 4] = [Self::Student, Self::Staff, Self::Police, Self::Admin];

    /// Wire value, e.g. `staff`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::Staff => "staff",
            Self::Police => "police",
            Self::Admin => "admin",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Student => "Student",
            Self::Staff => "Staff",
            Self::Police => "Police",
            Self::Admin => "Admin",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.as_str() == value)
    }
}

impl fmt::Display for AccountRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: i64,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    /// University person id, 9 digits.
    pub pid: String,
    pub role: AccountRole,
}

impl Account {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountPayload {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub pid: String,
    pub role: AccountRole,
}

impl From<&Account> for AccountPayload {
    fn from(a: &Account) -> Self {
        Self {
            email: a.email.clone(),
            first_name: a.first_name.clone(),
            last_name: a.last_name.clone(),
            pid: a.pid.clone(),
            role: a.role,
        }
    }
}

impl Resource for Account {
    type Payload = AccountPayload;

    const PATH: &'static str = "accounts";
    const NAME: &'static str = "Account";

    fn id(&self) -> i64 {
        self.id
    }
}
