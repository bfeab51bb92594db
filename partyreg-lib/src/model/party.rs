use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use super::Contact;
use super::Location;
use super::Resource;
use super::Student;

/// A registered party.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Party {
    pub id: i64,
    pub party_datetime: DateTime<Utc>,
    pub location: Location,
    /// The registering student.
    pub contact_one: Student,
    pub contact_two: Contact,
}

/// Create/update body for a party.
///
/// The address is sent as a place id; the backend resolves or creates the
/// location. `contact_one_id` is omitted when a student registers for
/// themselves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartyPayload {
    pub party_datetime: DateTime<Utc>,
    pub google_place_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_one_id: Option<i64>,
    pub contact_two: Contact,
}

impl From<&Party> for PartyPayload {
    fn from(p: &Party) -> Self {
        Self {
            party_datetime: p.party_datetime,
            google_place_id: p.location.google_place_id.clone(),
            contact_one_id: Some(p.contact_one.id),
            contact_two: p.contact_two.clone(),
        }
    }
}

impl Resource for Party {
    type Payload = PartyPayload;

    const PATH: &'static str = "parties";
    const NAME: &'static str = "Party";

    fn id(&self) -> i64 {
        self.id
    }
}
