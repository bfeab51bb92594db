use chrono::Duration;
use chrono::Local;
use chrono::NaiveDate;
use partyreg_lib::model::Contact;
use partyreg_lib::model::ContactPreference;
use partyreg_lib::model::Party;
use partyreg_lib::model::PartyPayload;
use tablekit::validation::Validatable;
use tablekit::validation::ValidationResult;
use tablekit::validation::Validator;

use super::digits_only;
use super::invalid;
use super::local_to_utc;
use super::parse_time;

/// Days between registering and the party, at minimum.
pub const MIN_LEAD_DAYS: i64 = 2;

/// Second contact of a party.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContactFields {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
    pub contact_preference: Option<ContactPreference>,
}

impl From<&Contact> for ContactFields {
    fn from(c: &Contact) -> Self {
        Self {
            first_name: c.first_name.clone(),
            last_name: c.last_name.clone(),
            email: c.email.clone(),
            phone_number: c.phone_number.clone(),
            contact_preference: Some(c.contact_preference),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartyForm {
    pub party_date: Option<NaiveDate>,
    /// `HH:MM`, local time.
    pub party_time: String,
    /// Place id picked from address autocomplete.
    pub place_id: String,
    /// Address shown for the picked place.
    pub address: String,
    /// Registering student. Staff pick one; students register as themselves.
    pub contact_one_id: Option<i64>,
    pub contact_two: ContactFields,
}

impl PartyForm {
    pub fn from_party(party: &Party) -> Self {
        let local = party.party_datetime.with_timezone(&Local);
        Self {
            party_date: Some(local.date_naive()),
            party_time: local.format("%H:%M").to_string(),
            place_id: party.location.google_place_id.clone(),
            address: party.location.formatted_address.clone(),
            contact_one_id: Some(party.contact_one.id),
            contact_two: ContactFields::from(&party.contact_two),
        }
    }

    /// Validates as of `today`; the party must be at least
    /// [`MIN_LEAD_DAYS`] after it.
    pub fn validate_on(&self, today: NaiveDate) -> ValidationResult {
        let earliest = today + Duration::days(MIN_LEAD_DAYS);
        let contact = &self.contact_two;

        Validator::new()
            .field("party_date", self.party_date)
            .selected("Party date is required")
            .at_least(
                earliest,
                format!("Parties must be registered at least {MIN_LEAD_DAYS} days in advance"),
            )
            .field("party_time", self.party_time.clone())
            .required("Party time is required")
            .rule(|t| parse_time(t).is_some(), "Enter the time as HH:MM")
            .field("address", self.place_id.clone())
            .required("Address is required")
            .field("contact_two.first_name", contact.first_name.clone())
            .required("First name is required")
            .field("contact_two.last_name", contact.last_name.clone())
            .required("Last name is required")
            .field("contact_two.email", contact.email.clone())
            .required("Email is required")
            .email("Please enter a valid email")
            .field("contact_two.phone_number", contact.phone_number.clone())
            .required("Phone number is required")
            .digits(10, "Phone number must be 10 digits")
            .field("contact_two.contact_preference", contact.contact_preference)
            .selected("Please select a contact preference")
            .validate()
    }

    /// Converts to a payload, or returns why it can't be.
    pub fn payload_on(&self, today: NaiveDate) -> Result<PartyPayload, ValidationResult> {
        let validation = self.validate_on(today);
        if validation.is_invalid() {
            return Err(validation);
        }

        let (Some(date), Some(time), Some(preference)) = (
            self.party_date,
            parse_time(&self.party_time),
            self.contact_two.contact_preference,
        ) else {
            return Err(invalid("form", "Form is incomplete"));
        };
        let party_datetime = local_to_utc(date, time)
            .ok_or_else(|| invalid("party_time", "That time does not exist on this date"))?;

        Ok(PartyPayload {
            party_datetime,
            google_place_id: self.place_id.trim().to_string(),
            contact_one_id: self.contact_one_id,
            contact_two: Contact {
                first_name: self.contact_two.first_name.trim().to_string(),
                last_name: self.contact_two.last_name.trim().to_string(),
                email: self.contact_two.email.trim().to_string(),
                phone_number: digits_only(&self.contact_two.phone_number),
                contact_preference: preference,
            },
        })
    }

    pub fn payload(&self) -> Result<PartyPayload, ValidationResult> {
        self.payload_on(today())
    }
}

impl Validatable for PartyForm {
    fn validate(&self) -> ValidationResult {
        self.validate_on(today())
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}
