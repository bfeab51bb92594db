use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use partyreg_lib::PartyRegClient;
use partyreg_lib::api::ResourceService;
use partyreg_lib::error::Error;
use partyreg_lib::model::Party;
use partyreg_lib::model::PartyPayload;
use tablekit::CellValue;
use tablekit::ColumnDefinition;
use tablekit::FilterType;
use tablekit::FilterValue;
use tablekit::SortOrder;
use tablekit::TableView;
use tablekit::validation::ValidationResult;

use super::format::clock;
use super::format::format_phone;
use super::format::json_cell;
use super::format::local_date;
use super::format::local_time;
use super::format::us_date;
use super::table::ResourceTable;
use super::table::TableResource;
use crate::forms::Form;
use crate::forms::PartyForm;
use crate::forms::invalid;

impl TableResource for Party {
    fn columns() -> Vec<ColumnDefinition<Self>> {
        vec![
            ColumnDefinition::new("address", "Address", |p: &Party| {
                p.location.formatted_address.clone().into()
            })
            .filter(FilterType::Text),
            ColumnDefinition::new("date", "Date", |p: &Party| local_date(p.party_datetime).into())
                .cell(|p: &Party| us_date(local_date(p.party_datetime)))
                .filter(FilterType::DateRange)
                .sort_fn(|a: &Party, b: &Party| a.party_datetime.cmp(&b.party_datetime)),
            ColumnDefinition::new("time", "Time", |p: &Party| local_time(p.party_datetime).into())
                .cell(|p: &Party| clock(local_time(p.party_datetime)))
                .filter(FilterType::Time),
            ColumnDefinition::new("contact_one", "Contact One", |p: &Party| {
                p.contact_one.full_name().into()
            })
            .filter(FilterType::Text),
            ColumnDefinition::new("contact_one_phone", "Phone", |p: &Party| {
                p.contact_one.phone_number.clone().into()
            })
            .cell(|p: &Party| format_phone(&p.contact_one.phone_number))
            .not_sortable(),
            ColumnDefinition::new("contact_two", "Contact Two", |p: &Party| {
                p.contact_two.full_name().into()
            })
            .filter(FilterType::Text),
            ColumnDefinition::new("contact_two_phone", "Phone", |p: &Party| {
                p.contact_two.phone_number.clone().into()
            })
            .cell(|p: &Party| format_phone(&p.contact_two.phone_number))
            .not_sortable(),
        ]
    }

    fn initial_sort() -> SortOrder {
        SortOrder::desc("date")
    }

    fn describe(&self) -> Option<String> {
        Some(format!(
            "Are you sure you want to delete the party at {} on {}? This action cannot be undone.",
            self.location.formatted_address,
            us_date(local_date(self.party_datetime))
        ))
    }

    /// Serialized party plus the local date, so `04/12/2025` and
    /// `2025-04-12` both find it.
    fn search_value(&self) -> CellValue {
        let json = serde_json::to_value(self)
            .map(|v| json_cell(&v))
            .unwrap_or(CellValue::Null);
        CellValue::List(vec![
            json,
            local_date(self.party_datetime).into(),
            us_date(local_date(self.party_datetime)).into(),
        ])
    }

    fn edit_form(&self) -> Form {
        Form::Party(PartyForm::from_party(self))
    }

    fn blank_form() -> Form {
        Form::Party(PartyForm::default())
    }

    fn payload(form: &Form) -> Result<PartyPayload, ValidationResult> {
        match form {
            Form::Party(form) => form.payload(),
            other => Err(invalid("form", format!("expected a party form, got {}", other.kind()))),
        }
    }
}

/// The signed-in student's own parties.
///
/// Listing goes to `/students/me/parties`; registering posts without a
/// first contact, which the backend fills with the caller.
pub struct MyParties {
    client: PartyRegClient,
}

impl MyParties {
    pub fn new(client: PartyRegClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ResourceService<Party> for MyParties {
    async fn list(&self) -> Result<Vec<Party>, Error> {
        self.client.my_parties().await
    }

    async fn get(&self, id: i64) -> Result<Party, Error> {
        self.client.get::<Party>(id).await
    }

    async fn create(&self, payload: &PartyPayload) -> Result<Party, Error> {
        let payload = PartyPayload {
            contact_one_id: None,
            ..payload.clone()
        };
        self.client.create::<Party>(&payload).await
    }

    async fn update(&self, _id: i64, _payload: &PartyPayload) -> Result<Party, Error> {
        Err(Error::InvalidOperation(
            "Registered parties can only be changed by staff".into(),
        ))
    }

    async fn delete(&self, _id: i64) -> Result<(), Error> {
        Err(Error::InvalidOperation(
            "Registered parties can only be cancelled by staff".into(),
        ))
    }
}

/// Parties near an address over a date range.
#[async_trait]
pub trait NearbySearch: Send + Sync {
    async fn parties_nearby(
        &self,
        place_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Party>, Error>;
}

#[async_trait]
impl NearbySearch for PartyRegClient {
    async fn parties_nearby(
        &self,
        place_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Party>, Error> {
        PartyRegClient::parties_nearby(self, place_id, start, end).await
    }
}

/// An address search over a date range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressSearch {
    pub place_id: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// The parties table with an optional address search.
///
/// While a search is active its nearby result replaces the full listing.
pub struct PartyTable {
    inner: ResourceTable<Party>,
    nearby: Arc<dyn NearbySearch>,
    search: Option<AddressSearch>,
}

impl PartyTable {
    pub fn new(inner: ResourceTable<Party>, nearby: Arc<dyn NearbySearch>) -> Self {
        Self {
            inner,
            nearby,
            search: None,
        }
    }

    pub fn inner(&self) -> &ResourceTable<Party> {
        &self.inner
    }

    pub fn inner_mut(&mut self) -> &mut ResourceTable<Party> {
        &mut self.inner
    }

    pub fn search(&self) -> Option<&AddressSearch> {
        self.search.as_ref()
    }

    /// Starts an address search. Reversed dates are swapped.
    pub async fn search_address(
        &mut self,
        place_id: impl Into<String>,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<(), Error> {
        let (start, end) = if end < start { (end, start) } else { (start, end) };
        self.search = Some(AddressSearch {
            place_id: place_id.into(),
            start,
            end,
        });
        self.load().await
    }

    pub async fn clear_search(&mut self) -> Result<(), Error> {
        self.search = None;
        self.load().await
    }

    /// Loads the listing and, if searching, the nearby parties together.
    pub async fn load(&mut self) -> Result<(), Error> {
        self.inner.table_mut().set_loading(true);

        let search = self.search.clone();
        let service = Arc::clone(&self.nearby);
        let nearby = async move {
            match search {
                Some(s) => service
                    .parties_nearby(&s.place_id, s.start, s.end)
                    .await
                    .map(Some),
                None => Ok(None),
            }
        };
        let (listing, nearby) = tokio::join!(self.inner.fetch(), nearby);

        self.inner.apply(select_feed(listing, nearby))
    }

    pub async fn reload(&mut self) -> Result<(), Error> {
        self.inner.reload().await?;
        if self.search.is_some() {
            self.load().await?;
        }
        Ok(())
    }

    pub async fn process_deletes(&mut self) -> Result<usize, Error> {
        let result = self.inner.apply_deletes().await;
        if matches!(result, Ok(n) if n > 0) {
            let _ = self.load().await;
        }
        result
    }

    pub async fn submit(&mut self) -> Result<Option<Party>, Error> {
        let saved = self.inner.save().await?;
        if saved.is_some() {
            let _ = self.load().await;
        }
        Ok(saved)
    }

    /// Applies a date filter on the party date column.
    pub fn filter_dates(&mut self, from: NaiveDate, to: Option<NaiveDate>) {
        self.inner
            .table_mut()
            .set_filter("date", Some(FilterValue::date_range(from, to)));
    }

    pub fn render(&mut self) -> TableView {
        let mut view = self.inner.render();
        if self.search.is_some() {
            view.title = format!("{} Nearby", view.title);
        }
        view
    }
}

/// An active search's result wins over the listing; its failure is the
/// table's failure.
fn select_feed(
    listing: Result<Vec<Party>, Error>,
    nearby: Result<Option<Vec<Party>>, Error>,
) -> Result<Vec<Party>, Error> {
    match nearby {
        Ok(Some(rows)) => Ok(rows),
        Ok(None) => listing,
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nearby_supersedes_listing() {
        let listing = Ok(Vec::new());
        assert!(select_feed(listing, Ok(None)).unwrap().is_empty());

        let failed: Result<Vec<Party>, Error> = Err(Error::InvalidOperation("down".into()));
        assert!(select_feed(failed, Ok(Some(Vec::new()))).is_ok());

        let err = select_feed(Ok(Vec::new()), Err(Error::InvalidOperation("x".into())));
        assert!(err.is_err());
    }
}
