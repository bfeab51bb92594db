//! Incident log of one location.

use std::sync::Arc;

use async_trait::async_trait;
use partyreg_lib::PartyRegClient;
use partyreg_lib::cache::MutationState;
use partyreg_lib::cache::QueryCache;
use partyreg_lib::error::Error;
use partyreg_lib::model::Incident;
use partyreg_lib::model::IncidentPayload;
use partyreg_lib::model::IncidentSeverity;
use partyreg_lib::model::Location;
use partyreg_lib::model::Resource;
use tablekit::ColumnDefinition;
use tablekit::FilterType;
use tablekit::SelectOption;
use tablekit::SidebarHandle;
use tablekit::SortOrder;
use tablekit::TableTemplate;
use tablekit::TableView;
use tablekit::validation::ValidationResult;
use tokio::sync::mpsc;

use super::format::clock;
use super::format::local_date;
use super::format::local_time;
use super::format::us_date;
use crate::forms::Form;
use crate::forms::FormMode;
use crate::forms::IncidentForm;
use crate::forms::Panel;

#[async_trait]
pub trait IncidentService: Send + Sync {
    async fn create_incident(&self, payload: &IncidentPayload) -> Result<Incident, Error>;

    async fn update_incident(&self, incident_id: i64, payload: &IncidentPayload) -> Result<Incident, Error>;

    async fn delete_incident(&self, location_id: i64, incident_id: i64) -> Result<(), Error>;
}

#[async_trait]
impl IncidentService for PartyRegClient {
    async fn create_incident(&self, payload: &IncidentPayload) -> Result<Incident, Error> {
        PartyRegClient::create_incident(self, payload).await
    }

    async fn update_incident(&self, incident_id: i64, payload: &IncidentPayload) -> Result<Incident, Error> {
        PartyRegClient::update_incident(self, incident_id, payload).await
    }

    async fn delete_incident(&self, location_id: i64, incident_id: i64) -> Result<(), Error> {
        PartyRegClient::delete_incident(self, location_id, incident_id).await
    }
}

fn columns() -> Vec<ColumnDefinition<Incident>> {
    vec![
        ColumnDefinition::new("date", "Date", |i: &Incident| local_date(i.incident_datetime).into())
            .cell(|i: &Incident| us_date(local_date(i.incident_datetime)))
            .filter(FilterType::DateRange)
            .sort_fn(|a: &Incident, b: &Incident| a.incident_datetime.cmp(&b.incident_datetime)),
        ColumnDefinition::new("time", "Time", |i: &Incident| local_time(i.incident_datetime).into())
            .cell(|i: &Incident| clock(local_time(i.incident_datetime)))
            .filter(FilterType::Time),
        ColumnDefinition::new("severity", "Severity", |i: &Incident| i.severity.as_str().into())
            .cell(|i: &Incident| i.severity.label().to_string())
            .select_options(
                IncidentSeverity::ALL
                    .iter()
                    .map(|s| SelectOption::new(s.as_str(), s.label()))
                    .collect(),
            ),
        ColumnDefinition::new("description", "Description", |i: &Incident| {
            i.description.clone().into()
        })
        .filter(FilterType::Text)
        .not_sortable(),
    ]
}

/// Incidents of one location, with logging, editing and deleting.
///
/// Changes here invalidate the locations cache, whose rows carry the
/// incident counts.
pub struct IncidentLog {
    location_id: i64,
    service: Arc<dyn IncidentService>,
    locations: Arc<QueryCache<Location>>,
    table: TableTemplate<Incident>,
    sidebar: SidebarHandle<Panel>,
    deletes: mpsc::UnboundedReceiver<Incident>,
    state: MutationState<()>,
}

impl IncidentLog {
    pub fn new(
        location: &Location,
        service: Arc<dyn IncidentService>,
        locations: Arc<QueryCache<Location>>,
        sidebar: SidebarHandle<Panel>,
        page_size: usize,
    ) -> Self {
        let (tx, deletes) = mpsc::unbounded_channel();
        let location_id = location.id;

        let edit_sidebar = sidebar.clone();
        let create_sidebar = sidebar.clone();
        let table = TableTemplate::new(columns(), |i: &Incident| i.id.to_string())
            .resource_name("Incident")
            .page_size(page_size)
            .initial_sort(SortOrder::desc("date"))
            .on_edit(move |i: &Incident| {
                let panel = Panel::edit(i.id, Form::Incident(IncidentForm::from(i)));
                edit_sidebar.open_sidebar(panel.key(), "Edit Incident", "Update the details below.", panel);
            })
            .on_delete(move |i: &Incident| {
                if tx.send(i.clone()).is_err() {
                    log::warn!("delete queue closed, dropping incident {}", i.id);
                }
            })
            .on_create_new(move || {
                let panel = Panel::create(Form::Incident(IncidentForm::for_location(location_id)));
                create_sidebar.open_sidebar(
                    panel.key(),
                    "Log Incident",
                    "Record a complaint, warning or citation.",
                    panel,
                );
            })
            .with_data(location.incidents.clone());

        Self {
            location_id,
            service,
            locations,
            table,
            sidebar,
            deletes,
            state: MutationState::Idle,
        }
    }

    pub fn table(&self) -> &TableTemplate<Incident> {
        &self.table
    }

    pub fn table_mut(&mut self) -> &mut TableTemplate<Incident> {
        &mut self.table
    }

    pub fn state(&self) -> &MutationState<()> {
        &self.state
    }

    pub fn render(&self) -> TableView {
        self.table.render()
    }

    /// Sends the open incident form.
    ///
    /// Invalid input stays in the panel; nothing is sent.
    pub async fn submit(&mut self) -> Result<Option<Incident>, Error> {
        let Some(panel) = self.sidebar.with_state(|s| s.content().cloned()).flatten() else {
            return Ok(None);
        };
        let Form::Incident(form) = &panel.form else {
            return Ok(None);
        };
        let payload = match form.payload() {
            Ok(payload) => payload,
            Err(validation) => {
                self.sidebar.with_content_mut(|p| p.validation = validation);
                return Ok(None);
            }
        };

        self.state = MutationState::Pending;
        self.sidebar.with_content_mut(|p| {
            p.validation = ValidationResult::Valid;
            p.submit = MutationState::Pending;
        });

        let result = match panel.mode {
            FormMode::Create => self.service.create_incident(&payload).await,
            FormMode::Edit(id) => self.service.update_incident(id, &payload).await,
        };

        match result {
            Ok(saved) => {
                log::info!("saved incident {} at location {}", saved.id, self.location_id);
                let mut rows: Vec<Incident> =
                    self.table.rows().iter().filter(|i| i.id != saved.id).cloned().collect();
                rows.push(saved.clone());
                self.table.set_data(rows);
                self.locations.invalidate_prefix(Location::PATH);
                self.sidebar.close_sidebar();
                self.table.on_sidebar_closed();
                self.state = MutationState::Success(());
                Ok(Some(saved))
            }
            Err(e) => {
                log::error!("saving incident failed: {e}");
                let message = e.user_message();
                self.sidebar
                    .with_content_mut(|p| p.submit = MutationState::Error(message.clone()));
                self.state = MutationState::Error(message);
                Err(e)
            }
        }
    }

    /// Runs queued deletes. Rows leave at once and come back on failure.
    pub async fn process_deletes(&mut self) -> Result<usize, Error> {
        let mut deleted = 0;
        while let Ok(incident) = self.deletes.try_recv() {
            let previous = self.table.rows().to_vec();
            self.table.set_deleting(true);
            self.table
                .set_data(previous.iter().filter(|i| i.id != incident.id).cloned().collect());

            let result = self
                .service
                .delete_incident(self.location_id, incident.id)
                .await;
            self.table.set_deleting(false);

            match result {
                Ok(()) => {
                    self.locations.invalidate_prefix(Location::PATH);
                    self.state = MutationState::Success(());
                    deleted += 1;
                }
                Err(e) => {
                    log::error!("deleting incident {} failed, rolling back: {e}", incident.id);
                    self.table.set_data(previous);
                    self.state = MutationState::Error(e.user_message());
                    return Err(e);
                }
            }
        }
        Ok(deleted)
    }
}
