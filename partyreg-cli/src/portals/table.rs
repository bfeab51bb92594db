//! Generic adapter between a resource service and a [`TableTemplate`].

use std::sync::Arc;

use partyreg_lib::api::ResourceService;
use partyreg_lib::cache::MutationState;
use partyreg_lib::cache::QueryCache;
use partyreg_lib::error::Error;
use partyreg_lib::model::Resource;
use tablekit::CellValue;
use tablekit::ColumnDefinition;
use tablekit::SidebarEvent;
use tablekit::SidebarHandle;
use tablekit::SortOrder;
use tablekit::TableTemplate;
use tablekit::TableView;
use tablekit::validation::ValidationResult;
use tokio::sync::mpsc;
use tokio::sync::watch;

use super::format::json_cell;
use crate::forms::Form;
use crate::forms::FormMode;
use crate::forms::Panel;

/// A resource that can be shown and edited in a table.
pub trait TableResource: Resource {
    fn columns() -> Vec<ColumnDefinition<Self>>;

    fn initial_sort() -> SortOrder {
        SortOrder::none()
    }

    /// Delete confirmation text. `None` uses the generic message.
    fn describe(&self) -> Option<String> {
        None
    }

    /// Value matched by the global search: every serialized field.
    fn search_value(&self) -> CellValue {
        serde_json::to_value(self)
            .map(|v| json_cell(&v))
            .unwrap_or(CellValue::Null)
    }

    fn edit_form(&self) -> Form;

    fn blank_form() -> Form;

    /// Validates `form` and converts it to the create/update body.
    fn payload(form: &Form) -> Result<Self::Payload, ValidationResult>;
}

/// What the current portal may do with a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Access {
    pub create: bool,
    pub edit: bool,
    pub delete: bool,
}

impl Access {
    pub const READ_ONLY: Access = Access {
        create: false,
        edit: false,
        delete: false,
    };

    pub const FULL: Access = Access {
        create: true,
        edit: true,
        delete: true,
    };

    pub const CREATE_ONLY: Access = Access {
        create: true,
        edit: false,
        delete: false,
    };
}

/// Drives one [`TableTemplate`] from a [`ResourceService`].
///
/// Rows come through the shared [`QueryCache`]. Confirmed deletes are
/// queued by the table's callback and run by [`process_deletes`]; edit and
/// create open a form in the sidebar, sent by [`submit`].
///
/// [`process_deletes`]: ResourceTable::process_deletes
/// [`submit`]: ResourceTable::submit
pub struct ResourceTable<R: TableResource> {
    service: Arc<dyn ResourceService<R>>,
    cache: Arc<QueryCache<R>>,
    key: String,
    table: TableTemplate<R>,
    sidebar: SidebarHandle<Panel>,
    sidebar_events: watch::Receiver<SidebarEvent>,
    deletes: mpsc::UnboundedReceiver<R>,
    delete_state: MutationState<()>,
}

impl<R: TableResource> ResourceTable<R> {
    pub fn new(
        service: Arc<dyn ResourceService<R>>,
        cache: Arc<QueryCache<R>>,
        sidebar: SidebarHandle<Panel>,
        access: Access,
        page_size: usize,
    ) -> Self {
        let (tx, deletes) = mpsc::unbounded_channel();

        let mut table = TableTemplate::new(R::columns(), |row: &R| row.id().to_string())
            .resource_name(R::NAME)
            .page_size(page_size)
            .initial_sort(R::initial_sort())
            .search_with(R::search_value);

        if access.edit {
            let sidebar = sidebar.clone();
            table = table.on_edit(move |row: &R| {
                let panel = Panel::edit(row.id(), row.edit_form());
                sidebar.open_sidebar(
                    panel.key(),
                    format!("Edit {}", R::NAME),
                    "Update the details below.",
                    panel,
                );
            });
        }
        if access.delete {
            table = table
                .on_delete(move |row: &R| {
                    if tx.send(row.clone()).is_err() {
                        log::warn!("delete queue closed, dropping {} {}", R::NAME, row.id());
                    }
                })
                .delete_description(|row: &R| {
                    row.describe().unwrap_or_else(|| {
                        format!(
                            "Are you sure you want to delete this {}? This action cannot be undone.",
                            R::NAME.to_lowercase()
                        )
                    })
                });
        }
        if access.create {
            let sidebar = sidebar.clone();
            table = table.on_create_new(move || {
                let panel = Panel::create(R::blank_form());
                sidebar.open_sidebar(
                    panel.key(),
                    format!("New {}", R::NAME),
                    "Fill in the details below.",
                    panel,
                );
            });
        }

        Self {
            service,
            cache,
            key: R::PATH.to_string(),
            sidebar_events: sidebar.subscribe(),
            sidebar,
            table,
            deletes,
            delete_state: MutationState::Idle,
        }
    }

    /// Uses a different cache key, e.g. for a scoped listing.
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn table(&self) -> &TableTemplate<R> {
        &self.table
    }

    pub fn table_mut(&mut self) -> &mut TableTemplate<R> {
        &mut self.table
    }

    pub fn sidebar(&self) -> &SidebarHandle<Panel> {
        &self.sidebar
    }

    pub fn delete_state(&self) -> &MutationState<()> {
        &self.delete_state
    }

    /// Cached rows, or a fresh listing.
    pub async fn fetch(&self) -> Result<Vec<R>, Error> {
        let response = self
            .cache
            .fetch_or_load(&self.key, self.service.list())
            .await?;
        if response.is_cached() {
            log::debug!("{} served from cache, cached at {}", self.key, response.cached_at());
        }
        Ok(response.into_inner())
    }

    /// Shows `result` in the table: rows, or the error's user message.
    pub fn apply(&mut self, result: Result<Vec<R>, Error>) -> Result<(), Error> {
        self.table.set_loading(false);
        match result {
            Ok(rows) => {
                self.table.set_error(None);
                self.table.set_data(rows);
                Ok(())
            }
            Err(e) => {
                log::error!("loading {} failed: {e}", self.key);
                self.table.set_error(Some(e.user_message()));
                Err(e)
            }
        }
    }

    pub async fn load(&mut self) -> Result<(), Error> {
        self.table.set_loading(true);
        let result = self.fetch().await;
        self.apply(result)
    }

    /// Drops the cached rows and loads again.
    pub async fn reload(&mut self) -> Result<(), Error> {
        self.cache.invalidate(&self.key);
        self.load().await
    }

    /// Clears the row selection if the sidebar closed since the last call.
    pub fn sync_sidebar(&mut self) {
        if self.sidebar_events.has_changed().unwrap_or(false)
            && matches!(*self.sidebar_events.borrow_and_update(), SidebarEvent::Closed)
        {
            self.table.on_sidebar_closed();
        }
    }

    pub fn render(&mut self) -> TableView {
        self.sync_sidebar();
        self.table.render()
    }

    /// Runs queued deletes without reloading.
    ///
    /// Each row leaves the table and the cache at once. On failure both are
    /// restored and the first error is returned after the queue drains.
    pub async fn apply_deletes(&mut self) -> Result<usize, Error> {
        let mut deleted = 0;
        let mut first_error = None;

        while let Ok(row) = self.deletes.try_recv() {
            let id = row.id();
            self.table.set_deleting(true);
            self.delete_state = MutationState::Pending;

            let previous_rows = self.table.rows().to_vec();
            self.table
                .set_data(previous_rows.iter().filter(|r| r.id() != id).cloned().collect());

            let cache = Arc::clone(&self.cache);
            let rollback = cache.optimistic_remove(&self.key, id);

            match self.service.delete(id).await {
                Ok(()) => {
                    rollback.commit();
                    cache.invalidate(&self.key);
                    log::info!("deleted {} {id}", R::NAME);
                    self.delete_state = MutationState::Success(());
                    deleted += 1;
                }
                Err(e) => {
                    log::error!("deleting {} {id} failed, rolling back: {e}", R::NAME);
                    rollback.rollback();
                    self.table.set_data(previous_rows);
                    self.delete_state = MutationState::Error(e.user_message());
                    if first_error.is_none() {
                        first_error = Some(e);
                    }
                }
            }
            self.table.set_deleting(false);
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(deleted),
        }
    }

    /// Runs queued deletes, then reloads if any succeeded.
    pub async fn process_deletes(&mut self) -> Result<usize, Error> {
        let result = self.apply_deletes().await;
        if matches!(result, Ok(n) if n > 0) {
            // Best effort; a failed reload shows in the table.
            let _ = self.load().await;
        }
        result
    }

    /// Sends the open form without reloading.
    ///
    /// Returns `Ok(None)` when nothing is open or the form is invalid; the
    /// panel then carries the field errors. A failed request keeps (or
    /// reopens) the form with the server's message.
    pub async fn save(&mut self) -> Result<Option<R>, Error> {
        let Some(panel) = self.sidebar.with_state(|s| s.content().cloned()).flatten() else {
            return Ok(None);
        };

        let payload = match R::payload(&panel.form) {
            Ok(payload) => payload,
            Err(validation) => {
                self.sidebar.with_content_mut(|p| p.validation = validation);
                return Ok(None);
            }
        };

        self.sidebar.with_content_mut(|p| {
            p.validation = ValidationResult::Valid;
            p.submit = MutationState::Pending;
        });

        let result = match panel.mode {
            FormMode::Create => self.service.create(&payload).await,
            FormMode::Edit(id) => self.service.update(id, &payload).await,
        };

        match result {
            Ok(saved) => {
                log::info!("saved {} {}", R::NAME, saved.id());
                self.cache.invalidate(&self.key);
                self.sidebar.close_sidebar();
                self.sync_sidebar();
                Ok(Some(saved))
            }
            Err(e) => {
                log::error!("saving {} failed: {e}", R::NAME);
                let message = e.user_message();
                let reopened = self
                    .sidebar
                    .with_content_mut(|p| p.submit = MutationState::Error(message.clone()))
                    .is_none();
                if reopened {
                    let mut panel = panel;
                    panel.submit = MutationState::Error(message);
                    let title = match panel.mode {
                        FormMode::Create => format!("New {}", R::NAME),
                        FormMode::Edit(_) => format!("Edit {}", R::NAME),
                    };
                    self.sidebar
                        .open_sidebar(panel.key(), title, "Please try again.", panel);
                }
                Err(e)
            }
        }
    }

    /// Sends the open form and reloads on success.
    pub async fn submit(&mut self) -> Result<Option<R>, Error> {
        let saved = self.save().await?;
        if saved.is_some() {
            let _ = self.load().await;
        }
        Ok(saved)
    }
}
