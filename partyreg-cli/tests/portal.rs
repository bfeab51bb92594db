//! Resource tables driven by in-memory services.

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

use async_trait::async_trait;
use chrono::NaiveDate;
use partyreg_cli::forms::Form;
use partyreg_cli::forms::StudentForm;
use partyreg_cli::portals::Access;
use partyreg_cli::portals::NearbySearch;
use partyreg_cli::portals::PartyTable;
use partyreg_cli::portals::ResourceTable;
use partyreg_lib::api::ResourceService;
use partyreg_lib::cache::MutationState;
use partyreg_lib::cache::QueryCache;
use partyreg_lib::error::ApiError;
use partyreg_lib::error::Error;
use partyreg_lib::model::ContactPreference;
use partyreg_lib::model::Party;
use partyreg_lib::model::PartyPayload;
use partyreg_lib::model::Student;
use partyreg_lib::model::StudentPayload;
use serde_json::json;
use tablekit::SidebarHandle;
use tablekit::TableBody;

fn student(id: i64, last_name: &str) -> Student {
    serde_json::from_value(json!({
        "id": id,
        "pid": format!("73000{id:04}"),
        "email": format!("student{id}@unc.edu"),
        "first_name": "Test",
        "last_name": last_name,
        "phone_number": "9195550142",
        "contact_preference": "text",
        "last_registered": null
    }))
    .unwrap()
}

fn party(id: i64, address: &str) -> Party {
    serde_json::from_value(json!({
        "id": id,
        "party_datetime": "2025-04-12T01:30:00Z",
        "location": {
            "id": id,
            "google_place_id": format!("ChIJ-{id}"),
            "formatted_address": address,
            "latitude": 35.91,
            "longitude": -79.05,
            "hold_expiration": null,
            "incidents": []
        },
        "contact_one": {
            "id": 10,
            "pid": "730000010",
            "email": "host@unc.edu",
            "first_name": "Host",
            "last_name": "Student",
            "phone_number": "9195550100",
            "contact_preference": "call",
            "last_registered": null
        },
        "contact_two": {
            "first_name": "Second",
            "last_name": "Contact",
            "email": "second@example.com",
            "phone_number": "9195550111",
            "contact_preference": "text"
        }
    }))
    .unwrap()
}

fn conflict(detail: &str) -> Error {
    Error::from(ApiError::from_body(
        409,
        &json!({ "detail": detail }).to_string(),
    ))
}

#[derive(Default)]
struct FakeStudents {
    rows: Mutex<Vec<Student>>,
    fail: AtomicBool,
    lists: AtomicUsize,
    writes: AtomicUsize,
}

impl FakeStudents {
    fn with(rows: Vec<Student>) -> Arc<Self> {
        Arc::new(Self {
            rows: Mutex::new(rows),
            ..Self::default()
        })
    }

    fn check(&self) -> Result<(), Error> {
        if self.fail.load(Ordering::SeqCst) {
            Err(conflict("The server rejected the change"))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl ResourceService<Student> for FakeStudents {
    async fn list(&self) -> Result<Vec<Student>, Error> {
        self.lists.fetch_add(1, Ordering::SeqCst);
        Ok(self.rows.lock().unwrap().clone())
    }

    async fn get(&self, id: i64) -> Result<Student, Error> {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.id == id)
            .cloned()
            .ok_or_else(|| Error::from(ApiError::from_body(404, "")))
    }

    async fn create(&self, payload: &StudentPayload) -> Result<Student, Error> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        let mut rows = self.rows.lock().unwrap();
        let mut created = student(rows.len() as i64 + 100, &payload.last_name);
        created.pid = payload.pid.clone();
        created.email = payload.email.clone();
        rows.push(created.clone());
        Ok(created)
    }

    async fn update(&self, id: i64, payload: &StudentPayload) -> Result<Student, Error> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        let mut rows = self.rows.lock().unwrap();
        let row = rows
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| Error::from(ApiError::from_body(404, "")))?;
        row.last_name = payload.last_name.clone();
        Ok(row.clone())
    }

    async fn delete(&self, id: i64) -> Result<(), Error> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        self.rows.lock().unwrap().retain(|s| s.id != id);
        Ok(())
    }
}

fn students_table(service: Arc<FakeStudents>, access: Access) -> ResourceTable<Student> {
    ResourceTable::new(
        service,
        Arc::new(QueryCache::default()),
        SidebarHandle::new(),
        access,
        25,
    )
}

fn valid_form() -> StudentForm {
    StudentForm {
        pid: "730009999".into(),
        email: "new.student@unc.edu".into(),
        first_name: "New".into(),
        last_name: "Student".into(),
        phone_number: "9195550199".into(),
        contact_preference: Some(ContactPreference::Call),
    }
}

#[tokio::test]
async fn test_second_load_served_from_cache() {
    let service = FakeStudents::with(vec![student(1, "Adams"), student(2, "Baker")]);
    let mut table = students_table(Arc::clone(&service), Access::FULL);

    table.load().await.unwrap();
    table.load().await.unwrap();

    assert_eq!(table.table().rows().len(), 2);
    assert_eq!(service.lists.load(Ordering::SeqCst), 1);

    table.reload().await.unwrap();
    assert_eq!(service.lists.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_confirmed_delete_removes_row() {
    let service = FakeStudents::with(vec![student(1, "Adams"), student(2, "Baker")]);
    let mut table = students_table(Arc::clone(&service), Access::FULL);
    table.load().await.unwrap();

    assert!(table.table_mut().request_delete("1"));
    assert!(table.table_mut().confirm_delete());
    let deleted = table.apply_deletes().await.unwrap();

    assert_eq!(deleted, 1);
    assert_eq!(table.table().rows().len(), 1);
    assert_eq!(table.table().rows()[0].id, 2);
    assert!(matches!(table.delete_state(), MutationState::Success(())));
    assert!(!table.table().is_deleting());
}

#[tokio::test]
async fn test_failed_delete_rolls_back() {
    let service = FakeStudents::with(vec![student(1, "Adams"), student(2, "Baker")]);
    let mut table = students_table(Arc::clone(&service), Access::FULL);
    table.load().await.unwrap();
    service.fail.store(true, Ordering::SeqCst);

    table.table_mut().request_delete("2");
    table.table_mut().confirm_delete();
    let result = table.apply_deletes().await;

    assert!(result.is_err());
    assert_eq!(table.table().rows().len(), 2);
    match table.delete_state() {
        MutationState::Error(message) => assert_eq!(message, "The server rejected the change"),
        other => panic!("unexpected state {other:?}"),
    }

    // The cached listing was restored too.
    table.load().await.unwrap();
    assert_eq!(table.table().rows().len(), 2);
    assert_eq!(service.lists.load(Ordering::SeqCst), 1);
}

/// Wraps [`FakeStudents`] and records what the shared cache holds while a
/// delete is in flight.
struct WatchedDeletes {
    inner: Arc<FakeStudents>,
    cache: Arc<QueryCache<Student>>,
    seen: Mutex<Vec<Vec<i64>>>,
}

#[async_trait]
impl ResourceService<Student> for WatchedDeletes {
    async fn list(&self) -> Result<Vec<Student>, Error> {
        self.inner.list().await
    }

    async fn get(&self, id: i64) -> Result<Student, Error> {
        self.inner.get(id).await
    }

    async fn create(&self, payload: &StudentPayload) -> Result<Student, Error> {
        self.inner.create(payload).await
    }

    async fn update(&self, id: i64, payload: &StudentPayload) -> Result<Student, Error> {
        self.inner.update(id, payload).await
    }

    async fn delete(&self, id: i64) -> Result<(), Error> {
        let cached = self
            .cache
            .get("students")
            .map(|r| r.into_inner().iter().map(|s| s.id).collect())
            .unwrap_or_default();
        self.seen.lock().unwrap().push(cached);
        self.inner.delete(id).await
    }
}

fn watched_table(fail: bool) -> (ResourceTable<Student>, Arc<WatchedDeletes>) {
    let inner = FakeStudents::with(vec![
        student(1, "Adams"),
        student(2, "Baker"),
        student(3, "Clark"),
    ]);
    inner.fail.store(fail, Ordering::SeqCst);
    let cache = Arc::new(QueryCache::default());
    let service = Arc::new(WatchedDeletes {
        inner,
        cache: Arc::clone(&cache),
        seen: Mutex::new(Vec::new()),
    });
    let table = ResourceTable::new(
        Arc::clone(&service) as Arc<dyn ResourceService<Student>>,
        cache,
        SidebarHandle::new(),
        Access::FULL,
        25,
    );
    (table, service)
}

fn row_ids(table: &ResourceTable<Student>) -> Vec<i64> {
    table.table().rows().iter().map(|s| s.id).collect()
}

#[tokio::test]
async fn test_deleted_row_leaves_cache_before_server_answers() {
    let (mut table, service) = watched_table(false);
    table.load().await.unwrap();

    table.table_mut().request_delete("2");
    table.table_mut().confirm_delete();
    table.apply_deletes().await.unwrap();

    assert_eq!(*service.seen.lock().unwrap(), vec![vec![1, 3]]);
    assert_eq!(row_ids(&table), vec![1, 3]);
}

#[tokio::test]
async fn test_failed_delete_restores_original_order() {
    let (mut table, service) = watched_table(true);
    table.load().await.unwrap();

    table.table_mut().request_delete("2");
    table.table_mut().confirm_delete();
    assert!(table.apply_deletes().await.is_err());

    assert_eq!(*service.seen.lock().unwrap(), vec![vec![1, 3]]);
    assert_eq!(row_ids(&table), vec![1, 2, 3]);

    // Served from the restored cache snapshot.
    table.load().await.unwrap();
    assert_eq!(row_ids(&table), vec![1, 2, 3]);
    assert_eq!(service.inner.lists.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_invalid_form_is_not_sent() {
    let service = FakeStudents::with(vec![]);
    let mut table = students_table(Arc::clone(&service), Access::FULL);
    table.load().await.unwrap();

    assert!(table.table_mut().create_new());
    let saved = table.submit().await.unwrap();

    assert!(saved.is_none());
    assert_eq!(service.writes.load(Ordering::SeqCst), 0);
    let invalid = table
        .sidebar()
        .with_state(|s| s.content().map(|p| p.validation.is_invalid()))
        .flatten();
    assert_eq!(invalid, Some(true));
}

#[tokio::test]
async fn test_server_error_stays_in_form() {
    let service = FakeStudents::with(vec![]);
    let mut table = students_table(Arc::clone(&service), Access::FULL);
    table.load().await.unwrap();
    service.fail.store(true, Ordering::SeqCst);

    table.table_mut().create_new();
    table
        .sidebar()
        .with_content_mut(|p| p.form = Form::Student(valid_form()));
    let result = table.submit().await;

    assert!(result.is_err());
    assert!(table.sidebar().is_open());
    let submit = table
        .sidebar()
        .with_state(|s| s.content().map(|p| p.submit.clone()))
        .flatten();
    assert!(matches!(submit, Some(MutationState::Error(m)) if m == "The server rejected the change"));
}

#[tokio::test]
async fn test_successful_create_closes_sidebar_and_reloads() {
    let service = FakeStudents::with(vec![student(1, "Adams")]);
    let mut table = students_table(Arc::clone(&service), Access::FULL);
    table.load().await.unwrap();

    table.table_mut().create_new();
    table
        .sidebar()
        .with_content_mut(|p| p.form = Form::Student(valid_form()));
    let saved = table.submit().await.unwrap().unwrap();

    assert_eq!(saved.pid, "730009999");
    assert!(!table.sidebar().is_open());
    assert_eq!(table.table().rows().len(), 2);
    assert_eq!(service.lists.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_edit_then_close_clears_selection() {
    let service = FakeStudents::with(vec![student(1, "Adams")]);
    let mut table = students_table(service, Access::FULL);
    table.load().await.unwrap();

    assert!(table.table_mut().edit_row("1"));
    assert!(table.table().is_selected("1"));
    assert_eq!(table.sidebar().current_key().as_deref(), Some("edit-student-1"));

    table.sidebar().close_sidebar();
    let view = table.render();

    assert!(!table.table().is_selected("1"));
    let TableBody::Rows(rows) = view.body else {
        panic!("expected rows");
    };
    assert!(!rows[0].selected);
}

#[tokio::test]
async fn test_read_only_table_has_no_actions() {
    let service = FakeStudents::with(vec![student(1, "Adams")]);
    let mut table = students_table(service, Access::READ_ONLY);
    table.load().await.unwrap();

    assert!(!table.table().has_actions());
    assert!(!table.table_mut().request_delete("1"));
    assert!(!table.table_mut().create_new());
    assert!(table.render().create_label.is_none());
}

struct FakeParties {
    rows: Vec<Party>,
}

#[async_trait]
impl ResourceService<Party> for FakeParties {
    async fn list(&self) -> Result<Vec<Party>, Error> {
        Ok(self.rows.clone())
    }

    async fn get(&self, _id: i64) -> Result<Party, Error> {
        Err(Error::InvalidOperation("not used".into()))
    }

    async fn create(&self, _payload: &PartyPayload) -> Result<Party, Error> {
        Err(Error::InvalidOperation("not used".into()))
    }

    async fn update(&self, _id: i64, _payload: &PartyPayload) -> Result<Party, Error> {
        Err(Error::InvalidOperation("not used".into()))
    }

    async fn delete(&self, _id: i64) -> Result<(), Error> {
        Err(Error::InvalidOperation("not used".into()))
    }
}

struct FakeNearby {
    rows: Vec<Party>,
    fail: bool,
    searches: Mutex<Vec<(String, NaiveDate, NaiveDate)>>,
}

#[async_trait]
impl NearbySearch for FakeNearby {
    async fn parties_nearby(
        &self,
        place_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Party>, Error> {
        self.searches
            .lock()
            .unwrap()
            .push((place_id.to_string(), start, end));
        if self.fail {
            Err(conflict("Address lookup failed"))
        } else {
            Ok(self.rows.clone())
        }
    }
}

fn party_table(nearby: Arc<FakeNearby>) -> PartyTable {
    let listing = FakeParties {
        rows: vec![party(1, "101 Cameron Ave"), party(2, "220 Rosemary St")],
    };
    let inner = ResourceTable::new(
        Arc::new(listing),
        Arc::new(QueryCache::default()),
        SidebarHandle::new(),
        Access::READ_ONLY,
        25,
    );
    PartyTable::new(inner, nearby)
}

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 4, d).unwrap()
}

#[tokio::test]
async fn test_address_search_replaces_listing() {
    let nearby = Arc::new(FakeNearby {
        rows: vec![party(2, "220 Rosemary St")],
        fail: false,
        searches: Mutex::new(Vec::new()),
    });
    let mut parties = party_table(Arc::clone(&nearby));

    parties.load().await.unwrap();
    assert_eq!(parties.inner().table().rows().len(), 2);

    parties.search_address("ChIJ-2", day(30), day(1)).await.unwrap();
    assert_eq!(parties.inner().table().rows().len(), 1);
    assert_eq!(parties.render().title, "Parties Nearby");
    assert_eq!(
        nearby.searches.lock().unwrap()[0],
        ("ChIJ-2".to_string(), day(1), day(30))
    );

    parties.clear_search().await.unwrap();
    assert_eq!(parties.inner().table().rows().len(), 2);
    assert_eq!(parties.render().title, "Parties");
}

#[tokio::test]
async fn test_failed_address_search_shows_error() {
    let nearby = Arc::new(FakeNearby {
        rows: Vec::new(),
        fail: true,
        searches: Mutex::new(Vec::new()),
    });
    let mut parties = party_table(nearby);

    let result = parties.search_address("ChIJ-9", day(1), day(7)).await;

    assert!(result.is_err());
    assert_eq!(parties.inner().table().error(), Some("Address lookup failed"));
    assert!(matches!(parties.render().body, TableBody::Error(_)));
}
