//! Role portals and the resource tables they show.

mod account;
mod format;
mod incident;
mod location;
mod party;
mod student;
mod table;

pub use format::format_phone;
pub use format::hold_text;
pub use incident::IncidentLog;
pub use incident::IncidentService;
pub use party::AddressSearch;
pub use party::MyParties;
pub use party::NearbySearch;
pub use party::PartyTable;
pub use table::Access;
pub use table::ResourceTable;
pub use table::TableResource;

use std::fmt;
use std::sync::Arc;

use partyreg_lib::PartyRegClient;
use partyreg_lib::api::ResourceService;
use partyreg_lib::api::RestService;
use partyreg_lib::cache::QueryCache;
use partyreg_lib::error::Error;
use partyreg_lib::model::Account;
use partyreg_lib::model::Location;
use partyreg_lib::model::Party;
use partyreg_lib::model::Student;
use serde::Deserialize;
use serde::Serialize;
use tablekit::SidebarHandle;

use crate::forms::Panel;

/// Who is using the frontend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Staff,
    Police,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Student => "student",
            Self::Staff => "staff",
            Self::Police => "police",
        })
    }
}

/// Tables a portal can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum TableKind {
    Parties,
    Students,
    Locations,
    Accounts,
}

impl Role {
    /// What this role may do with `kind`, or `None` if it can't see it.
    ///
    /// Students see their own parties and may register new ones. Staff
    /// manage everything. Police read parties and locations; incidents are
    /// logged separately.
    pub fn access(self, kind: TableKind) -> Option<Access> {
        match (self, kind) {
            (Self::Student, TableKind::Parties) => Some(Access::CREATE_ONLY),
            (Self::Student, _) => None,
            (Self::Staff, _) => Some(Access::FULL),
            (Self::Police, TableKind::Parties | TableKind::Locations) => Some(Access::READ_ONLY),
            (Self::Police, _) => None,
        }
    }

    pub fn tables(self) -> Vec<TableKind> {
        [
            TableKind::Parties,
            TableKind::Students,
            TableKind::Locations,
            TableKind::Accounts,
        ]
        .into_iter()
        .filter(|kind| self.access(*kind).is_some())
        .collect()
    }

    pub fn can_export(self) -> bool {
        self == Self::Staff
    }

    pub fn can_log_incidents(self) -> bool {
        matches!(self, Self::Staff | Self::Police)
    }
}

/// Query caches shared by every table of a portal.
#[derive(Default, Clone)]
pub struct Caches {
    pub parties: Arc<QueryCache<Party>>,
    pub students: Arc<QueryCache<Student>>,
    pub locations: Arc<QueryCache<Location>>,
    pub accounts: Arc<QueryCache<Account>>,
}

/// A role's view of the registry: its tables, one sidebar, shared caches.
pub struct Portal {
    role: Role,
    client: PartyRegClient,
    sidebar: SidebarHandle<Panel>,
    caches: Caches,
    page_size: usize,
}

impl Portal {
    pub fn new(role: Role, client: PartyRegClient, page_size: usize) -> Self {
        Self {
            role,
            client,
            sidebar: SidebarHandle::new(),
            caches: Caches::default(),
            page_size,
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn client(&self) -> &PartyRegClient {
        &self.client
    }

    pub fn sidebar(&self) -> &SidebarHandle<Panel> {
        &self.sidebar
    }

    fn access(&self, kind: TableKind) -> Result<Access, Error> {
        self.role.access(kind).ok_or_else(|| {
            Error::InvalidOperation(format!("The {} portal has no {kind:?} table", self.role))
        })
    }

    fn table<R: TableResource>(
        &self,
        service: Arc<dyn ResourceService<R>>,
        cache: &Arc<QueryCache<R>>,
        access: Access,
    ) -> ResourceTable<R> {
        ResourceTable::new(
            service,
            Arc::clone(cache),
            self.sidebar.clone(),
            access,
            self.page_size,
        )
    }

    pub fn parties(&self) -> Result<PartyTable, Error> {
        let access = self.access(TableKind::Parties)?;
        let inner = if self.role == Role::Student {
            self.table::<Party>(
                Arc::new(MyParties::new(self.client.clone())),
                &self.caches.parties,
                access,
            )
            .with_key("parties:mine")
        } else {
            self.table::<Party>(
                Arc::new(RestService::<Party>::new(self.client.clone())),
                &self.caches.parties,
                access,
            )
        };
        Ok(PartyTable::new(inner, Arc::new(self.client.clone())))
    }

    pub fn students(&self) -> Result<ResourceTable<Student>, Error> {
        let access = self.access(TableKind::Students)?;
        Ok(self.table::<Student>(
            Arc::new(RestService::<Student>::new(self.client.clone())),
            &self.caches.students,
            access,
        ))
    }

    pub fn locations(&self) -> Result<ResourceTable<Location>, Error> {
        let access = self.access(TableKind::Locations)?;
        Ok(self.table::<Location>(
            Arc::new(RestService::<Location>::new(self.client.clone())),
            &self.caches.locations,
            access,
        ))
    }

    pub fn accounts(&self) -> Result<ResourceTable<Account>, Error> {
        let access = self.access(TableKind::Accounts)?;
        Ok(self.table::<Account>(
            Arc::new(RestService::<Account>::new(self.client.clone())),
            &self.caches.accounts,
            access,
        ))
    }

    /// Incident log of a location, for roles that record incidents.
    pub fn incidents(&self, location: &Location) -> Result<IncidentLog, Error> {
        if !self.role.can_log_incidents() {
            return Err(Error::InvalidOperation(format!(
                "The {} portal cannot log incidents",
                self.role
            )));
        }
        Ok(IncidentLog::new(
            location,
            Arc::new(self.client.clone()),
            Arc::clone(&self.caches.locations),
            self.sidebar.clone(),
            self.page_size,
        ))
    }
}
