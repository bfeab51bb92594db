//! Slide-in panel host.
//!
//! The sidebar holds at most one panel: a create or edit form opened from a
//! table. It is a two-state machine shared through a cloneable handle, so
//! every table and form that needs it gets it passed in rather than reaching
//! for a global.

use std::sync::Arc;
use std::sync::RwLock;

use tokio::sync::watch;

/// Sidebar contents.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SidebarState<C> {
    #[default]
    Closed,
    Open {
        /// Logical identity of the panel, e.g. `edit-party-42`.
        key: String,
        title: String,
        description: String,
        content: C,
    },
}

impl<C> SidebarState<C> {
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Open { .. })
    }

    pub fn key(&self) -> Option<&str> {
        match self {
            Self::Open { key, .. } => Some(key),
            Self::Closed => None,
        }
    }

    pub fn title(&self) -> Option<&str> {
        match self {
            Self::Open { title, .. } => Some(title),
            Self::Closed => None,
        }
    }

    pub fn description(&self) -> Option<&str> {
        match self {
            Self::Open { description, .. } => Some(description),
            Self::Closed => None,
        }
    }

    pub fn content(&self) -> Option<&C> {
        match self {
            Self::Open { content, .. } => Some(content),
            Self::Closed => None,
        }
    }

    pub fn content_mut(&mut self) -> Option<&mut C> {
        match self {
            Self::Open { content, .. } => Some(content),
            Self::Closed => None,
        }
    }
}

/// Transition broadcast to subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SidebarEvent {
    Opened { key: String },
    Closed,
}

/// Shared handle to the sidebar.
///
/// Cheap to clone; all clones see the same state.
#[derive(Debug)]
pub struct SidebarHandle<C> {
    state: Arc<RwLock<SidebarState<C>>>,
    events: Arc<watch::Sender<SidebarEvent>>,
}

impl<C> Clone for SidebarHandle<C> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            events: Arc::clone(&self.events),
        }
    }
}

impl<C> Default for SidebarHandle<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> SidebarHandle<C> {
    /// Creates a closed sidebar.
    pub fn new() -> Self {
        let (events, _) = watch::channel(SidebarEvent::Closed);
        Self {
            state: Arc::new(RwLock::new(SidebarState::Closed)),
            events: Arc::new(events),
        }
    }

    /// Opens a panel, replacing whatever was open.
    ///
    /// Opening the same key twice is not deduplicated; the later call wins.
    pub fn open_sidebar(
        &self,
        key: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
        content: C,
    ) {
        let key = key.into();
        if let Ok(mut guard) = self.state.write() {
            log::debug!("sidebar open: {key}");
            *guard = SidebarState::Open {
                key: key.clone(),
                title: title.into(),
                description: description.into(),
                content,
            };
        }
        self.events.send_replace(SidebarEvent::Opened { key });
    }

    /// Closes the sidebar and drops its content.
    pub fn close_sidebar(&self) {
        if let Ok(mut guard) = self.state.write() {
            if guard.is_open() {
                log::debug!("sidebar close");
            }
            *guard = SidebarState::Closed;
        }
        self.events.send_replace(SidebarEvent::Closed);
    }

    pub fn is_open(&self) -> bool {
        self.state.read().map(|g| g.is_open()).unwrap_or(false)
    }

    /// Key of the open panel.
    pub fn current_key(&self) -> Option<String> {
        self.state
            .read()
            .ok()
            .and_then(|g| g.key().map(str::to_string))
    }

    /// Runs `f` against the current state.
    pub fn with_state<R>(&self, f: impl FnOnce(&SidebarState<C>) -> R) -> Option<R> {
        self.state.read().ok().map(|g| f(&g))
    }

    /// Runs `f` against the open panel's content.
    pub fn with_content_mut<R>(&self, f: impl FnOnce(&mut C) -> R) -> Option<R> {
        self.state
            .write()
            .ok()
            .and_then(|mut g| g.content_mut().map(f))
    }

    /// Receiver that observes open/close transitions.
    pub fn subscribe(&self) -> watch::Receiver<SidebarEvent> {
        self.events.subscribe()
    }
}

impl<C: Clone> SidebarHandle<C> {
    /// Copy of the current state.
    pub fn snapshot(&self) -> SidebarState<C> {
        self.state
            .read()
            .map(|g| g.clone())
            .unwrap_or(SidebarState::Closed)
    }
}
