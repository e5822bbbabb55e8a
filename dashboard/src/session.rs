//! Per-browser UI state: selected tab, last form input, pending download and
//! the outcome of the last action. Lives only as long as the process.

use actix_web::cookie::{Cookie, SameSite};
use actix_web::HttpRequest;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use uuid::Uuid;

use crate::error::{ActionError, ErrorKind};
use crate::services::TablePreview;

pub const SESSION_COOKIE: &str = "mlops_session";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Models,
    Training,
    Predict,
    Datasets,
    System,
}

impl Tab {
    pub const ALL: [Tab; 5] = [Tab::Models, Tab::Training, Tab::Predict, Tab::Datasets, Tab::System];

    pub fn as_str(&self) -> &'static str {
        match self {
            Tab::Models => "models",
            Tab::Training => "training",
            Tab::Predict => "predict",
            Tab::Datasets => "datasets",
            Tab::System => "system",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Tab::Models => "Models",
            Tab::Training => "Training",
            Tab::Predict => "Predictions",
            Tab::Datasets => "Datasets",
            Tab::System => "System",
        }
    }

    pub fn from_name(name: &str) -> Option<Tab> {
        Tab::ALL.iter().copied().find(|tab| tab.as_str() == name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Warning,
    Error,
}

/// Outcome of the last action, rendered once above the active tab.
#[derive(Debug, Clone)]
pub struct Notice {
    pub action: String,
    pub level: NoticeLevel,
    pub message: String,
    pub payload: Option<Value>,
    pub preview: Option<TablePreview>,
    pub download_ready: bool,
    pub at: DateTime<Utc>,
}

impl Notice {
    pub fn success(action: &str, message: impl Into<String>) -> Self {
        Self {
            action: action.to_string(),
            level: NoticeLevel::Success,
            message: message.into(),
            payload: None,
            preview: None,
            download_ready: false,
            at: Utc::now(),
        }
    }

    /// Validation problems are warnings; transport and server failures are
    /// errors. The message is the error's text, unaltered.
    pub fn failure(action: &str, error: &ActionError) -> Self {
        let level = match error.kind() {
            ErrorKind::Validation => NoticeLevel::Warning,
            ErrorKind::Transport | ErrorKind::Server => NoticeLevel::Error,
        };

        Self {
            level,
            message: error.to_string(),
            ..Self::success(action, "")
        }
    }

    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = Some(payload);
        self
    }

    pub fn with_preview(mut self, preview: TablePreview) -> Self {
        self.preview = Some(preview);
        self
    }

    pub fn with_download(mut self) -> Self {
        self.download_ready = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PendingDownload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct SessionState {
    pub tab: Tab,
    pub base_url: String,
    pub fields: HashMap<String, String>,
    pub delete_acknowledged: bool,
    pub notice: Option<Notice>,
    pub download: Option<PendingDownload>,
    pub last_seen: DateTime<Utc>,
}

impl SessionState {
    fn new(base_url: &str) -> Self {
        Self {
            tab: Tab::default(),
            base_url: base_url.to_string(),
            fields: HashMap::new(),
            delete_acknowledged: false,
            notice: None,
            download: None,
            last_seen: Utc::now(),
        }
    }

    fn idle_longer_than(&self, ttl: Duration, now: DateTime<Utc>) -> bool {
        (now - self.last_seen)
            .to_std()
            .map(|idle| idle > ttl)
            .unwrap_or(false)
    }

    pub fn field(&self, name: &str) -> &str {
        self.fields.get(name).map(String::as_str).unwrap_or_default()
    }

    pub fn remember(&mut self, tab: Tab, fields: &[(&str, &str)]) {
        self.tab = tab;
        for (name, value) in fields {
            self.fields.insert(name.to_string(), value.to_string());
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionHandle {
    pub id: Uuid,
    pub is_new: bool,
}

impl SessionHandle {
    pub fn cookie(&self) -> Cookie<'static> {
        Cookie::build(SESSION_COOKIE, self.id.to_string())
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .finish()
    }
}

pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(60 * 60);
pub const DEFAULT_MAX_SESSIONS: usize = 1000;

#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<DashMap<Uuid, SessionState>>,
    default_base_url: String,
    ttl: Duration,
    max_sessions: usize,
}

impl SessionStore {
    pub fn new(default_base_url: &str) -> Self {
        Self {
            sessions: Arc::new(DashMap::new()),
            default_base_url: default_base_url.to_string(),
            ttl: DEFAULT_SESSION_TTL,
            max_sessions: DEFAULT_MAX_SESSIONS,
        }
    }

    pub fn with_limits(mut self, ttl: Duration, max_sessions: usize) -> Self {
        self.ttl = ttl;
        self.max_sessions = max_sessions.max(1);
        self
    }

    /// Finds the caller's session from its cookie. A missing cookie, or one
    /// naming a session this store does not hold, gets a fresh id. Nothing is
    /// stored until the first `update`.
    pub fn resolve(&self, req: &HttpRequest) -> SessionHandle {
        let known = req
            .cookie(SESSION_COOKIE)
            .and_then(|cookie| Uuid::parse_str(cookie.value()).ok())
            .filter(|id| match self.sessions.get_mut(id) {
                Some(mut state) => {
                    state.last_seen = Utc::now();
                    true
                }
                None => false,
            });

        match known {
            Some(id) => SessionHandle { id, is_new: false },
            None => SessionHandle {
                id: Uuid::new_v4(),
                is_new: true,
            },
        }
    }

    pub fn snapshot(&self, id: Uuid) -> SessionState {
        self.sessions
            .get(&id)
            .map(|state| state.clone())
            .unwrap_or_else(|| SessionState::new(&self.default_base_url))
    }

    /// Runs `f` on the session, creating it first when absent.
    pub fn update<R>(&self, id: Uuid, f: impl FnOnce(&mut SessionState) -> R) -> R {
        if !self.sessions.contains_key(&id) {
            self.make_room();
        }

        let mut state = self
            .sessions
            .entry(id)
            .or_insert_with(|| SessionState::new(&self.default_base_url));
        state.last_seen = Utc::now();
        f(state.value_mut())
    }

    /// Drops sessions idle for longer than the configured TTL.
    pub fn sweep(&self) -> usize {
        let now = Utc::now();
        let before = self.sessions.len();
        self.sessions
            .retain(|_, state| !state.idle_longer_than(self.ttl, now));
        let evicted = before.saturating_sub(self.sessions.len());
        if evicted > 0 {
            debug!("Evicted {} idle sessions", evicted);
        }
        evicted
    }

    /// Keeps one slot free for a new session, evicting idle sessions first
    /// and then the least recently seen.
    fn make_room(&self) {
        if self.sessions.len() < self.max_sessions {
            return;
        }
        self.sweep();

        let excess = (self.sessions.len() + 1).saturating_sub(self.max_sessions);
        if excess == 0 {
            return;
        }

        let mut by_age: Vec<(DateTime<Utc>, Uuid)> = self
            .sessions
            .iter()
            .map(|entry| (entry.last_seen, *entry.key()))
            .collect();
        by_age.sort_unstable();
        for (_, id) in by_age.into_iter().take(excess) {
            self.sessions.remove(&id);
        }
        debug!("Evicted {} least recently seen sessions", excess);
    }

    pub fn base_url(&self, id: Uuid) -> String {
        self.sessions
            .get(&id)
            .map(|state| state.base_url.clone())
            .unwrap_or_else(|| self.default_base_url.clone())
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.sessions.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn test_new_visitor_is_stored_on_first_update() {
        let store = SessionStore::new("http://localhost:80");
        let req = TestRequest::default().to_http_request();

        let handle = store.resolve(&req);
        assert!(handle.is_new);
        assert!(store.is_empty());
        assert_eq!(store.base_url(handle.id), "http://localhost:80");

        store.update(handle.id, |state| state.tab = Tab::System);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_unknown_cookie_is_not_adopted() {
        let store = SessionStore::new("http://localhost:80");
        let forged = Uuid::new_v4();
        let req = TestRequest::default()
            .cookie(Cookie::new(SESSION_COOKIE, forged.to_string()))
            .to_http_request();

        let handle = store.resolve(&req);
        assert!(handle.is_new);
        assert_ne!(handle.id, forged);
        assert!(store.is_empty());
    }

    #[test]
    fn test_session_count_stays_bounded() {
        let store = SessionStore::new("http://localhost:80").with_limits(DEFAULT_SESSION_TTL, 50);

        for _ in 0..10_000 {
            let handle = store.resolve(&TestRequest::default().to_http_request());
            store.update(handle.id, |state| state.tab = Tab::Datasets);
        }
        for _ in 0..10_000 {
            let req = TestRequest::default()
                .cookie(Cookie::new(SESSION_COOKIE, Uuid::new_v4().to_string()))
                .to_http_request();
            store.resolve(&req);
        }

        assert_eq!(store.len(), 50);
    }

    #[test]
    fn test_full_store_evicts_least_recently_seen() {
        let store = SessionStore::new("http://localhost:80").with_limits(DEFAULT_SESSION_TTL, 2);
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());

        store.update(a, |state| state.last_seen = Utc::now() - chrono::Duration::minutes(5));
        store.update(b, |state| state.tab = Tab::Predict);
        store.update(c, |state| state.tab = Tab::System);

        assert_eq!(store.len(), 2);
        assert_eq!(store.snapshot(b).tab, Tab::Predict);
        assert_eq!(store.snapshot(c).tab, Tab::System);
        assert_eq!(store.snapshot(a).tab, Tab::Models);
    }

    #[test]
    fn test_sweep_drops_idle_sessions() {
        let store = SessionStore::new("http://localhost:80").with_limits(Duration::from_secs(60), 100);
        let (idle, active) = (Uuid::new_v4(), Uuid::new_v4());

        store.update(idle, |state| state.last_seen = Utc::now() - chrono::Duration::hours(2));
        store.update(active, |state| state.tab = Tab::Training);

        assert_eq!(store.sweep(), 1);
        assert_eq!(store.len(), 1);
        assert_eq!(store.snapshot(active).tab, Tab::Training);
    }

    #[test]
    fn test_resolve_refreshes_last_seen() {
        let store = SessionStore::new("http://localhost:80").with_limits(Duration::from_secs(60), 100);
        let id = Uuid::new_v4();
        store.update(id, |state| state.last_seen = Utc::now() - chrono::Duration::hours(2));

        let handle = SessionHandle { id, is_new: false };
        let req = TestRequest::default().cookie(handle.cookie()).to_http_request();
        assert_eq!(store.resolve(&req).id, id);

        assert_eq!(store.sweep(), 0);
    }

    #[test]
    fn test_cookie_resumes_session() {
        let store = SessionStore::new("http://localhost:80");
        let first = store.resolve(&TestRequest::default().to_http_request());
        store.update(first.id, |state| state.remember(Tab::Datasets, &[("dataset_id", "d-1")]));

        let req = TestRequest::default().cookie(first.cookie()).to_http_request();
        let again = store.resolve(&req);
        assert_eq!(again.id, first.id);
        assert!(!again.is_new);

        let state = store.snapshot(again.id);
        assert_eq!(state.tab, Tab::Datasets);
        assert_eq!(state.field("dataset_id"), "d-1");
        assert_eq!(state.field("model_id"), "");
    }

    #[test]
    fn test_garbage_cookie_starts_fresh() {
        let store = SessionStore::new("http://localhost:80");
        let req = TestRequest::default()
            .cookie(Cookie::new(SESSION_COOKIE, "not-a-uuid"))
            .to_http_request();
        assert!(store.resolve(&req).is_new);
    }

    #[test]
    fn test_sessions_are_isolated() {
        let store = SessionStore::new("http://localhost:80");
        let a = store.resolve(&TestRequest::default().to_http_request());
        let b = store.resolve(&TestRequest::default().to_http_request());

        store.update(a.id, |state| state.delete_acknowledged = true);
        assert!(store.snapshot(a.id).delete_acknowledged);
        assert!(!store.snapshot(b.id).delete_acknowledged);
    }

    #[test]
    fn test_failure_levels_follow_error_kind() {
        let warning = Notice::failure("Train model", &ActionError::MissingFields(vec!["model_id"]));
        assert_eq!(warning.level, NoticeLevel::Warning);

        let error = Notice::failure(
            "Get model info",
            &ActionError::Server {
                status: 404,
                message: "model not found".into(),
            },
        );
        assert_eq!(error.level, NoticeLevel::Error);
        assert_eq!(error.message, "model not found");
    }

    #[test]
    fn test_tab_names() {
        for tab in Tab::ALL {
            assert_eq!(Tab::from_name(tab.as_str()), Some(tab));
        }
        assert_eq!(Tab::from_name("admin"), None);
    }
}
