// storefront_app/src/state.rs
use crate::config::AppConfig;
use crate::errors::AppError;
use bobabble::{Backend, CartStore, CatalogGateway, OrderGateway, RequestSequencer};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Per-visitor state: the cart and the sequencer that marks superseded menu
/// browses as stale.
#[derive(Debug, Default)]
pub struct Session {
  pub cart: CartStore,
  pub browse: RequestSequencer,
}

#[derive(Debug)]
struct SessionEntry {
  session: Arc<Session>,
  last_seen: Instant,
}

/// Sessions keyed by the `X-Session-Id` header value.
///
/// Only [`SessionStore::create`] adds entries. Entries idle for longer than
/// `idle_timeout` are dropped, and at `capacity` the least recently seen one
/// makes room for a new session.
#[derive(Debug)]
pub struct SessionStore {
  sessions: Mutex<HashMap<String, SessionEntry>>,
  idle_timeout: Duration,
  capacity: usize,
}

impl SessionStore {
  pub fn new(idle_timeout: Duration, capacity: usize) -> Self {
    Self {
      sessions: Mutex::new(HashMap::new()),
      idle_timeout,
      capacity: capacity.max(1),
    }
  }

  /// Starts an empty session and returns its id.
  pub fn create(&self) -> String {
    let id = Uuid::new_v4().to_string();
    let now = Instant::now();
    let mut sessions = self.sessions.lock();

    let idle_timeout = self.idle_timeout;
    let before = sessions.len();
    sessions.retain(|_, entry| now.duration_since(entry.last_seen) < idle_timeout);
    let expired = before - sessions.len();

    if sessions.len() >= self.capacity {
      let oldest = sessions
        .iter()
        .min_by_key(|(_, entry)| entry.last_seen)
        .map(|(id, _)| id.clone());
      if let Some(oldest) = oldest {
        sessions.remove(&oldest);
        tracing::debug!(session_id = %oldest, "Evicted least recently used session.");
      }
    }

    sessions.insert(
      id.clone(),
      SessionEntry {
        session: Arc::new(Session::default()),
        last_seen: now,
      },
    );
    tracing::debug!(session_id = %id, expired, live = sessions.len(), "Created new storefront session.");
    id
  }

  /// Looks up a live session and marks it as seen. An idle-expired entry is
  /// removed and reported as missing.
  pub fn get(&self, id: &str) -> Option<Arc<Session>> {
    let now = Instant::now();
    let mut sessions = self.sessions.lock();
    let idle = now.duration_since(sessions.get(id)?.last_seen);
    if idle >= self.idle_timeout {
      sessions.remove(id);
      tracing::debug!(session_id = %id, "Session expired after idling.");
      return None;
    }
    let entry = sessions.get_mut(id)?;
    entry.last_seen = now;
    Some(entry.session.clone())
  }

  /// Like [`SessionStore::get`], but an unknown id is a 404.
  pub fn require(&self, id: &str) -> Result<Arc<Session>, AppError> {
    self.get(id).ok_or_else(|| {
      AppError::NotFound(format!(
        "Session '{}' does not exist or has expired. Create one with POST /api/v1/sessions.",
        id
      ))
    })
  }

  pub fn len(&self) -> usize {
    self.sessions.lock().len()
  }
}

#[derive(Clone)]
pub struct AppState {
  pub catalog: Arc<CatalogGateway>,
  pub orders: Arc<OrderGateway>,
  pub sessions: Arc<SessionStore>,
  pub config: Arc<AppConfig>, // Share loaded config
}

impl AppState {
  /// Wires both gateways to the one backend selected for the process.
  pub fn new(config: AppConfig, backend: Backend) -> Self {
    let catalog = CatalogGateway::new(backend.clone()).with_policy(config.catalog_fallback);
    let sessions = SessionStore::new(config.session_idle_timeout, config.max_sessions);
    Self {
      catalog: Arc::new(catalog),
      orders: Arc::new(OrderGateway::new(backend)),
      sessions: Arc::new(sessions),
      config: Arc::new(config),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn unknown_ids_are_not_created_on_lookup() {
    let store = SessionStore::new(Duration::from_secs(60), 8);
    assert!(store.get("made-up").is_none());
    assert!(matches!(store.require("made-up"), Err(AppError::NotFound(_))));
    assert_eq!(store.len(), 0);

    let id = store.create();
    assert!(store.get(&id).is_some());
    assert_eq!(store.len(), 1);
  }

  #[test]
  fn capacity_evicts_the_least_recently_seen_session() {
    let store = SessionStore::new(Duration::from_secs(60), 2);
    let first = store.create();
    std::thread::sleep(Duration::from_millis(2));
    let second = store.create();
    std::thread::sleep(Duration::from_millis(2));
    assert!(store.get(&first).is_some());

    let third = store.create();

    assert_eq!(store.len(), 2);
    assert!(store.get(&second).is_none());
    assert!(store.get(&first).is_some());
    assert!(store.get(&third).is_some());
  }

  #[test]
  fn idle_sessions_expire() {
    let store = SessionStore::new(Duration::from_millis(5), 8);
    let id = store.create();
    std::thread::sleep(Duration::from_millis(10));

    assert!(store.get(&id).is_none());
    assert_eq!(store.len(), 0);

    let stale = store.create();
    std::thread::sleep(Duration::from_millis(10));
    store.create();
    assert_eq!(store.len(), 1);
    assert!(store.get(&stale).is_none());
  }
}
