use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use serde_json::{json, Value};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use uuid::Uuid;

/// Event delivered through a session's outbound channel.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// Response envelope for a dispatched request.
    Response(Value),
    /// Unsolicited liveness ping.
    Ping(Value),
}

/// One live streaming or duplex connection.
pub struct Session {
    pub id: String,
    pub created_at: DateTime<Utc>,
    last_activity: RwLock<DateTime<Utc>>,
    tx: mpsc::UnboundedSender<SessionEvent>,
    heartbeat: Mutex<Option<JoinHandle<()>>>,
}

impl Session {
    /// Push an event to the outbound channel. Returns false once the
    /// receiving side is gone.
    pub fn push(&self, event: SessionEvent) -> bool {
        self.tx.send(event).is_ok()
    }

    /// Record inbound activity.
    pub fn touch(&self) {
        *self.last_activity.write() = Utc::now();
    }

    #[must_use]
    pub fn last_activity(&self) -> DateTime<Utc> {
        *self.last_activity.read()
    }
}

/// Tracks live sessions for the streaming transports. The session table is
/// the only cross-session shared resource: insert on connect, remove on
/// disconnect, nothing else mutates it.
#[derive(Clone)]
pub struct SessionManager {
    sessions: Arc<RwLock<HashMap<String, Arc<Session>>>>,
    heartbeat_interval: Duration,
}

impl SessionManager {
    #[must_use]
    pub fn new(heartbeat_interval: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            heartbeat_interval,
        }
    }

    /// Register a new session and return it with the receiving end of its
    /// outbound channel. With `heartbeat` set, a ping event is emitted every
    /// interval for the life of the session, starting one interval in.
    pub fn open(&self, heartbeat: bool) -> (Arc<Session>, mpsc::UnboundedReceiver<SessionEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let session = Arc::new(Session {
            id: Uuid::new_v4().to_string(),
            created_at: Utc::now(),
            last_activity: RwLock::new(Utc::now()),
            tx,
            heartbeat: Mutex::new(None),
        });

        self.sessions
            .write()
            .insert(session.id.clone(), Arc::clone(&session));

        if heartbeat {
            let manager = self.clone();
            let owner = Arc::clone(&session);
            let interval = self.heartbeat_interval;
            let handle = tokio::spawn(async move {
                let mut ticker = tokio::time::interval(interval);
                // The first tick completes immediately; skip it so the first
                // ping goes out one full interval after connect.
                ticker.tick().await;
                loop {
                    ticker.tick().await;
                    let ping = SessionEvent::Ping(json!({ "jsonrpc": "2.0", "method": "ping" }));
                    if !owner.push(ping) {
                        manager.close(&owner.id);
                        break;
                    }
                }
            });
            *session.heartbeat.lock() = Some(handle);
        }

        tracing::info!(session = %session.id, heartbeat, "session opened");
        (session, rx)
    }

    /// Fetch a live session by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<Arc<Session>> {
        self.sessions.read().get(id).cloned()
    }

    /// Tear down a session. The heartbeat is cancelled before the session
    /// leaves the live set, so no ping is ever attempted against a closed
    /// channel. Idempotent.
    pub fn close(&self, id: &str) {
        let mut sessions = self.sessions.write();
        if let Some(session) = sessions.get(id) {
            if let Some(handle) = session.heartbeat.lock().take() {
                handle.abort();
            }
        } else {
            return;
        }
        sessions.remove(id);
        tracing::info!(session = %id, "session closed");
    }

    #[must_use]
    pub fn is_open(&self, id: &str) -> bool {
        self.sessions.read().contains_key(id)
    }

    #[must_use]
    pub fn session_count(&self) -> usize {
        self.sessions.read().len()
    }
}

/// Closes its session when dropped; owned by the transport's response stream
/// so client disconnects reliably tear the session down.
pub struct SessionGuard {
    manager: SessionManager,
    id: String,
}

impl SessionGuard {
    #[must_use]
    pub fn new(manager: SessionManager, id: String) -> Self {
        Self { manager, id }
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        self.manager.close(&self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager(interval_ms: u64) -> SessionManager {
        SessionManager::new(Duration::from_millis(interval_ms))
    }

    #[tokio::test]
    async fn open_and_close_tracks_the_table() {
        let manager = manager(1000);
        assert_eq!(manager.session_count(), 0);

        let (session, _rx) = manager.open(false);
        assert_eq!(manager.session_count(), 1);
        assert!(manager.is_open(&session.id));

        manager.close(&session.id);
        assert_eq!(manager.session_count(), 0);
        assert!(!manager.is_open(&session.id));

        // Closing again is a no-op.
        manager.close(&session.id);
        assert_eq!(manager.session_count(), 0);
    }

    #[tokio::test]
    async fn session_ids_are_unique() {
        let manager = manager(1000);
        let (a, _rx_a) = manager.open(false);
        let (b, _rx_b) = manager.open(false);
        assert_ne!(a.id, b.id);
        assert_eq!(manager.session_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn heartbeat_fires_after_one_interval() {
        let manager = manager(30_000);
        let started = tokio::time::Instant::now();
        let (_session, mut rx) = manager.open(true);

        let event = rx.recv().await.unwrap();
        assert!(matches!(event, SessionEvent::Ping(_)));
        // Virtual time must have advanced a full interval before the ping.
        assert!(started.elapsed() >= Duration::from_millis(30_000));
    }

    #[tokio::test(start_paused = true)]
    async fn no_heartbeat_after_teardown() {
        let manager = manager(30_000);
        let (session, mut rx) = manager.open(true);
        let id = session.id.clone();

        manager.close(&id);
        drop(session);

        // Channel drains and closes without a ping ever arriving.
        tokio::time::advance(Duration::from_millis(90_000)).await;
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn push_fails_once_receiver_is_gone() {
        let manager = manager(1000);
        let (session, rx) = manager.open(false);
        assert!(session.push(SessionEvent::Response(json!({"ok": true}))));

        drop(rx);
        assert!(!session.push(SessionEvent::Response(json!({"ok": false}))));
    }

    #[tokio::test]
    async fn guard_closes_on_drop() {
        let manager = manager(1000);
        let (session, _rx) = manager.open(true);
        let guard = SessionGuard::new(manager.clone(), session.id.clone());

        assert!(manager.is_open(&session.id));
        drop(guard);
        assert!(!manager.is_open(&session.id));
    }
}
