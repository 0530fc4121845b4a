//! The single viewer session.
//!
//! One task owns the [`Controller`] and processes events strictly in arrival
//! order. Allow-list fetches run on their own tasks and report back through
//! the same queue; the controller's tickets discard responses that were
//! overtaken by a newer selection. Every processed event republishes a
//! [`SessionSnapshot`] on a `watch` channel, which is what handlers read.

use std::sync::Arc;

use serde::Serialize;
use storemap_core::controller::PendingList;
use storemap_core::persist::persist_entry;
use storemap_core::{
    Command, Controller, Event, FeatureCollection, FilterState, KeyValueStore, ViewState,
};
use storemap_loader::DataLoader;
use tokio::sync::{mpsc, oneshot, watch};

const QUEUE_DEPTH: usize = 64;

#[derive(Debug, Clone, Serialize)]
pub struct FilterSelectors {
    pub brand: String,
    pub codes: String,
}

impl From<&FilterState> for FilterSelectors {
    fn from(state: &FilterState) -> Self {
        Self {
            brand: state.brand.as_selector().to_string(),
            codes: state.codes.as_selector().to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PendingSelector {
    #[serde(skip)]
    pub ticket: u64,
    pub codes: String,
}

impl From<&PendingList> for PendingSelector {
    fn from(pending: &PendingList) -> Self {
        Self {
            ticket: pending.ticket,
            codes: pending.list_id.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub filters: FilterSelectors,
    pub view: ViewState,
    /// Code list requested but not yet applied.
    pub pending: Option<PendingSelector>,
    /// Most recent notice raised since the last user action.
    pub notice: Option<String>,
    pub visible: Arc<FeatureCollection>,
}

struct Message {
    event: Event,
    reply: Option<oneshot::Sender<SessionSnapshot>>,
}

/// Cheap, cloneable handle to the session task.
#[derive(Clone)]
pub struct SessionHandle {
    tx: mpsc::Sender<Message>,
    snapshots: watch::Receiver<SessionSnapshot>,
}

#[derive(Debug, thiserror::Error)]
#[error("viewer session has stopped")]
pub struct SessionClosed;

impl SessionHandle {
    /// Queue an event and wait until it has been processed.
    ///
    /// # Errors
    ///
    /// Returns [`SessionClosed`] if the session task is gone.
    pub async fn dispatch(&self, event: Event) -> Result<SessionSnapshot, SessionClosed> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Message {
                event,
                reply: Some(reply),
            })
            .await
            .map_err(|_| SessionClosed)?;
        rx.await.map_err(|_| SessionClosed)
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        !self.tx.is_closed()
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Wait until the list request identified by `ticket` has been settled,
    /// either applied, rejected, or superseded.
    ///
    /// # Errors
    ///
    /// Returns [`SessionClosed`] if the session task is gone.
    pub async fn settled(&self, ticket: u64) -> Result<SessionSnapshot, SessionClosed> {
        let mut rx = self.snapshots.clone();
        let snapshot = rx
            .wait_for(|s| s.pending.as_ref().is_none_or(|p| p.ticket != ticket))
            .await
            .map_err(|_| SessionClosed)?;
        Ok(snapshot.clone())
    }
}

struct Session {
    controller: Controller,
    loader: DataLoader,
    store: Box<dyn KeyValueStore + Send>,
    weak_tx: mpsc::WeakSender<Message>,
    snapshots: watch::Sender<SessionSnapshot>,
    visible: Arc<FeatureCollection>,
    notice: Option<String>,
}

impl Session {
    fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            filters: self.controller.filters().into(),
            view: self.controller.view(),
            pending: self.controller.pending().map(Into::into),
            notice: self.notice.clone(),
            visible: Arc::clone(&self.visible),
        }
    }

    fn handle(&mut self, event: Event) {
        let user_action = matches!(
            event,
            Event::BrandChanged(_) | Event::CodeFilterChanged(_) | Event::ViewMoved(_)
        );
        if user_action {
            self.notice = None;
        }
        let commands = self.controller.dispatch(event);
        self.execute(commands);
        self.snapshots.send_replace(self.snapshot());
    }

    fn execute(&mut self, commands: Vec<Command>) {
        for command in commands {
            match command {
                Command::Render(collection) => {
                    self.visible = Arc::new(collection);
                }
                Command::Persist { key, value } => {
                    if let Err(e) = persist_entry(&mut self.store, key, &value) {
                        tracing::error!(key, error = %e, "failed to persist viewer state");
                    }
                }
                Command::FetchAllowList { ticket, list_id } => {
                    self.spawn_fetch(ticket, list_id);
                }
                Command::Notify(message) => {
                    tracing::info!(notice = %message, "viewer notice");
                    self.notice = Some(message);
                }
            }
        }
    }

    fn spawn_fetch(&self, ticket: u64, list_id: String) {
        let loader = self.loader.clone();
        let weak_tx = self.weak_tx.clone();
        tokio::spawn(async move {
            let result = loader
                .load_allow_list(&list_id)
                .await
                .map_err(|e| e.to_string());
            let Some(tx) = weak_tx.upgrade() else {
                return;
            };
            let event = Event::AllowListLoaded {
                ticket,
                list_id,
                result,
            };
            if tx.send(Message { event, reply: None }).await.is_err() {
                tracing::debug!(ticket, "session closed before allow-list arrived");
            }
        });
    }
}

/// Start the session task.
///
/// `initial` are the commands returned by [`Controller::restore`]; they are
/// executed before any event is processed.
pub fn spawn_session(
    controller: Controller,
    initial: Vec<Command>,
    loader: DataLoader,
    store: Box<dyn KeyValueStore + Send>,
) -> SessionHandle {
    let (tx, mut rx) = mpsc::channel::<Message>(QUEUE_DEPTH);

    let mut session = Session {
        controller,
        loader,
        store,
        weak_tx: tx.downgrade(),
        snapshots: watch::Sender::new(SessionSnapshot {
            filters: FilterSelectors {
                brand: String::new(),
                codes: String::new(),
            },
            view: ViewState::default(),
            pending: None,
            notice: None,
            visible: Arc::new(FeatureCollection::default()),
        }),
        visible: Arc::new(FeatureCollection::default()),
        notice: None,
    };
    session.execute(initial);
    session.snapshots.send_replace(session.snapshot());
    let snapshots = session.snapshots.subscribe();

    tokio::spawn(async move {
        while let Some(Message { event, reply }) = rx.recv().await {
            session.handle(event);
            if let Some(reply) = reply {
                // The caller may have given up waiting.
                let _ = reply.send(session.snapshot());
            }
        }
        tracing::debug!("viewer session stopped");
    });

    SessionHandle { tx, snapshots }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use storemap_core::persist::{load_persisted, MemoryStore};
    use storemap_core::{
        build_features, BrandFilter, BuildOptions, CodeFilter, DataSource, PersistedState,
        StoreRecord,
    };

    use super::*;

    fn row(code: &str, brand: &str) -> StoreRecord {
        StoreRecord {
            code: Some(code.to_string()),
            name: Some(format!("{brand} {code}")),
            brand: Some(brand.to_string()),
            latitude: Some("35.0".to_string()),
            longitude: Some("135.0".to_string()),
        }
    }

    fn codes(snapshot: &SessionSnapshot) -> Vec<String> {
        snapshot
            .visible
            .iter()
            .filter_map(|f| f.code().map(str::to_string))
            .collect()
    }

    async fn start(dir: &std::path::Path, persisted: &PersistedState) -> SessionHandle {
        let loader =
            DataLoader::new(DataSource::Directory(dir.to_path_buf()), 5, "test").unwrap();
        let (controller, initial) = Controller::restore(persisted);
        let session = spawn_session(controller, initial, loader, Box::new(MemoryStore::default()));
        let rows = vec![row("1", "松屋"), row("2", "松のや"), row("3", "松屋")];
        let collection = Arc::new(build_features(&rows, BuildOptions::default()).0);
        session.dispatch(Event::DataLoaded(collection)).await.unwrap();
        session
    }

    #[tokio::test]
    async fn brand_change_updates_visible_set() {
        let dir = tempfile::tempdir().unwrap();
        let session = start(dir.path(), &PersistedState::default()).await;

        let snapshot = session
            .dispatch(Event::BrandChanged(BrandFilter::Brand("松屋".into())))
            .await
            .unwrap();
        assert_eq!(codes(&snapshot), vec!["1", "3"]);
        assert_eq!(snapshot.filters.brand, "松屋");
    }

    #[tokio::test]
    async fn code_list_is_fetched_and_applied() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("l.csv"), "2\n3\n").unwrap();
        let session = start(dir.path(), &PersistedState::default()).await;

        let snapshot = session
            .dispatch(Event::CodeFilterChanged(CodeFilter::List("l.csv".into())))
            .await
            .unwrap();
        let ticket = snapshot.pending.expect("pending").ticket;

        let settled = tokio::time::timeout(Duration::from_secs(5), session.settled(ticket))
            .await
            .expect("settles")
            .unwrap();
        assert_eq!(codes(&settled), vec!["2", "3"]);
        assert_eq!(settled.filters.codes, "l.csv");
    }

    #[tokio::test]
    async fn missing_list_keeps_view_and_raises_notice() {
        let dir = tempfile::tempdir().unwrap();
        let session = start(dir.path(), &PersistedState::default()).await;

        let snapshot = session
            .dispatch(Event::CodeFilterChanged(CodeFilter::List("gone.csv".into())))
            .await
            .unwrap();
        let ticket = snapshot.pending.expect("pending").ticket;
        let settled = tokio::time::timeout(Duration::from_secs(5), session.settled(ticket))
            .await
            .expect("settles")
            .unwrap();

        assert_eq!(codes(&settled), vec!["1", "2", "3"]);
        assert_eq!(settled.filters.codes, "all");
        assert!(settled.notice.is_some_and(|n| n.contains("gone.csv")));
    }

    #[tokio::test]
    async fn persisted_list_is_restored_at_startup() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("l.csv"), "1\n").unwrap();

        let mut store = MemoryStore::default();
        store.set("selectedCodeFilter", "l.csv").unwrap();
        let persisted = load_persisted(&store).unwrap();
        let session = start(dir.path(), &persisted).await;

        let current = session.snapshot();
        let settled = match current.pending {
            Some(p) => tokio::time::timeout(Duration::from_secs(5), session.settled(p.ticket))
                .await
                .expect("settles")
                .unwrap(),
            None => current,
        };
        assert_eq!(codes(&settled), vec!["1"]);
    }

    #[tokio::test]
    async fn view_move_is_reflected_in_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let session = start(dir.path(), &PersistedState::default()).await;
        let view = ViewState {
            center: [139.7, 35.7],
            zoom: 12.0,
        };
        let snapshot = session.dispatch(Event::ViewMoved(view)).await.unwrap();
        assert_eq!(snapshot.view, view);
    }
}
