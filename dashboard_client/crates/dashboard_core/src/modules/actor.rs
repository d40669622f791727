use crate::modules::config::ReconcileMode;
use crate::modules::error::DashboardError;
use crate::modules::gateway::RemoteGateway;
use crate::modules::store::{DashboardSnapshot, DashboardStore};
use crate::modules::toggle::PluginRef;
use std::collections::VecDeque;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;

pub const COMMAND_CAP: usize = 64;

type Reply = oneshot::Sender<Result<DashboardSnapshot, DashboardError>>;

pub enum StoreCommand {
    Load { reply: Reply },
    Toggle { plugin: PluginRef, reply: Reply },
    ToggleAll { reply: Reply },
    Snapshot { reply: oneshot::Sender<DashboardSnapshot> },
}

/// Cheap, cloneable access to a store owned by a background task.
///
/// Commands run strictly one after another, so a toggle always stages
/// against the payload left by the previous one.
#[derive(Clone)]
pub struct StoreHandle {
    tx: mpsc::Sender<StoreCommand>,
    updates: watch::Receiver<DashboardSnapshot>,
}

impl StoreHandle {
    pub async fn load(&self) -> Result<DashboardSnapshot, DashboardError> {
        self.request(|reply| StoreCommand::Load { reply }).await
    }

    pub async fn toggle(&self, plugin: PluginRef) -> Result<DashboardSnapshot, DashboardError> {
        self.request(|reply| StoreCommand::Toggle { plugin, reply }).await
    }

    pub async fn toggle_all(&self) -> Result<DashboardSnapshot, DashboardError> {
        self.request(|reply| StoreCommand::ToggleAll { reply }).await
    }

    pub async fn snapshot(&self) -> Result<DashboardSnapshot, DashboardError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(StoreCommand::Snapshot { reply })
            .await
            .map_err(|_| DashboardError::StoreUnavailable)?;
        rx.await.map_err(|_| DashboardError::StoreUnavailable)
    }

    /// Receives a fresh snapshot after every state change, including the
    /// loading flag flipping on before the first fetch.
    pub fn subscribe(&self) -> watch::Receiver<DashboardSnapshot> {
        self.updates.clone()
    }

    async fn request(
        &self,
        make: impl FnOnce(Reply) -> StoreCommand,
    ) -> Result<DashboardSnapshot, DashboardError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(make(reply))
            .await
            .map_err(|_| DashboardError::StoreUnavailable)?;
        rx.await.map_err(|_| DashboardError::StoreUnavailable)?
    }
}

pub fn spawn_store<G>(gateway: G, reconcile: ReconcileMode) -> (StoreHandle, JoinHandle<()>)
where
    G: RemoteGateway + Send + Sync + 'static,
{
    let (tx, rx) = mpsc::channel(COMMAND_CAP);
    let (updates_tx, updates_rx) = watch::channel(DashboardSnapshot::default());
    let store = DashboardStore::new(gateway, reconcile).with_publisher(updates_tx);
    let task = tokio::spawn(run(store, rx));
    (
        StoreHandle {
            tx,
            updates: updates_rx,
        },
        task,
    )
}

pub async fn run<G>(mut store: DashboardStore<G>, mut rx: mpsc::Receiver<StoreCommand>)
where
    G: RemoteGateway + Sync,
{
    let mut backlog: VecDeque<StoreCommand> = VecDeque::new();

    while let Some(cmd) = recv_or_backlog(&mut rx, &mut backlog).await {
        match cmd {
            StoreCommand::Load { reply } => {
                let waiters = coalesce_loads(reply, &mut rx, &mut backlog);
                if waiters.len() > 1 {
                    tracing::debug!("merged {} queued loads into one fetch", waiters.len());
                }
                let result = store.load().await;
                reply_all(waiters, result);
            }
            StoreCommand::Toggle { plugin, reply } => {
                let _ = reply.send(store.toggle_one(&plugin).await);
            }
            StoreCommand::ToggleAll { reply } => {
                let _ = reply.send(store.toggle_all().await);
            }
            StoreCommand::Snapshot { reply } => {
                let _ = reply.send(store.snapshot());
            }
        }
    }

    tracing::debug!("store actor stopped");
}

/// Collects every `Load` queued directly behind `first`. Anything else stops
/// the scan and is kept, in order, for the next iteration.
fn coalesce_loads(
    first: Reply,
    rx: &mut mpsc::Receiver<StoreCommand>,
    backlog: &mut VecDeque<StoreCommand>,
) -> Vec<Reply> {
    let mut waiters = vec![first];

    while let Some(StoreCommand::Load { .. }) = backlog.front() {
        if let Some(StoreCommand::Load { reply }) = backlog.pop_front() {
            waiters.push(reply);
        }
    }
    if !backlog.is_empty() {
        return waiters;
    }

    while let Ok(next) = rx.try_recv() {
        match next {
            StoreCommand::Load { reply } => waiters.push(reply),
            other => {
                backlog.push_back(other);
                break;
            }
        }
    }
    waiters
}

fn reply_all(waiters: Vec<Reply>, result: Result<DashboardSnapshot, DashboardError>) {
    let mut waiters = waiters.into_iter();
    let Some(first) = waiters.next() else { return };
    for waiter in waiters {
        let relayed = match &result {
            Ok(snapshot) => Ok(snapshot.clone()),
            Err(e) => Err(DashboardError::Relayed(e.to_string())),
        };
        let _ = waiter.send(relayed);
    }
    let _ = first.send(result);
}

async fn recv_or_backlog(
    rx: &mut mpsc::Receiver<StoreCommand>,
    backlog: &mut VecDeque<StoreCommand>,
) -> Option<StoreCommand> {
    if let Some(cmd) = backlog.pop_front() {
        return Some(cmd);
    }
    rx.recv().await
}
