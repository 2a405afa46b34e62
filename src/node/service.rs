use super::client::PeerClient;
use super::handlers::handle_rpc;
use super::protocol::{ENDPOINT_RPC, Operation, Request};
use crate::config::{NodeConfig, URL_SCHEME};
use crate::error::{NodeError, Result};
use crate::membership::catalog::Catalog;
use crate::membership::table::NeighborTable;
use crate::membership::types::{Key, NodeUrl, Snapshot};
use crate::storage::memory::{ACK, LocalStore};

use axum::{Extension, Router, routing::post};
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::sync::{mpsc, oneshot, watch};
use tracing::info;

/// Work items for the serving loop. Every read or write of node state goes
/// through one of these, so state is only ever touched by one task.
enum Command {
    Dispatch {
        request: Request,
        reply: oneshot::Sender<Result<Value>>,
    },
    GetLocal {
        key: Key,
        reply: oneshot::Sender<Option<Value>>,
    },
    AddNeighbor {
        url: NodeUrl,
        reply: oneshot::Sender<bool>,
    },
    /// Outgoing gossip: full view plus the neighbors to send it to.
    Outbound {
        reply: oneshot::Sender<(Snapshot, Vec<NodeUrl>)>,
    },
    Merge {
        snapshot: Snapshot,
        reply: oneshot::Sender<usize>,
    },
    Neighbors {
        reply: oneshot::Sender<Snapshot>,
    },
    View {
        reply: oneshot::Sender<Snapshot>,
    },
    Catalog {
        reply: oneshot::Sender<Catalog>,
    },
}

/// State owned by the serving loop.
struct NodeState {
    url: NodeUrl,
    store: LocalStore,
    neighbors: NeighborTable,
}

impl NodeState {
    fn dispatch(&mut self, operation: Operation) -> Result<Value> {
        match operation {
            Operation::Get { key } => Ok(self.store.get_or_absent(&key)),
            Operation::Set { key, value } => {
                self.store.set(key, value);
                Ok(Value::from(ACK))
            }
            Operation::ShareNeighbors { neighbors } => {
                let view = self.share_neighbors(neighbors);
                Ok(serde_json::to_value(view)?)
            }
        }
    }

    /// Inbound gossip. The incoming entry for this node is dropped by the
    /// table; everything else is unioned in, and the caller gets this node's
    /// whole view back rather than an echo of what it sent.
    fn share_neighbors(&mut self, incoming: Snapshot) -> Snapshot {
        let peers = incoming.len();
        let learned = self.neighbors.merge(incoming);
        tracing::debug!(
            "{}: share_neighbors with {} entries, learned {} new fact(s)",
            self.url,
            peers,
            learned
        );
        self.full_view()
    }

    fn full_view(&self) -> Snapshot {
        self.neighbors.view_with_self(self.store.key_set())
    }

    fn handle(&mut self, command: Command) {
        // A dropped reply receiver only means the caller gave up waiting.
        match command {
            Command::Dispatch { request, reply } => {
                let result = match request {
                    Request::Call(operation) => self.dispatch(operation),
                    Request::Stop => Ok(Value::from(ACK)),
                };
                let _ = reply.send(result);
            }
            Command::GetLocal { key, reply } => {
                let _ = reply.send(self.store.get(&key).cloned());
            }
            Command::AddNeighbor { url, reply } => {
                let _ = reply.send(self.neighbors.add_neighbor(url));
            }
            Command::Outbound { reply } => {
                let _ = reply.send((self.full_view(), self.neighbors.urls()));
            }
            Command::Merge { snapshot, reply } => {
                let _ = reply.send(self.neighbors.merge(snapshot));
            }
            Command::Neighbors { reply } => {
                let _ = reply.send(self.neighbors.to_snapshot());
            }
            Command::View { reply } => {
                let _ = reply.send(self.full_view());
            }
            Command::Catalog { reply } => {
                let _ = reply.send(Catalog::from_table(&self.neighbors));
            }
        }
    }
}

/// A node that has bound its endpoint but is not serving yet.
///
/// The URL is fixed at bind time, so peers can be wired together before any
/// of them starts.
pub struct Node {
    config: NodeConfig,
    listener: TcpListener,
    state: NodeState,
}

impl Node {
    pub async fn bind(config: NodeConfig) -> Result<Self> {
        let listener = TcpListener::bind(config.bind_addr).await?;
        let port = listener.local_addr()?.port();
        let url = NodeUrl::new(URL_SCHEME, &config.hostname, port);

        info!("Bound node {} on {}", url, listener.local_addr()?);

        Ok(Self {
            config,
            listener,
            state: NodeState {
                neighbors: NeighborTable::new(url.clone()),
                store: LocalStore::new(),
                url,
            },
        })
    }

    pub fn url(&self) -> &NodeUrl {
        &self.state.url
    }

    /// Seeds the local store.
    pub fn with_data(mut self, data: impl IntoIterator<Item = (Key, Value)>) -> Self {
        for (key, value) in data {
            self.state.store.set(key, value);
        }
        self
    }

    pub fn with_neighbor(mut self, url: NodeUrl) -> Self {
        self.state.neighbors.add_neighbor(url);
        self
    }

    /// Spawns the serving loop and the network endpoint.
    ///
    /// The loop runs until it receives the stop sentinel, after which the
    /// endpoint shuts down gracefully and the returned handle reports stopped.
    pub fn start(self) -> NodeHandle {
        let Node {
            config,
            listener,
            state,
        } = self;

        let (commands, receiver) = mpsc::channel(config.mailbox_capacity.max(1));
        let (stopped_tx, stopped_rx) = watch::channel(false);
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let handle = NodeHandle {
            url: state.url.clone(),
            commands,
            client: PeerClient::new(config.request_timeout),
            stopped: stopped_rx,
        };

        tokio::spawn(serving_loop(state, receiver, shutdown_tx));

        let app = Router::new()
            .route(ENDPOINT_RPC, post(handle_rpc))
            .layer(Extension(handle.clone()));

        let url = handle.url.clone();
        tokio::spawn(async move {
            let server = axum::serve(listener, app).with_graceful_shutdown(async move {
                let _ = shutdown_rx.await;
            });
            if let Err(e) = server.await {
                tracing::error!("{}: endpoint failed: {}", url, e);
            }
            info!("{}: endpoint closed", url);
            let _ = stopped_tx.send(true);
        });

        handle
    }
}

async fn serving_loop(
    mut state: NodeState,
    mut commands: mpsc::Receiver<Command>,
    shutdown: oneshot::Sender<()>,
) {
    info!("{}: serving loop started", state.url);

    while let Some(command) = commands.recv().await {
        let stop = matches!(
            command,
            Command::Dispatch {
                request: Request::Stop,
                ..
            }
        );
        state.handle(command);
        if stop {
            break;
        }
    }

    // Anything still queued is dropped unanswered; its callers see `Stopped`.
    drop(commands);
    let _ = shutdown.send(());
    info!("{}: serving loop stopped", state.url);
}

/// Summary of one gossip round.
///
/// Neighbors that failed stay in the table; facts merged from the ones that
/// answered are kept regardless of later failures.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GossipReport {
    pub merged: Vec<NodeUrl>,
    pub failed: Vec<(NodeUrl, String)>,
    /// New (peer, key) facts this node learned during the round.
    pub learned: usize,
}

impl GossipReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Cloneable access to a running node.
///
/// Calls on the handle run on the caller's task and talk to the serving loop
/// through its mailbox. After the node stops they fail with
/// [`NodeError::Stopped`].
#[derive(Debug, Clone)]
pub struct NodeHandle {
    url: NodeUrl,
    commands: mpsc::Sender<Command>,
    client: PeerClient,
    stopped: watch::Receiver<bool>,
}

impl NodeHandle {
    pub fn url(&self) -> &NodeUrl {
        &self.url
    }

    pub fn client(&self) -> &PeerClient {
        &self.client
    }

    async fn ask<T>(&self, command: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(command(reply))
            .await
            .map_err(|_| NodeError::Stopped)?;
        response.await.map_err(|_| NodeError::Stopped)
    }

    /// Runs a request through the serving loop exactly as if it had arrived
    /// over the network.
    pub async fn dispatch(&self, request: Request) -> Result<Value> {
        self.ask(|reply| Command::Dispatch { request, reply })
            .await?
    }

    /// The locally stored value, if any. Never touches the network.
    pub async fn get(&self, key: &Key) -> Result<Option<Value>> {
        let key = key.clone();
        self.ask(|reply| Command::GetLocal { key, reply }).await
    }

    pub async fn set(&self, key: Key, value: Value) -> Result<()> {
        self.dispatch(Request::Call(Operation::Set { key, value }))
            .await
            .map(|_| ())
    }

    /// Registers a peer with an empty key set. Returns `false` if it was
    /// already known or is this node.
    pub async fn add_neighbor(&self, url: NodeUrl) -> Result<bool> {
        self.ask(|reply| Command::AddNeighbor { url, reply }).await
    }

    /// Union-merges outside knowledge into the neighbor table.
    pub async fn merge(&self, snapshot: Snapshot) -> Result<usize> {
        self.ask(|reply| Command::Merge { snapshot, reply }).await
    }

    /// A copy of the neighbor table.
    pub async fn neighbors(&self) -> Result<Snapshot> {
        self.ask(|reply| Command::Neighbors { reply }).await
    }

    /// The neighbor table plus this node's own keys: what it gossips.
    pub async fn view(&self) -> Result<Snapshot> {
        self.ask(|reply| Command::View { reply }).await
    }

    pub async fn catalog(&self) -> Result<Catalog> {
        self.ask(|reply| Command::Catalog { reply }).await
    }

    /// Runs one gossip round with every neighbor known at call time.
    ///
    /// Neighbors are contacted one after another; each exchange consumes
    /// exactly one reply, which is merged before the next neighbor is tried.
    /// Failures are collected in the report instead of aborting the round.
    pub async fn update(&self) -> Result<GossipReport> {
        let (view, neighbors) = self.ask(|reply| Command::Outbound { reply }).await?;
        tracing::debug!("{}: gossiping with {} neighbor(s)", self.url, neighbors.len());

        let request = Request::Call(Operation::ShareNeighbors { neighbors: view });
        let mut report = GossipReport::default();

        let mut pending = neighbors.into_iter();
        while let Some(neighbor) = pending.next() {
            let outcome = match self.exchange(&neighbor, &request).await {
                Ok(reply) => self.merge(reply).await,
                Err(e) => Err(e),
            };

            match outcome {
                Ok(learned) => {
                    report.learned += learned;
                    report.merged.push(neighbor);
                }
                Err(NodeError::Stopped) => {
                    // This node stopped mid-round: its reply cannot be merged
                    // and nobody after it is contacted.
                    tracing::warn!("{}: stopped during gossip round", self.url);
                    let reason = NodeError::Stopped.to_string();
                    report.failed.push((neighbor, reason.clone()));
                    report
                        .failed
                        .extend(pending.by_ref().map(|rest| (rest, reason.clone())));
                    break;
                }
                Err(e) => {
                    tracing::warn!("{}: gossip with {} failed: {}", self.url, neighbor, e);
                    report.failed.push((neighbor, e.to_string()));
                }
            }
        }

        info!(
            "{}: gossip round done, {} merged, {} failed, {} new fact(s)",
            self.url,
            report.merged.len(),
            report.failed.len(),
            report.learned
        );

        Ok(report)
    }

    async fn exchange(&self, neighbor: &NodeUrl, request: &Request) -> Result<Snapshot> {
        let reply = self.client.request(neighbor, request).await?;
        Ok(serde_json::from_value(reply)?)
    }

    /// Sends the stop sentinel to this node's own endpoint.
    pub async fn stop(&self) -> Result<Value> {
        self.client.stop(&self.url).await
    }

    /// Resolves once the serving loop has exited and the endpoint is closed.
    pub async fn stopped(&self) {
        let mut stopped = self.stopped.clone();
        let _ = stopped.wait_for(|done| *done).await;
    }

    pub fn is_stopped(&self) -> bool {
        *self.stopped.borrow()
    }
}
