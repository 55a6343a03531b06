//! In-process node backed by an actor thread.

use std::{
    net::{Ipv4Addr, SocketAddrV4},
    num::NonZeroUsize,
    thread,
};

use async_trait::async_trait;
use bytes::Bytes;
use flume::{Receiver, Sender};
use lru::LruCache;
use tracing::{debug, info};

use super::{
    peers::PeersStore, Node, NodeConfig, NodeError, MAX_INFO_HASHES, MAX_PEERS, MAX_VALUES,
};
use crate::common::{Id, Receipt, Value};

#[derive(Debug, Clone)]
/// A single member DHT node running in this process.
///
/// Values and peers live in an actor thread, every clone talks to the same
/// actor. The thread stops on [LocalNode::shutdown] or once all clones are
/// dropped.
pub struct LocalNode {
    sender: Sender<ActorMessage>,
    id: Id,
    address: Option<Ipv4Addr>,
    port: u16,
}

impl LocalNode {
    pub fn new(config: NodeConfig) -> std::io::Result<Self> {
        let (sender, receiver) = flume::unbounded();

        let id = config.id.unwrap_or_else(Id::random);
        let actor = Actor::new(&config, receiver);

        thread::Builder::new()
            .name("dht-node".to_string())
            .spawn(move || actor.run())?;

        info!(?id, address = ?config.address, port = config.port, "Dht node started");

        Ok(Self {
            sender,
            id,
            address: config.address,
            port: config.port,
        })
    }

    /// Shutdown the actor thread loop.
    pub async fn shutdown(&self) {
        let (sender, receiver) = flume::bounded::<()>(1);

        let _ = self.sender.send(ActorMessage::Shutdown(sender));
        let _ = receiver.recv_async().await;
    }

    async fn request<T>(
        &self,
        message: impl FnOnce(Sender<T>) -> ActorMessage,
    ) -> Result<T, NodeError> {
        let (sender, receiver) = flume::bounded::<T>(1);

        self.sender
            .send(message(sender))
            .map_err(|_| NodeError::Shutdown)?;

        receiver.recv_async().await.map_err(|_| NodeError::Shutdown)
    }
}

#[async_trait]
impl Node for LocalNode {
    fn id(&self) -> Id {
        self.id
    }

    fn address4(&self) -> Option<Ipv4Addr> {
        self.address
    }

    fn port(&self) -> u16 {
        self.port
    }

    async fn find_value(&self, id: Id) -> Result<Option<Value>, NodeError> {
        self.request(|sender| ActorMessage::FindValue(id, sender))
            .await
    }

    async fn store_value(&self, value: Value) -> Result<Receipt, NodeError> {
        self.request(|sender| ActorMessage::StoreValue(value, sender))
            .await?
    }

    async fn announce_peer(&self, info_hash: Id, port: Option<u16>) -> Result<Id, NodeError> {
        let peer = SocketAddrV4::new(
            self.address.unwrap_or(Ipv4Addr::LOCALHOST),
            port.unwrap_or(self.port),
        );

        self.request(|sender| ActorMessage::AnnouncePeer(info_hash, peer, sender))
            .await?;

        Ok(info_hash)
    }

    async fn get_peers(&self, info_hash: Id) -> Result<Vec<SocketAddrV4>, NodeError> {
        self.request(|sender| ActorMessage::GetPeers(info_hash, sender))
            .await
    }
}

#[derive(Debug)]
enum ActorMessage {
    FindValue(Id, Sender<Option<Value>>),
    StoreValue(Value, Sender<Result<Receipt, NodeError>>),
    AnnouncePeer(Id, SocketAddrV4, Sender<()>),
    GetPeers(Id, Sender<Vec<SocketAddrV4>>),
    Shutdown(Sender<()>),
}

#[derive(Debug)]
struct Actor {
    receiver: Receiver<ActorMessage>,
    values: LruCache<Id, Bytes>,
    peers: PeersStore,
    max_value_size: usize,
}

impl Actor {
    fn new(config: &NodeConfig, receiver: Receiver<ActorMessage>) -> Self {
        Self {
            receiver,
            values: LruCache::new(non_zero(config.max_values, MAX_VALUES)),
            peers: PeersStore::new(
                non_zero(config.max_info_hashes, MAX_INFO_HASHES),
                non_zero(config.max_peers_per_info_hash, MAX_PEERS),
            ),
            max_value_size: config.max_value_size,
        }
    }

    fn run(mut self) {
        while let Ok(message) = self.receiver.recv() {
            match message {
                ActorMessage::FindValue(id, sender) => {
                    let value = self.values.get(&id).map(|data| Value::keyed(id, data.clone()));

                    debug!(?id, found = value.is_some(), "find_value");

                    let _ = sender.send(value);
                }
                ActorMessage::StoreValue(value, sender) => {
                    let _ = sender.send(self.store(value));
                }
                ActorMessage::AnnouncePeer(info_hash, peer, sender) => {
                    debug!(?info_hash, ?peer, "announce_peer");

                    self.peers.add_peer(info_hash, peer);
                    let _ = sender.send(());
                }
                ActorMessage::GetPeers(info_hash, sender) => {
                    let peers = self
                        .peers
                        .get_random_peers(&info_hash)
                        .unwrap_or_default();

                    let _ = sender.send(peers);
                }
                ActorMessage::Shutdown(sender) => {
                    let _ = sender.send(());
                    break;
                }
            }
        }

        debug!("Dht node actor thread was shutdown.");
    }

    fn store(&mut self, value: Value) -> Result<Receipt, NodeError> {
        let size = value.data().len();

        if size > self.max_value_size {
            debug!(id = ?value.id(), size, "Value too large");
            return Err(NodeError::ValueTooLarge(size, self.max_value_size));
        }

        let id = *value.id();
        self.values.put(id, value.into_data());

        debug!(?id, size, "store_value");

        Ok(Receipt::new(id))
    }
}

fn non_zero(value: usize, default: usize) -> NonZeroUsize {
    NonZeroUsize::new(value)
        .or(NonZeroUsize::new(default))
        .unwrap_or(NonZeroUsize::MIN)
}
