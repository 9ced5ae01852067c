use core::error::Error;
use std::{
    collections::HashMap,
    io,
    net::SocketAddr,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use log::{error, info, warn};
use tokio::{
    net::{TcpListener, TcpStream},
    sync::RwLock,
};

use crate::{
    cave::Cave,
    connection::Connection,
    session::{PlayerId, SessionHandle},
};

const ACCEPT_BACKOFF: Duration = Duration::from_millis(10);

type SessionMap = Arc<RwLock<HashMap<PlayerId, Arc<SessionHandle>>>>;

pub struct CaveServer {
    tcp_listener: TcpListener,
    cave: Arc<Cave>,
    sessions: SessionMap,
    next_player_id: AtomicU64,
}

impl CaveServer {
    pub async fn bind(tcp_addr: String, cave: Cave) -> Result<Self, Box<dyn Error + Send + Sync>> {
        Ok(Self {
            tcp_listener: TcpListener::bind(tcp_addr).await?,
            cave: Arc::new(cave),
            sessions: Arc::new(RwLock::new(HashMap::new())),
            next_player_id: AtomicU64::new(1),
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, Box<dyn Error + Send + Sync>> {
        Ok(self.tcp_listener.local_addr()?)
    }

    /// Accepts players until `shutdown` resolves, then kills every live session.
    pub async fn listen(
        self,
        shutdown: impl Future<Output = ()>,
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        tokio::pin!(shutdown);

        loop {
            tokio::select! {

                _ = &mut shutdown => {

                    let sessions = self.sessions.read().await;
                    info!("Shutting down, ending {} sessions", sessions.len());

                    for handle in sessions.values() {
                        handle.kill();
                    }

                    return Ok(());
                }

                result = self.tcp_listener.accept() => {

                    self.accept_player(result).await;
                }
            }
        }
    }

    async fn accept_player(
        &self,
        result: io::Result<(TcpStream, SocketAddr)>,
    ) -> Option<PlayerId> {
        let (tcp_socket, peer_addr) = match result {
            Ok(accepted) => accepted,
            Err(e) => {
                warn!("Error accepting connection: {}", e);
                tokio::time::sleep(ACCEPT_BACKOFF).await;
                return None;
            }
        };

        let player_id = self.next_player_id.fetch_add(1, Ordering::Relaxed);
        let handle = Arc::new(SessionHandle::new(player_id));

        self.sessions.write().await.insert(player_id, handle.clone());
        info!("Player {} connected from {}", player_id, peer_addr);

        let cave = self.cave.clone();
        let sessions = self.sessions.clone();

        tokio::spawn(async move {

            if let Err(e) = Connection::handle_stream(tcp_socket, cave, handle).await {

                error!("Error handling player {}: {}", player_id, e);
            }

            sessions.write().await.remove(&player_id);
            info!("Player {} has left the cave", player_id);
        });

        Some(player_id)
    }
}
