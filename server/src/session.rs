use std::sync::{
    Mutex, PoisonError,
    atomic::{AtomicBool, Ordering},
};

use shared::player_action::RoomId;
use tokio::sync::Notify;

pub type PlayerId = u64;

pub const INITIAL_ARROWS: u32 = 3;
pub const GOLD_PER_PILE: u32 = 20;
pub const WUMPUS_BOUNTY: u32 = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Entering,
    Playing,
    Dead,
    Exited,
}

impl SessionState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionState::Dead | SessionState::Exited)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Inventory {
    pub gold: u32,
    pub arrows: u32,
    pub points: u32,
}

impl Default for Inventory {
    fn default() -> Self {
        Self {
            gold: 0,
            arrows: INITIAL_ARROWS,
            points: 0,
        }
    }
}

#[derive(Debug)]
pub struct Player {
    pub id: PlayerId,
    pub room: Option<RoomId>,
    pub state: SessionState,
    pub inventory: Inventory,
}

impl Player {
    pub fn new(id: PlayerId) -> Self {
        Self {
            id,
            room: None,
            state: SessionState::Entering,
            inventory: Inventory::default(),
        }
    }
}

/// Any task may push notifications or kill the session; only the session's
/// own loop drains the mailbox.
#[derive(Debug)]
pub struct SessionHandle {
    pub player_id: PlayerId,
    notifications: Mutex<Vec<String>>,
    alive: AtomicBool,
    wake: Notify,
}

impl SessionHandle {
    pub fn new(player_id: PlayerId) -> Self {
        Self {
            player_id,
            notifications: Mutex::new(Vec::new()),
            alive: AtomicBool::new(true),
            wake: Notify::new(),
        }
    }

    pub fn has_notifications(&self) -> bool {
        !self
            .notifications
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_empty()
    }

    pub fn add_notification(&self, message: impl Into<String>) {
        self.notifications
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message.into());
        self.wake.notify_one();
    }

    pub fn take_notifications(&self) -> Vec<String> {
        std::mem::take(
            &mut *self
                .notifications
                .lock()
                .unwrap_or_else(PoisonError::into_inner),
        )
    }

    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }

    pub fn kill(&self) {
        self.alive.store(false, Ordering::Release);
        self.wake.notify_one();
    }

    /// Resolves once a notification was added or the session was killed
    /// since the last wake-up.
    pub async fn woken(&self) {
        self.wake.notified().await;
    }
}
