use std::collections::HashSet;

use shared::player_action::RoomId;
use tokio::sync::Mutex;

use crate::session::PlayerId;

#[derive(Debug, Default, Clone)]
pub struct RoomState {
    pub has_wumpus: bool,
    pub has_pit: bool,
    pub has_bats: bool,
    pub has_gold: bool,
    pub has_ladder: bool,
    pub has_arrow: bool,
    pub players: HashSet<PlayerId>,
}

impl RoomState {
    pub fn is_lethal(&self) -> bool {
        self.has_wumpus || self.has_pit
    }

    pub fn has_other_players(&self, observer: PlayerId) -> bool {
        self.players.iter().any(|player| *player != observer)
    }
}

#[derive(Debug)]
pub struct Room {
    pub id: RoomId,
    neighbors: Vec<RoomId>,
    pub(crate) state: Mutex<RoomState>,
}

impl Room {
    pub fn new(id: RoomId, neighbors: Vec<RoomId>, state: RoomState) -> Self {
        Self {
            id,
            neighbors,
            state: Mutex::new(state),
        }
    }

    pub fn neighbors(&self) -> &[RoomId] {
        &self.neighbors
    }

    pub fn is_adjacent(&self, id: RoomId) -> bool {
        self.neighbors.binary_search(&id).is_ok()
    }

    pub fn neighbor(&self, id: RoomId) -> Option<RoomId> {
        self.is_adjacent(id).then_some(id)
    }

    pub async fn enter(&self, player: PlayerId) {
        self.state.lock().await.players.insert(player);
    }

    pub async fn leave(&self, player: PlayerId) {
        self.state.lock().await.players.remove(&player);
    }
}

/// Builds the sensed description of `room` as seen by `observer`.
///
/// `neighbors` must hold the state of every adjacent room, in the order the
/// tunnels should be listed.
pub fn sense<'a>(
    room_id: RoomId,
    room: &RoomState,
    neighbors: impl IntoIterator<Item = (RoomId, &'a RoomState)>,
    observer: PlayerId,
) -> Vec<String> {
    let mut senses = Vec::new();

    if room.has_bats {
        senses.push("You have encountered bats. The bats move you to another room.".to_string());
        return senses;
    }

    senses.push(format!("You are in room {}", room_id));

    if room.has_wumpus {
        senses.push("You are in the same room as a wumpus. The wumpus has killed you.".to_string());
        return senses;
    }
    if room.has_pit {
        senses.push("You have fallen down a pit. You are dead.".to_string());
        return senses;
    }

    if room.has_arrow {
        senses.push("You see an arrow.".to_string());
    }
    if room.has_gold {
        senses.push("You see gold.".to_string());
    }
    if room.has_ladder {
        senses.push("You see a ladder.".to_string());
    }

    let neighbors: Vec<(RoomId, &RoomState)> = neighbors.into_iter().collect();
    let ids: Vec<RoomId> = neighbors.iter().map(|(id, _)| *id).collect();
    senses.push(describe_tunnels(&ids));

    if neighbors.iter().any(|(_, state)| state.has_wumpus) {
        senses.push("You smell something terrible.".to_string());
    }
    if neighbors.iter().any(|(_, state)| state.has_bats) {
        senses.push("You hear a fluttering of wings.".to_string());
    }
    if neighbors.iter().any(|(_, state)| state.has_pit) {
        senses.push("You feel a draft.".to_string());
    }
    if neighbors
        .iter()
        .any(|(_, state)| state.has_other_players(observer))
    {
        senses.push("You hear another person in the caves.".to_string());
    }

    senses
}

fn describe_tunnels(ids: &[RoomId]) -> String {
    match ids {
        [] => "You see no tunnels.".to_string(),
        [only] => format!("You see a tunnel to room {}.", only),
        [first, second] => format!("You see tunnels to rooms {} and {}.", first, second),
        [rest @ .., last] => {
            let rest: Vec<String> = rest.iter().map(|id| id.to_string()).collect();
            format!("You see tunnels to rooms {}, and {}.", rest.join(", "), last)
        }
    }
}
