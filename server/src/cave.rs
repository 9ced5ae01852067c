use std::{
    collections::{BTreeMap, BTreeSet},
    ops::{Index, IndexMut},
};

use rand::{Rng, rngs::StdRng};
use shared::{CAVE_SIZE, player_action::RoomId};
use tokio::sync::{Mutex, MutexGuard};

use crate::{
    hazards::place_hazards,
    room::{Room, RoomState, sense},
    session::PlayerId,
};

#[derive(Debug, Clone)]
pub struct Tunnels {
    links: Vec<BTreeSet<RoomId>>,
}

impl Tunnels {
    pub fn new(room_count: usize) -> Self {
        Self {
            links: vec![BTreeSet::new(); room_count],
        }
    }

    pub fn ring(room_count: usize) -> Self {
        let mut tunnels = Self::new(room_count);
        for i in 0..room_count {
            tunnels.connect(i, (i + 1) % room_count);
            tunnels.connect(i, (i + 2) % room_count);
        }
        tunnels
    }

    pub fn connect(&mut self, a: RoomId, b: RoomId) {
        if a == b {
            return;
        }
        self.links[a].insert(b);
        self.links[b].insert(a);
    }

    pub fn is_connected(&self, a: RoomId, b: RoomId) -> bool {
        self.links.get(a).is_some_and(|links| links.contains(&b))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hazard {
    Wumpus,
    Pit,
    Bats,
}

#[derive(Debug)]
pub struct Arrival {
    pub senses: Vec<String>,
    pub hazard: Option<Hazard>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShotOutcome {
    Killed { wumpus_moved_to: RoomId },
    Missed,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Loot {
    pub gold: bool,
    pub arrow: bool,
}

/// Guards for a set of rooms, acquired in ascending id order.
pub struct RoomLocks<'a> {
    guards: BTreeMap<RoomId, MutexGuard<'a, RoomState>>,
}

impl Index<RoomId> for RoomLocks<'_> {
    type Output = RoomState;

    fn index(&self, id: RoomId) -> &RoomState {
        &*self.guards[&id]
    }
}

impl IndexMut<RoomId> for RoomLocks<'_> {
    fn index_mut(&mut self, id: RoomId) -> &mut RoomState {
        match self.guards.get_mut(&id) {
            Some(guard) => &mut **guard,
            None => panic!("room {} was not locked", id),
        }
    }
}

pub struct Cave {
    rooms: Vec<Room>,
    rng: Mutex<StdRng>,
}

impl Cave {
    pub fn new(mut rng: StdRng) -> Self {
        let mut states = vec![RoomState::default(); CAVE_SIZE];
        place_hazards(&mut states, &mut rng);

        Self::from_parts(Tunnels::ring(CAVE_SIZE), states, rng)
    }

    pub fn from_parts(tunnels: Tunnels, states: Vec<RoomState>, rng: StdRng) -> Self {
        let rooms = tunnels
            .links
            .into_iter()
            .zip(states)
            .enumerate()
            .map(|(id, (links, state))| Room::new(id, links.into_iter().collect(), state))
            .collect();

        Self {
            rooms,
            rng: Mutex::new(rng),
        }
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    pub fn room(&self, id: RoomId) -> Option<&Room> {
        self.rooms.get(id)
    }

    pub fn neighbor(&self, room: RoomId, id: RoomId) -> Option<RoomId> {
        self.rooms.get(room)?.neighbor(id)
    }

    pub fn is_adjacent(&self, room: RoomId, id: RoomId) -> bool {
        self.neighbor(room, id).is_some()
    }

    pub async fn random_room(&self) -> RoomId {
        self.rng.lock().await.random_range(0..self.rooms.len())
    }

    pub async fn random_room_excluding(&self, excluded: &[RoomId]) -> RoomId {
        let candidates: Vec<RoomId> = (0..self.rooms.len())
            .filter(|id| !excluded.contains(id))
            .collect();
        if candidates.is_empty() {
            return self.random_room().await;
        }

        let pick = self.rng.lock().await.random_range(0..candidates.len());
        candidates[pick]
    }

    pub async fn lock_rooms(&self, ids: impl IntoIterator<Item = RoomId>) -> RoomLocks<'_> {
        let ids: BTreeSet<RoomId> = ids.into_iter().collect();

        let mut guards = BTreeMap::new();
        for id in ids {
            if let Some(room) = self.rooms.get(id) {
                guards.insert(id, room.state.lock().await);
            }
        }

        RoomLocks { guards }
    }

    fn sense_locked(&self, locks: &RoomLocks<'_>, id: RoomId, observer: PlayerId) -> Vec<String> {
        let neighbors = self.rooms[id]
            .neighbors()
            .iter()
            .map(|neighbor| (*neighbor, &locks[*neighbor]));

        sense(id, &locks[id], neighbors, observer)
    }

    fn with_neighbors(&self, id: RoomId) -> impl Iterator<Item = RoomId> + '_ {
        std::iter::once(id).chain(self.rooms[id].neighbors().iter().copied())
    }

    pub async fn describe(&self, id: RoomId, observer: PlayerId) -> Vec<String> {
        if id >= self.rooms.len() {
            return Vec::new();
        }

        let locks = self.lock_rooms(self.with_neighbors(id)).await;
        self.sense_locked(&locks, id, observer)
    }

    pub async fn enter(&self, id: RoomId, player: PlayerId) {
        if let Some(room) = self.rooms.get(id) {
            room.enter(player).await;
        }
    }

    pub async fn leave(&self, id: RoomId, player: PlayerId) {
        if let Some(room) = self.rooms.get(id) {
            room.leave(player).await;
        }
    }

    /// Moves `player` out of `from` (if any) and into `to` as one step.
    ///
    /// The senses are taken while the destination is still locked, so they
    /// agree with the returned hazard. A lethal hazard removes the player
    /// from the destination again before the locks are released.
    pub async fn arrive(&self, player: PlayerId, from: Option<RoomId>, to: RoomId) -> Arrival {
        let mut locks = self
            .lock_rooms(self.with_neighbors(to).chain(from))
            .await;

        if let Some(from) = from {
            locks[from].players.remove(&player);
        }
        locks[to].players.insert(player);

        let senses = self.sense_locked(&locks, to, player);

        let room = &mut locks[to];
        let hazard = if room.has_wumpus {
            Some(Hazard::Wumpus)
        } else if room.has_pit {
            Some(Hazard::Pit)
        } else if room.has_bats {
            Some(Hazard::Bats)
        } else {
            None
        };

        if room.is_lethal() {
            room.players.remove(&player);
        }

        Arrival { senses, hazard }
    }

    /// All three rooms (shooter, target, landing) stay locked for the whole update.
    pub async fn shoot(&self, from: RoomId, target: RoomId) -> ShotOutcome {
        let landing = self.random_room_excluding(&[from, target]).await;
        let mut locks = self.lock_rooms([from, target, landing]).await;

        locks[target].has_arrow = true;

        if !locks[target].has_wumpus {
            return ShotOutcome::Missed;
        }

        locks[target].has_wumpus = false;
        locks[landing].has_wumpus = true;

        ShotOutcome::Killed {
            wumpus_moved_to: landing,
        }
    }

    pub async fn pick_up(&self, id: RoomId) -> Loot {
        let Some(room) = self.rooms.get(id) else {
            return Loot::default();
        };
        let mut state = room.state.lock().await;

        let loot = Loot {
            gold: state.has_gold,
            arrow: state.has_arrow,
        };
        state.has_gold = false;
        state.has_arrow = false;

        loot
    }

    pub async fn has_ladder(&self, id: RoomId) -> bool {
        match self.rooms.get(id) {
            Some(room) => room.state.lock().await.has_ladder,
            None => false,
        }
    }

    #[cfg(test)]
    pub(crate) async fn state(&self, id: RoomId) -> MutexGuard<'_, RoomState> {
        self.rooms[id].state.lock().await
    }

    #[cfg(test)]
    pub(crate) async fn empty(seed: u64) -> Self {
        use rand::SeedableRng;

        let cave = Self::new(StdRng::seed_from_u64(seed));
        for room in &cave.rooms {
            *room.state.lock().await = RoomState::default();
        }
        cave
    }
}
