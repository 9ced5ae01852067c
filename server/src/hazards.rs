use rand::Rng;

use crate::room::RoomState;

pub const BAT_COLONIES: usize = 3;
pub const PITS: usize = 3;

// Bat draws may repeat a room; pits are redrawn until they miss the ladder.
pub fn place_hazards<R: Rng>(rooms: &mut [RoomState], rng: &mut R) {
    let room_count = rooms.len();
    if room_count == 0 {
        return;
    }

    for room in rooms.iter_mut() {
        room.has_gold = true;
    }

    rooms[rng.random_range(0..room_count)].has_wumpus = true;

    let ladder = rng.random_range(0..room_count);
    rooms[ladder].has_ladder = true;

    for _ in 0..BAT_COLONIES {
        rooms[rng.random_range(0..room_count)].has_bats = true;
    }

    if room_count < 2 {
        return;
    }
    for _ in 0..PITS {
        let mut pit = rng.random_range(0..room_count);
        while pit == ladder {
            pit = rng.random_range(0..room_count);
        }
        rooms[pit].has_pit = true;
    }
}
