use std::sync::Arc;

use log::{debug, info};
use shared::player_action::{PlayerAction, RoomId};

use crate::{
    cave::{Cave, Hazard, ShotOutcome},
    session::{GOLD_PER_PILE, Player, SessionHandle, SessionState, WUMPUS_BOUNTY},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Senses(Vec<String>),
    Notifications(Vec<String>),
    Died,
}

pub struct CommandHandler {
    cave: Arc<Cave>,
    handle: Arc<SessionHandle>,
    player: Player,
}

impl CommandHandler {
    pub fn new(cave: Arc<Cave>, handle: Arc<SessionHandle>) -> Self {
        let player = Player::new(handle.player_id);

        Self {
            cave,
            handle,
            player,
        }
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn is_over(&self) -> bool {
        self.player.state.is_terminal()
    }

    pub async fn enter_cave(&mut self, start: RoomId) -> Vec<Reply> {
        let mut replies = Vec::new();
        if self.player.state != SessionState::Entering {
            return replies;
        }

        self.player.state = SessionState::Playing;
        self.arrive(start, &mut replies).await;

        replies
    }

    pub async fn handle_action(&mut self, action: &PlayerAction) -> Vec<Reply> {
        let mut replies = Vec::new();

        let Some(room) = self.current_room() else {
            return replies;
        };

        debug!("Player {} in room {}: {:?}", self.player.id, room, action);

        match action {
            PlayerAction::Move(target) => self.move_to(room, *target, &mut replies).await,
            PlayerAction::Shoot(target) => self.shoot(room, *target, &mut replies).await,
            PlayerAction::Pickup => self.pick_up(room, &mut replies).await,
            PlayerAction::Climb => self.climb(room, &mut replies).await,
            PlayerAction::Quit => {
                self.abandon().await;
                self.player.state = SessionState::Exited;
            }
            PlayerAction::Invalid(_) => {
                replies.push(Reply::Notifications(vec!["invalid response".to_string()]));
            }
        }

        replies
    }

    /// Returns false if the session had already ended.
    pub async fn terminate(&mut self) -> bool {
        self.abandon().await;
        if self.is_over() {
            return false;
        }

        self.player.state = SessionState::Dead;
        true
    }

    pub async fn abandon(&mut self) {
        if let Some(room) = self.player.room.take() {
            self.cave.leave(room, self.player.id).await;
        }
    }

    fn current_room(&self) -> Option<RoomId> {
        match self.player.state {
            SessionState::Playing => self.player.room,
            _ => None,
        }
    }

    async fn arrive(&mut self, mut to: RoomId, replies: &mut Vec<Reply>) {
        loop {
            let arrival = self.cave.arrive(self.player.id, self.player.room, to).await;
            replies.push(Reply::Senses(arrival.senses));

            match arrival.hazard {
                Some(hazard @ (Hazard::Wumpus | Hazard::Pit)) => {
                    self.player.room = None;
                    info!("Player {} killed by {:?} in room {}", self.player.id, hazard, to);
                    self.die(replies);
                    return;
                }
                Some(Hazard::Bats) => {
                    self.player.room = Some(to);
                    let from = to;
                    to = self.cave.random_room_excluding(&[from]).await;
                    debug!("Bats carry player {} from {} to {}", self.player.id, from, to);
                }
                None => {
                    self.player.room = Some(to);
                    return;
                }
            }
        }
    }

    fn die(&mut self, replies: &mut Vec<Reply>) {
        self.player.state = SessionState::Dead;
        self.handle.kill();
        replies.push(Reply::Died);
    }

    async fn senses(&self, room: RoomId) -> Reply {
        Reply::Senses(self.cave.describe(room, self.player.id).await)
    }

    async fn move_to(&mut self, room: RoomId, target: RoomId, replies: &mut Vec<Reply>) {
        let Some(target) = self.cave.neighbor(room, target) else {
            replies.push(Reply::Notifications(vec![format!(
                "Invalid input. Room {} is not connected to this room.",
                target
            )]));
            replies.push(self.senses(room).await);
            return;
        };

        self.arrive(target, replies).await;
    }

    async fn shoot(&mut self, room: RoomId, target: RoomId, replies: &mut Vec<Reply>) {
        let Some(target) = self.cave.neighbor(room, target) else {
            replies.push(Reply::Notifications(vec![format!(
                "You are not connected to room {}.",
                target
            )]));
            replies.push(self.senses(room).await);
            return;
        };

        if self.player.inventory.arrows == 0 {
            replies.push(Reply::Notifications(vec![
                "You have no more arrows.".to_string(),
            ]));
            replies.push(self.senses(room).await);
            return;
        }

        self.player.inventory.arrows -= 1;
        let arrows_left = format!("You have {} arrows left.", self.player.inventory.arrows);

        match self.cave.shoot(room, target).await {
            ShotOutcome::Killed { wumpus_moved_to } => {
                self.player.inventory.points += WUMPUS_BOUNTY;
                info!(
                    "Player {} killed the wumpus in room {}, it reappears in room {}",
                    self.player.id, target, wumpus_moved_to
                );

                replies.push(Reply::Notifications(vec![
                    "You killed the wumpus!".to_string(),
                    arrows_left,
                ]));
                replies.push(self.senses(room).await);

                if wumpus_moved_to == room {
                    self.abandon().await;
                    info!("Player {} killed by the relocated wumpus", self.player.id);
                    self.die(replies);
                }
            }
            ShotOutcome::Missed => {
                replies.push(Reply::Notifications(vec![
                    "You did not hit anything.".to_string(),
                    arrows_left,
                ]));
                replies.push(self.senses(room).await);
            }
        }
    }

    async fn pick_up(&mut self, room: RoomId, replies: &mut Vec<Reply>) {
        let loot = self.cave.pick_up(room).await;

        let mut notes = Vec::new();
        if !loot.gold && !loot.arrow {
            notes.push("Nothing to pick up.".to_string());
        }
        if loot.gold {
            self.player.inventory.gold += GOLD_PER_PILE;
            notes.push("You picked up gold!".to_string());
        }
        if loot.arrow {
            self.player.inventory.arrows += 1;
            notes.push("You picked up an arrow!".to_string());
        }

        replies.push(Reply::Notifications(notes));
        replies.push(self.senses(room).await);
    }

    async fn climb(&mut self, room: RoomId, replies: &mut Vec<Reply>) {
        if !self.cave.has_ladder(room).await {
            replies.push(Reply::Notifications(vec![
                "There is no ladder in this room.".to_string(),
            ]));
            replies.push(self.senses(room).await);
            return;
        }

        let inventory = self.player.inventory;
        replies.push(Reply::Notifications(vec![
            "Congratulations, you made it out of the cave alive!".to_string(),
            format!("Your score was: {}", inventory.points),
            format!("You gathered {} pounds of gold.", inventory.gold),
        ]));

        info!(
            "Player {} escaped with {} gold and {} points",
            self.player.id, inventory.gold, inventory.points
        );

        self.abandon().await;
        self.player.state = SessionState::Exited;
        self.handle.kill();
    }
}

#[cfg(test)]
mod tests {
    use crate::session::{INITIAL_ARROWS, Inventory};

    use super::*;

    async fn handler_in(cave: &Arc<Cave>, start: RoomId) -> CommandHandler {
        let mut handler = CommandHandler::new(cave.clone(), Arc::new(SessionHandle::new(1)));
        let replies = handler.enter_cave(start).await;
        assert_eq!(replies.len(), 1, "{:?}", replies);
        handler
    }

    fn notifications(replies: &[Reply]) -> Vec<String> {
        replies
            .iter()
            .filter_map(|reply| match reply {
                Reply::Notifications(notes) => Some(notes.clone()),
                _ => None,
            })
            .flatten()
            .collect()
    }

    #[tokio::test]
    async fn moving_into_a_pit_kills() {
        let cave = Arc::new(Cave::empty(1).await);
        cave.state(6).await.has_pit = true;
        let mut handler = handler_in(&cave, 5).await;
        let before = handler.player().inventory;

        let replies = handler.handle_action(&PlayerAction::Move(6)).await;

        assert_eq!(replies.last(), Some(&Reply::Died));
        let Some(Reply::Senses(senses)) = replies.first() else {
            panic!("expected senses first: {:?}", replies);
        };
        assert!(senses.iter().any(|line| line.contains("pit")));
        assert_eq!(handler.player().state, SessionState::Dead);
        assert_eq!(handler.player().inventory, before);
        assert!(cave.state(6).await.players.is_empty());
        assert!(cave.state(5).await.players.is_empty());

        assert!(handler.handle_action(&PlayerAction::Move(7)).await.is_empty());
    }

    #[tokio::test]
    async fn moving_to_unconnected_room_changes_nothing() {
        let cave = Arc::new(Cave::empty(2).await);
        let mut handler = handler_in(&cave, 5).await;
        let before = handler.player().inventory;

        let replies = handler.handle_action(&PlayerAction::Move(12)).await;

        let notes = notifications(&replies);
        assert_eq!(notes.len(), 1);
        assert!(notes[0].starts_with("Invalid"));
        assert_eq!(handler.player().room, Some(5));
        assert_eq!(handler.player().inventory, before);
        assert!(cave.state(5).await.players.contains(&1));
    }

    #[tokio::test]
    async fn moving_updates_occupancy() {
        let cave = Arc::new(Cave::empty(3).await);
        let mut handler = handler_in(&cave, 5).await;

        let replies = handler.handle_action(&PlayerAction::Move(7)).await;

        assert_eq!(replies.len(), 1);
        assert_eq!(handler.player().room, Some(7));
        assert!(cave.state(7).await.players.contains(&1));
        assert!(!cave.state(5).await.players.contains(&1));
    }

    #[tokio::test]
    async fn starting_room_hazard_fires_before_first_command() {
        let cave = Arc::new(Cave::empty(4).await);
        cave.state(9).await.has_wumpus = true;
        let mut handler = CommandHandler::new(cave.clone(), Arc::new(SessionHandle::new(1)));

        let replies = handler.enter_cave(9).await;

        assert_eq!(replies.len(), 2);
        assert_eq!(replies[1], Reply::Died);
        assert!(handler.is_over());
    }

    #[tokio::test]
    async fn bats_chain_until_a_quiet_room() {
        let cave = Arc::new(Cave::empty(5).await);
        let mut handler = handler_in(&cave, 5).await;
        for id in 0..cave.len() {
            if id != 13 {
                cave.state(id).await.has_bats = true;
            }
        }

        let replies = handler.handle_action(&PlayerAction::Move(6)).await;

        assert!(replies.len() >= 2);
        assert_eq!(handler.player().room, Some(13));
        assert!(!handler.is_over());
        let Some(Reply::Senses(last)) = replies.last() else {
            panic!("expected senses last: {:?}", replies);
        };
        assert_eq!(last[0], "You are in room 13");
        assert!(cave.state(13).await.players.contains(&1));
        assert!(cave.state(6).await.players.is_empty());
    }

    #[tokio::test]
    async fn killing_the_wumpus_pays_and_relocates() {
        let cave = Arc::new(Cave::empty(6).await);
        cave.state(6).await.has_wumpus = true;
        let mut handler = handler_in(&cave, 5).await;

        let replies = handler.handle_action(&PlayerAction::Shoot(6)).await;

        let player = handler.player();
        assert_eq!(player.inventory.points, WUMPUS_BOUNTY);
        assert_eq!(player.inventory.arrows, INITIAL_ARROWS - 1);
        assert_eq!(
            notifications(&replies),
            vec![
                "You killed the wumpus!".to_string(),
                format!("You have {} arrows left.", INITIAL_ARROWS - 1),
            ]
        );
        assert!(!cave.state(6).await.has_wumpus);
        assert!(cave.state(6).await.has_arrow);

        let mut wumpuses = 0;
        for id in 0..cave.len() {
            if cave.state(id).await.has_wumpus {
                wumpuses += 1;
            }
        }
        assert_eq!(wumpuses, 1);
        assert!(!cave.state(5).await.has_wumpus);
    }

    #[tokio::test]
    async fn missing_leaves_an_arrow_behind() {
        let cave = Arc::new(Cave::empty(7).await);
        let mut handler = handler_in(&cave, 5).await;

        let replies = handler.handle_action(&PlayerAction::Shoot(4)).await;

        assert_eq!(notifications(&replies)[0], "You did not hit anything.");
        assert_eq!(handler.player().inventory.arrows, INITIAL_ARROWS - 1);
        assert!(cave.state(4).await.has_arrow);
    }

    #[tokio::test]
    async fn shooting_without_arrows_or_out_of_reach_is_free() {
        let cave = Arc::new(Cave::empty(8).await);
        cave.state(6).await.has_wumpus = true;
        let mut handler = handler_in(&cave, 5).await;

        let replies = handler.handle_action(&PlayerAction::Shoot(15)).await;
        assert_eq!(notifications(&replies), vec!["You are not connected to room 15."]);
        assert_eq!(handler.player().inventory.arrows, INITIAL_ARROWS);

        handler.player.inventory.arrows = 0;
        for _ in 0..3 {
            let replies = handler.handle_action(&PlayerAction::Shoot(6)).await;
            assert_eq!(notifications(&replies), vec!["You have no more arrows."]);
            assert_eq!(handler.player().inventory.arrows, 0);
        }
        assert!(cave.state(6).await.has_wumpus);
        assert!(!cave.state(6).await.has_arrow);
    }

    #[tokio::test]
    async fn pickup_collects_gold_and_arrow() {
        let cave = Arc::new(Cave::empty(9).await);
        {
            let mut room = cave.state(5).await;
            room.has_gold = true;
            room.has_arrow = true;
        }
        let mut handler = handler_in(&cave, 5).await;

        let replies = handler.handle_action(&PlayerAction::Pickup).await;

        assert_eq!(
            notifications(&replies),
            vec!["You picked up gold!", "You picked up an arrow!"]
        );
        assert_eq!(
            handler.player().inventory,
            Inventory {
                gold: GOLD_PER_PILE,
                arrows: INITIAL_ARROWS + 1,
                points: 0,
            }
        );
        assert!(!cave.state(5).await.has_gold);
        assert!(!cave.state(5).await.has_arrow);

        let replies = handler.handle_action(&PlayerAction::Pickup).await;
        assert_eq!(notifications(&replies), vec!["Nothing to pick up."]);
        assert_eq!(handler.player().inventory.gold, GOLD_PER_PILE);
    }

    #[tokio::test]
    async fn climbing_the_ladder_wins() {
        let cave = Arc::new(Cave::empty(10).await);
        cave.state(5).await.has_ladder = true;
        cave.state(5).await.has_gold = true;
        let mut handler = handler_in(&cave, 5).await;
        handler.handle_action(&PlayerAction::Pickup).await;

        let replies = handler.handle_action(&PlayerAction::Climb).await;

        assert_eq!(
            notifications(&replies),
            vec![
                "Congratulations, you made it out of the cave alive!".to_string(),
                "Your score was: 0".to_string(),
                format!("You gathered {} pounds of gold.", GOLD_PER_PILE),
            ]
        );
        assert!(!replies.contains(&Reply::Died));
        assert_eq!(handler.player().state, SessionState::Exited);
        assert!(cave.state(5).await.players.is_empty());
        assert!(handler.handle_action(&PlayerAction::Pickup).await.is_empty());
    }

    #[tokio::test]
    async fn climbing_without_ladder_fails() {
        let cave = Arc::new(Cave::empty(11).await);
        let mut handler = handler_in(&cave, 5).await;

        let replies = handler.handle_action(&PlayerAction::Climb).await;

        assert_eq!(notifications(&replies), vec!["There is no ladder in this room."]);
        assert_eq!(handler.player().state, SessionState::Playing);
    }

    #[tokio::test]
    async fn quit_is_silent_and_idempotent() {
        let cave = Arc::new(Cave::empty(12).await);
        let mut handler = handler_in(&cave, 5).await;

        assert!(handler.handle_action(&PlayerAction::Quit).await.is_empty());
        assert_eq!(handler.player().state, SessionState::Exited);
        assert!(cave.state(5).await.players.is_empty());

        assert!(handler.handle_action(&PlayerAction::Quit).await.is_empty());
        assert_eq!(handler.player().state, SessionState::Exited);
        assert!(!handler.terminate().await);
    }

    #[tokio::test]
    async fn unknown_input_is_rejected() {
        let cave = Arc::new(Cave::empty(13).await);
        let mut handler = handler_in(&cave, 5).await;

        let replies = handler
            .handle_action(&PlayerAction::Invalid("DANCE".to_string()))
            .await;

        assert_eq!(
            replies,
            vec![Reply::Notifications(vec!["invalid response".to_string()])]
        );
        assert_eq!(handler.player().room, Some(5));
    }
}
