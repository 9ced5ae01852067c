use std::fmt;

use strum_macros::{Display, EnumString};

pub type RoomId = usize;

#[derive(Debug, PartialEq, Eq, Clone, Copy, Display, EnumString)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum ActionKeyword {
    Move,
    Shoot,
    Pickup,
    Climb,
    Quit,
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub enum PlayerAction {
    Move(RoomId),
    Shoot(RoomId),
    Pickup,
    Climb,
    Quit,
    Invalid(String),
}

impl PlayerAction {
    pub fn parse(line: &str) -> Self {
        let mut parts = line.split_whitespace();

        let keyword: Option<ActionKeyword> = parts.next().and_then(|word| word.parse().ok());
        let argument = parts.next();
        let trailing = parts.next();

        let Some(keyword) = keyword else {
            return PlayerAction::Invalid(line.to_string());
        };
        if trailing.is_some() {
            return PlayerAction::Invalid(line.to_string());
        }

        let room = argument.map(|arg| arg.parse::<RoomId>());

        match (keyword, room) {
            (ActionKeyword::Move, Some(Ok(room))) => PlayerAction::Move(room),
            (ActionKeyword::Shoot, Some(Ok(room))) => PlayerAction::Shoot(room),
            (ActionKeyword::Pickup, None) => PlayerAction::Pickup,
            (ActionKeyword::Climb, None) => PlayerAction::Climb,
            (ActionKeyword::Quit, None) => PlayerAction::Quit,
            _ => PlayerAction::Invalid(line.to_string()),
        }
    }
}

impl fmt::Display for PlayerAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlayerAction::Move(room) => write!(f, "{} {}", ActionKeyword::Move, room),
            PlayerAction::Shoot(room) => write!(f, "{} {}", ActionKeyword::Shoot, room),
            PlayerAction::Pickup => write!(f, "{}", ActionKeyword::Pickup),
            PlayerAction::Climb => write!(f, "{}", ActionKeyword::Climb),
            PlayerAction::Quit => write!(f, "{}", ActionKeyword::Quit),
            PlayerAction::Invalid(line) => write!(f, "{}", line),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_keywords_and_targets() {
        assert_eq!(PlayerAction::parse("MOVE 6"), PlayerAction::Move(6));
        assert_eq!(PlayerAction::parse("  shoot 12 "), PlayerAction::Shoot(12));
        assert_eq!(PlayerAction::parse("PICKUP"), PlayerAction::Pickup);
        assert_eq!(PlayerAction::parse("Climb"), PlayerAction::Climb);
        assert_eq!(PlayerAction::parse("QUIT"), PlayerAction::Quit);
    }

    #[test]
    fn rejects_malformed_lines() {
        for line in ["", "MOVE", "MOVE six", "MOVE -1", "MOVE 1 2", "PICKUP 3", "DANCE"] {
            assert_eq!(
                PlayerAction::parse(line),
                PlayerAction::Invalid(line.to_string()),
                "{:?}",
                line
            );
        }
    }

    #[test]
    fn formats_back_to_protocol_lines() {
        assert_eq!(PlayerAction::Move(3).to_string(), "MOVE 3");
        assert_eq!(PlayerAction::Pickup.to_string(), "PICKUP");
        assert_eq!(
            PlayerAction::parse(&PlayerAction::Shoot(19).to_string()),
            PlayerAction::Shoot(19)
        );
    }
}
