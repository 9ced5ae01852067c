pub mod player_action;
pub mod received_tcp_command;
pub mod tcp_command;
pub mod tcp_command_id;
pub mod tcp_command_payload_type;

pub const CAVE_PORT: u16 = 2000;
pub const DIRECTORY_PORT: u16 = 1235;

pub const CAVE_SIZE: usize = 20;
