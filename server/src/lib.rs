pub mod cave;
pub mod cave_server;
pub mod command_handler;
pub mod connection;
pub mod directory;
pub mod hazards;
pub mod room;
pub mod session;
