pub mod ability;
pub mod chat;
pub mod color;
pub mod command;
pub mod config;
pub mod game;
pub mod player;
pub mod role;
pub mod room;
pub mod stopwatch;
pub mod user;
