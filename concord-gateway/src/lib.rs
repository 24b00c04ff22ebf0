pub mod discord;
pub mod state;
