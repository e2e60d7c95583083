pub mod config;
pub mod talk;
pub mod text;
