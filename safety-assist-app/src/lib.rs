pub mod bootstrap;
pub mod config;
pub mod data;
pub mod repl;
