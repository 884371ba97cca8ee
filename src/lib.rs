pub mod config;
pub mod identifier;
pub mod registry;
pub mod runtime;
pub mod scaffold;
pub mod tracker;
