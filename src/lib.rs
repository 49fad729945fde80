pub mod components;
pub mod config;
pub mod error;
pub mod input;
pub mod startup;
pub mod sync;
pub mod utils;
