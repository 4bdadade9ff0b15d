pub mod config;
pub mod notes;
pub mod output;
pub mod progress;
pub mod university;
