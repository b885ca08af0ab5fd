pub mod error;
pub mod consts;
pub mod sky;
pub mod exposure;
pub mod catalog;
pub mod io;
pub mod config;
pub mod aggregate;
pub mod stage;
pub mod collect;
pub mod jobs;
