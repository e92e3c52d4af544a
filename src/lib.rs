pub mod api;
pub mod app;
pub mod catalog;
pub mod config;
pub mod details;
pub mod events;
pub mod geo;
pub mod location;
pub mod logging;
pub mod models;
pub mod runtime;
pub mod search;
pub mod selector;
pub mod status;
pub mod store;
pub mod ui;
