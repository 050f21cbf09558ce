//! TaskDeck -- terminal to-do tracker library.

pub mod app;
pub mod auth;
pub mod bridge;
pub mod config;
pub mod controller;
pub mod session;
pub mod store;
pub mod ui;
