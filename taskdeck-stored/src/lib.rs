//! TaskDeck document store server library.
//!
//! A small hosted-database stand-in: per-user document collections held in
//! memory, exposed over a WebSocket request/response protocol, plus a
//! credential directory backing the identity-exchange endpoint. Exposed as
//! a library so integration tests can start the server in-process.

pub mod config;
pub mod credentials;
pub mod server;
pub mod store;
