//! Library side of coscale-cli.
//!
//! `data` turns the compact data-point syntax into encoded upload batches,
//! `api` talks to the CoScale REST API, and `config` locates and reads the
//! `api.conf` credentials.

pub mod api;
pub mod cli;
pub mod config;
pub mod data;
pub mod error;
pub mod logging;
