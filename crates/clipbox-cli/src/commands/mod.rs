//! Command handlers for the CLI

pub mod capture;
pub mod category;
pub mod config;
pub mod link;
pub mod status;
pub mod transfer;
