//! Article Service - fetches article JSON from a URL and stores it
//!
//! This crate exposes a small REST API for creating articles from a remote
//! source URL, then reading, retitling and deleting them.

pub mod config;
pub mod db;
pub mod error;
pub mod fetcher;
pub mod models;
pub mod routes;
