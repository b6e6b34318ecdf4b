// Library entry point for the `nonggle-server` crate. The integration tests
// build the router through here instead of going through the binary.
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod extractors;
pub mod jwt;
pub mod kakao;
pub mod response;
pub mod user;
pub mod web_server;
