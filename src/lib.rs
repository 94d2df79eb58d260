/// Photo-sharing social backend library.
/// Exposed as a lib so the integration tests can drive the database and
/// HTTP layers directly.
pub mod auth;
pub mod config;
pub mod db;
pub mod friends;
pub mod handlers;
pub mod server;
