pub mod api;
pub mod client;
pub mod config;
pub mod db;
pub mod draft;
pub mod models;
pub mod normalize;
pub mod session;
pub mod store;
pub mod text_sync;
pub mod timeline;
pub mod validate;
