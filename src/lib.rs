pub mod batch;
pub mod cache;
pub mod client;
pub mod config;
pub mod enrich;
pub mod error;
pub mod gacha;
pub mod generations;
pub mod models;
pub mod prelude;
pub mod rolls;
pub mod service;
