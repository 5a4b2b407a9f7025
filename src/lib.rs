pub mod app;
pub mod auth;
pub mod config;
pub mod error;
pub mod referrals;
pub mod state;
pub mod tree;
pub mod users;
