pub mod api;
pub mod backend;
pub mod config;
pub mod storage;
pub mod todo;
pub mod upload;
pub mod utils;
