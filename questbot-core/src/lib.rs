// src/lib.rs

pub mod db;
pub mod repositories;
pub mod platforms;
pub mod services;
pub mod utils;
pub mod test_utils;

pub use db::Database;
pub use questbot_common::error::Error;
