// questbot-core/src/repositories/mod.rs

pub mod postgres;
