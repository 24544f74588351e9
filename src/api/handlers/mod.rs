//! HTTP API handlers

pub mod arithmetic;
pub mod calculations;
pub mod health;
pub mod users;
