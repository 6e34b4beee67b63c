//! Badge evaluation and claim statement generation over symptom logs.

pub mod badges;
pub mod config;
pub mod db;
pub mod error;
pub mod export;
pub mod models;
pub mod reminders;
pub mod statement;
pub mod streak;
