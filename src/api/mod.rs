//! API handlers for Ordena REST endpoints

pub mod calendar;
pub mod catalog;
pub mod health;
pub mod openapi;
pub mod orders;
pub mod schedules;
