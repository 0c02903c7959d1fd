//! Kyozai - discussion and rating backend for a teaching-material sharing platform
//!
//! This library provides the activity feed, comment threads, rating
//! aggregation, and reaction tallies for the Kyozai platform.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;
