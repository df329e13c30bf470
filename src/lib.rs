//! Course profile report service
//!
//! Turns one row of a course-enrollment dataset into a human-readable report
//! delivered over two channels: an interactive on-screen view and a
//! downloadable PDF. Both channels render the same `ReportModel`, so data,
//! ordering and colors cannot diverge between them.

pub mod config;
pub mod logging;
pub mod report;
pub mod store;
pub mod web;
