//! Ayka timesheet library crate.
//!
//! This crate exposes the attendance classification engine, the
//! overtime calculator and the monthly timesheet assembler as reusable
//! modules.  External applications may call
//! `engine::build_timesheet` directly on data they already hold, use
//! `report::ReportService` over a `store::TimesheetSource`, or embed the
//! HTTP API via `api::router`.

pub mod api;
pub mod calendar;
pub mod classifier;
pub mod config;
pub mod engine;
pub mod error;
pub mod leave;
pub mod logging;
pub mod models;
pub mod overtime;
pub mod performance;
pub mod report;
pub mod roster;
pub mod schedule;
pub mod store;
pub mod summary;
