//! Core types and trait definitions for the Rota volunteer roster.
//!
//! No HTTP or database dependencies; every other crate in the workspace
//! builds on this one.

// `RosterStore` spells out `Send` on its returned futures.
#![allow(async_fn_in_trait)]

pub mod assignment;
pub mod calendar;
pub mod error;
pub mod identity;
pub mod person;
pub mod reconcile;
pub mod session;
pub mod store;

pub use error::{Error, Result, core_cause};
