//! Artifactory reconciler
//!
//! Creates, inspects and deletes Artifactory users, groups, repositories and
//! permission targets, and merges new grants into existing permission
//! targets without clobbering the grants already there.

pub mod cli;
pub mod client;
pub mod commands;
pub mod config;
pub mod error;
pub mod metrics;
pub mod model;
pub mod output;
pub mod reconcilers;
pub mod testing;

pub use error::{Error, Result};
pub use reconcilers::{Outcome, Reconciler};
