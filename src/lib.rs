//! auditor-planner
//!
//! Monthly auditor-to-location assignment planning: distance matrix,
//! constraint scoring, greedy allocation, date distribution and reporting.

pub mod traits;
pub mod models;
pub mod matrix;
pub mod haversine;
pub mod config;
pub mod constraints;
pub mod solver;
pub mod dates;
pub mod metrics;
pub mod export;
pub mod planner;
pub mod error;
pub mod logging;

pub use error::{PlanningError, Result};
pub use planner::{generate_planning, generate_planning_with, PlanningRequest, PlanningResult};
