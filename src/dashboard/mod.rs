//! An overview page summarizing the active financial period.

mod aggregation;
mod charts;
mod dashboard_page;
mod entries;

pub use dashboard_page::{DashboardState, get_dashboard_page};
