//! Dashboard module
//!
//! An overview page with the branch's headline totals, trend charts and the
//! customers who registered most recently.

mod cards;
mod charts;
mod handlers;
mod tables;

pub use handlers::get_dashboard_page;
