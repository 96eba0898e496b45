//! Financial periods and the routes for managing them.

mod activate_endpoint;
mod checker;
mod core;
mod create_endpoint;
mod delete_endpoint;
mod edit_endpoint;
mod edit_page;
mod form;
mod new_page;
mod periods_page;

pub use activate_endpoint::activate_period_endpoint;
pub use core::{
    Period, PeriodId, count_period_references, create_period, create_period_table,
    get_active_period, get_all_periods, get_period, get_selectable_periods, set_active_period,
    update_period,
};
pub use create_endpoint::create_period_endpoint;
pub use delete_endpoint::delete_period_endpoint;
pub use edit_endpoint::edit_period_endpoint;
pub use edit_page::get_edit_period_page;
pub use new_page::get_new_period_page;
pub use periods_page::get_periods_page;
