//! Spending categories and the routes for managing them.

mod categories_page;
mod core;
mod create_endpoint;
mod delete_endpoint;
mod edit_endpoint;

pub use categories_page::get_categories_page;
pub use core::{
    Category, CategoryId, create_category, create_category_table, delete_category,
    get_all_categories, get_category, update_category,
};
pub use create_endpoint::create_category_endpoint;
pub use delete_endpoint::delete_category_endpoint;
pub use edit_endpoint::edit_category_endpoint;
