//! Cost-sharing groups and the routes for managing them.

mod core;
mod create_endpoint;
mod delete_endpoint;
mod edit_endpoint;
mod edit_page;
mod form;
mod groups_page;
mod new_page;

pub use core::{
    ApportionmentMode, Group, GroupId, count_group_references, create_group, create_group_table,
    get_active_groups, get_all_groups, get_group, get_group_members, update_group,
};
pub use create_endpoint::create_group_endpoint;
pub use delete_endpoint::delete_group_endpoint;
pub use edit_endpoint::edit_group_endpoint;
pub use edit_page::get_edit_group_page;
pub use groups_page::get_groups_page;
pub use new_page::get_new_group_page;
