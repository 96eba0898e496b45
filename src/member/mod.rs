//! Household members and the routes for managing them.

mod core;
mod create_endpoint;
mod delete_endpoint;
mod edit_endpoint;
mod members_page;

pub use core::{
    Member, MemberId, count_member_references, create_member, create_member_table,
    get_active_members, get_all_members, get_member, map_row_to_member,
};
pub use create_endpoint::create_member_endpoint;
pub use delete_endpoint::delete_member_endpoint;
pub use edit_endpoint::edit_member_endpoint;
pub use members_page::get_members_page;
