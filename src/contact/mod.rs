//! Contact detection and resolution between grain pairs.

pub mod resolver;
pub mod search;

pub use resolver::resolve_contacts;
pub use search::{check_and_add_contact, find_contacts_all_pairs, find_contacts_in_grid, gap};
