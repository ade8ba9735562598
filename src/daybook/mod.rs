//! The daybook, a chronological journal of money received and paid out.

mod core;
mod endpoints;
mod grouping;

pub use core::{
    DaybookEntry, DaybookEntryForm, create_daybook_entry, create_daybook_table,
    delete_daybook_entry, get_daybook_entries,
};
pub use endpoints::{
    create_daybook_entry_endpoint, delete_daybook_entry_endpoint, get_daybook_endpoint,
};
pub use grouping::{Daybook, group_by_day};
