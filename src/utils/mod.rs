//! Formatting helpers shared by the store and the terminal client.

pub mod time;
pub mod title;

pub use time::{date_group_label, format_time, group_messages_by_date, now_millis};
pub use title::generate_session_title;
