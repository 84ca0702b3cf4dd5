//! Scheduled work-hour reminders.
//!
//! [`compute_next_fire_time`] is a pure function of the configuration and the
//! current instant; [`ReminderScheduler`] turns it into a single re-armable timer.

mod schedule;
mod scheduler;

pub use schedule::{
    compute_next_fire_time, parse_time, parse_weekday, parse_weekdays, ReminderConfig,
};
pub use scheduler::{ReminderScheduler, ReminderSink};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReminderError {
    #[error("Invalid reminder configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to deliver reminders: {0}")]
    Delivery(String),
}
