//! System clock adapter

use chrono::{DateTime, Utc};

use crate::application::ports::Clock;

/// Wall clock backed by the OS
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
