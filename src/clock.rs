use chrono::{FixedOffset, NaiveDate, NaiveDateTime, Timelike, Utc};

/// Wall clock pinned to the server timezone. Every stored timestamp and every
/// "today" comes from here.
#[derive(Debug, Clone, Copy)]
pub struct Clock {
    offset: FixedOffset,
}

impl Clock {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    /// Local time truncated to whole seconds.
    pub fn now(&self) -> NaiveDateTime {
        let now = Utc::now().with_timezone(&self.offset).naive_local();
        now.with_nanosecond(0).unwrap_or(now)
    }

    pub fn today(&self) -> NaiveDate {
        self.now().date()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn now_has_no_subsecond_part() {
        let clock = Clock::new(FixedOffset::east_opt(330 * 60).unwrap());
        assert_eq!(clock.now().nanosecond(), 0);
        assert_eq!(clock.today(), clock.now().date());
    }
}
