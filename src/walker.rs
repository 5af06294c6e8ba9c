//! Backward calendar cursor driving the crawl.

use chrono::{Local, NaiveDate};

/// Walks the calendar one day at a time, from a start date into the past.
///
/// The walker has no end; the harvester stops asking once its target is met.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWalker {
    current: NaiveDate,
}

impl DateWalker {
    /// Start at `date`.
    pub fn new(date: NaiveDate) -> Self {
        Self { current: date }
    }

    /// Start at today's local date.
    pub fn today() -> Self {
        Self::new(Local::now().date_naive())
    }

    pub fn current(&self) -> NaiveDate {
        self.current
    }

    /// Step one calendar day back and return the new date.
    ///
    /// Saturates at [`NaiveDate::MIN`], which a real crawl never reaches.
    pub fn advance(&mut self) -> NaiveDate {
        if let Some(prev) = self.current.pred_opt() {
            self.current = prev;
        }
        self.current
    }
}

impl Iterator for DateWalker {
    type Item = NaiveDate;

    /// Yields the current date, then moves the cursor back one day.
    fn next(&mut self) -> Option<NaiveDate> {
        let date = self.current;
        self.advance();
        Some(date)
    }
}
