//! Trading-calendar eligibility.
//!
//! All time-zone handling lives here: callers pass an absolute UTC instant and
//! the policy converts it to the venue's civil calendar before applying the
//! per-category rule.

use chrono::{DateTime, Datelike, Timelike, Utc, Weekday};
use chrono_tz::Tz;

use crate::Category;

/// Inclusive intraday session bounds, in minutes since local midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionWindow {
    open_minute: u32,
    close_minute: u32,
}

impl SessionWindow {
    /// Returns `None` when `open` is after `close` or either bound is past 23:59.
    pub fn new(open_minute: u32, close_minute: u32) -> Option<Self> {
        (open_minute <= close_minute && close_minute < 24 * 60).then_some(Self {
            open_minute,
            close_minute,
        })
    }

    /// 09:30 to 16:30.
    pub const fn us_equities() -> Self {
        Self {
            open_minute: 9 * 60 + 30,
            close_minute: 16 * 60 + 30,
        }
    }

    pub fn contains(&self, minute_of_day: u32) -> bool {
        (self.open_minute..=self.close_minute).contains(&minute_of_day)
    }

    pub fn open_minute(&self) -> u32 {
        self.open_minute
    }

    pub fn close_minute(&self) -> u32 {
        self.close_minute
    }
}

#[derive(Debug, Clone)]
pub struct CalendarPolicy {
    timezone: Tz,
    equity_session: SessionWindow,
}

impl Default for CalendarPolicy {
    fn default() -> Self {
        Self::new(chrono_tz::America::New_York, SessionWindow::us_equities())
    }
}

impl CalendarPolicy {
    pub fn new(timezone: Tz, equity_session: SessionWindow) -> Self {
        Self {
            timezone,
            equity_session,
        }
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    pub fn equity_session(&self) -> SessionWindow {
        self.equity_session
    }

    pub fn is_eligible(&self, category: Category, instant: DateTime<Utc>) -> bool {
        let local = instant.with_timezone(&self.timezone);
        let minute_of_day = local.hour() * 60 + local.minute();
        self.is_eligible_local(category, local.weekday(), minute_of_day)
    }

    /// Rule evaluation on pre-converted local calendar values.
    pub fn is_eligible_local(&self, category: Category, weekday: Weekday, minute_of_day: u32) -> bool {
        let is_weekday = !matches!(weekday, Weekday::Sat | Weekday::Sun);

        match category {
            Category::Crypto => true,
            Category::FxOrCommodity | Category::Index => is_weekday,
            Category::Equity => is_weekday && self.equity_session.contains(minute_of_day),
            Category::Unknown => false,
        }
    }
}
