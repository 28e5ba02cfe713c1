//! Time source for handlers, the sweeper and the dispatcher.

use chrono::{DateTime, Duration, FixedOffset, Local, NaiveTime, TimeZone, Utc};
use parking_lot::RwLock;

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Settable clock for tests
#[derive(Debug)]
pub struct FixedClock {
    now: RwLock<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: RwLock::new(now),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.write() = now;
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.write();
        *now += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.read()
    }
}

/// Last instant (23:59:59.999) of the calendar day containing `now`.
///
/// The day is taken in `offset` when given, otherwise in host local time.
pub fn end_of_day(now: DateTime<Utc>, offset: Option<FixedOffset>) -> DateTime<Utc> {
    match offset {
        Some(offset) => end_of_day_in(&offset, now),
        None => end_of_day_in(&Local, now),
    }
}

fn end_of_day_in<Tz: TimeZone>(tz: &Tz, now: DateTime<Utc>) -> DateTime<Utc> {
    let last_millisecond = NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or(NaiveTime::MIN);
    let local_end = now.with_timezone(tz).date_naive().and_time(last_millisecond);
    // A DST gap at 23:59 is not possible in practice; fall back to the UTC reading
    tz.from_local_datetime(&local_end)
        .latest()
        .map(|end| end.with_timezone(&Utc))
        .unwrap_or_else(|| local_end.and_utc())
}
