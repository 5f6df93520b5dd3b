use chrono::{DateTime, Datelike, Duration, NaiveTime, TimeZone, Weekday};

use crate::error::{BloomError, Result};

const MS_PER_SECOND: i64 = 1000;
const MS_PER_MINUTE: i64 = MS_PER_SECOND * 60;
const MS_PER_HOUR: i64 = MS_PER_MINUTE * 60;
const MS_PER_DAY: i64 = MS_PER_HOUR * 24;

fn end_of_day() -> NaiveTime {
    NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or(NaiveTime::MIN)
}

/// Days from `from` until the next `to`. Same weekday counts as a full week.
pub fn days_until(from: Weekday, to: Weekday) -> i64 {
    let from = from.num_days_from_sunday() as i64;
    let to = to.num_days_from_sunday() as i64;
    match (to - from + 7) % 7 {
        0 => 7,
        days => days,
    }
}

/// End of the next `weekday` strictly after today, in `now`'s timezone.
pub fn next_deadline<Tz: TimeZone>(
    now: &DateTime<Tz>,
    weekday: Weekday,
) -> Result<DateTime<Tz>> {
    let days = days_until(now.weekday(), weekday);
    let naive = (now.date_naive() + Duration::days(days)).and_time(end_of_day());
    now.timezone()
        .from_local_datetime(&naive)
        .earliest()
        .ok_or(BloomError::UnresolvableDeadline(naive))
}

/// Stand-in for a deadline that falls into a DST gap: one hour earlier on the
/// same day, so the target stays late on `weekday`.
pub fn fallback_deadline<Tz: TimeZone>(now: &DateTime<Tz>, weekday: Weekday) -> DateTime<Tz> {
    let days = days_until(now.weekday(), weekday);
    let naive = (now.date_naive() + Duration::days(days)).and_time(end_of_day());
    now.timezone()
        .from_local_datetime(&(naive - Duration::hours(1)))
        .earliest()
        .unwrap_or_else(|| now.clone() + Duration::days(days))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Remaining {
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
}

impl Remaining {
    pub const ZERO: Remaining = Remaining {
        days: 0,
        hours: 0,
        minutes: 0,
        seconds: 0,
    };

    pub fn from_millis(distance_ms: i64) -> Option<Self> {
        if distance_ms < 0 {
            return None;
        }
        Some(Remaining {
            days: distance_ms / MS_PER_DAY,
            hours: (distance_ms % MS_PER_DAY) / MS_PER_HOUR,
            minutes: (distance_ms % MS_PER_HOUR) / MS_PER_MINUTE,
            seconds: (distance_ms % MS_PER_MINUTE) / MS_PER_SECOND,
        })
    }

    /// `None` once `now` has passed `target`.
    pub fn between<Tz: TimeZone>(target: &DateTime<Tz>, now: &DateTime<Tz>) -> Option<Self> {
        Self::from_millis(target.timestamp_millis() - now.timestamp_millis())
    }

    /// Days, hours, minutes, seconds as zero-padded text.
    pub fn fields(&self) -> [String; 4] {
        [self.days, self.hours, self.minutes, self.seconds].map(|value| format!("{:02}", value))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    Render(Remaining),
    /// First tick past the deadline. Returned at most once.
    Finish,
    Idle,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ClockPhase {
    #[default]
    Running,
    Finished,
}

impl ClockPhase {
    pub fn advance<Tz: TimeZone>(
        &mut self,
        deadline: &DateTime<Tz>,
        now: &DateTime<Tz>,
    ) -> TickOutcome {
        if *self == ClockPhase::Finished {
            return TickOutcome::Idle;
        }
        match Remaining::between(deadline, now) {
            Some(remaining) => TickOutcome::Render(remaining),
            None => {
                *self = ClockPhase::Finished;
                TickOutcome::Finish
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn at(day: u32, h: u32, m: u32, s: u32, ms: u32) -> DateTime<FixedOffset> {
        let tz = FixedOffset::east_opt(2 * 3600).unwrap();
        tz.with_ymd_and_hms(2026, 10, day, h, m, s).unwrap() + Duration::milliseconds(ms as i64)
    }

    #[test]
    fn test_days_until_rolls_same_day_to_next_week() {
        assert_eq!(days_until(Weekday::Fri, Weekday::Fri), 7);
        assert_eq!(days_until(Weekday::Thu, Weekday::Fri), 1);
        assert_eq!(days_until(Weekday::Sat, Weekday::Fri), 6);
        assert_eq!(days_until(Weekday::Sun, Weekday::Fri), 5);
    }

    #[test]
    fn test_thursday_morning_targets_this_friday() {
        // 2026-10-22 is a Thursday.
        let now = at(22, 10, 0, 0, 0);
        let target = next_deadline(&now, Weekday::Fri).unwrap();
        assert_eq!(target, at(23, 23, 59, 59, 999));

        let remaining = Remaining::between(&target, &now).unwrap();
        assert_eq!(
            remaining,
            Remaining {
                days: 1,
                hours: 13,
                minutes: 59,
                seconds: 59
            }
        );
    }

    #[test]
    fn test_last_instant_of_friday_rolls_a_full_week() {
        let now = at(23, 23, 59, 59, 999);
        let target = next_deadline(&now, Weekday::Fri).unwrap();
        assert_eq!(target, at(30, 23, 59, 59, 999));
        assert_eq!(Remaining::between(&target, &now).unwrap().days, 7);
    }

    #[test]
    fn test_first_instant_of_friday_also_rolls() {
        let now = at(23, 0, 0, 0, 0);
        let target = next_deadline(&now, Weekday::Fri).unwrap();
        assert_eq!(target, at(30, 23, 59, 59, 999));
    }

    #[test]
    fn test_sub_second_remainder_is_discarded() {
        let remaining = Remaining::from_millis(MS_PER_DAY * 2 + MS_PER_HOUR * 3 + 4_999).unwrap();
        assert_eq!(remaining.fields(), ["02", "03", "00", "04"]);
        assert_eq!(Remaining::from_millis(999).unwrap(), Remaining::ZERO);
    }

    #[test]
    fn test_fields_are_zero_padded() {
        let remaining = Remaining {
            days: 3,
            hours: 0,
            minutes: 9,
            seconds: 10,
        };
        assert_eq!(remaining.fields(), ["03", "00", "09", "10"]);
        assert_eq!(Remaining::ZERO.fields(), ["00", "00", "00", "00"]);
    }

    #[test]
    fn test_past_target_has_no_remaining() {
        let target = at(23, 23, 59, 59, 999);
        let now = target.clone() + Duration::milliseconds(1);
        assert_eq!(Remaining::between(&target, &now), None);
        assert_eq!(Remaining::between(&target, &target), Some(Remaining::ZERO));
    }

    #[test]
    fn test_fallback_stays_late_on_the_deadline_day() {
        let now = at(22, 10, 0, 0, 0);
        assert_eq!(fallback_deadline(&now, Weekday::Fri), at(23, 22, 59, 59, 999));
        let friday = at(23, 23, 30, 0, 0);
        assert_eq!(fallback_deadline(&friday, Weekday::Fri), at(30, 22, 59, 59, 999));
    }

    #[test]
    fn test_clock_renders_until_the_deadline_passes() {
        let deadline = at(23, 23, 59, 59, 999);
        let mut phase = ClockPhase::default();
        assert_eq!(
            phase.advance(&deadline, &at(23, 23, 59, 57, 0)),
            TickOutcome::Render(Remaining {
                days: 0,
                hours: 0,
                minutes: 0,
                seconds: 2
            })
        );
        assert_eq!(
            phase.advance(&deadline, &deadline),
            TickOutcome::Render(Remaining::ZERO)
        );
        assert_eq!(phase, ClockPhase::Running);
    }

    #[test]
    fn test_clock_finishes_once_then_stays_idle() {
        let deadline = at(23, 23, 59, 59, 999);
        let mut phase = ClockPhase::default();
        let late = deadline.clone() + Duration::milliseconds(1);
        assert_eq!(phase.advance(&deadline, &late), TickOutcome::Finish);
        assert_eq!(phase, ClockPhase::Finished);

        for secs in 1..5 {
            let later = late.clone() + Duration::seconds(secs);
            assert_eq!(phase.advance(&deadline, &later), TickOutcome::Idle);
        }
        // Even a clock stepped back before the deadline does not resume rendering.
        assert_eq!(phase.advance(&deadline, &at(22, 0, 0, 0, 0)), TickOutcome::Idle);
    }
}
