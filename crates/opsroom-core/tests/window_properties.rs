//! Property tests for the reminder phase classifier.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use opsroom_core::{classify, ReminderPhase, TaskTimeWindow, TimeOfDay, ALMOST_LATE_MINUTES};
use proptest::prelude::*;

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
}

fn time_of_day(minutes: u16) -> TimeOfDay {
    TimeOfDay::from_hm(u32::from(minutes / 60), u32::from(minutes % 60)).unwrap()
}

fn now_at(date: NaiveDate, minutes: u16) -> NaiveDateTime {
    date.and_time(NaiveTime::from_hms_opt(u32::from(minutes / 60), u32::from(minutes % 60), 0).unwrap())
}

/// Ordered windows with at least five minutes between due and end.
fn ordered_window() -> impl Strategy<Value = TaskTimeWindow> {
    (0u16..1300, 0u16..60, 5u16..60).prop_map(|(start, to_due, to_end)| {
        let due = start + to_due;
        let end = due + to_end;
        TaskTimeWindow::new(day(), time_of_day(start), time_of_day(due), time_of_day(end))
    })
}

proptest! {
    #[test]
    fn other_days_are_upcoming(
        window in ordered_window(),
        minutes in 0u16..1440,
        offset in prop_oneof![-400i64..-1, 1i64..400],
    ) {
        let date = day() + Duration::days(offset);
        prop_assert_eq!(classify(now_at(date, minutes), &window), ReminderPhase::Upcoming);
    }

    #[test]
    fn classification_is_idempotent(window in ordered_window(), minutes in 0u16..1440) {
        let now = now_at(day(), minutes);
        let first = classify(now, &window);
        for _ in 0..3 {
            prop_assert_eq!(classify(now, &window), first);
        }
    }

    #[test]
    fn threshold_is_always_five_minutes_before_end(window in ordered_window()) {
        prop_assert_eq!(
            window.window_end.minutes() - window.almost_late_threshold().minutes(),
            ALMOST_LATE_MINUTES as u16
        );
        let edge = now_at(day(), window.almost_late_threshold().minutes());
        prop_assert_eq!(classify(edge, &window), ReminderPhase::AlmostLate);
    }

    #[test]
    fn phases_never_move_backwards_through_the_day(window in ordered_window()) {
        let rank = |phase: ReminderPhase| ReminderPhase::ALL.iter().position(|p| *p == phase).unwrap();
        let mut last = 0;
        for minutes in 0u16..1440 {
            let current = rank(classify(now_at(day(), minutes), &window));
            prop_assert!(current >= last);
            last = current;
        }
    }
}
