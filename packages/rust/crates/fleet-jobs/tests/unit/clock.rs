use std::time::Duration;

use chrono::{TimeZone, Utc};

use super::{Clock, ManualClock, elapsed_between};

#[test]
fn manual_clock_advances_and_rewinds() {
    let start = Utc
        .with_ymd_and_hms(2024, 3, 1, 12, 0, 0)
        .single()
        .expect("valid start");
    let clock = ManualClock::new(start);

    clock.advance(Duration::from_secs(300));
    assert_eq!(clock.now(), start + chrono::TimeDelta::seconds(300));

    clock.set(start);
    assert_eq!(clock.now(), start);
}

#[test]
fn elapsed_between_clamps_skew_to_zero() {
    let now = Utc::now();
    let future = now + chrono::TimeDelta::seconds(30);
    assert_eq!(elapsed_between(now, future), Duration::ZERO);
    assert_eq!(elapsed_between(future, now), Duration::from_secs(30));
}
