use api::domains::bookings::rules::{
    self, allows_transition, can_cancel, customer_can_modify, day_grid, has_conflict,
    quote_refund, refund_percentage, slot_instant, status_after_modification, total_price_cents,
    TimeRange,
};
use chrono::{Duration, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};
use infra::repos::BookingStatus;

fn t(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

fn range(start: (u32, u32), end: (u32, u32)) -> TimeRange {
    TimeRange::new(t(start.0, start.1), t(end.0, end.1)).unwrap()
}

#[test]
fn overlapping_slots_conflict() {
    let existing = vec![(range((10, 0), (12, 0)), BookingStatus::Confirmed)];

    assert!(has_conflict(&range((11, 0), (13, 0)), existing.clone()));
    assert!(has_conflict(&range((9, 0), (10, 30)), existing.clone()));
    assert!(has_conflict(&range((10, 30), (11, 30)), existing.clone()));
    assert!(has_conflict(&range((8, 0), (14, 0)), existing));
}

#[test]
fn touching_slots_do_not_conflict() {
    let existing = vec![(range((10, 0), (12, 0)), BookingStatus::Confirmed)];

    assert!(!has_conflict(&range((12, 0), (13, 0)), existing.clone()));
    assert!(!has_conflict(&range((8, 0), (10, 0)), existing));
}

#[test]
fn released_bookings_do_not_block() {
    for status in [
        BookingStatus::CancelledByUser,
        BookingStatus::CancelledByAdmin,
        BookingStatus::CancelledNoPayment,
        BookingStatus::Refunded,
    ] {
        let existing = vec![(range((10, 0), (12, 0)), status)];
        assert!(
            !has_conflict(&range((10, 0), (12, 0)), existing),
            "{status} should not hold the slot"
        );
    }

    for status in [
        BookingStatus::PendingPayment,
        BookingStatus::Modified,
        BookingStatus::CheckedIn,
        BookingStatus::NoShow,
    ] {
        let existing = vec![(range((10, 0), (12, 0)), status)];
        assert!(
            has_conflict(&range((10, 0), (12, 0)), existing),
            "{status} should hold the slot"
        );
    }
}

#[test]
fn empty_or_inverted_ranges_are_rejected() {
    assert!(TimeRange::new(t(10, 0), t(10, 0)).is_none());
    assert!(TimeRange::new(t(12, 0), t(10, 0)).is_none());
}

#[test]
fn price_is_prorated_by_minute() {
    assert_eq!(total_price_cents(4500, &range((10, 0), (12, 0))), 9000);
    assert_eq!(total_price_cents(4500, &range((10, 0), (11, 30))), 6750);
    // 3333 * 20 / 60 = 1111
    assert_eq!(total_price_cents(3333, &range((9, 0), (9, 20))), 1111);
    // 1000 * 50 / 60 = 833.33, rounded
    assert_eq!(total_price_cents(1000, &range((9, 0), (9, 50))), 833);
    assert_eq!(total_price_cents(0, &range((9, 0), (17, 0))), 0);
}

#[test]
fn refund_tiers() {
    assert_eq!(refund_percentage(Duration::hours(72)), 100);
    assert_eq!(refund_percentage(Duration::hours(48) + Duration::minutes(1)), 100);
    assert_eq!(refund_percentage(Duration::hours(48)), 50);
    assert_eq!(refund_percentage(Duration::hours(30)), 50);
    assert_eq!(refund_percentage(Duration::hours(24)), 50);
    assert_eq!(refund_percentage(Duration::hours(24) - Duration::minutes(1)), 0);
    assert_eq!(refund_percentage(Duration::hours(2)), 0);
    assert_eq!(refund_percentage(-Duration::hours(1)), 0);
}

#[test]
fn refund_quote_uses_start_instant() {
    let now = Utc.with_ymd_and_hms(2026, 5, 4, 8, 0, 0).unwrap();
    let starts_at = now + Duration::hours(30);

    let quote = quote_refund(9000, starts_at, now);
    assert_eq!(quote.percentage, 50);
    assert_eq!(quote.amount_cents, 4500);
    assert_eq!(quote.hours_until_start, 30);

    let quote = quote_refund(9000, now + Duration::days(5), now);
    assert_eq!(quote.amount_cents, 9000);

    let quote = quote_refund(9000, now + Duration::hours(3), now);
    assert_eq!(quote.amount_cents, 0);
}

#[test]
fn refund_amount_rounds_down() {
    assert_eq!(rules::refund_amount_cents(999, 50), 499);
    assert_eq!(rules::refund_amount_cents(999, 100), 999);
    assert_eq!(rules::refund_amount_cents(999, 0), 0);
}

#[test]
fn slot_instant_applies_business_offset() {
    let paris_summer = FixedOffset::east_opt(2 * 3600).unwrap();
    let date = NaiveDate::from_ymd_opt(2026, 7, 1).unwrap();

    assert_eq!(
        slot_instant(date, t(10, 0), paris_summer),
        Utc.with_ymd_and_hms(2026, 7, 1, 8, 0, 0).unwrap()
    );
}

#[test]
fn customer_modification_is_limited_to_early_statuses() {
    assert!(customer_can_modify(BookingStatus::PendingPayment));
    assert!(customer_can_modify(BookingStatus::PaymentReceived));
    assert!(customer_can_modify(BookingStatus::Confirmed));
    assert!(!customer_can_modify(BookingStatus::Modified));
    assert!(!customer_can_modify(BookingStatus::CheckedIn));
    assert!(!customer_can_modify(BookingStatus::CancelledByUser));
}

#[test]
fn admin_modification_excludes_closed_bookings() {
    assert!(rules::admin_can_modify(BookingStatus::Modified));
    assert!(rules::admin_can_modify(BookingStatus::CheckedIn));
    assert!(!rules::admin_can_modify(BookingStatus::Completed));
    assert!(!rules::admin_can_modify(BookingStatus::Refunded));
    assert!(!rules::admin_can_modify(BookingStatus::CancelledByAdmin));
}

#[test]
fn cancellation_follows_transitions() {
    assert!(can_cancel(BookingStatus::PendingPayment));
    assert!(can_cancel(BookingStatus::Confirmed));
    assert!(can_cancel(BookingStatus::Modified));
    assert!(can_cancel(BookingStatus::InProgress));
    assert!(can_cancel(BookingStatus::NoShow));
    assert!(!can_cancel(BookingStatus::Completed));
    assert!(!can_cancel(BookingStatus::CancelledNoPayment));
    assert!(!can_cancel(BookingStatus::Refunded));
}

#[test]
fn cancellable_exactly_when_admin_may_modify() {
    for status in BookingStatus::ALL {
        assert_eq!(
            can_cancel(status),
            rules::admin_can_modify(status),
            "{status} disagrees"
        );
    }
}

#[test]
fn no_show_can_only_be_cancelled() {
    assert!(allows_transition(BookingStatus::NoShow, BookingStatus::CancelledByAdmin));
    assert!(allows_transition(BookingStatus::NoShow, BookingStatus::CancelledByUser));
    assert!(!allows_transition(BookingStatus::NoShow, BookingStatus::Confirmed));
    assert!(!allows_transition(BookingStatus::NoShow, BookingStatus::Completed));
    assert!(!rules::is_terminal(BookingStatus::NoShow));
}

#[test]
fn terminal_statuses_have_no_exit() {
    for status in [
        BookingStatus::Completed,
        BookingStatus::CancelledByUser,
        BookingStatus::CancelledByAdmin,
        BookingStatus::CancelledNoPayment,
        BookingStatus::Refunded,
    ] {
        assert!(rules::is_terminal(status), "{status} should be terminal");
    }
    assert!(!rules::is_terminal(BookingStatus::Confirmed));
}

#[test]
fn lifecycle_moves_forward() {
    assert!(allows_transition(BookingStatus::PendingPayment, BookingStatus::Confirmed));
    assert!(allows_transition(BookingStatus::Confirmed, BookingStatus::CheckedIn));
    assert!(allows_transition(BookingStatus::CheckedIn, BookingStatus::InProgress));
    assert!(allows_transition(BookingStatus::InProgress, BookingStatus::Completed));
    assert!(allows_transition(BookingStatus::Modified, BookingStatus::Confirmed));

    assert!(!allows_transition(BookingStatus::PendingPayment, BookingStatus::CheckedIn));
    assert!(!allows_transition(BookingStatus::InProgress, BookingStatus::CheckedIn));
    assert!(!allows_transition(BookingStatus::Confirmed, BookingStatus::Confirmed));
    assert!(!allows_transition(BookingStatus::PendingPayment, BookingStatus::Refunded));
}

#[test]
fn modification_status() {
    assert_eq!(
        status_after_modification(BookingStatus::Confirmed),
        BookingStatus::Modified
    );
    assert_eq!(
        status_after_modification(BookingStatus::Modified),
        BookingStatus::Modified
    );
    assert_eq!(
        status_after_modification(BookingStatus::PendingPayment),
        BookingStatus::PendingPayment
    );
    assert_eq!(
        status_after_modification(BookingStatus::CheckedIn),
        BookingStatus::CheckedIn
    );
}

#[test]
fn admin_cannot_set_payment_statuses() {
    assert!(rules::is_admin_settable(BookingStatus::NoShow));
    assert!(rules::is_admin_settable(BookingStatus::CancelledByAdmin));
    assert!(!rules::is_admin_settable(BookingStatus::Refunded));
    assert!(!rules::is_admin_settable(BookingStatus::PendingPayment));
    assert!(!rules::is_admin_settable(BookingStatus::CancelledByUser));
}

#[test]
fn day_grid_marks_booked_and_past_hours() {
    let booked = vec![range((10, 0), (11, 30))];
    let grid = day_grid(t(8, 0), t(19, 0), &booked, Some(t(8, 30)));

    assert_eq!(grid.len(), 11);
    assert_eq!(grid[0].range, range((8, 0), (9, 0)));
    assert_eq!(grid[10].range, range((18, 0), (19, 0)));

    assert!(grid[0].past && !grid[0].available());
    assert!(!grid[1].past && grid[1].available());
    assert!(grid[2].booked, "10:00 is taken");
    assert!(grid[3].booked, "11:00 overlaps the 11:30 end");
    assert!(!grid[4].booked);
}

#[test]
fn day_grid_for_future_day_is_open() {
    let grid = day_grid(t(9, 0), t(12, 0), &[], None);
    assert_eq!(grid.len(), 3);
    assert!(grid.iter().all(|slot| slot.available()));
}
