use api::domains::bookings::types::{CreateBookingRequest, ModifyBookingRequest};
use api::domains::bookings::validation::{
    is_valid_email, normalize_phone, validate_new_booking, validate_slot_change, BookingWindow,
};
use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};
use infra::models::BookingRow;
use infra::repos::BookingStatus;
use uuid::Uuid;

fn window() -> BookingWindow {
    BookingWindow {
        opening: NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
        closing: NaiveTime::from_hms_opt(19, 0, 0).unwrap(),
        now: NaiveDate::from_ymd_opt(2026, 4, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap(),
    }
}

fn valid_request() -> CreateBookingRequest {
    CreateBookingRequest {
        room_id: Some(Uuid::new_v4().to_string()),
        date: Some("2026-04-10".into()),
        start_time: Some("10:00".into()),
        end_time: Some("12:00".into()),
        customer_name: Some("Jeanne Martin".into()),
        customer_email: Some("Jeanne.Martin@Example.com".into()),
        customer_phone: Some("+33 6 12 34 56 78".into()),
        number_of_people: Some(4),
    }
}

fn existing_booking() -> BookingRow {
    let created = Utc.with_ymd_and_hms(2026, 3, 20, 10, 0, 0).unwrap();
    BookingRow {
        id: Uuid::new_v4(),
        room_id: Uuid::new_v4(),
        user_id: "user_1".into(),
        date: NaiveDate::from_ymd_opt(2026, 4, 10).unwrap(),
        original_date: None,
        start_time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
        end_time: NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
        customer_name: "Jeanne Martin".into(),
        customer_email: "jeanne.martin@example.com".into(),
        customer_phone: String::new(),
        number_of_people: 4,
        total_price_cents: 9000,
        status: BookingStatus::Confirmed,
        stripe_session_id: None,
        stripe_payment_id: None,
        stripe_refund_id: None,
        cancelled_at: None,
        reminder_sent_at: None,
        created_at: created,
        updated_at: created,
    }
}

#[test]
fn accepts_a_complete_request() {
    let booking = validate_new_booking(&valid_request(), &window()).expect("valid");

    assert_eq!(booking.range.minutes(), 120);
    assert_eq!(booking.customer_email, "jeanne.martin@example.com");
    assert_eq!(booking.customer_phone, "+33612345678");
}

#[test]
fn phone_is_optional() {
    let req = CreateBookingRequest {
        customer_phone: None,
        ..valid_request()
    };
    let booking = validate_new_booking(&req, &window()).expect("valid");
    assert_eq!(booking.customer_phone, "");
}

#[test]
fn reports_every_missing_field() {
    let errors = validate_new_booking(&CreateBookingRequest::default(), &window()).unwrap_err();

    for field in [
        "roomId",
        "date",
        "startTime",
        "endTime",
        "customerName",
        "customerEmail",
        "numberOfPeople",
    ] {
        assert!(errors.contains_key(field), "missing error for {field}");
    }
    assert!(!errors.contains_key("customerPhone"));
}

#[test]
fn rejects_end_before_start() {
    let req = CreateBookingRequest {
        start_time: Some("12:00".into()),
        end_time: Some("10:00".into()),
        ..valid_request()
    };
    let errors = validate_new_booking(&req, &window()).unwrap_err();
    assert!(errors.contains_key("endTime"));
}

#[test]
fn rejects_slots_outside_opening_hours() {
    let req = CreateBookingRequest {
        start_time: Some("18:00".into()),
        end_time: Some("20:00".into()),
        ..valid_request()
    };
    let errors = validate_new_booking(&req, &window()).unwrap_err();
    assert!(errors.contains_key("startTime"));

    let req = CreateBookingRequest {
        start_time: Some("07:00".into()),
        end_time: Some("09:00".into()),
        ..valid_request()
    };
    assert!(validate_new_booking(&req, &window()).is_err());
}

#[test]
fn rejects_slots_in_the_past() {
    let req = CreateBookingRequest {
        date: Some("2026-04-01".into()),
        start_time: Some("08:00".into()),
        end_time: Some("10:00".into()),
        ..valid_request()
    };
    let errors = validate_new_booking(&req, &window()).unwrap_err();
    assert!(errors.contains_key("date"));

    let later_today = CreateBookingRequest {
        date: Some("2026-04-01".into()),
        start_time: Some("14:00".into()),
        end_time: Some("15:00".into()),
        ..valid_request()
    };
    assert!(validate_new_booking(&later_today, &window()).is_ok());
}

#[test]
fn rejects_bad_customer_details() {
    let req = CreateBookingRequest {
        customer_name: Some(" J ".into()),
        customer_email: Some("not-an-email".into()),
        customer_phone: Some("12-34".into()),
        number_of_people: Some(0),
        ..valid_request()
    };
    let errors = validate_new_booking(&req, &window()).unwrap_err();

    assert!(errors.contains_key("customerName"));
    assert!(errors.contains_key("customerEmail"));
    assert!(errors.contains_key("customerPhone"));
    assert!(errors.contains_key("numberOfPeople"));
}

#[test]
fn rejects_malformed_formats() {
    let req = CreateBookingRequest {
        room_id: Some("room-1".into()),
        date: Some("10/04/2026".into()),
        start_time: Some("10h".into()),
        ..valid_request()
    };
    let errors = validate_new_booking(&req, &window()).unwrap_err();

    assert!(errors.contains_key("roomId"));
    assert!(errors.contains_key("date"));
    assert!(errors.contains_key("startTime"));
}

#[test]
fn email_shape() {
    assert!(is_valid_email("a@b.co"));
    assert!(is_valid_email("first.last+tag@sub.example.org"));
    assert!(!is_valid_email("a@b"));
    assert!(!is_valid_email("@b.co"));
    assert!(!is_valid_email("a@.co"));
    assert!(!is_valid_email("a@b."));
    assert!(!is_valid_email("a b@c.de"));
    assert!(!is_valid_email("a@b@c.de"));
}

#[test]
fn phone_shape() {
    assert_eq!(normalize_phone("06 12 34 56 78").as_deref(), Some("0612345678"));
    assert_eq!(normalize_phone("+1 (555) 010-9999").as_deref(), Some("+15550109999"));
    assert_eq!(normalize_phone("1234567"), None);
    assert_eq!(normalize_phone("1234567890123456"), None);
    assert_eq!(normalize_phone("06 12 34 56 7a"), None);
    assert_eq!(normalize_phone("++33612345678"), None);
}

#[test]
fn slot_change_merges_with_current_booking() {
    let current = existing_booking();
    let req = ModifyBookingRequest {
        start_time: Some("11:00".into()),
        end_time: Some("13:00".into()),
        ..Default::default()
    };

    let change = validate_slot_change(&req, &current, &window()).expect("valid");
    assert_eq!(change.date, current.date);
    assert_eq!(change.number_of_people, 4);
    assert!(change.moves_slot(&current));
}

#[test]
fn headcount_only_change_keeps_slot() {
    let current = existing_booking();
    let req = ModifyBookingRequest {
        number_of_people: Some(6),
        ..Default::default()
    };

    let change = validate_slot_change(&req, &current, &window()).expect("valid");
    assert_eq!(change.number_of_people, 6);
    assert!(!change.moves_slot(&current));
}

#[test]
fn slot_change_cannot_move_into_the_past() {
    let current = existing_booking();
    let req = ModifyBookingRequest {
        date: Some("2026-03-30".into()),
        ..Default::default()
    };

    let errors = validate_slot_change(&req, &current, &window()).unwrap_err();
    assert!(errors.contains_key("date"));
}

#[test]
fn running_booking_can_change_headcount() {
    let current = BookingRow {
        status: BookingStatus::InProgress,
        ..existing_booking()
    };
    let during = BookingWindow {
        now: current.date.and_hms_opt(11, 0, 0).unwrap(),
        ..window()
    };
    let req = ModifyBookingRequest {
        number_of_people: Some(5),
        ..Default::default()
    };

    let change = validate_slot_change(&req, &current, &during).expect("valid");
    assert_eq!(change.number_of_people, 5);
    assert!(!change.moves_slot(&current));
}

#[test]
fn running_booking_cannot_be_moved() {
    let current = existing_booking();
    let during = BookingWindow {
        now: current.date.and_hms_opt(11, 0, 0).unwrap(),
        ..window()
    };
    let req = ModifyBookingRequest {
        end_time: Some("11:30".into()),
        ..Default::default()
    };

    let errors = validate_slot_change(&req, &current, &during).unwrap_err();
    assert!(errors.contains_key("date"));
}
