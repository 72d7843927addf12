use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use infra::models::BookingRow;
use uuid::Uuid;

use crate::domains::bookings::rules::TimeRange;
use crate::domains::bookings::types::{CreateBookingRequest, ModifyBookingRequest};
use crate::domains::common::parse_hhmm;
use crate::error::FieldErrors;

const MIN_NAME_CHARS: usize = 2;
const MIN_PHONE_DIGITS: usize = 8;
const MAX_PHONE_DIGITS: usize = 15;

/// Opening hours and the venue-local clock a requested slot is checked against.
#[derive(Debug, Clone, Copy)]
pub struct BookingWindow {
    pub opening: NaiveTime,
    pub closing: NaiveTime,
    pub now: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBooking {
    pub room_id: Uuid,
    pub date: NaiveDate,
    pub range: TimeRange,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub number_of_people: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotChange {
    pub date: NaiveDate,
    pub range: TimeRange,
    pub number_of_people: i32,
}

impl SlotChange {
    pub fn moves_slot(&self, current: &BookingRow) -> bool {
        self.date != current.date
            || self.range.start != current.start_time
            || self.range.end != current.end_time
    }
}

pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    domain
        .char_indices()
        .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len())
}

/// Digits with an optional leading `+`. Spaces, dots, dashes and parentheses are ignored.
pub fn normalize_phone(phone: &str) -> Option<String> {
    let trimmed = phone.trim();
    let (plus, rest) = match trimmed.strip_prefix('+') {
        Some(rest) => ("+", rest),
        None => ("", trimmed),
    };

    let mut digits = String::with_capacity(rest.len());
    for c in rest.chars() {
        match c {
            '0'..='9' => digits.push(c),
            ' ' | '.' | '-' | '(' | ')' => {}
            _ => return None,
        }
    }

    (MIN_PHONE_DIGITS..=MAX_PHONE_DIGITS)
        .contains(&digits.len())
        .then(|| format!("{plus}{digits}"))
}

fn required<'a>(
    errors: &mut FieldErrors,
    field: &str,
    value: &'a Option<String>,
) -> Option<&'a str> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Some(v),
        _ => {
            errors.insert(field.to_string(), "This field is required".to_string());
            None
        }
    }
}

fn parse_date(errors: &mut FieldErrors, raw: &str) -> Option<NaiveDate> {
    let parsed = NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok();
    if parsed.is_none() {
        errors.insert("date".into(), "Date must use the YYYY-MM-DD format".into());
    }
    parsed
}

fn parse_time(errors: &mut FieldErrors, field: &str, raw: &str) -> Option<NaiveTime> {
    let parsed = parse_hhmm(raw);
    if parsed.is_none() {
        errors.insert(field.to_string(), "Time must use the HH:MM format".into());
    }
    parsed
}

/// Ordering, opening hours and "not in the past" checks for a slot.
fn check_slot(
    errors: &mut FieldErrors,
    date: NaiveDate,
    start: NaiveTime,
    end: NaiveTime,
    window: &BookingWindow,
    require_future: bool,
) -> Option<TimeRange> {
    let Some(range) = TimeRange::new(start, end) else {
        errors.insert("endTime".into(), "End time must be after start time".into());
        return None;
    };

    if !range.within(window.opening, window.closing) {
        errors.insert(
            "startTime".into(),
            format!(
                "Bookings must fit between {} and {}",
                window.opening.format("%H:%M"),
                window.closing.format("%H:%M")
            ),
        );
        return None;
    }

    if require_future && date.and_time(start) <= window.now {
        errors.insert("date".into(), "Booking must start in the future".into());
        return None;
    }

    Some(range)
}

fn check_people(errors: &mut FieldErrors, people: i32) {
    if people < 1 {
        errors.insert("numberOfPeople".into(), "At least one person is required".into());
    }
}

pub fn validate_new_booking(
    req: &CreateBookingRequest,
    window: &BookingWindow,
) -> Result<NewBooking, FieldErrors> {
    let mut errors = FieldErrors::new();

    let room_id = required(&mut errors, "roomId", &req.room_id).and_then(|raw| {
        let parsed = Uuid::parse_str(raw).ok();
        if parsed.is_none() {
            errors.insert("roomId".into(), "Invalid room id".into());
        }
        parsed
    });

    let date =
        required(&mut errors, "date", &req.date).and_then(|raw| parse_date(&mut errors, raw));
    let start = required(&mut errors, "startTime", &req.start_time)
        .and_then(|raw| parse_time(&mut errors, "startTime", raw));
    let end = required(&mut errors, "endTime", &req.end_time)
        .and_then(|raw| parse_time(&mut errors, "endTime", raw));

    let customer_name =
        required(&mut errors, "customerName", &req.customer_name).map(str::to_string);
    if let Some(name) = &customer_name {
        if name.chars().count() < MIN_NAME_CHARS {
            errors.insert(
                "customerName".into(),
                format!("Name must be at least {MIN_NAME_CHARS} characters"),
            );
        }
    }

    let customer_email =
        required(&mut errors, "customerEmail", &req.customer_email).map(str::to_string);
    if let Some(email) = &customer_email {
        if !is_valid_email(email) {
            errors.insert("customerEmail".into(), "Invalid email address".into());
        }
    }

    let customer_phone = match req.customer_phone.as_deref().map(str::trim) {
        None | Some("") => Some(String::new()),
        Some(raw) => {
            let normalized = normalize_phone(raw);
            if normalized.is_none() {
                errors.insert(
                    "customerPhone".into(),
                    format!("Phone must contain {MIN_PHONE_DIGITS} to {MAX_PHONE_DIGITS} digits"),
                );
            }
            normalized
        }
    };

    let number_of_people = match req.number_of_people {
        Some(people) => {
            check_people(&mut errors, people);
            Some(people)
        }
        None => {
            errors.insert("numberOfPeople".into(), "This field is required".into());
            None
        }
    };

    let range = match (date, start, end) {
        (Some(date), Some(start), Some(end)) => {
            check_slot(&mut errors, date, start, end, window, true)
        }
        _ => None,
    };

    match (
        room_id,
        date,
        range,
        customer_name,
        customer_email,
        customer_phone,
        number_of_people,
    ) {
        (
            Some(room_id),
            Some(date),
            Some(range),
            Some(customer_name),
            Some(customer_email),
            Some(customer_phone),
            Some(number_of_people),
        ) if errors.is_empty() => Ok(NewBooking {
            room_id,
            date,
            range,
            customer_name,
            customer_email: customer_email.to_lowercase(),
            customer_phone,
            number_of_people,
        }),
        _ => Err(errors),
    }
}

/// Merges a partial change onto the current booking and validates the result.
pub fn validate_slot_change(
    req: &ModifyBookingRequest,
    current: &BookingRow,
    window: &BookingWindow,
) -> Result<SlotChange, FieldErrors> {
    let mut errors = FieldErrors::new();

    let date = match req.date.as_deref() {
        Some(raw) => parse_date(&mut errors, raw.trim()),
        None => Some(current.date),
    };
    let start = match req.start_time.as_deref() {
        Some(raw) => parse_time(&mut errors, "startTime", raw),
        None => Some(current.start_time),
    };
    let end = match req.end_time.as_deref() {
        Some(raw) => parse_time(&mut errors, "endTime", raw),
        None => Some(current.end_time),
    };

    let number_of_people = req.number_of_people.unwrap_or(current.number_of_people);
    check_people(&mut errors, number_of_people);

    // A slot that stays where it is may already have started.
    let range = match (date, start, end) {
        (Some(date), Some(start), Some(end)) => {
            let moves =
                date != current.date || start != current.start_time || end != current.end_time;
            check_slot(&mut errors, date, start, end, window, moves)
        }
        _ => None,
    };

    match (date, range) {
        (Some(date), Some(range)) if errors.is_empty() => Ok(SlotChange {
            date,
            range,
            number_of_people,
        }),
        _ => Err(errors),
    }
}
