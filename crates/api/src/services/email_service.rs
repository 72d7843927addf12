use std::time::Duration;

use chrono::{Datelike, NaiveDate, NaiveTime};
use futures_util::future::join;
use html_escape::encode_text;
use infra::models::BookingRow;
use serde_json::json;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::AppConfig;

/// Attempts after the first failed delivery.
pub const MAX_RETRIES: u32 = 2;
const RETRY_BASE_DELAY: Duration = Duration::from_secs(1);

#[derive(Debug, Error)]
pub enum EmailError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("API error (status {status}): {body}")]
    ApiError { status: u16, body: String },
}

#[derive(Clone)]
pub struct EmailConfig {
    pub api_key: String,
    pub project_id: String,
    pub region: String,
    pub sender_email: String,
    pub sender_name: String,
    pub frontend_base_url: String,
    pub admin_email: Option<String>,
    pub locale: Locale,
}

impl EmailConfig {
    pub fn from_env(app: &AppConfig) -> Option<Self> {
        let api_key = std::env::var("EMAIL_API_KEY").ok()?;
        let project_id = std::env::var("EMAIL_PROJECT_ID").ok()?;
        let sender_email = std::env::var("EMAIL_SENDER").ok()?;

        Some(Self {
            api_key,
            project_id,
            region: std::env::var("EMAIL_REGION").unwrap_or_else(|_| "fr-par".to_string()),
            sender_email,
            sender_name: std::env::var("EMAIL_SENDER_NAME")
                .unwrap_or_else(|_| "BookRoom".to_string()),
            frontend_base_url: app.frontend_base_url.clone(),
            admin_email: app.admin_email.clone(),
            locale: std::env::var("EMAIL_LOCALE")
                .map(|v| Locale::from_str_lossy(&v))
                .unwrap_or_default(),
        })
    }
}

#[derive(Clone)]
pub struct EmailService {
    config: EmailConfig,
    client: reqwest::Client,
}

/// Backoff before retry number `attempt` (1-based): 1s, then 2s.
pub fn retry_delay(attempt: u32) -> Duration {
    RETRY_BASE_DELAY * 2u32.pow(attempt.saturating_sub(1))
}

// ── Locale ──────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Locale {
    #[default]
    En,
    Fr,
}

impl Locale {
    pub fn from_str_lossy(s: &str) -> Self {
        match s.get(..2).map(str::to_ascii_lowercase).as_deref() {
            Some("fr") => Self::Fr,
            _ => Self::En,
        }
    }
}

// ── i18n strings ────────────────────────────────────────────────────

struct I18n {
    hi: &'static str,
    footer_tagline: &'static str,
    weekdays: [&'static str; 7],
    months: [&'static str; 12],

    label_room: &'static str,
    label_date: &'static str,
    label_time: &'static str,
    label_people: &'static str,
    label_total: &'static str,
    label_reference: &'static str,
    label_customer: &'static str,
    label_previous_date: &'static str,
    cta_bookings: &'static str,

    confirmed_subject: &'static str,
    confirmed_heading: &'static str,
    confirmed_body: &'static str,

    modified_subject: &'static str,
    modified_heading: &'static str,
    modified_body: &'static str,

    cancelled_subject: &'static str,
    cancelled_heading: &'static str,
    cancelled_body: &'static str,
    refund_tpl: &'static str,
    no_refund: &'static str,

    reminder_subject: &'static str,
    reminder_heading: &'static str,
    reminder_body: &'static str,

    admin_new_subject: &'static str,
    admin_new_heading: &'static str,
    admin_cancel_subject: &'static str,
    admin_cancel_heading: &'static str,
}

fn i18n(locale: Locale) -> &'static I18n {
    match locale {
        Locale::En => &I18N_EN,
        Locale::Fr => &I18N_FR,
    }
}

static I18N_EN: I18n = I18n {
    hi: "Hello",
    footer_tagline: "Meeting room booking",
    weekdays: ["Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday", "Sunday"],
    months: [
        "January", "February", "March", "April", "May", "June", "July", "August", "September",
        "October", "November", "December",
    ],

    label_room: "Room",
    label_date: "Date",
    label_time: "Time",
    label_people: "Attendees",
    label_total: "Total",
    label_reference: "Reference",
    label_customer: "Customer",
    label_previous_date: "Previous date",
    cta_bookings: "View my bookings",

    confirmed_subject: "Your booking is confirmed",
    confirmed_heading: "Booking confirmed",
    confirmed_body: "Thank you for your booking. Here are the details:",

    modified_subject: "Your booking has been updated",
    modified_heading: "Booking updated",
    modified_body: "Your booking was changed. The new details are:",

    cancelled_subject: "Your booking has been cancelled",
    cancelled_heading: "Booking cancelled",
    cancelled_body: "The following booking has been cancelled:",
    refund_tpl: "A refund of {amount} ({percent}% of the amount paid) is on its way to your original payment method.",
    no_refund: "No refund applies to this cancellation.",

    reminder_subject: "Reminder: your booking is tomorrow",
    reminder_heading: "See you tomorrow",
    reminder_body: "This is a reminder for your booking tomorrow:",

    admin_new_subject: "New booking",
    admin_new_heading: "New booking received",
    admin_cancel_subject: "Booking cancelled",
    admin_cancel_heading: "A booking was cancelled",
};

static I18N_FR: I18n = I18n {
    hi: "Bonjour",
    footer_tagline: "R\u{e9}servation de salles de r\u{e9}union",
    weekdays: ["lundi", "mardi", "mercredi", "jeudi", "vendredi", "samedi", "dimanche"],
    months: [
        "janvier", "f\u{e9}vrier", "mars", "avril", "mai", "juin", "juillet", "ao\u{fb}t",
        "septembre", "octobre", "novembre", "d\u{e9}cembre",
    ],

    label_room: "Salle",
    label_date: "Date",
    label_time: "Horaire",
    label_people: "Participants",
    label_total: "Total",
    label_reference: "R\u{e9}f\u{e9}rence",
    label_customer: "Client",
    label_previous_date: "Date initiale",
    cta_bookings: "Voir mes r\u{e9}servations",

    confirmed_subject: "Votre r\u{e9}servation est confirm\u{e9}e",
    confirmed_heading: "R\u{e9}servation confirm\u{e9}e",
    confirmed_body: "Merci pour votre r\u{e9}servation. En voici le d\u{e9}tail\u{a0}:",

    modified_subject: "Votre r\u{e9}servation a \u{e9}t\u{e9} modifi\u{e9}e",
    modified_heading: "R\u{e9}servation modifi\u{e9}e",
    modified_body: "Votre r\u{e9}servation a \u{e9}t\u{e9} modifi\u{e9}e. Nouveau d\u{e9}tail\u{a0}:",

    cancelled_subject: "Votre r\u{e9}servation a \u{e9}t\u{e9} annul\u{e9}e",
    cancelled_heading: "R\u{e9}servation annul\u{e9}e",
    cancelled_body: "La r\u{e9}servation suivante a \u{e9}t\u{e9} annul\u{e9}e\u{a0}:",
    refund_tpl: "Un remboursement de {amount} ({percent}\u{a0}% du montant pay\u{e9}) sera cr\u{e9}dit\u{e9} sur votre moyen de paiement.",
    no_refund: "Aucun remboursement ne s&rsquo;applique \u{e0} cette annulation.",

    reminder_subject: "Rappel\u{a0}: votre r\u{e9}servation est demain",
    reminder_heading: "\u{c0} demain",
    reminder_body: "Petit rappel pour votre r\u{e9}servation de demain\u{a0}:",

    admin_new_subject: "Nouvelle r\u{e9}servation",
    admin_new_heading: "Nouvelle r\u{e9}servation",
    admin_cancel_subject: "R\u{e9}servation annul\u{e9}e",
    admin_cancel_heading: "Une r\u{e9}servation a \u{e9}t\u{e9} annul\u{e9}e",
};

// ── Formatting ──────────────────────────────────────────────────────

/// "Tuesday 3 March 2026" / "mardi 3 mars 2026".
pub fn format_long_date(date: NaiveDate, locale: Locale) -> String {
    let t = i18n(locale);
    format!(
        "{} {} {} {}",
        t.weekdays[date.weekday().num_days_from_monday() as usize],
        date.day(),
        t.months[date.month0() as usize],
        date.year()
    )
}

/// "€45.50" / "45,50 €".
pub fn format_price(cents: i32, locale: Locale) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    let (units, rest) = (abs / 100, abs % 100);
    match locale {
        Locale::En => format!("{sign}\u{20ac}{units}.{rest:02}"),
        Locale::Fr => format!("{sign}{units},{rest:02}\u{a0}\u{20ac}"),
    }
}

fn format_slot(start: NaiveTime, end: NaiveTime) -> String {
    format!("{} \u{2013} {}", start.format("%H:%M"), end.format("%H:%M"))
}

/// Everything a booking email needs, detached from the database row.
#[derive(Debug, Clone)]
pub struct BookingDetails {
    pub booking_id: Uuid,
    pub customer_name: String,
    pub customer_email: String,
    pub room_name: String,
    pub date: NaiveDate,
    pub original_date: Option<NaiveDate>,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub number_of_people: i32,
    pub total_price_cents: i32,
}

impl BookingDetails {
    pub fn new(booking: &BookingRow, room_name: &str) -> Self {
        Self {
            booking_id: booking.id,
            customer_name: booking.customer_name.clone(),
            customer_email: booking.customer_email.clone(),
            room_name: room_name.to_string(),
            date: booking.date,
            original_date: booking.original_date,
            start_time: booking.start_time,
            end_time: booking.end_time,
            number_of_people: booking.number_of_people,
            total_price_cents: booking.total_price_cents,
        }
    }

    fn reference(&self) -> String {
        self.booking_id.simple().to_string()[..8].to_uppercase()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RefundNotice {
    pub amount_cents: i32,
    pub percentage: i32,
}

// ── Shared HTML layout ──────────────────────────────────────────────

fn wrap_in_layout(heading: &str, body_html: &str, footer_tagline: &str) -> String {
    format!(
        r##"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>{heading}</title>
</head>
<body style="margin:0;padding:0;background-color:#f4f5f7;color:#1f2937;font-family:Arial,Helvetica,sans-serif;">
<table role="presentation" width="100%" cellpadding="0" cellspacing="0" border="0" style="background-color:#f4f5f7;">
<tr><td align="center" style="padding:32px 16px;">
  <table role="presentation" width="560" cellpadding="0" cellspacing="0" border="0" style="max-width:560px;background-color:#ffffff;border-radius:8px;border-top:4px solid #2563eb;">
    <tr><td style="padding:28px 36px 0;font-size:20px;font-weight:bold;color:#2563eb;letter-spacing:0.5px;">BookRoom</td></tr>
    <tr><td style="padding:20px 36px 0;">
      <h1 style="margin:0;font-size:22px;color:#111827;">{heading}</h1>
    </td></tr>
    <tr><td style="padding:20px 36px 8px;">
      {body_html}
    </td></tr>
    <tr><td style="padding:16px 36px 28px;border-top:1px solid #e5e7eb;font-size:12px;color:#9ca3af;">
      {footer_tagline} &middot; BookRoom
    </td></tr>
  </table>
</td></tr>
</table>
</body>
</html>"##
    )
}

fn cta_button(href: &str, label: &str) -> String {
    format!(
        r#"<p style="margin:24px 0 8px;"><a href="{href}" target="_blank" style="display:inline-block;padding:12px 28px;background-color:#2563eb;border-radius:6px;color:#ffffff;font-weight:bold;font-size:14px;text-decoration:none;">{label}</a></p>"#
    )
}

fn paragraph(text: &str) -> String {
    format!(r#"<p style="margin:0 0 16px;font-size:15px;line-height:1.6;">{text}</p>"#)
}

fn detail_table(rows: &[(&str, String)]) -> String {
    let body: String = rows
        .iter()
        .map(|(label, value)| {
            format!(
                r#"<tr><td style="padding:6px 12px 6px 0;color:#6b7280;font-size:14px;">{label}</td><td style="padding:6px 0;font-size:14px;font-weight:bold;">{value}</td></tr>"#
            )
        })
        .collect();
    format!(
        r#"<table role="presentation" cellpadding="0" cellspacing="0" border="0" style="margin:0 0 16px;">{body}</table>"#
    )
}

/// Rendered message, ready to hand to the delivery API.
#[derive(Debug, Clone)]
pub struct RenderedEmail {
    pub subject: String,
    pub html: String,
    pub text: String,
}

// ── EmailService implementation ─────────────────────────────────────

impl EmailService {
    pub fn new(config: EmailConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    pub fn admin_email(&self) -> Option<&str> {
        self.config.admin_email.as_deref()
    }

    fn bookings_url(&self) -> String {
        format!("{}/my-bookings", self.config.frontend_base_url)
    }

    /// Delivers one message, retrying transient failures with exponential backoff.
    async fn send_email(
        &self,
        to_email: &str,
        to_name: &str,
        email: &RenderedEmail,
    ) -> Result<(), EmailError> {
        let mut attempt = 0;
        loop {
            match self.deliver(to_email, to_name, email).await {
                Ok(()) => {
                    info!("Email sent to {} ({})", to_email, email.subject);
                    return Ok(());
                }
                Err(e) if attempt < MAX_RETRIES => {
                    attempt += 1;
                    let delay = retry_delay(attempt);
                    warn!(
                        "Email to {} failed ({}), retry {}/{} in {:?}",
                        to_email, e, attempt, MAX_RETRIES, delay
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn deliver(
        &self,
        to_email: &str,
        to_name: &str,
        email: &RenderedEmail,
    ) -> Result<(), EmailError> {
        let url = format!(
            "https://api.scaleway.com/transactional-email/v1alpha1/regions/{}/emails",
            self.config.region
        );

        let body = json!({
            "from": {
                "email": self.config.sender_email,
                "name": self.config.sender_name,
            },
            "to": [{
                "email": to_email,
                "name": to_name,
            }],
            "subject": email.subject,
            "html": email.html,
            "text": email.text,
            "project_id": self.config.project_id,
        });

        let response = self
            .client
            .post(&url)
            .header("X-Auth-Token", &self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| EmailError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(EmailError::ApiError { status, body });
        }

        Ok(())
    }

    fn summary_rows(&self, details: &BookingDetails) -> Vec<(&'static str, String)> {
        let locale = self.config.locale;
        let t = i18n(locale);
        let mut rows = vec![
            (t.label_reference, details.reference()),
            (t.label_room, encode_text(&details.room_name).into_owned()),
            (t.label_date, format_long_date(details.date, locale)),
            (t.label_time, format_slot(details.start_time, details.end_time)),
            (t.label_people, details.number_of_people.to_string()),
            (t.label_total, format_price(details.total_price_cents, locale)),
        ];
        if let Some(previous) = details.original_date.filter(|d| *d != details.date) {
            rows.push((t.label_previous_date, format_long_date(previous, locale)));
        }
        rows
    }

    fn summary_text(&self, details: &BookingDetails) -> String {
        self.summary_rows(details)
            .into_iter()
            .map(|(label, value)| format!("{label}: {}", html_escape::decode_html_entities(&value)))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn customer_email(
        &self,
        details: &BookingDetails,
        subject: &str,
        heading: &str,
        intro: &str,
        extra: Option<&str>,
    ) -> RenderedEmail {
        let t = i18n(self.config.locale);
        let safe_name = encode_text(&details.customer_name);
        let mut body_html = format!(
            "{}{}{}",
            paragraph(&format!("{} {},", t.hi, safe_name)),
            paragraph(intro),
            detail_table(&self.summary_rows(details)),
        );
        if let Some(extra) = extra {
            body_html.push_str(&paragraph(extra));
        }
        body_html.push_str(&cta_button(&encode_text(&self.bookings_url()), t.cta_bookings));

        let mut text = format!(
            "{} {},\n\n{}\n\n{}\n",
            t.hi,
            details.customer_name,
            html_escape::decode_html_entities(intro),
            self.summary_text(details)
        );
        if let Some(extra) = extra {
            text.push_str(&format!("\n{}\n", html_escape::decode_html_entities(extra)));
        }
        text.push_str(&format!("\n{}: {}\n\n-- BookRoom", t.cta_bookings, self.bookings_url()));

        RenderedEmail {
            subject: subject.to_string(),
            html: wrap_in_layout(heading, &body_html, t.footer_tagline),
            text,
        }
    }

    fn admin_message(
        &self,
        details: &BookingDetails,
        subject: &str,
        heading: &str,
        extra: Option<&str>,
    ) -> RenderedEmail {
        let t = i18n(self.config.locale);
        let mut rows = self.summary_rows(details);
        rows.insert(
            1,
            (
                t.label_customer,
                format!(
                    "{} &lt;{}&gt;",
                    encode_text(&details.customer_name),
                    encode_text(&details.customer_email)
                ),
            ),
        );
        let mut body_html = detail_table(&rows);
        if let Some(extra) = extra {
            body_html.push_str(&paragraph(extra));
        }

        let text = rows
            .iter()
            .map(|(label, value)| format!("{label}: {}", html_escape::decode_html_entities(value)))
            .collect::<Vec<_>>()
            .join("\n");

        RenderedEmail {
            subject: format!("{} \u{2013} {}", subject, details.room_name),
            html: wrap_in_layout(heading, &body_html, t.footer_tagline),
            text,
        }
    }

    fn refund_line(&self, refund: Option<RefundNotice>) -> String {
        let t = i18n(self.config.locale);
        match refund.filter(|r| r.amount_cents > 0) {
            Some(r) => t
                .refund_tpl
                .replace("{amount}", &format_price(r.amount_cents, self.config.locale))
                .replace("{percent}", &r.percentage.to_string()),
            None => t.no_refund.to_string(),
        }
    }

    pub fn render_confirmation(&self, details: &BookingDetails) -> RenderedEmail {
        let t = i18n(self.config.locale);
        self.customer_email(
            details,
            t.confirmed_subject,
            t.confirmed_heading,
            t.confirmed_body,
            None,
        )
    }

    pub fn render_modification(&self, details: &BookingDetails) -> RenderedEmail {
        let t = i18n(self.config.locale);
        self.customer_email(details, t.modified_subject, t.modified_heading, t.modified_body, None)
    }

    pub fn render_cancellation(
        &self,
        details: &BookingDetails,
        refund: Option<RefundNotice>,
    ) -> RenderedEmail {
        let t = i18n(self.config.locale);
        let refund_line = self.refund_line(refund);
        self.customer_email(
            details,
            t.cancelled_subject,
            t.cancelled_heading,
            t.cancelled_body,
            Some(&refund_line),
        )
    }

    pub fn render_reminder(&self, details: &BookingDetails) -> RenderedEmail {
        let t = i18n(self.config.locale);
        self.customer_email(details, t.reminder_subject, t.reminder_heading, t.reminder_body, None)
    }

    pub fn render_admin_new_booking(&self, details: &BookingDetails) -> RenderedEmail {
        let t = i18n(self.config.locale);
        self.admin_message(details, t.admin_new_subject, t.admin_new_heading, None)
    }

    pub fn render_admin_cancellation(
        &self,
        details: &BookingDetails,
        refund: Option<RefundNotice>,
    ) -> RenderedEmail {
        let t = i18n(self.config.locale);
        let refund_line = self.refund_line(refund);
        self.admin_message(
            details,
            t.admin_cancel_subject,
            t.admin_cancel_heading,
            Some(&refund_line),
        )
    }

    pub async fn send_booking_reminder(&self, details: &BookingDetails) -> Result<(), EmailError> {
        let email = self.render_reminder(details);
        self.send_email(&details.customer_email, &details.customer_name, &email)
            .await
    }

    async fn send_to_customer(&self, details: &BookingDetails, email: RenderedEmail) {
        if let Err(e) = self
            .send_email(&details.customer_email, &details.customer_name, &email)
            .await
        {
            warn!(
                "Failed to send \"{}\" to {} for booking {}: {}",
                email.subject, details.customer_email, details.booking_id, e
            );
        }
    }

    async fn send_to_admin(&self, details: &BookingDetails, email: RenderedEmail) {
        let Some(admin) = self.admin_email() else {
            return;
        };
        if let Err(e) = self.send_email(admin, "BookRoom", &email).await {
            warn!(
                "Failed to send admin notice for booking {}: {}",
                details.booking_id, e
            );
        }
    }
}

// ── Fire-and-forget helper ──────────────────────────────────────────

pub enum EmailType {
    /// Customer confirmation plus admin notice.
    Confirmed(BookingDetails),
    Modified(BookingDetails),
    /// Customer notice plus admin notice, with the refund outcome when one applies.
    Cancelled {
        details: BookingDetails,
        refund: Option<RefundNotice>,
    },
}

/// Sends the emails for a booking event in the background. Failures are
/// logged and never reach the caller.
pub fn spawn_email(email_service: Option<&EmailService>, email_type: EmailType) {
    let Some(email_service) = email_service.cloned() else {
        return;
    };

    tokio::spawn(async move {
        match email_type {
            EmailType::Confirmed(details) => {
                let to_customer = email_service.render_confirmation(&details);
                let to_admin = email_service.render_admin_new_booking(&details);
                join(
                    email_service.send_to_customer(&details, to_customer),
                    email_service.send_to_admin(&details, to_admin),
                )
                .await;
            }
            EmailType::Modified(details) => {
                email_service
                    .send_to_customer(&details, email_service.render_modification(&details))
                    .await;
            }
            EmailType::Cancelled { details, refund } => {
                let to_customer = email_service.render_cancellation(&details, refund);
                let to_admin = email_service.render_admin_cancellation(&details, refund);
                join(
                    email_service.send_to_customer(&details, to_customer),
                    email_service.send_to_admin(&details, to_admin),
                )
                .await;
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(locale: Locale) -> EmailService {
        EmailService::new(EmailConfig {
            api_key: "key".into(),
            project_id: "project".into(),
            region: "fr-par".into(),
            sender_email: "noreply@bookroom.test".into(),
            sender_name: "BookRoom".into(),
            frontend_base_url: "https://bookroom.test".into(),
            admin_email: Some("admin@bookroom.test".into()),
            locale,
        })
    }

    fn details() -> BookingDetails {
        BookingDetails {
            booking_id: Uuid::nil(),
            customer_name: "Ada <Lovelace>".into(),
            customer_email: "ada@example.com".into(),
            room_name: "Salle Horizon".into(),
            date: NaiveDate::from_ymd_opt(2026, 3, 3).unwrap(),
            original_date: None,
            start_time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
            number_of_people: 4,
            total_price_cents: 9050,
        }
    }

    #[test]
    fn backoff_doubles() {
        assert_eq!(retry_delay(1), Duration::from_secs(1));
        assert_eq!(retry_delay(2), Duration::from_secs(2));
    }

    #[test]
    fn dates_and_prices_are_localized() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 3).unwrap();
        assert_eq!(format_long_date(date, Locale::En), "Tuesday 3 March 2026");
        assert_eq!(format_long_date(date, Locale::Fr), "mardi 3 mars 2026");
        assert_eq!(format_price(9050, Locale::En), "\u{20ac}90.50");
        assert_eq!(format_price(9050, Locale::Fr), "90,50\u{a0}\u{20ac}");
    }

    #[test]
    fn customer_name_is_escaped_in_html() {
        let email = service(Locale::En).render_confirmation(&details());
        assert!(email.html.contains("Ada &lt;Lovelace&gt;"));
        assert!(email.text.contains("Ada <Lovelace>"));
        assert!(email.text.contains("10:00 \u{2013} 12:00"));
    }

    #[test]
    fn cancellation_mentions_refund_only_when_due() {
        let svc = service(Locale::En);
        let refunded = svc.render_cancellation(
            &details(),
            Some(RefundNotice {
                amount_cents: 4525,
                percentage: 50,
            }),
        );
        assert!(refunded.text.contains("\u{20ac}45.25 (50% of the amount paid)"));

        let none = svc.render_cancellation(&details(), None);
        assert!(none.text.contains("No refund applies"));
    }

    #[test]
    fn admin_notice_carries_customer_and_room() {
        let email = service(Locale::Fr).render_admin_new_booking(&details());
        assert!(email.subject.contains("Salle Horizon"));
        assert!(email.text.contains("ada@example.com"));
    }
}
