//! Lifecycle dates, the reservation timeline, and listing details.
//!
//! Dates stay raw strings in [`DateInformation`]; parsing only happens when
//! something needs to order or compare them (the timeline) or render them
//! (see [`crate::format`]).

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Serialize;

use crate::amount::parse_count;
use crate::record::{ReservationDetails, fields};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DateInformation {
    pub booking: Option<String>,
    pub confirmation: Option<String>,
    pub checkin: Option<String>,
    pub checkout: Option<String>,
    pub cancellation: Option<String>,
    pub last_modified: Option<String>,
    pub nights: i64,
}

pub fn extract_date_information(reservation: &ReservationDetails) -> DateInformation {
    DateInformation {
        booking: reservation.text(fields::BOOKING_DATE),
        confirmation: reservation.text(fields::CONFIRMATION_DATE),
        checkin: reservation.text(fields::CHECKIN),
        checkout: reservation.text(fields::CHECKOUT),
        cancellation: reservation.text(fields::CANCELLATION_DATE),
        last_modified: reservation.text(fields::LAST_MODIFIED),
        nights: parse_count(reservation.first_present(fields::NIGHTS)),
    }
}

/// Parse the date shapes the reporting API emits.
///
/// Accepts RFC 3339, `YYYY-MM-DD` and `YYYY-MM-DD[T ]HH:MM[:SS[.fff]]`.
/// Values without an offset are taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    const NAIVE_FORMATS: [&str; 6] = [
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ];
    if let Some(naive) = NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
    {
        return Some(naive.and_utc());
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

// ── Timeline ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TimelineVariant {
    Default,
    Success,
    Destructive,
}

/// One lifecycle event of the reservation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineEvent {
    /// Raw date as sent by the API.
    pub date: String,
    #[serde(skip)]
    pub at: Option<DateTime<Utc>>,
    pub label: &'static str,
    pub description: &'static str,
    pub variant: TimelineVariant,
    pub is_past: bool,
    pub is_future: bool,
}

impl TimelineEvent {
    fn new(
        date: String,
        now: DateTime<Utc>,
        label: &'static str,
        description: &'static str,
        variant: TimelineVariant,
    ) -> Self {
        let at = parse_timestamp(&date);
        Self {
            date,
            at,
            label,
            description,
            variant,
            is_past: at.is_some_and(|t| t < now),
            is_future: at.is_some_and(|t| t > now),
        }
    }
}

/// Build the chronological lifecycle of a reservation relative to `now`.
///
/// Empty date strings produce no event. The last-modification event is
/// skipped when it equals the creation date. Events whose date cannot be
/// parsed are neither past nor future and keep their relative order after
/// all dated events.
pub fn build_timeline(reservation: &ReservationDetails, now: DateTime<Utc>) -> Vec<TimelineEvent> {
    let non_empty = |keys: &[&str]| reservation.text(keys).filter(|d| !d.is_empty());
    let mut events = Vec::new();

    let created = non_empty(&["DTE_CREATE"]);
    if let Some(date) = created.clone() {
        events.push(TimelineEvent::new(
            date,
            now,
            "Réservation créée",
            "Création initiale de la réservation dans le système",
            TimelineVariant::Default,
        ));
    }

    if let Some(date) = non_empty(&["DTE_CONFIRM"]) {
        events.push(TimelineEvent::new(
            date,
            now,
            "Réservation confirmée",
            "Confirmation officielle de la réservation",
            TimelineVariant::Success,
        ));
    }

    if let Some(date) = non_empty(fields::CHECKIN) {
        let mut event = TimelineEvent::new(
            date,
            now,
            "Arrivée (Check-in)",
            "Début du séjour au logement",
            TimelineVariant::Default,
        );
        if event.is_past {
            event.variant = TimelineVariant::Success;
        }
        events.push(event);
    }

    if let Some(date) = non_empty(fields::CHECKOUT) {
        let mut event = TimelineEvent::new(
            date,
            now,
            "Départ (Check-out)",
            "Fin du séjour et libération du logement",
            TimelineVariant::Default,
        );
        if event.is_past {
            event.variant = TimelineVariant::Success;
        }
        events.push(event);
    }

    if let Some(date) = non_empty(&["DTE_MOD"])
        && Some(&date) != created.as_ref()
    {
        events.push(TimelineEvent::new(
            date,
            now,
            "Dernière modification",
            "Dernière mise à jour des informations de réservation",
            TimelineVariant::Default,
        ));
    }

    if let Some(date) = non_empty(&["DTE_CANCELED"]) {
        events.push(TimelineEvent::new(
            date,
            now,
            "Réservation annulée",
            "Annulation de la réservation",
            TimelineVariant::Destructive,
        ));
    }

    events.sort_by_key(|e| (e.at.is_none(), e.at));
    events
}

// ── Listing ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingInfo {
    pub name: Option<String>,
    pub address: Option<String>,
    pub listing_id: Option<String>,
    pub internal_ref: Option<String>,
}

pub fn listing_info(reservation: &ReservationDetails) -> ListingInfo {
    ListingInfo {
        name: reservation.text(fields::LISTING_NAME),
        address: reservation.text(fields::LISTING_ADDRESS),
        listing_id: reservation.text(fields::LISTING_ID),
        internal_ref: reservation.text(fields::INTERNAL_REF),
    }
}
