//! Status and platform display labels.
//!
//! Both lookups are total: a code that is not in the table, including a
//! missing code, resolves to the `UNKNOWN` entry.

use serde::Serialize;
use std::collections::HashMap;
use std::sync::LazyLock;

use crate::record::{ReservationDetails, fields};

/// Code used when the record carries no status or platform.
pub const UNKNOWN_CODE: &str = "UNKNOWN";

/// Badge style of a status label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BadgeVariant {
    Default,
    Secondary,
    Destructive,
    Outline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusLabel {
    pub label: &'static str,
    pub variant: BadgeVariant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformLabel {
    pub label: &'static str,
    pub color: &'static str,
}

// ── Lookup tables ─────────────────────────────────────────────────────────────

const UNKNOWN_STATUS: StatusLabel = StatusLabel {
    label: "Inconnu",
    variant: BadgeVariant::Outline,
};

const UNKNOWN_PLATFORM: PlatformLabel = PlatformLabel {
    label: "Inconnue",
    color: "text-gray-600",
};

static STATUS_LABELS: LazyLock<HashMap<&'static str, StatusLabel>> = LazyLock::new(|| {
    [
        ("CONFIRMED", "Confirmée", BadgeVariant::Default),
        ("PENDING", "En attente", BadgeVariant::Secondary),
        ("CANCELLED", "Annulée", BadgeVariant::Destructive),
        ("CHECKED-OUT", "Terminée", BadgeVariant::Outline),
        ("CHECKED-IN", "En cours", BadgeVariant::Default),
        ("NO-SHOW", "No show", BadgeVariant::Destructive),
        ("FUTURE", "À venir", BadgeVariant::Secondary),
    ]
    .into_iter()
    .map(|(code, label, variant)| (code, StatusLabel { label, variant }))
    .chain([(UNKNOWN_CODE, UNKNOWN_STATUS)])
    .collect()
});

static PLATFORM_LABELS: LazyLock<HashMap<&'static str, PlatformLabel>> = LazyLock::new(|| {
    [
        ("Booking.com", "Booking.com", "text-blue-600"),
        ("airbnb2", "Airbnb", "text-red-600"),
        ("Hotels.com", "Hotels.com", "text-purple-600"),
        ("Expedia", "Expedia", "text-yellow-600"),
        ("Travelocity", "Travelocity", "text-green-600"),
        ("manual", "Directe", "text-navy-600"),
    ]
    .into_iter()
    .map(|(code, label, color)| (code, PlatformLabel { label, color }))
    .chain([(UNKNOWN_CODE, UNKNOWN_PLATFORM)])
    .collect()
});

/// Exact, case-sensitive status lookup.
pub fn status_label(code: &str) -> StatusLabel {
    STATUS_LABELS.get(code).copied().unwrap_or(UNKNOWN_STATUS)
}

/// Exact, case-sensitive platform lookup.
pub fn platform_label(code: &str) -> PlatformLabel {
    PLATFORM_LABELS.get(code).copied().unwrap_or(UNKNOWN_PLATFORM)
}

// ── Record-level helpers ──────────────────────────────────────────────────────

/// Raw status code with its label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayStatus {
    pub status: String,
    pub label: &'static str,
    pub variant: BadgeVariant,
}

/// Raw platform code with its label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayPlatform {
    pub platform: String,
    pub label: &'static str,
    pub color: &'static str,
}

pub fn get_display_status(reservation: &ReservationDetails) -> DisplayStatus {
    let status = reservation
        .text(fields::STATUS)
        .unwrap_or_else(|| UNKNOWN_CODE.to_string());
    let StatusLabel { label, variant } = status_label(&status);
    DisplayStatus { status, label, variant }
}

pub fn get_display_platform(reservation: &ReservationDetails) -> DisplayPlatform {
    let platform = reservation
        .text(fields::PLATFORM)
        .unwrap_or_else(|| UNKNOWN_CODE.to_string());
    let PlatformLabel { label, color } = platform_label(&platform);
    DisplayPlatform { platform, label, color }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn known_status() {
        let r = ReservationDetails::new().with("STATE", "CONFIRMED");
        let s = get_display_status(&r);
        assert_eq!(s.status, "CONFIRMED");
        assert_eq!(s.label, "Confirmée");
        assert_eq!(s.variant, BadgeVariant::Default);
    }

    #[test]
    fn unknown_status_falls_back() {
        let r = ReservationDetails::new().with("STATE", "FOO");
        let s = get_display_status(&r);
        assert_eq!(s.status, "FOO");
        assert_eq!((s.label, s.variant), ("Inconnu", BadgeVariant::Outline));

        let s = get_display_status(&ReservationDetails::new());
        assert_eq!(s.status, "UNKNOWN");
        assert_eq!(s.label, "Inconnu");
    }

    #[test]
    fn status_lookup_is_case_sensitive() {
        assert_eq!(status_label("confirmed"), UNKNOWN_STATUS);
        assert_eq!(status_label("NO-SHOW").variant, BadgeVariant::Destructive);
    }

    #[test]
    fn status_alias() {
        let r = ReservationDetails::new().with("status", "CHECKED-OUT");
        assert_eq!(get_display_status(&r).label, "Terminée");
    }

    #[test]
    fn platforms() {
        let r = ReservationDetails::new().with("PLATFORM", "airbnb2");
        let p = get_display_platform(&r);
        assert_eq!((p.label, p.color), ("Airbnb", "text-red-600"));

        let r = ReservationDetails::new().with("reservation_source", "manual");
        assert_eq!(get_display_platform(&r).label, "Directe");

        let r = ReservationDetails::new().with("ota", "Vrbo");
        let p = get_display_platform(&r);
        assert_eq!(p.platform, "Vrbo");
        assert_eq!((p.label, p.color), ("Inconnue", "text-gray-600"));
    }

    #[test]
    fn serializes_variant_lowercase() {
        let r = ReservationDetails::new().with("STATE", "PENDING");
        assert_eq!(
            serde_json::to_value(get_display_status(&r)).unwrap(),
            json!({ "status": "PENDING", "label": "En attente", "variant": "secondary" })
        );
    }
}
