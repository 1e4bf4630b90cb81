//! Guest counts and contact details.

use serde::Serialize;

use crate::amount::parse_count;
use crate::record::{ReservationDetails, fields};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GuestBreakdown {
    pub adults: i64,
    pub children: i64,
    pub infants: i64,
    pub total: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GuestContact {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub notes: Option<String>,
}

/// Guest counts from either the current or the legacy field names.
///
/// `total` comes from the explicit total-guest fields only. When none of
/// them is present it is `0`; it is never derived from
/// `adults + children + infants`. Reports without a total field therefore
/// show zero guests overall while listing non-zero per-age counts.
pub fn extract_guest_breakdown(reservation: &ReservationDetails) -> GuestBreakdown {
    let count = |keys: &[&str]| parse_count(reservation.first_present(keys));

    GuestBreakdown {
        adults: count(fields::ADULTS),
        children: count(fields::CHILDREN),
        infants: count(fields::INFANTS),
        total: count(fields::TOTAL_GUESTS),
    }
}

pub fn guest_contact(reservation: &ReservationDetails) -> GuestContact {
    GuestContact {
        name: reservation.text(fields::GUEST_NAME),
        email: reservation.text(fields::GUEST_EMAIL),
        phone: reservation.text(fields::GUEST_PHONE),
        notes: reservation.text(fields::GUEST_NOTES),
    }
}
