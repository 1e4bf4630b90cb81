//! The raw reservation record as returned by the reporting API.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Alias chains for logical fields.
///
/// The reporting API has renamed fields across report versions, so one
/// logical attribute may arrive under any of several keys. Each chain lists
/// the candidates in priority order; the first present key wins.
pub mod fields {
    // ── Identity ──────────────────────────────────────────────────────────
    pub const CONFIRMATION_CODE: &[&str] = &["confirmationCode"];
    pub const INTERNAL_REF: &[&str] = &["REF"];
    pub const LISTING_ID: &[&str] = &["listing_id"];

    // ── Lifecycle dates ───────────────────────────────────────────────────
    pub const BOOKING_DATE: &[&str] = &["DTE_CREATE"];
    pub const CONFIRMATION_DATE: &[&str] = &["DTE_CONFIRM"];
    pub const CHECKIN: &[&str] = &["DTE_CI", "checkin_date", "reservation_checkIn"];
    pub const CHECKOUT: &[&str] = &["DTE_CO", "checkout_date", "reservation_checkOut"];
    pub const CANCELLATION_DATE: &[&str] = &["DTE_CANCELED", "reservation_canceledAt"];
    pub const LAST_MODIFIED: &[&str] = &["DTE_MOD", "reservation_lastUpdatedAt"];
    pub const NIGHTS: &[&str] = &["NUMBER_OF_NIGHTS", "nights", "nightsCount"];
    pub const REPORT_GENERATED_AT: &[&str] = &["reportGenerationTimestamp"];

    // ── Guests ────────────────────────────────────────────────────────────
    pub const ADULTS: &[&str] = &["NUMBER_GUEST_ADULT", "reservation_numberOfAdults"];
    pub const CHILDREN: &[&str] = &["NUMBER_GUEST_CHILD", "reservation_numberOfChildren"];
    pub const INFANTS: &[&str] = &["NUMBER_GUEST_INFANT", "reservation_numberOfInfants"];
    pub const TOTAL_GUESTS: &[&str] = &["NUMBER_OF_GUESTS", "number_of_guests", "reservation_guestsCount"];
    pub const GUEST_NAME: &[&str] = &["GUEST_NAME", "guest_fullName", "guest_name"];
    pub const GUEST_EMAIL: &[&str] = &["GUEST_EMAIL", "guest_email"];
    pub const GUEST_PHONE: &[&str] = &["guest_phone"];
    pub const GUEST_NOTES: &[&str] = &["guest_notes", "reservation_notes"];

    // ── Listing ───────────────────────────────────────────────────────────
    pub const LISTING_NAME: &[&str] = &["LISTING_NAME", "reservation_listing_nickname", "listing_name"];
    pub const LISTING_ADDRESS: &[&str] = &["reservation_listing_full_address"];

    // ── Status and platform ───────────────────────────────────────────────
    pub const STATUS: &[&str] = &["STATE", "status"];
    pub const PLATFORM: &[&str] = &["PLATFORM", "ota", "reservation_source"];

    // ── Totals ────────────────────────────────────────────────────────────
    pub const TOTAL_HT: &[&str] = &["TOTAL_HT"];
    pub const TOTAL_VAT: &[&str] = &["TOTAL_VAT"];
    pub const TOTAL_TTC: &[&str] = &["TOTAL_TTC", "total_ttc"];
    pub const CURRENCY: &[&str] = &["currency", "money_currency"];

    // ── Payments ──────────────────────────────────────────────────────────
    pub const TOTAL_DUE: &[&str] = &["TOTAL_TTC", "total_ttc", "money_fareAccommodation"];
    pub const TOTAL_PAID: &[&str] = &["money_totalPaid"];
    pub const BALANCE_DUE: &[&str] = &["money_balanceDue"];
    pub const HOST_PAYOUT: &[&str] = &["money_hostPayout"];
    pub const HOST_SERVICE_FEE: &[&str] = &["money_hostServiceFee"];
    pub const TOTAL_TAXES: &[&str] = &["money_totalTaxes", "CITY_TAX"];
    pub const FARE_ACCOMMODATION: &[&str] = &["money_fareAccommodation"];
    pub const FARE_ACCOMMODATION_ADJUSTED: &[&str] = &["money_fareAccommodationAdjusted"];
    pub const FARE_CLEANING: &[&str] = &["money_fareCleaning"];
    pub const DEPOSIT: &[&str] = &["DEPOSIT_WITHDRAW"];
}

/// A flat reservation record where every field is independently optional.
///
/// Unknown keys are kept as-is so the record round-trips through JSON.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReservationDetails {
    fields: Map<String, Value>,
}

impl ReservationDetails {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a record from any JSON value. Anything but an object yields an
    /// empty record.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(fields) => Self { fields },
            _ => Self::default(),
        }
    }

    /// Set a field, replacing any previous value.
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(key.to_string(), value.into());
        self
    }

    /// Look up one key. JSON `null` counts as absent.
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key).filter(|v| !v.is_null())
    }

    /// First present value along an alias chain.
    ///
    /// Only absent or `null` keys fall through; an empty string or `0` wins.
    pub fn first_present(&self, keys: &[&str]) -> Option<&Value> {
        keys.iter().find_map(|key| self.field(key))
    }

    /// First present value along an alias chain, rendered as text.
    pub fn text(&self, keys: &[&str]) -> Option<String> {
        self.first_present(keys).map(value_text)
    }

    pub fn confirmation_code(&self) -> Option<String> {
        self.text(fields::CONFIRMATION_CODE)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl From<Map<String, Value>> for ReservationDetails {
    fn from(fields: Map<String, Value>) -> Self {
        Self { fields }
    }
}

/// Strings verbatim, every other value by its JSON text.
fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn null_counts_as_absent() {
        let r = ReservationDetails::from_value(json!({ "DTE_CI": null, "checkin_date": "2025-06-01" }));
        assert!(r.field("DTE_CI").is_none());
        assert_eq!(r.text(fields::CHECKIN).as_deref(), Some("2025-06-01"));
    }

    #[test]
    fn empty_string_and_zero_win_the_chain() {
        let r = ReservationDetails::new()
            .with("DTE_CI", "")
            .with("checkin_date", "2025-06-01")
            .with("NUMBER_OF_NIGHTS", 0)
            .with("nights", 4);
        assert_eq!(r.text(fields::CHECKIN).as_deref(), Some(""));
        assert_eq!(r.first_present(fields::NIGHTS), Some(&json!(0)));
    }

    #[test]
    fn non_object_value_is_empty_record() {
        assert!(ReservationDetails::from_value(json!([1, 2, 3])).is_empty());
        assert!(ReservationDetails::from_value(Value::Null).is_empty());
    }

    #[test]
    fn non_string_scalars_render_as_json_text() {
        let r = ReservationDetails::new().with("confirmationCode", 12345);
        assert_eq!(r.confirmation_code().as_deref(), Some("12345"));
    }

    #[test]
    fn round_trips_unknown_fields() {
        let raw = json!({ "confirmationCode": "HM123", "SOMETHING_NEW": [1, 2] });
        let r: ReservationDetails = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(serde_json::to_value(&r).unwrap(), raw);
    }
}
