//! Financial views: categorized HT/VAT/TTC breakdown, totals, payments.
//!
//! Every amount comes pre-computed from the reporting system. Nothing here
//! recomputes taxes or reconciles the breakdown with the top-level totals;
//! the two are sourced independently upstream and may disagree.

use serde::{Serialize, Serializer};
use std::fmt;

use crate::amount::{parse_amount, parse_count};
use crate::record::{ReservationDetails, fields};

/// Currency used when the record carries none.
pub const DEFAULT_CURRENCY: &str = "EUR";

// ── Categories ──────────────────────────────────────────────────────────────

/// Display groups of the breakdown table, in rendering order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FinancialCategory {
    Accommodation,
    Cleaning,
    AdditionalServices,
    TaxesAndFees,
}

impl FinancialCategory {
    pub const ALL: [FinancialCategory; 4] = [
        Self::Accommodation,
        Self::Cleaning,
        Self::AdditionalServices,
        Self::TaxesAndFees,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Accommodation => "Hébergement",
            Self::Cleaning => "Nettoyage",
            Self::AdditionalServices => "Services additionnels",
            Self::TaxesAndFees => "Taxes et frais",
        }
    }
}

impl fmt::Display for FinancialCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for FinancialCategory {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

// ── Output types ────────────────────────────────────────────────────────────

/// One line of the breakdown table.
///
/// Discounts keep a positive magnitude and are flagged with `is_discount`;
/// the sign is applied when summing and when rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialItem {
    pub label: &'static str,
    #[serde(rename = "amountHT", skip_serializing_if = "Option::is_none")]
    pub amount_ht: Option<f64>,
    #[serde(rename = "amountVAT", skip_serializing_if = "Option::is_none")]
    pub amount_vat: Option<f64>,
    #[serde(rename = "amountTTC", skip_serializing_if = "Option::is_none")]
    pub amount_ttc: Option<f64>,
    pub is_discount: bool,
}

impl FinancialItem {
    fn sign(&self) -> f64 {
        if self.is_discount { -1.0 } else { 1.0 }
    }
}

/// A non-empty category with its items and subtotals.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialBreakdown {
    pub category: FinancialCategory,
    pub items: Vec<FinancialItem>,
    #[serde(rename = "totalHT")]
    pub total_ht: f64,
    #[serde(rename = "totalVAT")]
    pub total_vat: f64,
    #[serde(rename = "totalTTC")]
    pub total_ttc: f64,
}

/// Top-level totals as aggregated by the reporting system.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TotalAmount {
    pub ht: f64,
    pub vat: f64,
    pub ttc: f64,
    pub currency: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositInfo {
    pub has_deposit: bool,
    pub amount: f64,
}

/// Headline figures for the summary card.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialSummary {
    pub currency: String,
    pub total_ttc: f64,
    pub nights: i64,
    pub average_per_night: f64,
    pub accommodation_ttc: f64,
    pub cleaning_ttc: f64,
    pub discount_ttc: f64,
    pub ota_fee: f64,
    pub city_tax: f64,
    pub has_additional_charges: bool,
}

/// Guest-side and host-side payment state.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentOverview {
    pub currency: String,
    pub total_due: f64,
    pub total_paid: f64,
    pub balance_due: f64,
    pub progress_percent: f64,
    pub is_fully_paid: bool,
    pub host_payout: f64,
    pub host_service_fee: f64,
    pub host_net: f64,
    pub total_taxes: f64,
    pub fare_accommodation: Option<f64>,
    /// Only set when it differs from the initial fare.
    pub fare_accommodation_adjusted: Option<f64>,
    pub fare_cleaning: Option<f64>,
}

// ── Line definitions ────────────────────────────────────────────────────────

#[derive(Clone, Copy)]
enum Columns {
    Triplet {
        ht: &'static str,
        vat: &'static str,
        ttc: &'static str,
    },
    TtcOnly(&'static str),
}

#[derive(Clone, Copy)]
enum Include {
    NonZero,
    Positive,
}

impl Include {
    fn admits(self, amount: f64) -> bool {
        match self {
            Self::NonZero => amount != 0.0,
            Self::Positive => amount > 0.0,
        }
    }
}

struct LineSpec {
    category: FinancialCategory,
    label: &'static str,
    columns: Columns,
    include: Include,
    is_discount: bool,
}

const fn triplet(
    category: FinancialCategory,
    label: &'static str,
    [ht, vat, ttc]: [&'static str; 3],
    include: Include,
) -> LineSpec {
    LineSpec {
        category,
        label,
        columns: Columns::Triplet { ht, vat, ttc },
        include,
        is_discount: false,
    }
}

const fn ttc_only(category: FinancialCategory, label: &'static str, field: &'static str) -> LineSpec {
    LineSpec {
        category,
        label,
        columns: Columns::TtcOnly(field),
        include: Include::Positive,
        is_discount: false,
    }
}

use FinancialCategory::{Accommodation, AdditionalServices, Cleaning, TaxesAndFees};

/// Every candidate line, in rendering order within its category.
///
/// The base accommodation amount is kept whenever it is non-zero (a negative
/// base fare is shown); every other line needs a positive amount.
const LINES: &[LineSpec] = &[
    triplet(
        Accommodation,
        "Hébergement de base",
        ["ACCOMODATION_HT", "ACCOMODATION_VAT", "ACCOMODATION_TTC"],
        Include::NonZero,
    ),
    triplet(
        Accommodation,
        "Majoration hébergement",
        ["GROWTH_ACCOMODATION_HT", "GROWTH_ACCOMODATION_VAT", "GROWTH_ACCOMODATION_TTC"],
        Include::Positive,
    ),
    LineSpec {
        is_discount: true,
        ..triplet(
            Accommodation,
            "Remise",
            ["DISCOUNT_HT", "DISCOUNT_VAT", "DISCOUNT_TTC"],
            Include::Positive,
        )
    },
    triplet(
        Cleaning,
        "Nettoyage obligatoire",
        ["MANDATORY_CLEANING_HT", "MANDATORY_CLEANING_VAT", "MANDATORY_CLEANING_TTC"],
        Include::Positive,
    ),
    triplet(
        Cleaning,
        "Nettoyage supplémentaire",
        ["EXTRA_CLEANING_HT", "EXTRA_CLEANING_VAT", "EXTRA_CLEANING_TTC"],
        Include::Positive,
    ),
    triplet(
        AdditionalServices,
        "Check-in anticipé",
        ["EARLY_CI_HT", "EARLY_CI_VAT", "EARLY_CI_TTC"],
        Include::Positive,
    ),
    triplet(
        AdditionalServices,
        "Check-out tardif",
        ["LATE_CO_HT", "LATE_CO_VAT", "LATE_CO_TTC"],
        Include::Positive,
    ),
    triplet(
        AdditionalServices,
        "Service de blanchisserie",
        ["LAUNDRY_HT", "LAUNDRY_VAT", "LAUNDRY_TTC"],
        Include::Positive,
    ),
    triplet(
        AdditionalServices,
        "Restauration",
        ["FOOD_HT", "FOOD_VAT", "FOOD_TTC"],
        Include::Positive,
    ),
    triplet(
        AdditionalServices,
        "Changement de chambre",
        ["ADD_CHARGE_ROOM_UPDATE_HT", "ADD_CHARGE_ROOM_UPDATE_VAT", "ADD_CHARGE_ROOM_UPDATE_TTC"],
        Include::Positive,
    ),
    ttc_only(TaxesAndFees, "Taxe de séjour", "CITY_TAX"),
    ttc_only(TaxesAndFees, "Frais de plateforme", "OTA_FEE"),
];

fn amount(reservation: &ReservationDetails, key: &str) -> f64 {
    parse_amount(reservation.field(key))
}

fn chain_amount(reservation: &ReservationDetails, keys: &[&str]) -> f64 {
    parse_amount(reservation.first_present(keys))
}

impl LineSpec {
    fn read(&self, reservation: &ReservationDetails) -> Option<FinancialItem> {
        let item = match self.columns {
            Columns::Triplet { ht, vat, ttc } => {
                let amount_ht = amount(reservation, ht);
                if !self.include.admits(amount_ht) {
                    return None;
                }
                FinancialItem {
                    label: self.label,
                    amount_ht: Some(amount_ht),
                    amount_vat: Some(amount(reservation, vat)),
                    amount_ttc: Some(amount(reservation, ttc)),
                    is_discount: self.is_discount,
                }
            }
            Columns::TtcOnly(field) => {
                let amount_ttc = amount(reservation, field);
                if !self.include.admits(amount_ttc) {
                    return None;
                }
                FinancialItem {
                    label: self.label,
                    amount_ht: None,
                    amount_vat: None,
                    amount_ttc: Some(amount_ttc),
                    is_discount: self.is_discount,
                }
            }
        };
        Some(item)
    }
}

// ── Extractors ──────────────────────────────────────────────────────────────

/// Group the raw amount fields into ordered, non-empty categories.
///
/// Subtotals sum each column over the included items; a discount subtracts
/// its magnitude. An item without a column (tax lines have TTC only)
/// contributes nothing to that column.
pub fn extract_financial_breakdown(reservation: &ReservationDetails) -> Vec<FinancialBreakdown> {
    FinancialCategory::ALL
        .into_iter()
        .filter_map(|category| {
            let items: Vec<FinancialItem> = LINES
                .iter()
                .filter(|line| line.category == category)
                .filter_map(|line| line.read(reservation))
                .collect();
            if items.is_empty() {
                return None;
            }

            let column_total = |column: fn(&FinancialItem) -> Option<f64>| -> f64 {
                items.iter().map(|item| column(item).unwrap_or(0.0) * item.sign()).sum()
            };
            let total_ht = column_total(|item| item.amount_ht);
            let total_vat = column_total(|item| item.amount_vat);
            let total_ttc = column_total(|item| item.amount_ttc);

            Some(FinancialBreakdown {
                category,
                items,
                total_ht,
                total_vat,
                total_ttc,
            })
        })
        .collect()
}

/// Currency code of the record, `EUR` when absent.
pub fn currency(reservation: &ReservationDetails) -> String {
    reservation
        .text(fields::CURRENCY)
        .unwrap_or_else(|| DEFAULT_CURRENCY.to_string())
}

pub fn calculate_total_amount(reservation: &ReservationDetails) -> TotalAmount {
    TotalAmount {
        ht: chain_amount(reservation, fields::TOTAL_HT),
        vat: chain_amount(reservation, fields::TOTAL_VAT),
        ttc: chain_amount(reservation, fields::TOTAL_TTC),
        currency: currency(reservation),
    }
}

pub fn deposit_info(reservation: &ReservationDetails) -> DepositInfo {
    let amount = chain_amount(reservation, fields::DEPOSIT);
    DepositInfo {
        has_deposit: amount > 0.0,
        amount,
    }
}

pub fn financial_summary(reservation: &ReservationDetails) -> FinancialSummary {
    let total_ttc = chain_amount(reservation, fields::TOTAL_TTC);
    let nights = parse_count(reservation.first_present(fields::NIGHTS));
    let average_per_night = if nights > 0 { total_ttc / nights as f64 } else { 0.0 };

    let has_additional_charges = ["EARLY_CI_TTC", "LATE_CO_TTC", "LAUNDRY_TTC", "FOOD_TTC"]
        .iter()
        .any(|key| amount(reservation, key) > 0.0);

    FinancialSummary {
        currency: currency(reservation),
        total_ttc,
        nights,
        average_per_night,
        accommodation_ttc: amount(reservation, "ACCOMODATION_TTC"),
        cleaning_ttc: amount(reservation, "MANDATORY_CLEANING_TTC") + amount(reservation, "EXTRA_CLEANING_TTC"),
        discount_ttc: amount(reservation, "DISCOUNT_TTC"),
        ota_fee: amount(reservation, "OTA_FEE"),
        city_tax: amount(reservation, "CITY_TAX"),
        has_additional_charges,
    }
}

pub fn payment_overview(reservation: &ReservationDetails) -> PaymentOverview {
    let total_due = chain_amount(reservation, fields::TOTAL_DUE);
    let total_paid = chain_amount(reservation, fields::TOTAL_PAID);
    let balance_due = reservation
        .first_present(fields::BALANCE_DUE)
        .map(|v| parse_amount(Some(v)))
        .unwrap_or(total_due - total_paid);
    let progress_percent = if total_due > 0.0 { total_paid / total_due * 100.0 } else { 0.0 };

    let host_payout = chain_amount(reservation, fields::HOST_PAYOUT);
    let host_service_fee = chain_amount(reservation, fields::HOST_SERVICE_FEE);

    let nonzero = |keys: &[&str]| Some(chain_amount(reservation, keys)).filter(|v| *v != 0.0);
    let fare_accommodation = nonzero(fields::FARE_ACCOMMODATION);
    let fare_accommodation_adjusted =
        nonzero(fields::FARE_ACCOMMODATION_ADJUSTED).filter(|adjusted| Some(*adjusted) != fare_accommodation);

    PaymentOverview {
        currency: currency(reservation),
        total_due,
        total_paid,
        balance_due,
        progress_percent,
        is_fully_paid: balance_due <= 0.0,
        host_payout,
        host_service_fee,
        host_net: host_payout - host_service_fee,
        total_taxes: chain_amount(reservation, fields::TOTAL_TAXES),
        fare_accommodation,
        fare_accommodation_adjusted,
        fare_cleaning: nonzero(fields::FARE_CLEANING),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: serde_json::Value) -> ReservationDetails {
        ReservationDetails::from_value(value)
    }

    #[test]
    fn empty_record_has_no_categories() {
        assert!(extract_financial_breakdown(&ReservationDetails::new()).is_empty());
    }

    #[test]
    fn discount_is_subtracted_from_accommodation() {
        let r = record(json!({
            "ACCOMODATION_HT": 100, "ACCOMODATION_VAT": 20, "ACCOMODATION_TTC": 120,
            "DISCOUNT_HT": 10, "DISCOUNT_VAT": 2, "DISCOUNT_TTC": 12
        }));
        let breakdown = extract_financial_breakdown(&r);
        assert_eq!(breakdown.len(), 1);

        let acc = &breakdown[0];
        assert_eq!(acc.category, FinancialCategory::Accommodation);
        assert_eq!(acc.items.len(), 2);
        assert!(!acc.items[0].is_discount);
        assert!(acc.items[1].is_discount);
        assert_eq!(acc.items[1].amount_ht, Some(10.0));
        assert_eq!(acc.total_ht, 90.0);
        assert_eq!(acc.total_vat, 18.0);
        assert_eq!(acc.total_ttc, 108.0);
    }

    #[test]
    fn negative_base_fare_is_kept_but_negative_surcharge_is_not() {
        let r = record(json!({ "ACCOMODATION_HT": -50, "GROWTH_ACCOMODATION_HT": -5 }));
        let breakdown = extract_financial_breakdown(&r);
        assert_eq!(breakdown[0].items.len(), 1);
        assert_eq!(breakdown[0].items[0].label, "Hébergement de base");
        assert_eq!(breakdown[0].total_ht, -50.0);
    }

    #[test]
    fn categories_come_out_in_fixed_order() {
        let r = record(json!({
            "OTA_FEE": "15.5",
            "LAUNDRY_HT": 10, "LAUNDRY_VAT": 2, "LAUNDRY_TTC": 12,
            "FOOD_HT": 5,
            "EXTRA_CLEANING_HT": 30, "EXTRA_CLEANING_TTC": 36,
            "MANDATORY_CLEANING_HT": 40, "MANDATORY_CLEANING_TTC": 48
        }));
        let breakdown = extract_financial_breakdown(&r);
        let categories: Vec<_> = breakdown.iter().map(|b| b.category).collect();
        assert_eq!(
            categories,
            vec![
                FinancialCategory::Cleaning,
                FinancialCategory::AdditionalServices,
                FinancialCategory::TaxesAndFees
            ]
        );

        let cleaning_labels: Vec<_> = breakdown[0].items.iter().map(|i| i.label).collect();
        assert_eq!(cleaning_labels, vec!["Nettoyage obligatoire", "Nettoyage supplémentaire"]);
        assert_eq!(breakdown[0].total_ttc, 84.0);

        let services: Vec<_> = breakdown[1].items.iter().map(|i| i.label).collect();
        assert_eq!(services, vec!["Service de blanchisserie", "Restauration"]);
        assert_eq!(breakdown[1].total_ht, 15.0);
        assert_eq!(breakdown[1].total_vat, 2.0);
    }

    #[test]
    fn tax_lines_only_carry_ttc() {
        let r = record(json!({ "CITY_TAX": 4.4, "OTA_FEE": 10 }));
        let taxes = &extract_financial_breakdown(&r)[0];
        assert_eq!(taxes.category, FinancialCategory::TaxesAndFees);
        assert_eq!(taxes.items[0].amount_ht, None);
        assert_eq!(taxes.total_ht, 0.0);
        assert_eq!(taxes.total_vat, 0.0);
        assert!((taxes.total_ttc - 14.4).abs() < 1e-9);
    }

    #[test]
    fn malformed_amounts_drop_the_line() {
        let r = record(json!({ "MANDATORY_CLEANING_HT": "n/a", "EARLY_CI_HT": "0" }));
        assert!(extract_financial_breakdown(&r).is_empty());
    }

    #[test]
    fn totals_use_aliases_and_default_currency() {
        let r = record(json!({ "TOTAL_HT": "100", "TOTAL_VAT": 20, "total_ttc": 120 }));
        let total = calculate_total_amount(&r);
        assert_eq!(total, TotalAmount { ht: 100.0, vat: 20.0, ttc: 120.0, currency: "EUR".into() });

        let r = record(json!({ "TOTAL_TTC": 80, "total_ttc": 120, "money_currency": "USD" }));
        let total = calculate_total_amount(&r);
        assert_eq!(total.ttc, 80.0);
        assert_eq!(total.currency, "USD");
    }

    #[test]
    fn deposit() {
        assert_eq!(deposit_info(&ReservationDetails::new()), DepositInfo { has_deposit: false, amount: 0.0 });
        let r = record(json!({ "DEPOSIT_WITHDRAW": "300" }));
        assert_eq!(deposit_info(&r), DepositInfo { has_deposit: true, amount: 300.0 });
    }

    #[test]
    fn summary_average_per_night() {
        let r = record(json!({
            "TOTAL_TTC": 450, "NUMBER_OF_NIGHTS": 3,
            "MANDATORY_CLEANING_TTC": 40, "EXTRA_CLEANING_TTC": 10,
            "LATE_CO_TTC": 25
        }));
        let s = financial_summary(&r);
        assert_eq!(s.average_per_night, 150.0);
        assert_eq!(s.cleaning_ttc, 50.0);
        assert!(s.has_additional_charges);

        let s = financial_summary(&record(json!({ "TOTAL_TTC": 450 })));
        assert_eq!(s.nights, 0);
        assert_eq!(s.average_per_night, 0.0);
        assert!(!s.has_additional_charges);
    }

    #[test]
    fn payment_balance_falls_back_to_due_minus_paid() {
        let r = record(json!({ "TOTAL_TTC": 200, "money_totalPaid": 50 }));
        let p = payment_overview(&r);
        assert_eq!(p.balance_due, 150.0);
        assert_eq!(p.progress_percent, 25.0);
        assert!(!p.is_fully_paid);

        let r = record(json!({ "money_fareAccommodation": 200, "money_totalPaid": 200, "money_balanceDue": 0 }));
        let p = payment_overview(&r);
        assert_eq!(p.total_due, 200.0);
        assert!(p.is_fully_paid);
        assert_eq!(p.progress_percent, 100.0);
    }

    #[test]
    fn payment_host_side_and_fares() {
        let r = record(json!({
            "money_hostPayout": 180, "money_hostServiceFee": 20, "CITY_TAX": 6,
            "money_fareAccommodation": 150, "money_fareAccommodationAdjusted": 150,
            "money_fareCleaning": 0
        }));
        let p = payment_overview(&r);
        assert_eq!(p.host_net, 160.0);
        assert_eq!(p.total_taxes, 6.0);
        assert_eq!(p.fare_accommodation, Some(150.0));
        assert_eq!(p.fare_accommodation_adjusted, None);
        assert_eq!(p.fare_cleaning, None);
        assert_eq!(p.progress_percent, 0.0);
    }

    #[test]
    fn breakdown_serializes_with_display_labels() {
        let r = record(json!({ "CITY_TAX": 2 }));
        let value = serde_json::to_value(extract_financial_breakdown(&r)).unwrap();
        assert_eq!(
            value,
            json!([{
                "category": "Taxes et frais",
                "items": [{ "label": "Taxe de séjour", "amountTTC": 2.0, "isDiscount": false }],
                "totalHT": 0.0, "totalVAT": 0.0, "totalTTC": 2.0
            }])
        );
    }
}
