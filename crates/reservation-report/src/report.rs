//! Report assembly and output (console summary, JSON, CSV)

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use csv::Writer;
use serde::Serialize;
use serde_json::Value;
use std::fmt::Write as _;
use std::io::Read;
use std::path::Path;

use reservation_details::format::{
    DatePattern, format_currency, format_date, format_nights, format_percent, format_signed_currency,
};
use reservation_details::record::fields;
use reservation_details::{
    DateInformation, DepositInfo, DisplayPlatform, DisplayStatus, FinancialBreakdown, FinancialItem, FinancialSummary,
    GuestBreakdown, GuestContact, ListingInfo, PaymentOverview, ReservationDetails, TimelineEvent, TotalAmount,
    build_timeline, calculate_total_amount, deposit_info, extract_date_information, extract_financial_breakdown,
    extract_guest_breakdown, financial_summary, get_display_platform, get_display_status, guest_contact,
    listing_info, payment_overview,
};

const BANNER: &str = "══════════════════════════════════════════════════";
const RULE: &str = "─────────────────────────────────────────────";

/// Every display view of one reservation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationReport {
    pub confirmation_code: Option<String>,
    pub currency: String,
    pub status: DisplayStatus,
    pub platform: DisplayPlatform,
    pub listing: ListingInfo,
    pub dates: DateInformation,
    pub guests: GuestBreakdown,
    pub contact: GuestContact,
    pub breakdown: Vec<FinancialBreakdown>,
    pub totals: TotalAmount,
    pub deposit: DepositInfo,
    pub summary: FinancialSummary,
    pub payment: PaymentOverview,
    pub timeline: Vec<TimelineEvent>,
    /// When the reporting system produced the record, if it says so
    pub generated_at: Option<String>,
}

impl ReservationReport {
    pub fn build(reservation: &ReservationDetails, now: DateTime<Utc>) -> Self {
        Self::build_with_currency(reservation, now, reservation_details::financial::DEFAULT_CURRENCY)
    }

    /// Like [`Self::build`], using `fallback_currency` when the record has no
    /// currency of its own.
    pub fn build_with_currency(reservation: &ReservationDetails, now: DateTime<Utc>, fallback_currency: &str) -> Self {
        let currency = reservation
            .text(fields::CURRENCY)
            .unwrap_or_else(|| fallback_currency.to_string());

        let mut totals = calculate_total_amount(reservation);
        let mut summary = financial_summary(reservation);
        let mut payment = payment_overview(reservation);
        totals.currency.clone_from(&currency);
        summary.currency.clone_from(&currency);
        payment.currency.clone_from(&currency);

        Self {
            confirmation_code: reservation.confirmation_code(),
            currency,
            status: get_display_status(reservation),
            platform: get_display_platform(reservation),
            listing: listing_info(reservation),
            dates: extract_date_information(reservation),
            guests: extract_guest_breakdown(reservation),
            contact: guest_contact(reservation),
            breakdown: extract_financial_breakdown(reservation),
            totals,
            deposit: deposit_info(reservation),
            summary,
            payment,
            timeline: build_timeline(reservation, now),
            generated_at: reservation.text(fields::REPORT_GENERATED_AT),
        }
    }
}

// =============================================================================
// Input
// =============================================================================

/// Parse a record given either bare or wrapped in the API envelope
/// (`{"data": {...}}`).
pub fn parse_record(content: &str) -> Result<ReservationDetails> {
    let value: Value = serde_json::from_str(content).context("Reservation input is not valid JSON")?;
    match value {
        Value::Object(mut map) => match map.remove("data") {
            Some(data @ Value::Object(_)) => Ok(ReservationDetails::from_value(data)),
            Some(other) => {
                map.insert("data".to_string(), other);
                Ok(ReservationDetails::from(map))
            }
            None => Ok(ReservationDetails::from(map)),
        },
        _ => bail!("Reservation input must be a JSON object"),
    }
}

/// Read a record from `path`, or from stdin when `path` is `-`.
pub fn load_record(path: &Path) -> Result<ReservationDetails> {
    let content = if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read reservation from stdin")?;
        buf
    } else {
        std::fs::read_to_string(path).with_context(|| format!("Failed to read reservation file: {}", path.display()))?
    };
    parse_record(&content).with_context(|| format!("Invalid reservation in {}", path.display()))
}

// =============================================================================
// Output
// =============================================================================

pub fn to_json(report: &ReservationReport) -> Result<String> {
    serde_json::to_string_pretty(report).context("Failed to serialize report")
}

/// Write breakdown.csv: one row per line item plus one subtotal row per
/// category. Amounts are unsigned magnitudes; discounts are flagged.
pub fn write_breakdown_csv(path: &Path, report: &ReservationReport) -> Result<()> {
    let mut wtr = Writer::from_path(path).with_context(|| format!("Failed to create {}", path.display()))?;

    wtr.write_record(["Category", "Item", "HT", "VAT", "TTC", "Discount"])?;

    let cell = |amount: Option<f64>| amount.map(|a| format!("{:.2}", a)).unwrap_or_default();

    for group in &report.breakdown {
        let category = group.category.label();
        for item in &group.items {
            wtr.write_record([
                category,
                item.label,
                &cell(item.amount_ht),
                &cell(item.amount_vat),
                &cell(item.amount_ttc),
                if item.is_discount { "yes" } else { "no" },
            ])?;
        }
        wtr.write_record([
            category,
            "Sous-total",
            &format!("{:.2}", group.total_ht),
            &format!("{:.2}", group.total_vat),
            &format!("{:.2}", group.total_ttc),
            "",
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

fn item_amount(item: &FinancialItem, amount: Option<f64>, currency: &str) -> String {
    match amount {
        Some(a) if item.is_discount => format_signed_currency(a, currency),
        Some(a) => format_currency(Some(a), currency),
        None => "-".to_string(),
    }
}

/// Console layout of a report.
pub fn render_report(report: &ReservationReport) -> String {
    let cur = report.currency.as_str();
    let mut out = String::new();

    // Writing into a String cannot fail.
    let _ = write_report(&mut out, report, cur);
    out
}

fn write_report(out: &mut String, report: &ReservationReport, cur: &str) -> std::fmt::Result {
    let code = report.confirmation_code.as_deref().unwrap_or("-");

    writeln!(out, "\n{BANNER}")?;
    writeln!(out, "  RÉSERVATION {code}")?;
    writeln!(out, "{BANNER}")?;
    writeln!(out, "    Statut:       {} ({})", report.status.label, report.status.status)?;
    writeln!(out, "    Plateforme:   {}", report.platform.label)?;
    if let Some(name) = &report.listing.name {
        writeln!(out, "    Logement:     {name}")?;
    }
    if let Some(address) = &report.listing.address {
        writeln!(out, "    Adresse:      {address}")?;
    }
    if let Some(internal_ref) = &report.listing.internal_ref {
        writeln!(out, "    Référence:    {internal_ref}")?;
    }

    // Stay
    let dates = &report.dates;
    let guests = &report.guests;
    writeln!(out, "\n  SÉJOUR")?;
    writeln!(out, "  {RULE}")?;
    writeln!(out, "    Réservée le:  {}", format_date(dates.booking.as_deref(), DatePattern::DateTime))?;
    writeln!(out, "    Arrivée:      {}", format_date(dates.checkin.as_deref(), DatePattern::Long))?;
    writeln!(out, "    Départ:       {}", format_date(dates.checkout.as_deref(), DatePattern::Long))?;
    writeln!(out, "    Durée:        {}", format_nights(dates.nights))?;
    writeln!(
        out,
        "    Voyageurs:    {} ({} adulte(s), {} enfant(s), {} bébé(s))",
        guests.total, guests.adults, guests.children, guests.infants
    )?;
    if let Some(cancelled) = dates.cancellation.as_deref() {
        writeln!(out, "    Annulée le:   {}", format_date(Some(cancelled), DatePattern::DateTime))?;
    }
    if let Some(name) = &report.contact.name {
        writeln!(out, "    Client:       {name}")?;
    }

    // Financial breakdown
    writeln!(out, "\n  DÉTAIL FINANCIER ({cur})")?;
    writeln!(out, "  {RULE}")?;
    if report.breakdown.is_empty() {
        writeln!(out, "    Aucune ligne financière")?;
    }
    for group in &report.breakdown {
        writeln!(out, "    {}", group.category)?;
        for item in &group.items {
            writeln!(
                out,
                "      {:<26} HT {:>14}  TVA {:>12}  TTC {:>14}",
                item.label,
                item_amount(item, item.amount_ht, cur),
                item_amount(item, item.amount_vat, cur),
                item_amount(item, item.amount_ttc, cur),
            )?;
        }
        writeln!(
            out,
            "      {:<26} HT {:>14}  TVA {:>12}  TTC {:>14}",
            "Sous-total",
            format_currency(Some(group.total_ht), cur),
            format_currency(Some(group.total_vat), cur),
            format_currency(Some(group.total_ttc), cur),
        )?;
    }

    // Payment
    let payment = &report.payment;
    writeln!(out, "\n  PAIEMENT")?;
    writeln!(out, "  {RULE}")?;
    writeln!(
        out,
        "    Payé:         {} / {} ({})",
        format_currency(Some(payment.total_paid), cur),
        format_currency(Some(payment.total_due), cur),
        format_percent(payment.progress_percent)
    )?;
    if payment.is_fully_paid {
        writeln!(out, "    Solde:        payé intégralement")?;
    } else {
        writeln!(out, "    Solde dû:     {}", format_currency(Some(payment.balance_due), cur))?;
    }
    if report.deposit.has_deposit {
        writeln!(out, "    Caution:      {}", format_currency(Some(report.deposit.amount), cur))?;
    }
    if payment.host_payout != 0.0 {
        writeln!(out, "    Versement hôte: {}", format_currency(Some(payment.host_net), cur))?;
    }

    // Timeline
    if !report.timeline.is_empty() {
        writeln!(out, "\n  CHRONOLOGIE")?;
        writeln!(out, "  {RULE}")?;
        for event in &report.timeline {
            let marker = if event.is_past { "✓" } else { "·" };
            writeln!(
                out,
                "    {marker} {:<24} {}",
                format_date(Some(&event.date), DatePattern::DateTime),
                event.label
            )?;
        }
    }

    let summary = &report.summary;
    writeln!(out, "\n  {BANNER}")?;
    writeln!(out, "  TOTAL TTC:    {}", format_currency(Some(report.totals.ttc), cur))?;
    if summary.nights > 0 {
        writeln!(out, "  PAR NUIT:     {}", format_currency(Some(summary.average_per_night), cur))?;
    }
    writeln!(out, "  {BANNER}")?;
    Ok(())
}

pub fn print_report(report: &ReservationReport) {
    print!("{}", render_report(report));
}
