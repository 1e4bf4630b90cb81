//! Display-ready views of a JHMH reservation record.
//!
//! The reporting API hands back one flat record with dozens of optional,
//! loosely typed fields. Everything here is a pure function over a borrowed
//! [`ReservationDetails`]: missing or malformed data degrades to `0`, `None`
//! or an `UNKNOWN` label instead of an error, because the upstream system is
//! the authority on correctness and this layer only reshapes what it sent.

pub mod amount;
pub mod dates;
pub mod financial;
pub mod format;
pub mod guests;
pub mod labels;
pub mod record;
pub mod sections;

pub use amount::{parse_amount, parse_count};
pub use dates::{
    DateInformation, ListingInfo, TimelineEvent, TimelineVariant, build_timeline, extract_date_information,
    listing_info, parse_timestamp,
};
pub use financial::{
    DepositInfo, FinancialBreakdown, FinancialCategory, FinancialItem, FinancialSummary, PaymentOverview,
    TotalAmount, calculate_total_amount, deposit_info, extract_financial_breakdown, financial_summary,
    payment_overview,
};
pub use guests::{GuestBreakdown, GuestContact, extract_guest_breakdown, guest_contact};
pub use labels::{BadgeVariant, DisplayPlatform, DisplayStatus, get_display_platform, get_display_status};
pub use record::ReservationDetails;
pub use sections::ExpandedSections;
