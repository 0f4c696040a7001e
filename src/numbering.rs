//! Document-number generation.
//!
//! Business documents carry human-readable numbers of the form
//! `<PREFIX>-<OFFICE>-<YYYYMM>-<NNN>`, where the serial restarts every
//! month per office. The serial is derived by counting existing rows that
//! match the prefix, so the count query and the insert it precedes must
//! share one transaction.

use chrono::{Datelike, NaiveDate};

/// Document families that use the office/month serial scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Enquiry,
    ProposalRequest,
    Proposal,
    WorkOrder,
    InvoiceRequest,
    PaymentReceipt,
}

impl DocumentKind {
    pub fn prefix(self) -> &'static str {
        match self {
            DocumentKind::Enquiry => "ENQ",
            DocumentKind::ProposalRequest => "PR",
            DocumentKind::Proposal => "PROP",
            DocumentKind::WorkOrder => "WO",
            DocumentKind::InvoiceRequest => "INV",
            DocumentKind::PaymentReceipt => "RCP",
        }
    }
}

/// Prefix shared by all numbers of `kind` raised by `office_code` in the
/// month containing `date`, e.g. `INV-RO-DEL-202508`.
pub fn month_prefix(kind: DocumentKind, office_code: &str, date: NaiveDate) -> String {
    format!(
        "{}-{}-{}{:02}",
        kind.prefix(),
        office_code,
        date.year(),
        date.month()
    )
}

/// Full document number for the `existing + 1`-th document under `prefix`.
pub fn serial_number(prefix: &str, existing: u64) -> String {
    format!("{}-{:03}", prefix, existing + 1)
}

/// Grievance tickets use a yearly global serial: `GRV/YYYY/NNNNNN`.
pub fn grievance_number(year: i32, existing: u64) -> String {
    format!("GRV/{}/{:06}", year, existing + 1)
}

/// Prefix matching every grievance ticket of `year`.
pub fn grievance_prefix(year: i32) -> String {
    format!("GRV/{}/", year)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn aug_2025() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 8, 6).unwrap()
    }

    #[test]
    fn invoice_prefix_format() {
        assert_eq!(
            month_prefix(DocumentKind::InvoiceRequest, "RO-DEL", aug_2025()),
            "INV-RO-DEL-202508"
        );
    }

    #[test]
    fn receipt_prefix_format() {
        assert_eq!(
            month_prefix(DocumentKind::PaymentReceipt, "HQ", aug_2025()),
            "RCP-HQ-202508"
        );
    }

    #[test]
    fn month_is_zero_padded() {
        let jan = NaiveDate::from_ymd_opt(2026, 1, 2).unwrap();
        assert_eq!(
            month_prefix(DocumentKind::Enquiry, "HQ", jan),
            "ENQ-HQ-202601"
        );
    }

    #[test]
    fn serial_starts_at_one() {
        assert_eq!(serial_number("INV-HQ-202508", 0), "INV-HQ-202508-001");
        assert_eq!(serial_number("INV-HQ-202508", 41), "INV-HQ-202508-042");
    }

    #[test]
    fn serial_grows_past_three_digits() {
        assert_eq!(serial_number("RCP-HQ-202508", 999), "RCP-HQ-202508-1000");
    }

    #[test]
    fn grievance_numbers_use_yearly_serial() {
        assert_eq!(grievance_number(2025, 0), "GRV/2025/000001");
        assert_eq!(grievance_number(2025, 122), "GRV/2025/000123");
        assert_eq!(grievance_prefix(2025), "GRV/2025/");
    }
}
