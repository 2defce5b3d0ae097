//! # Totals Engine
//!
//! Pure monetary arithmetic for documents: per-line totals, document
//! aggregates, display formatting, and the form-input coercion policy.
//!
//! Everything here is deterministic and side-effect free. Full `f64`
//! precision is kept until [`format_amount`] — the one place rounding is
//! allowed to happen.
//!
//! Two tax models exist:
//! - **line-taxed** (invoices): each item carries its own rate, and the
//!   document tax is the sum of the per-line tax amounts;
//! - **document-taxed** (purchase orders): a single VAT percentage applied
//!   once to the subtotal.

use serde::{Deserialize, Serialize};

use super::types::{InvoiceItem, OrderItem};

/// Document-level monetary aggregates.
///
/// Derived, never stored independently of its inputs: callers recompute a
/// fresh value from current line items whenever one is needed, so the
/// preview and a persisted snapshot can never diverge from the form state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Totals {
    pub subtotal: f64,
    pub total_tax: f64,
    /// `subtotal + total_tax - discount`. Deliberately unclamped: a
    /// discount larger than subtotal + tax produces a negative value.
    pub grand_total: f64,
}

/// Per-line total: `quantity * unit_price * (1 + tax_rate / 100)`.
pub fn line_total(quantity: f64, unit_price: f64, tax_rate: f64) -> f64 {
    let line_subtotal = quantity * unit_price;
    line_subtotal + line_subtotal * (tax_rate / 100.0)
}

/// Totals for a line-taxed document (invoice).
pub fn invoice_totals(items: &[InvoiceItem], discount: f64) -> Totals {
    let subtotal: f64 = items.iter().map(|it| it.quantity * it.unit_price).sum();
    let total_tax: f64 = items
        .iter()
        .map(|it| it.quantity * it.unit_price * (it.tax_rate / 100.0))
        .sum();
    Totals {
        subtotal,
        total_tax,
        grand_total: subtotal + total_tax - discount,
    }
}

/// Totals for a document-taxed document (purchase order).
///
/// VAT is applied once to the subtotal, not per line, and purchase orders
/// carry no discount.
pub fn order_totals(items: &[OrderItem], vat_percent: f64) -> Totals {
    let subtotal: f64 = items.iter().map(|it| it.quantity * it.unit_price).sum();
    let total_tax = subtotal * (vat_percent / 100.0);
    Totals {
        subtotal,
        total_tax,
        grand_total: subtotal + total_tax,
    }
}

/// Coerce raw form input to a number.
///
/// Policy: NaN-or-invalid → 0. Malformed text, empty strings and
/// non-finite values all become `0.0`; nothing is surfaced to the user.
pub fn coerce_number(raw: &str) -> f64 {
    match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => value,
        _ => 0.0,
    }
}

/// Format a currency amount for display: exactly 3 fractional digits.
pub fn format_amount(value: f64) -> String {
    format!("{:.3}", value)
}

/// Format a tax rate for display: exactly 2 fractional digits.
pub fn format_rate(value: f64) -> String {
    format!("{:.2}", value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn item(quantity: f64, unit_price: f64, tax_rate: f64) -> InvoiceItem {
        let mut it = InvoiceItem::new(0);
        it.quantity = quantity;
        it.unit_price = unit_price;
        it.tax_rate = tax_rate;
        it.recompute();
        it
    }

    fn order_item(quantity: f64, unit_price: f64) -> OrderItem {
        OrderItem {
            quantity,
            unit_price,
            ..OrderItem::new()
        }
    }

    #[test]
    fn test_line_total_formula() {
        // lineTotal == q*p*(1+t/100) within 1e-9
        let cases = [
            (2.0, 10.0, 5.0),
            (1.0, 100.0, 0.0),
            (5.0, 3.0, 10.0),
            (0.0, 99.0, 50.0),
            (3.5, 0.25, 12.5),
        ];
        for (q, p, t) in cases {
            let expected = q * p * (1.0 + t / 100.0);
            assert!((line_total(q, p, t) - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn test_invoice_scenario() {
        // Three items (2,10,5), (1,100,0), (5,3,10) with discount 2:
        // subtotal 135, tax 1 + 0 + 1.5 = 2.5, grand 135.5
        let items = vec![item(2.0, 10.0, 5.0), item(1.0, 100.0, 0.0), item(5.0, 3.0, 10.0)];
        let totals = invoice_totals(&items, 2.0);
        assert_eq!(totals.subtotal, 135.0);
        assert_eq!(totals.total_tax, 2.5);
        assert_eq!(totals.grand_total, 135.5);
    }

    #[test]
    fn test_order_scenario() {
        // Subtotal 200 with 5% VAT: tax 10, grand 210
        let items = vec![order_item(4.0, 25.0), order_item(2.0, 50.0)];
        let totals = order_totals(&items, 5.0);
        assert_eq!(totals.subtotal, 200.0);
        assert_eq!(totals.total_tax, 10.0);
        assert_eq!(totals.grand_total, 210.0);
    }

    #[test]
    fn test_grand_total_identity() {
        let items = vec![item(3.0, 7.5, 2.0), item(1.5, 40.0, 0.0)];
        let discount = 11.25;
        let totals = invoice_totals(&items, discount);
        // Exact identity, no rounding before formatting
        assert_eq!(totals.grand_total, totals.subtotal + totals.total_tax - discount);
    }

    #[test]
    fn test_negative_grand_total_is_permitted() {
        // A discount larger than subtotal + tax goes negative. This pins
        // the unclamped behavior so any future floor is a deliberate
        // change, not an accident.
        let items = vec![item(1.0, 10.0, 0.0)];
        let totals = invoice_totals(&items, 25.0);
        assert_eq!(totals.grand_total, -15.0);
    }

    #[test]
    fn test_coerce_number() {
        assert_eq!(coerce_number("3.25"), 3.25);
        assert_eq!(coerce_number("  42 "), 42.0);
        assert_eq!(coerce_number(""), 0.0);
        assert_eq!(coerce_number("abc"), 0.0);
        assert_eq!(coerce_number("12abc"), 0.0);
        assert_eq!(coerce_number("NaN"), 0.0);
        assert_eq!(coerce_number("inf"), 0.0);
    }

    #[test]
    fn test_format_amount_three_digits() {
        assert_eq!(format_amount(135.5), "135.500");
        assert_eq!(format_amount(0.0), "0.000");
        assert_eq!(format_amount(20.125), "20.125");
        assert_eq!(format_amount(-15.0), "-15.000");
    }

    #[test]
    fn test_format_rate_two_digits() {
        assert_eq!(format_rate(5.0), "5.00");
        assert_eq!(format_rate(12.5), "12.50");
    }

    #[test]
    fn test_empty_items_zero_totals() {
        let totals = invoice_totals(&[], 0.0);
        assert_eq!(totals.subtotal, 0.0);
        assert_eq!(totals.total_tax, 0.0);
        assert_eq!(totals.grand_total, 0.0);
    }
}
