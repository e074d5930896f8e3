//! # Checkout Pricing
//!
//! Server-side pricing is authoritative. The storefront keeps a local cart
//! and shows its own running totals, but every checkout recomputes the
//! breakdown here from catalog prices and reconciles the two.
//!
//! Fixed rates, uniform across all products and orders:
//!
//! - 10% order discount on the subtotal
//! - 9% CGST + 9% SGST on the subtotal
//! - ₹40 delivery fee on subtotals under ₹250
//!
//! All amounts are integer paise; percentages use truncating integer
//! division.
use serde::{Deserialize, Serialize};

use catalog::money::Paise;

pub const DISCOUNT_PCT: i64 = 10;
pub const CGST_PCT: i64 = 9;
pub const SGST_PCT: i64 = 9;
pub const FREE_DELIVERY_MIN_PAISE: Paise = 250_00;
pub const DELIVERY_FEE_PAISE: Paise = 40_00;

/// Full server-side breakdown for one cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    #[serde(rename = "subtotalPaise")]
    pub subtotal: Paise,
    #[serde(rename = "discountPaise")]
    pub discount: Paise,
    #[serde(rename = "cgstPaise")]
    pub cgst: Paise,
    #[serde(rename = "sgstPaise")]
    pub sgst: Paise,
    #[serde(rename = "deliveryFeePaise")]
    pub delivery_fee: Paise,
    #[serde(rename = "totalPaise")]
    pub total: Paise,
}

fn pct(amount: Paise, percent: i64) -> Paise {
    amount * percent / 100
}

/// Price a cart given `(unit price, quantity)` pairs.
pub fn quote(lines: &[(Paise, i64)]) -> Quote {
    let subtotal: Paise = lines.iter().map(|(price, quantity)| price * quantity).sum();

    let discount = pct(subtotal, DISCOUNT_PCT);
    let cgst = pct(subtotal, CGST_PCT);
    let sgst = pct(subtotal, SGST_PCT);
    let delivery_fee = if subtotal < FREE_DELIVERY_MIN_PAISE {
        DELIVERY_FEE_PAISE
    } else {
        0
    };

    Quote {
        subtotal,
        discount,
        cgst,
        sgst,
        delivery_fee,
        total: subtotal + cgst + sgst + delivery_fee - discount,
    }
}

/// Reconcile the storefront's locally-computed total against ours. `None`
/// means the client sent no total and the server quote simply applies.
pub fn reconciles(quote: &Quote, expected_total: Option<Paise>) -> bool {
    expected_total.is_none_or(|total| total == quote.total)
}

#[cfg(test)]
mod tests {
    use super::{DELIVERY_FEE_PAISE, quote, reconciles};

    #[test]
    fn test_formula() {
        // subtotal 300_00: discount 30_00, cgst 27_00, sgst 27_00, no fee
        let q = quote(&[(100_00, 3)]);

        assert_eq!(q.subtotal, 300_00);
        assert_eq!(q.discount, 30_00);
        assert_eq!(q.cgst, 27_00);
        assert_eq!(q.sgst, 27_00);
        assert_eq!(q.delivery_fee, 0);
        assert_eq!(q.total, 324_00);
    }

    #[test]
    fn test_delivery_fee_below_threshold() {
        let q = quote(&[(50_00, 2)]);

        assert_eq!(q.subtotal, 100_00);
        assert_eq!(q.delivery_fee, DELIVERY_FEE_PAISE);
        assert_eq!(q.total, 100_00 + 9_00 + 9_00 + 40_00 - 10_00);
    }

    #[test]
    fn test_threshold_boundary() {
        assert_eq!(quote(&[(249_99, 1)]).delivery_fee, DELIVERY_FEE_PAISE);
        assert_eq!(quote(&[(250_00, 1)]).delivery_fee, 0);
    }

    #[test]
    fn test_truncating_percentages() {
        // 9% of 999 paise is 89.91 paise, truncates to 89
        let q = quote(&[(999, 1)]);

        assert_eq!(q.cgst, 89);
        assert_eq!(q.sgst, 89);
        assert_eq!(q.discount, 99);
    }

    #[test]
    fn test_multiple_lines() {
        let q = quote(&[(45_00, 2), (120_00, 1), (15_50, 4)]);

        assert_eq!(q.subtotal, 90_00 + 120_00 + 62_00);
    }

    #[test]
    fn test_empty_cart_is_all_zero_plus_fee() {
        // Routes reject empty carts before quoting; the math itself stays total = fee.
        let q = quote(&[]);

        assert_eq!(q.subtotal, 0);
        assert_eq!(q.total, DELIVERY_FEE_PAISE);
    }

    #[test]
    fn test_reconciles() {
        let q = quote(&[(100_00, 3)]);

        assert!(reconciles(&q, None));
        assert!(reconciles(&q, Some(324_00)));
        assert!(!reconciles(&q, Some(324_01)));
    }
}
