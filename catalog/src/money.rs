/// Amounts are integer paise end to end. 100 paise = ₹1.
pub type Paise = i64;

/// Display form for logs, mail bodies, and the smoke tester.
pub fn rupees(amount: Paise) -> String {
    let sign = if amount < 0 { "-" } else { "" };
    let amount = amount.abs();

    format!("{sign}₹{}.{:02}", amount / 100, amount % 100)
}

#[cfg(test)]
mod tests {
    use super::rupees;

    #[test]
    fn test_whole_rupees() {
        assert_eq!(rupees(25_000), "₹250.00");
        assert_eq!(rupees(0), "₹0.00");
    }

    #[test]
    fn test_paise_padding() {
        assert_eq!(rupees(4_005), "₹40.05");
        assert_eq!(rupees(9), "₹0.09");
    }

    #[test]
    fn test_negative() {
        assert_eq!(rupees(-150), "-₹1.50");
    }
}
