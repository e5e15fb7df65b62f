/// Reduce an account number to its last four characters for audit payloads.
/// Shorter values are masked entirely.
pub fn mask_account_number(account_number: &str) -> String {
    let count = account_number.chars().count();
    if count <= 4 {
        return "*".repeat(count);
    }
    let tail: String = account_number.chars().skip(count - 4).collect();
    format!("{}{}", "*".repeat(count - 4), tail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_only_last_four_digits() {
        assert_eq!(mask_account_number("123456789012"), "********9012");
    }

    #[test]
    fn short_values_are_fully_masked() {
        assert_eq!(mask_account_number("123"), "***");
        assert_eq!(mask_account_number("1234"), "****");
    }

    #[test]
    fn empty_input_stays_empty() {
        assert_eq!(mask_account_number(""), "");
    }
}
