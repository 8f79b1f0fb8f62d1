/// Format a balance with thousands separators and two decimals, e.g. `-1,234.50`
pub fn format_balance(amount: f64) -> String {
    let cents = (amount.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();
    let fraction = cents % 100;

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, c) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    format!("{}{}.{:02}", sign, grouped, fraction)
}

/// Show only the last four characters of an account number
pub fn mask_account_number(number: &str) -> String {
    let count = number.chars().count();
    if count <= 4 {
        return number.to_string();
    }
    let tail: String = number.chars().skip(count - 4).collect();
    format!("****{}", tail)
}

/// Format a phone number for display
/// Handles various input formats and normalizes to (XXX) XXX-XXXX
pub fn format_phone(phone: &str) -> String {
    // Extract just the digits
    let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();

    match digits.len() {
        10 => format!("({}) {}-{}", &digits[0..3], &digits[3..6], &digits[6..10]),
        11 if digits.starts_with('1') => {
            format!("({}) {}-{}", &digits[1..4], &digits[4..7], &digits[7..11])
        }
        _ => phone.to_string(), // Return original if can't format
    }
}
