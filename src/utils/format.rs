/// Format a price with thousands separators and two decimals: `15230.5` -> `15,230.50`
pub fn format_price(value: f64) -> String {
    format_thousands(value, 2)
}

/// Format a signed percentage: `1.234` -> `+1.23%`
pub fn format_percent(value: f64) -> String {
    format!("{:+.2}%", value)
}

/// Group the integer part of `value` in threes
pub fn format_thousands(value: f64, decimals: usize) -> String {
    let formatted = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match formatted.split_once('.') {
        Some((int_part, frac)) => (int_part, Some(frac)),
        None => (formatted.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, digit) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if value < 0.0 && formatted.chars().any(|c| c != '0' && c != '.') {
        "-"
    } else {
        ""
    };

    match frac_part {
        Some(frac) => format!("{}{}.{}", sign, grouped, frac),
        None => format!("{}{}", sign, grouped),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_thousands() {
        assert_eq!(format_price(15230.0), "15,230.00");
        assert_eq!(format_price(999.999), "1,000.00");
        assert_eq!(format_price(1234567.891), "1,234,567.89");
        assert_eq!(format_thousands(33500.0, 0), "33,500");
        assert_eq!(format_thousands(-2045.5, 1), "-2,045.5");
        assert_eq!(format_thousands(0.0, 2), "0.00");
    }

    #[test]
    fn test_format_percent() {
        assert_eq!(format_percent(1.5333), "+1.53%");
        assert_eq!(format_percent(-0.5), "-0.50%");
    }
}
