pub const CURRENCY: &str = "$";

/// Render a USD price for display.
///
/// Prices of at least one dollar get two decimals and thousands separators.
/// Sub-dollar prices keep up to eight decimals with trailing zeros dropped.
pub fn format_price(value: f64) -> String {
    if value >= 1.0 {
        return format!("{CURRENCY}{}", group_thousands(&format!("{value:.2}")));
    }

    let fixed = format!("{value:.8}");
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');

    // never hand back an empty or negative-zero digit string
    let digits = match trimmed {
        "" | "-" | "-0" => "0",
        s => s,
    };

    format!("{CURRENCY}{digits}")
}

fn group_thousands(fixed: &str) -> String {
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed, ""));

    let len = int_part.len();
    let mut out = String::with_capacity(len + len / 3 + frac_part.len() + 1);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }

    if !frac_part.is_empty() {
        out.push('.');
        out.push_str(frac_part);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn large_values_get_separators() {
        assert_eq!(format_price(1234.5), "$1,234.50");
        assert_eq!(format_price(1_234_567.891), "$1,234,567.89");
        assert_eq!(format_price(100.0), "$100.00");
        assert_eq!(format_price(1.0), "$1.00");
    }

    #[test]
    fn small_values_strip_trailing_zeros() {
        assert_eq!(format_price(0.000123000), "$0.000123");
        assert_eq!(format_price(0.0001), "$0.0001");
        assert_eq!(format_price(0.5), "$0.5");
        assert_eq!(format_price(0.00001234), "$0.00001234");
    }

    #[test]
    fn zero_never_renders_empty() {
        assert_eq!(format_price(0.0), "$0");
        assert_eq!(format_price(0.000000001), "$0");
    }
}
