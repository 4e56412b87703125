//! Brazilian number and currency formatting
//!
//! `.` groups thousands and `,` separates decimals: `1234.5` renders as
//! `1.234,50`, and as currency `R$ 1.234,50`.

use chrono::NaiveDate;

/// Format a number with Brazilian separators and a fixed number of decimals
pub fn format_br_number(value: f64, decimals: usize) -> String {
    if !value.is_finite() {
        return "-".to_string();
    }

    let fixed = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (fixed.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (count, ch) in int_part.chars().rev().enumerate() {
        if count > 0 && count % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }
    let mut result: String = grouped.chars().rev().collect();

    if let Some(frac) = frac_part {
        result.push(',');
        result.push_str(frac);
    }

    // -0,00 reads as zero
    let is_zero = result.chars().all(|c| matches!(c, '0' | '.' | ','));
    if value.is_sign_negative() && !is_zero {
        result.insert(0, '-');
    }
    result
}

/// Format an amount as `R$ 1.234,50`
pub fn format_br_currency(value: f64) -> String {
    format!("R$ {}", format_br_number(value, 2))
}

/// Format liters with two decimals and an `L` suffix
pub fn format_liters(value: f64) -> String {
    format!("{} L", format_br_number(value, 2))
}

/// Format a count with thousands separators
pub fn format_count(count: usize) -> String {
    format_br_number(count as f64, 0)
}

/// `dd/mm/yyyy`
pub fn format_br_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_formatting() {
        assert_eq!(format_br_number(1234.5, 2), "1.234,50");
        assert_eq!(format_br_number(0.0, 2), "0,00");
        assert_eq!(format_br_number(999.999, 2), "1.000,00");
        assert_eq!(format_br_number(1_234_567.891, 3), "1.234.567,891");
        assert_eq!(format_br_number(42.0, 0), "42");
        assert_eq!(format_br_number(-1500.25, 2), "-1.500,25");
        assert_eq!(format_br_number(-0.001, 2), "0,00");
        assert_eq!(format_br_number(f64::NAN, 2), "-");
    }

    #[test]
    fn test_currency_formatting() {
        assert_eq!(format_br_currency(1234.5), "R$ 1.234,50");
        assert_eq!(format_br_currency(0.0), "R$ 0,00");
        assert_eq!(format_br_currency(1_000_000.0), "R$ 1.000.000,00");
    }

    #[test]
    fn test_misc_formatting() {
        assert_eq!(format_liters(17.25), "17,25 L");
        assert_eq!(format_count(12345), "12.345");
        assert_eq!(
            format_br_date(NaiveDate::from_ymd_opt(2024, 3, 7).unwrap()),
            "07/03/2024"
        );
    }
}
