// src/format.rs
use chrono::NaiveDate;

/// Formats a monetary value in BRL: `R$ 1.234,56`.
pub fn format_currency(value: f64) -> String {
    let negative = value < 0.0;
    // Work in cents to avoid float formatting artifacts
    let cents = (value.abs() * 100.0).round() as i64;
    let int_part = (cents / 100).to_string();
    let dec_part = cents % 100;

    let mut out = String::new();
    let chars: Vec<char> = int_part.chars().collect();
    let mut cnt = 0;
    for i in (0..chars.len()).rev() {
        if cnt == 3 {
            out.push('.');
            cnt = 0;
        }
        out.push(chars[i]);
        cnt += 1;
    }
    let int_with_sep: String = out.chars().rev().collect();

    format!(
        "{}R$ {},{:02}",
        if negative { "-" } else { "" },
        int_with_sep,
        dec_part
    )
}

pub fn format_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// Human-readable report period: `dd/mm/yyyy - dd/mm/yyyy`.
pub fn period_label(start: NaiveDate, end: NaiveDate) -> String {
    format!("{} - {}", format_date(start), format_date(end))
}

/// Display label for a stored payment method value. Unrecognized values
/// are shown as stored.
pub fn payment_method_label(method: &str) -> String {
    match method {
        "cash" => "Cash".to_string(),
        "credit_card" => "Credit Card".to_string(),
        "debit_card" => "Debit Card".to_string(),
        "pix" => "PIX".to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn currency_groups_thousands() {
        assert_eq!(format_currency(1234.56), "R$ 1.234,56");
        assert_eq!(format_currency(1_234_567.8), "R$ 1.234.567,80");
    }

    #[test]
    fn currency_small_values() {
        assert_eq!(format_currency(0.0), "R$ 0,00");
        assert_eq!(format_currency(9.9), "R$ 9,90");
        assert_eq!(format_currency(100.0), "R$ 100,00");
    }

    #[test]
    fn currency_negative() {
        assert_eq!(format_currency(-550.5), "-R$ 550,50");
    }

    #[test]
    fn date_and_period() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        assert_eq!(format_date(start), "01/01/2024");
        assert_eq!(period_label(start, end), "01/01/2024 - 31/01/2024");
    }

    #[test]
    fn payment_labels() {
        assert_eq!(payment_method_label("cash"), "Cash");
        assert_eq!(payment_method_label("pix"), "PIX");
        assert_eq!(payment_method_label("voucher"), "voucher");
    }
}
