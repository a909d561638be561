// 💵 Money formatting for tables, bars and hover text

use serde::Serialize;

/// Display scale for large USD values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Unit {
    Units,
    Thousands,
    Millions,
    HundredMillions,
    Billions,
    Trillions,
}

impl Unit {
    pub fn divisor(&self) -> f64 {
        match self {
            Unit::Units => 1.0,
            Unit::Thousands => 1e3,
            Unit::Millions => 1e6,
            Unit::HundredMillions => 1e8,
            Unit::Billions => 1e9,
            Unit::Trillions => 1e12,
        }
    }

    pub fn suffix(&self) -> &str {
        match self {
            Unit::Units => "",
            Unit::Thousands => "K",
            Unit::Millions => "M",
            Unit::HundredMillions => "x100M",
            Unit::Billions => "B",
            Unit::Trillions => "T",
        }
    }
}

pub fn scale(value: f64, unit: Unit) -> f64 {
    value / unit.divisor()
}

/// Integer part with comma thousands separators, rounded half away from zero
pub fn group_thousands(value: f64) -> String {
    let rounded = value.round();
    let negative = rounded < 0.0;
    let digits = format!("{:.0}", rounded.abs());

    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }

    if negative {
        format!("-{}", out)
    } else {
        out
    }
}

/// `$1,234,567`; negatives render as `-$1,234`
pub fn dollar(value: f64) -> String {
    let grouped = group_thousands(value);
    match grouped.strip_prefix('-') {
        Some(rest) => format!("-${}", rest),
        None => format!("${}", grouped),
    }
}

/// Divide by 10^power and label as billions, e.g. `dollar_scaled(3.2e9, 9)` → `3 billions`
pub fn dollar_scaled(value: f64, power: i32) -> String {
    format!("{} billions", group_thousands(value / 10f64.powi(power)))
}

/// Short label such as `1.5 B USD`
pub fn short_usd(value: f64, unit: Unit, decimals: usize) -> String {
    format!("{:.*} {} USD", decimals, scale(value, unit), unit.suffix())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dollar() {
        assert_eq!(dollar(0.0), "$0");
        assert_eq!(dollar(999.4), "$999");
        assert_eq!(dollar(1234567.0), "$1,234,567");
        assert_eq!(dollar(-350.0), "-$350");
        assert_eq!(dollar(-1500.5), "-$1,501");
    }

    #[test]
    fn test_dollar_scaled() {
        assert_eq!(dollar_scaled(3.2e9, 9), "3 billions");
        assert_eq!(dollar_scaled(1.25e12, 9), "1,250 billions");
    }

    #[test]
    fn test_short_usd() {
        assert_eq!(short_usd(1.5e9, Unit::Billions, 1), "1.5 B USD");
        assert_eq!(short_usd(2.346e12, Unit::Trillions, 2), "2.35 T USD");
    }

    #[test]
    fn test_scale() {
        assert_eq!(scale(5e8, Unit::HundredMillions), 5.0);
        assert_eq!(short_usd(3.4e8, Unit::HundredMillions, 1), "3.4 x100M USD");
        assert_eq!(scale(7e3, Unit::Thousands), 7.0);
    }
}
