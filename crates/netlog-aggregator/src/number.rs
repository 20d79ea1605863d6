/// Render a float the way the downstream plotting scripts expect: integral
/// values keep a trailing `.0`.
pub fn format_float(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    let text = value.to_string();
    if text.contains(['.', 'e']) {
        text
    } else {
        format!("{text}.0")
    }
}

#[cfg(test)]
mod tests {
    use super::format_float;

    #[test]
    fn keeps_trailing_zero() {
        assert_eq!(format_float(50.0), "50.0");
        assert_eq!(format_float(0.0), "0.0");
    }

    #[test]
    fn keeps_fraction() {
        assert_eq!(format_float(12.5), "12.5");
        assert_eq!(format_float(100.0 / 3.0), "33.333333333333336");
    }

    #[test]
    fn non_finite() {
        assert_eq!(format_float(f64::NAN), "nan");
        assert_eq!(format_float(f64::NEG_INFINITY), "-inf");
    }
}
