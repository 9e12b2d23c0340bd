//! Money as integer minor units (cents).

/// Dollar amounts in cents. Signed: variance deltas can be negative.
pub type Cents = i64;

/// Baseline cost from `quantity × cost_per_unit`, rounded to whole cents.
///
/// Quantities can be fractional (2.5 hours of labor); this is the one place
/// float math touches money, and the result is rounded exactly once.
pub fn baseline_from_unit_cost(quantity: f64, cost_per_unit_cents: Cents) -> Cents {
    (quantity * cost_per_unit_cents as f64).round() as Cents
}

/// `part / whole × 100`, defined as 0 when the denominator is 0.
pub fn percent_of(part: Cents, whole: Cents) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

/// Render cents as a dollar string, e.g. `-123456` → `"-$1,234.56"`.
pub fn format_cents(cents: Cents) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    let dollars = abs / 100;
    let rem = abs % 100;

    let mut whole = dollars.to_string();
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    while whole.len() > 3 {
        let split = whole.len() - 3;
        grouped.insert_str(0, &whole.split_off(split));
        grouped.insert(0, ',');
    }
    grouped.insert_str(0, &whole);

    format!("{sign}${grouped}.{rem:02}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn baseline_rounds_to_cents() {
        // 10 × $50.00
        assert_eq!(baseline_from_unit_cost(10.0, 5000), 50000);
        // 2.5 hours × $48.33 = $120.825 → $120.83
        assert_eq!(baseline_from_unit_cost(2.5, 4833), 12083);
        assert_eq!(baseline_from_unit_cost(0.0, 5000), 0);
    }

    #[test]
    fn percent_guards_zero_denominator() {
        assert_eq!(percent_of(500, 0), 0.0);
        assert_eq!(percent_of(0, 0), 0.0);
        assert!((percent_of(50, 200) - 25.0).abs() < f64::EPSILON);
        assert!((percent_of(-2000, 48000) + 4.166_666_666_666_667).abs() < 1e-9);
    }

    #[test]
    fn formats_dollars() {
        assert_eq!(format_cents(0), "$0.00");
        assert_eq!(format_cents(48000), "$480.00");
        assert_eq!(format_cents(123456789), "$1,234,567.89");
        assert_eq!(format_cents(-123456), "-$1,234.56");
        assert_eq!(format_cents(5), "$0.05");
    }
}
