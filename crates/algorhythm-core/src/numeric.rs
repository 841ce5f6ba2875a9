/// Round `value` to `decimals` decimal places, half away from zero.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(0.123_456, 4), 0.1235);
        assert_eq!(round_to(87.549, 1), 87.5);
        assert_eq!(round_to(-0.333_33, 3), -0.333);
        assert_eq!(round_to(2.0, 2), 2.0);
    }
}
