//! Human-readable distance labels.

/// Render a distance for display next to a nearby result.
///
/// Under one kilometre the value is shown in whole metres, under ten with
/// one decimal place, and beyond that in whole kilometres.
///
/// # Examples
/// ```
/// use solace_core::format_distance;
///
/// assert_eq!(format_distance(0.0973), "97 m away");
/// assert_eq!(format_distance(2.345), "2.3 km away");
/// assert_eq!(format_distance(12.6), "13 km away");
/// ```
#[expect(clippy::float_arithmetic, reason = "kilometre to metre conversion")]
#[must_use]
pub fn format_distance(km: f64) -> String {
    if km < 1.0 {
        format!("{:.0} m away", (km * 1000.0).round())
    } else if km < 10.0 {
        format!("{km:.1} km away")
    } else {
        format!("{:.0} km away", km.round())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0.0, "0 m away")]
    #[case(0.097_317, "97 m away")]
    #[case(0.9994, "999 m away")]
    #[case(1.0, "1.0 km away")]
    #[case(9.94, "9.9 km away")]
    #[case(10.0, "10 km away")]
    #[case(343.556, "344 km away")]
    fn renders_by_magnitude(#[case] km: f64, #[case] expected: &str) {
        assert_eq!(format_distance(km), expected);
    }
}
