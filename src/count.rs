//! Turns displayed counts ("1,004", "1.2K", "3M") into integers.

/// Anything a follower count may arrive as.
pub trait IntoCount {
    fn into_count(self) -> Option<u64>;
}

/// Normalize a raw count. Never panics; unparseable input is `None`.
pub fn normalize<T: IntoCount>(raw: T) -> Option<u64> {
    raw.into_count()
}

impl IntoCount for &str {
    fn into_count(self) -> Option<u64> {
        let text = self.trim().to_uppercase().replace(',', "");
        if text.is_empty() {
            return None;
        }

        let suffix = [('K', 1_000), ('M', 1_000_000)]
            .into_iter()
            .find(|(c, _)| text.contains(*c));

        match suffix {
            Some((c, multiplier)) => scale(text.replace(c, "").trim(), multiplier),
            None => {
                let digits: String = text.chars().filter(char::is_ascii_digit).collect();
                digits.parse().ok()
            }
        }
    }
}

impl IntoCount for String {
    fn into_count(self) -> Option<u64> {
        self.as_str().into_count()
    }
}

impl IntoCount for &String {
    fn into_count(self) -> Option<u64> {
        self.as_str().into_count()
    }
}

impl IntoCount for u64 {
    fn into_count(self) -> Option<u64> {
        Some(self)
    }
}

impl IntoCount for u32 {
    fn into_count(self) -> Option<u64> {
        Some(u64::from(self))
    }
}

impl IntoCount for i64 {
    fn into_count(self) -> Option<u64> {
        u64::try_from(self).ok()
    }
}

impl IntoCount for f64 {
    fn into_count(self) -> Option<u64> {
        if self.is_finite() && self >= 0.0 && self < u64::MAX as f64 {
            Some(self.trunc() as u64)
        } else {
            None
        }
    }
}

impl<T: IntoCount> IntoCount for Option<T> {
    fn into_count(self) -> Option<u64> {
        self.and_then(IntoCount::into_count)
    }
}

// Decimal mantissa times a power of ten, truncated. Integer arithmetic keeps
// "1.2K" at exactly 1200.
fn scale(mantissa: &str, multiplier: u64) -> Option<u64> {
    let (whole, fraction) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    if whole.is_empty() && fraction.is_empty() {
        return None;
    }
    if !whole.chars().chain(fraction.chars()).all(|c| c.is_ascii_digit()) {
        return None;
    }

    let whole: u64 = if whole.is_empty() { 0 } else { whole.parse().ok()? };
    let mut value = whole.checked_mul(multiplier)?;

    let mut place = multiplier;
    for digit in fraction.chars().filter_map(|c| c.to_digit(10)) {
        place /= 10;
        if place == 0 {
            break;
        }
        value = value.checked_add(u64::from(digit) * place)?;
    }
    Some(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_plain_and_separated_numbers() {
        for s in ["0", "7", "1,004", "12,345,678", "1000000"] {
            let expected: u64 = s.replace(',', "").parse().unwrap();
            assert_eq!(normalize(s), Some(expected), "{s}");
        }
    }

    #[test]
    fn test_magnitude_suffix() {
        assert_eq!(normalize("1.2K"), Some(1200));
        assert_eq!(normalize("1.2k"), Some(1200));
        assert_eq!(normalize("3M"), Some(3_000_000));
        assert_eq!(normalize("5.6K"), Some(5600));
        assert_eq!(normalize("4.1K"), Some(4100));
        assert_eq!(normalize("2.345M"), Some(2_345_000));
        assert_eq!(normalize("1.2345K"), Some(1234));
        assert_eq!(normalize(".5K"), Some(500));
        assert_eq!(normalize("1,200.5K"), Some(1_200_500));
    }

    #[test]
    fn test_other_letters_are_stripped() {
        assert_eq!(normalize("about 1,004"), Some(1004));
        assert_eq!(normalize("1B"), Some(1));
        assert_eq!(normalize("1.5B"), Some(15));
    }

    #[test]
    fn test_garbage_is_none() {
        assert_eq!(normalize(""), None);
        assert_eq!(normalize("   "), None);
        assert_eq!(normalize("N/A"), None);
        assert_eq!(normalize("K"), None);
        assert_eq!(normalize("1.2.3K"), None);
        assert_eq!(normalize("abc"), None);
        assert_eq!(normalize(None::<&str>), None);
    }

    #[test]
    fn test_numbers() {
        assert_eq!(normalize(1004_u64), Some(1004));
        assert_eq!(normalize(-3_i64), None);
        assert_eq!(normalize(12.9_f64), Some(12));
        assert_eq!(normalize(f64::NAN), None);
        assert_eq!(normalize(Some("2,000")), Some(2000));
    }

    #[test]
    fn test_idempotent() {
        for s in ["1,004", "1.2K", "3M", "N/A", "", "88"] {
            assert_eq!(normalize(normalize(s)), normalize(s), "{s}");
        }
    }
}
