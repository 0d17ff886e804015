//! Dutch license plate normalization and validation.

/// Known sidecode patterns for 6-character plates; L = letter, D = digit.
const SIDECODES: &[&str] = &[
    "LLDDLL", // XX-99-XX
    "DDLLLD", // 99-XXX-9
    "DDLLDD", // 99-XX-99
    "LLDDDL", // XX-999-X
    "LLLDDL", // XXX-99-X
    "DLLLDD", // 9-XXX-99
    "LDDDLL", // X-999-XX
];

/// Uppercase and strip everything that is not a letter or digit.
pub fn normalize(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

/// Whether a normalized plate matches one of the known sidecodes.
pub fn is_valid(normalized: &str) -> bool {
    normalized.len() == 6
        && SIDECODES
            .iter()
            .any(|pattern| matches_sidecode(normalized, pattern))
}

fn matches_sidecode(plate: &str, pattern: &str) -> bool {
    plate.chars().zip(pattern.chars()).all(|(c, p)| match p {
        'L' => c.is_ascii_uppercase(),
        'D' => c.is_ascii_digit(),
        _ => false,
    })
}

/// Display format: groups of two separated by dashes.
pub fn format(normalized: &str) -> String {
    if normalized.len() == 6 {
        format!(
            "{}-{}-{}",
            &normalized[0..2],
            &normalized[2..4],
            &normalized[4..6]
        )
    } else {
        normalized.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_dashes_and_uppercases() {
        assert_eq!(normalize("gb-12-3x"), "GB123X");
        assert_eq!(normalize(" 12 AB 34 "), "12AB34");
        assert_eq!(normalize("XX-99-XX"), "XX99XX");
    }

    #[test]
    fn valid_sidecodes() {
        for plate in ["XX99XX", "99XXX9", "99XX99", "XX999X", "XXX99X", "9XXX99", "X999XX"] {
            assert!(is_valid(plate), "{} should be valid", plate);
        }
    }

    #[test]
    fn invalid_plates_rejected() {
        assert!(!is_valid("123456"));
        assert!(!is_valid("ABCDEF"));
        assert!(!is_valid("AB12"));
        assert!(!is_valid("AB12CDE"));
        assert!(!is_valid(""));
    }

    #[test]
    fn format_groups_of_two() {
        assert_eq!(format("GB123X"), "GB-12-3X");
        assert_eq!(format("XX99XX"), "XX-99-XX");
        // Anything that isn't 6 characters passes through untouched
        assert_eq!(format("AB12"), "AB12");
    }
}
