//! Submitter roles: stored code <-> display label.

/// Known roles as (code, label).
pub const ROLES: [(&str, &str); 5] = [
    ("med_student", "Current US medical student"),
    ("pre_med_4yr", "Prospective US medical student enrolled in 4-year degree program"),
    ("other_student", "Student (other)"),
    ("faculty", "Medical school faculty member"),
    ("physician", "Physician (resident, attending, etc)"),
];

/// Display label for a role code. Unknown codes display as themselves.
pub fn display_label(code: &str) -> &str {
    ROLES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, label)| *label)
        .unwrap_or(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_codes_display_labels() {
        for (code, label) in ROLES {
            assert_eq!(display_label(code), label);
        }
    }

    #[test]
    fn test_unknown_code_displays_as_itself() {
        assert_eq!(display_label("nurse"), "nurse");
    }
}
