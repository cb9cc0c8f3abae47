//! Version normalization between artifact filenames and sidecar metadata
//!
//! Artifact filenames embed versions in dash form (`1-2-3`) while sidecar
//! metadata records use dot form (`1.2.3`).

/// Convert a dash-form version into the dot form used by metadata records.
///
/// Every `-` becomes `.`. The input is not otherwise validated.
///
/// # Examples
///
/// ```
/// use artifact_publisher::core::normalize_version;
///
/// assert_eq!(normalize_version("1-2-3"), "1.2.3");
/// assert_eq!(normalize_version("2-0-0-4"), "2.0.0.4");
/// ```
pub fn normalize_version(raw: &str) -> String {
    raw.replace('-', ".")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replaces_every_separator() {
        assert_eq!(normalize_version("1-0-0-12"), "1.0.0.12");
    }

    #[test]
    fn test_dot_form_is_unchanged() {
        assert_eq!(normalize_version("1.0.0"), "1.0.0");
    }

    #[test]
    fn test_empty_version() {
        assert_eq!(normalize_version(""), "");
    }
}
