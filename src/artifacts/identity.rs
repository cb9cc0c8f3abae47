//! Filename identity parser
//!
//! Recovers a candidate `(package, version)` pair from an artifact archive
//! name of the form `<package>_sfpowerscripts_artifact_<version>.zip`.

use lazy_static::lazy_static;
use regex::Regex;
use std::path::Path;

lazy_static! {
    static ref ARTIFACT_NAME_REGEX: Regex =
        Regex::new(r"^(?P<package>.*)sfpowerscripts_artifact_(?P<version>.*)\.zip")
            .expect("artifact name pattern is valid");
}

/// Identity guessed from an artifact filename
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateIdentity {
    /// May be empty
    pub package_name: String,
    /// Version exactly as embedded in the filename (dash form)
    pub raw_version: String,
}

impl CandidateIdentity {
    /// Parse the base filename of `archive_path`
    ///
    /// Returns `None` when the name does not follow the artifact naming
    /// convention; such artifacts are skipped without being counted.
    ///
    /// # Examples
    ///
    /// ```
    /// use artifact_publisher::artifacts::CandidateIdentity;
    /// use std::path::Path;
    ///
    /// let identity = CandidateIdentity::from_archive_path(Path::new(
    ///     "artifacts/core_sfpowerscripts_artifact_1-2-3.zip",
    /// ))
    /// .unwrap();
    ///
    /// assert_eq!(identity.package_name, "core");
    /// assert_eq!(identity.raw_version, "1-2-3");
    /// ```
    pub fn from_archive_path(archive_path: &Path) -> Option<Self> {
        let file_name = archive_path.file_name()?.to_str()?;
        Self::from_file_name(file_name)
    }

    pub fn from_file_name(file_name: &str) -> Option<Self> {
        let captures = ARTIFACT_NAME_REGEX.captures(file_name)?;

        let mut package_name = captures["package"].to_string();
        // Drop the separator between package name and marker
        package_name.pop();

        Some(Self {
            package_name,
            raw_version: captures["version"].to_string(),
        })
    }

    /// Label used in failure reports: `<name> v<raw version>`
    pub fn label(&self) -> String {
        format!("{} v{}", self.package_name, self.raw_version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_conventional_name() {
        let identity =
            CandidateIdentity::from_file_name("core_sfpowerscripts_artifact_1-0-0.zip").unwrap();

        assert_eq!(identity.package_name, "core");
        assert_eq!(identity.raw_version, "1-0-0");
        assert_eq!(identity.label(), "core v1-0-0");
    }

    #[test]
    fn test_version_is_not_normalized() {
        let identity =
            CandidateIdentity::from_file_name("core_sfpowerscripts_artifact_2-1-0-15.zip").unwrap();
        assert_eq!(identity.raw_version, "2-1-0-15");
    }

    #[test]
    fn test_package_name_with_underscores() {
        let identity =
            CandidateIdentity::from_file_name("sales_core_sfpowerscripts_artifact_1-0-0.zip")
                .unwrap();
        assert_eq!(identity.package_name, "sales_core");
    }

    #[test]
    fn test_only_one_separator_is_stripped() {
        let identity =
            CandidateIdentity::from_file_name("core__sfpowerscripts_artifact_1-0-0.zip").unwrap();
        assert_eq!(identity.package_name, "core_");
    }

    #[test]
    fn test_empty_package_name() {
        let identity =
            CandidateIdentity::from_file_name("sfpowerscripts_artifact_1-0-0.zip").unwrap();
        assert_eq!(identity.package_name, "");
        assert_eq!(identity.raw_version, "1-0-0");
    }

    #[test]
    fn test_non_matching_names_are_skipped() {
        assert!(CandidateIdentity::from_file_name("core-1.0.0.zip").is_none());
        assert!(CandidateIdentity::from_file_name("core_sfpowerscripts_artifact_1-0-0.tgz").is_none());
        assert!(CandidateIdentity::from_file_name("artifact_metadata.json").is_none());
    }

    #[test]
    fn test_from_archive_path_uses_base_name() {
        let identity = CandidateIdentity::from_archive_path(Path::new(
            "/builds/sfpowerscripts_artifact_dir/ui_sfpowerscripts_artifact_3-0-1.zip",
        ))
        .unwrap();

        assert_eq!(identity.package_name, "ui");
        assert_eq!(identity.raw_version, "3-0-1");
    }
}
