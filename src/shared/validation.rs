use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Regex for a single path segment (organization id, entity id, document type)
    /// Letters, digits, hyphens and underscores only
    /// - Valid: "org1", "3f2b9c1e-8d4a-4f6b-9a7e-2c1d0b9e8f7a", "risk_assessment"
    /// - Invalid: "", "org/1", "..", "policy docs"
    pub static ref PATH_SEGMENT_REGEX: Regex = Regex::new(r"^[A-Za-z0-9_-]+$").unwrap();
}

/// Check a caller-supplied storage path: relative, no empty, `.` or `..` segments
pub fn is_valid_storage_path(path: &str) -> bool {
    !path.is_empty()
        && !path.starts_with('/')
        && !path.contains('\\')
        && path
            .split('/')
            .all(|segment| !segment.is_empty() && segment != "." && segment != "..")
}
