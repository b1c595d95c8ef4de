//! Deterministic document path construction
//!
//! Paths take the form
//! `{organization_id}/{entity_id}/{document_type}/{base_name}_{epoch_millis}{extension}`.
//! Two uploads of the same filename collide only when issued within the same
//! millisecond.

use chrono::Utc;

use super::provider::file_name_of;

/// Build a storage path using the current wall-clock time
pub fn generate_file_path(
    organization_id: &str,
    entity_id: &str,
    document_type: &str,
    file_name: &str,
) -> String {
    build_file_path(
        organization_id,
        entity_id,
        document_type,
        file_name,
        Utc::now().timestamp_millis(),
    )
}

/// Build a storage path for an explicit timestamp
pub fn build_file_path(
    organization_id: &str,
    entity_id: &str,
    document_type: &str,
    file_name: &str,
    epoch_millis: i64,
) -> String {
    let (base_name, extension) = split_extension(file_name_of(file_name));
    format!(
        "{}/{}/{}/{}_{}{}",
        organization_id, entity_id, document_type, base_name, epoch_millis, extension
    )
}

/// Split `report.final.pdf` into (`report.final`, `.pdf`).
///
/// Dotfiles such as `.env` have no extension.
fn split_extension(file_name: &str) -> (&str, &str) {
    match file_name.rfind('.') {
        Some(idx) if idx > 0 => file_name.split_at(idx),
        _ => (file_name, ""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_file_path_format() {
        let path = build_file_path("org1", "entity1", "policy", "test.txt", 1_700_000_000_000);
        assert_eq!(path, "org1/entity1/policy/test_1700000000000.txt");
    }

    #[test]
    fn test_build_file_path_keeps_inner_dots() {
        let path = build_file_path("o", "e", "evidence", "q3.report.final.pdf", 42);
        assert_eq!(path, "o/e/evidence/q3.report.final_42.pdf");
    }

    #[test]
    fn test_build_file_path_without_extension() {
        assert_eq!(build_file_path("o", "e", "t", "README", 7), "o/e/t/README_7");
        assert_eq!(build_file_path("o", "e", "t", ".env", 7), "o/e/t/.env_7");
    }

    #[test]
    fn test_build_file_path_strips_directories_from_name() {
        let path = build_file_path("o", "e", "t", "nested/dir/scan.png", 1);
        assert_eq!(path, "o/e/t/scan_1.png");
    }

    #[test]
    fn test_distinct_millis_yield_distinct_paths() {
        let first = build_file_path("org1", "entity1", "policy", "test.txt", 1_700_000_000_000);
        let second = build_file_path("org1", "entity1", "policy", "test.txt", 1_700_000_000_001);
        assert_ne!(first, second);
    }

    #[test]
    fn test_generate_file_path_uses_current_time() {
        let before = Utc::now().timestamp_millis();
        let path = generate_file_path("org1", "entity1", "policy", "test.txt");
        let after = Utc::now().timestamp_millis();

        let millis: i64 = path
            .trim_start_matches("org1/entity1/policy/test_")
            .trim_end_matches(".txt")
            .parse()
            .unwrap();
        assert!(millis >= before && millis <= after);
    }
}
