use chrono::{Local, TimeZone};
use tempfile::TempDir;

use projtrack::storage::{
    content_type, is_inline_safe, sanitize_filename, stored_filename, UploadStore, MAX_STORED_NAME,
};

#[test]
fn sanitize_keeps_safe_characters() {
    assert_eq!(sanitize_filename("report-2024_v2.pdf"), "report-2024_v2.pdf");
    assert_eq!(sanitize_filename("my report (final).pdf"), "my_report_final.pdf");
    assert_eq!(sanitize_filename("résumé.pdf"), "rsum.pdf");
}

#[test]
fn sanitize_strips_paths() {
    assert_eq!(sanitize_filename("../../etc/passwd"), "etc_passwd");
    assert_eq!(sanitize_filename("C:\\Users\\me\\plan.docx"), "C_Users_me_plan.docx");
    assert_eq!(sanitize_filename(".hidden"), "hidden");
    assert_eq!(sanitize_filename("..."), "");
}

#[test]
fn stored_name_is_timestamped() {
    let now = Local.with_ymd_and_hms(2024, 3, 5, 14, 7, 9).unwrap();
    assert_eq!(stored_filename("plan.pdf", now), "20240305_140709_plan.pdf");
    assert_eq!(stored_filename("///", now), "20240305_140709_upload");
}

#[test]
fn long_names_are_cut_to_fit_the_column() {
    let now = Local.with_ymd_and_hms(2024, 3, 5, 14, 7, 9).unwrap();

    let original = format!("{}.pdf", "quarterly_report_".repeat(12));
    let stored = stored_filename(&original, now);
    assert_eq!(stored.len(), MAX_STORED_NAME);
    assert!(stored.starts_with("20240305_140709_quarterly_report_"));
    assert!(stored.ends_with(".pdf"));

    // Without an extension the stem is simply cut.
    let stored = stored_filename(&"x".repeat(500), now);
    assert_eq!(stored.len(), MAX_STORED_NAME);

    // A very long "extension" is treated as part of the stem.
    let stored = stored_filename(&format!("a.{}", "b".repeat(300)), now);
    assert_eq!(stored.len(), MAX_STORED_NAME);

    // Short names are untouched.
    assert_eq!(stored_filename("plan.pdf", now), "20240305_140709_plan.pdf");
}

#[test]
fn only_passive_types_are_shown_inline() {
    assert!(is_inline_safe("plan.pdf"));
    assert!(is_inline_safe("photo.JPG"));
    assert!(is_inline_safe("notes.txt"));
    assert!(!is_inline_safe("diagram.svg"));
    assert!(!is_inline_safe("page.html"));
    assert!(!is_inline_safe("data.json"));
    assert!(!is_inline_safe("noext"));
}

#[test]
fn path_for_refuses_traversal() {
    let store = UploadStore::new("/srv/uploads");
    assert!(store.path_for("plan.pdf").is_some());
    assert!(store.path_for("").is_none());
    assert!(store.path_for("..").is_none());
    assert!(store.path_for("../secret").is_none());
    assert!(store.path_for("a\\b").is_none());
}

#[test]
fn content_types_by_extension() {
    assert_eq!(content_type("a.PDF"), "application/pdf");
    assert_eq!(content_type("a.jpeg"), "image/jpeg");
    assert_eq!(content_type("notes.txt"), "text/plain; charset=utf-8");
    assert_eq!(content_type("archive.tar.gz"), "application/octet-stream");
    assert_eq!(content_type("noext"), "application/octet-stream");
}

#[tokio::test]
async fn save_read_and_remove() {
    let dir = TempDir::new().unwrap();
    let store = UploadStore::new(dir.path().join("nested"));

    let name = store.save("Spec sheet.txt", b"hello").await.unwrap();
    assert!(name.ends_with("_Spec_sheet.txt"));
    assert_eq!(store.read(&name).await.unwrap(), b"hello");

    store.remove(&name).await.unwrap();
    let err = store.read(&name).await.unwrap_err();
    assert_eq!(err.kind(), std::io::ErrorKind::NotFound);

    // Removing twice is fine.
    store.remove(&name).await.unwrap();
}
