use super::*;

#[test]
fn test_get_log_dir() {
    let dir = get_log_dir();
    assert!(dir.is_some());
    let dir = dir.unwrap();
    assert!(dir.to_string_lossy().contains(APP_NAME));
    assert!(dir.to_string_lossy().contains(LOG_DIR));
}

#[test]
fn test_scratch_dir_is_per_session() {
    let dir = get_scratch_dir();
    assert!(dir.to_string_lossy().contains(SCRATCH_DIR));
    assert_eq!(dir.file_name().map(|n| n.len()), Some(16));
}

#[test]
fn test_ensure_configured_scratch_dir() {
    let temp = tempfile::tempdir().unwrap();
    let wanted = temp.path().join("a/b");

    let dir = ensure_scratch_dir(Some(&wanted)).unwrap();

    assert_eq!(dir, wanted);
    assert!(wanted.is_dir());
}
