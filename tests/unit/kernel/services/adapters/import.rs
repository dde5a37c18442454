use super::*;
use std::fs;

fn project() -> (tempfile::TempDir, std::path::PathBuf) {
    let temp = tempfile::tempdir().unwrap();
    let root = temp.path().join("proj");
    fs::create_dir_all(root.join("src/lib")).unwrap();
    fs::create_dir_all(root.join("node_modules/pkg")).unwrap();
    fs::create_dir_all(root.join(".git")).unwrap();
    fs::write(root.join("main.py"), "print('main')").unwrap();
    fs::write(root.join("src/lib/helper.py"), "def helper(): pass").unwrap();
    fs::write(root.join("src/a.txt"), "a").unwrap();
    fs::write(root.join("node_modules/pkg/index.js"), "x").unwrap();
    fs::write(root.join(".git/HEAD"), "ref").unwrap();
    fs::write(root.join(".env"), "SECRET=1").unwrap();
    fs::write(root.join("logo.bin"), [0u8, 1, 2]).unwrap();
    (temp, root)
}

#[test]
fn test_read_directory_prefixes_and_sorts() {
    let (_temp, root) = project();
    let files = read_directory(&root).unwrap();

    let paths: Vec<_> = files.iter().map(|f| f.path.as_str()).collect();
    assert_eq!(paths, ["proj/main.py", "proj/src/a.txt", "proj/src/lib/helper.py"]);
    assert_eq!(files[0].content, "print('main')");
}

#[test]
fn test_gitignore_applies_outside_a_repository() {
    let temp = tempfile::tempdir().unwrap();
    let root = temp.path().join("plain");
    fs::create_dir_all(root.join("build")).unwrap();
    fs::write(root.join(".gitignore"), "build/\n*.log\n").unwrap();
    fs::write(root.join("app.py"), "print('app')").unwrap();
    fs::write(root.join("run.log"), "noise").unwrap();
    fs::write(root.join("build/out.py"), "generated").unwrap();

    let files = read_directory(&root).unwrap();

    let paths: Vec<_> = files.iter().map(|f| f.path.as_str()).collect();
    assert_eq!(paths, ["plain/app.py"]);
}

#[test]
fn test_read_directory_rejects_files() {
    let (_temp, root) = project();
    let err = read_directory(&root.join("main.py")).unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
}

#[test]
fn test_should_ignore() {
    assert!(should_ignore(".git"));
    assert!(should_ignore("__pycache__"));
    assert!(!should_ignore("src"));
}
