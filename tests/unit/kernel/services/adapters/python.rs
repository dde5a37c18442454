use super::*;
use crate::test_support::block_on;

struct Collect {
    out: Vec<String>,
    err: Vec<String>,
}

impl OutputSink for Collect {
    fn stdout(&mut self, text: &str) {
        self.out.push(text.to_string());
    }

    fn stderr(&mut self, text: &str) {
        self.err.push(text.to_string());
    }
}

fn bridge_in(dir: &Path, python: &str) -> ProcessBridge {
    let settings = RuntimeSettings {
        python: python.to_string(),
        ..RuntimeSettings::default()
    };
    ProcessBridge::new(&settings, dir.join("scratch"))
}

#[test]
fn test_scratch_fs_rejects_escaping_paths() {
    let temp = tempfile::tempdir().unwrap();
    let fs = ScratchFs::new(temp.path().to_path_buf());

    assert!(matches!(
        fs.write_file("./../outside.py", b"x"),
        Err(FsError::Rejected(_))
    ));
    assert!(!temp.path().parent().unwrap().join("outside.py").exists());
}

#[test]
fn test_scratch_fs_writes_below_root() {
    let temp = tempfile::tempdir().unwrap();
    let fs = ScratchFs::new(temp.path().to_path_buf());

    fs.mkdir("./pkg").unwrap();
    assert_eq!(fs.mkdir("./pkg"), Err(FsError::AlreadyExists));
    fs.write_file("./pkg/a.py", b"print(1)").unwrap();

    let written = std::fs::read_to_string(temp.path().join("pkg/a.py")).unwrap();
    assert_eq!(written, "print(1)");
}

#[test]
fn test_missing_interpreter_fails_start() {
    let temp = tempfile::tempdir().unwrap();
    let bridge = bridge_in(temp.path(), "zagent-no-such-python");

    let err = block_on(bridge.start()).unwrap_err();

    assert!(err.message.contains("zagent-no-such-python"));
    assert_eq!(bridge.label(), "Python 3");
}

#[test]
fn test_runs_source_when_python_is_available() {
    let temp = tempfile::tempdir().unwrap();
    let bridge = bridge_in(temp.path(), "python3");
    let Ok(handle) = block_on(bridge.start()) else {
        // No interpreter on this machine.
        return;
    };
    assert!(bridge.label().starts_with("Python"));
    handle.write_file("./helper.py", b"VALUE = 42\n").unwrap();

    let mut sink = Collect {
        out: Vec::new(),
        err: Vec::new(),
    };
    let source = "import helper\nprint(helper.VALUE)\nraise SystemExit(3)\n";
    let result = block_on(bridge.execute(&handle, source, &mut sink));

    assert_eq!(sink.out, ["42"]);
    assert_eq!(result, Err(ExecutionError::Exited { code: Some(3) }));
}

#[test]
fn test_traceback_goes_to_stderr() {
    let temp = tempfile::tempdir().unwrap();
    let bridge = bridge_in(temp.path(), "python3");
    let Ok(handle) = block_on(bridge.start()) else {
        return;
    };

    let mut sink = Collect {
        out: Vec::new(),
        err: Vec::new(),
    };
    let result = block_on(bridge.execute(&handle, "[][1]\n", &mut sink));

    assert!(result.is_err());
    assert_eq!(
        sink.err.last().map(String::as_str),
        Some("IndexError: list index out of range")
    );
}

#[test]
fn test_each_stream_keeps_its_own_order() {
    let temp = tempfile::tempdir().unwrap();
    let bridge = bridge_in(temp.path(), "python3");
    let Ok(handle) = block_on(bridge.start()) else {
        return;
    };

    let mut sink = Collect {
        out: Vec::new(),
        err: Vec::new(),
    };
    let source = "import sys\nfor i in range(50):\n    print(f'out {i}')\n    sys.stderr.write(f'err {i}\\n')\n";
    let result = block_on(bridge.execute(&handle, source, &mut sink));

    assert_eq!(result, Ok(()));
    let expected_out: Vec<_> = (0..50).map(|i| format!("out {i}")).collect();
    let expected_err: Vec<_> = (0..50).map(|i| format!("err {i}")).collect();
    assert_eq!(sink.out, expected_out);
    assert_eq!(sink.err, expected_err);
}
