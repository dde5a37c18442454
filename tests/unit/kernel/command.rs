use super::*;

#[test]
fn parses_python_with_exactly_one_argument() {
    assert_eq!(
        TerminalCommand::parse("python main.py"),
        TerminalCommand::Python {
            file: "main.py".to_string()
        }
    );
    assert_eq!(
        TerminalCommand::parse("  python   main.py  "),
        TerminalCommand::Python {
            file: "main.py".to_string()
        }
    );
}

#[test]
fn python_arity_is_strict() {
    assert_eq!(TerminalCommand::parse("python"), TerminalCommand::Unrecognized);
    assert_eq!(
        TerminalCommand::parse("python greet.py Alice"),
        TerminalCommand::Unrecognized
    );
}

#[test]
fn clear_and_ls_are_exact() {
    assert_eq!(TerminalCommand::parse("clear"), TerminalCommand::Clear);
    assert_eq!(TerminalCommand::parse("ls"), TerminalCommand::List);
    assert_eq!(TerminalCommand::parse("ls -la"), TerminalCommand::Unrecognized);
    assert_eq!(TerminalCommand::parse("clear now"), TerminalCommand::Unrecognized);
}

#[test]
fn grammar_is_case_sensitive() {
    assert_eq!(TerminalCommand::parse("LS"), TerminalCommand::Unrecognized);
    assert_eq!(
        TerminalCommand::parse("Python main.py"),
        TerminalCommand::Unrecognized
    );
}

#[test]
fn blank_and_unknown_input_is_unrecognized() {
    assert_eq!(TerminalCommand::parse(""), TerminalCommand::Unrecognized);
    assert_eq!(TerminalCommand::parse("   "), TerminalCommand::Unrecognized);
    assert_eq!(TerminalCommand::parse("cat main.py"), TerminalCommand::Unrecognized);
    assert_eq!(
        TerminalCommand::parse("python 'my file.py'"),
        TerminalCommand::Unrecognized
    );
}

#[test]
fn command_names() {
    assert_eq!(TerminalCommand::List.name(), "ls");
    assert_eq!(TerminalCommand::Unrecognized.name(), "unrecognized");
}
