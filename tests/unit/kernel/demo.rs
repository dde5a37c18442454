use super::*;
use crate::kernel::command::TerminalCommand;
use crate::models::FileTree;

#[test]
fn task_ids_are_unique_and_ordered() {
    let ids: Vec<_> = demo_tasks().iter().map(|t| t.id).collect();
    assert_eq!(ids, ["task-1", "task-2", "task-3"]);
}

#[test]
fn initial_command_targets_a_file_in_the_task() {
    for task in demo_tasks() {
        let tree = FileTree::from_template(&task.files);
        match TerminalCommand::parse(task.initial_command) {
            TerminalCommand::Python { file } => {
                assert!(tree.find_by_name(&file).is_some(), "{}: {file}", task.id);
            }
            other => panic!("{}: unexpected command {other:?}", task.id),
        }
    }
}

#[test]
fn off_by_one_fixture_keeps_its_bug() {
    let task = find_demo("task-1").unwrap();
    let tree = FileTree::from_template(&task.files);
    let utils = tree.find_by_name("utils.py").unwrap();

    assert!(tree
        .content(utils)
        .unwrap()
        .contains("range(len(numbers) + 1)"));
    assert_eq!(task.difficulty.label(), "Easy");
}

#[test]
fn unknown_task_is_none() {
    assert!(find_demo("task-9").is_none());
}
