use super::*;

fn names(tree: &FileTree, id: NodeId) -> Vec<String> {
    tree.list_children(id)
        .into_iter()
        .map(|entry| entry.name.to_string())
        .collect()
}

#[test]
fn test_default_scaffold() {
    let tree = FileTree::default_scaffold();
    let root = tree.root();

    assert!(tree.is_folder(root));
    assert_eq!(tree.name(root), Some(DEFAULT_ROOT_NAME));
    assert_eq!(names(&tree, root), ["README.md", "main.py"]);

    let main = tree.selected().unwrap();
    assert_eq!(tree.name(main), Some("main.py"));
    assert_eq!(tree.language(main), Some(LanguageId::Python));
    assert_eq!(
        tree.content(main),
        Some("print(\"Hello from the Agent Editor!\")\n")
    );
}

#[test]
fn test_create_entry_at_root() {
    let mut tree = FileTree::new("root");
    let root = tree.root();

    let file_id = tree.create_entry(None, "a.py", NodeKind::File).unwrap();
    let dir_id = tree.create_entry(None, "pkg", NodeKind::Folder).unwrap();

    assert_eq!(tree.kind(file_id), Some(NodeKind::File));
    assert_eq!(tree.content(file_id), Some(""));
    assert_eq!(tree.language(file_id), Some(LanguageId::Python));
    assert!(tree.is_folder(dir_id));
    assert!(tree.children(dir_id).is_empty());
    assert_eq!(names(&tree, root), ["a.py", "pkg"]);
}

#[test]
fn test_duplicate_name_is_rejected_without_mutation() {
    let mut tree = FileTree::new("root");
    let root = tree.root();

    tree.create_entry(None, "a.py", NodeKind::File).unwrap();
    let before = tree.node_count();

    let err = tree.create_entry(None, "a.py", NodeKind::File).unwrap_err();
    assert_eq!(
        err,
        FileTreeError::DuplicateName {
            name: "a.py".to_string()
        }
    );
    let err = tree.create_entry(None, "a.py", NodeKind::Folder).unwrap_err();
    assert!(matches!(err, FileTreeError::DuplicateName { .. }));

    assert_eq!(tree.node_count(), before);
    assert_eq!(names(&tree, root), ["a.py"]);
}

#[test]
fn test_duplicate_check_is_case_sensitive() {
    let mut tree = FileTree::new("root");
    tree.create_entry(None, "Readme.md", NodeKind::File).unwrap();
    tree.create_entry(None, "README.md", NodeKind::File).unwrap();
    assert_eq!(tree.children(tree.root()).len(), 2);
}

#[test]
fn test_invalid_names_are_rejected() {
    let mut tree = FileTree::new("root");
    assert!(matches!(
        tree.create_entry(None, "", NodeKind::File),
        Err(FileTreeError::InvalidName { .. })
    ));
    assert!(matches!(
        tree.create_entry(None, "a/b.py", NodeKind::File),
        Err(FileTreeError::InvalidName { .. })
    ));
    assert!(tree.is_empty());
}

#[test]
fn test_create_entry_resolves_target_from_hint() {
    let mut tree = FileTree::new("root");
    let root = tree.root();
    let src = tree.create_entry(None, "src", NodeKind::Folder).unwrap();
    let lib = tree.create_entry(Some(src), "lib.py", NodeKind::File).unwrap();

    // file hint -> its parent folder
    let sibling = tree.create_entry(Some(lib), "util.py", NodeKind::File).unwrap();
    assert_eq!(tree.find_parent(sibling), Some(src));

    // folder hint -> the folder itself
    let nested = tree.create_entry(Some(src), "inner", NodeKind::Folder).unwrap();
    assert_eq!(tree.find_parent(nested), Some(src));

    // no hint -> root
    let top = tree.create_entry(None, "top.py", NodeKind::File).unwrap();
    assert_eq!(tree.find_parent(top), Some(root));
}

#[test]
fn test_stale_hint_falls_back_to_root() {
    let mut tree = FileTree::default_scaffold();
    let stale = tree.selected().unwrap();
    tree.replace_with(&NodeTemplate::folder("root", vec![]));

    assert!(!tree.contains(stale));
    let id = tree.create_entry(Some(stale), "new.py", NodeKind::File).unwrap();
    assert_eq!(tree.find_parent(id), Some(tree.root()));
}

#[test]
fn test_set_content_is_in_place() {
    let mut tree = FileTree::default_scaffold();
    let main = tree.selected().unwrap();

    tree.set_content(main, "print(1)\n").unwrap();

    assert_eq!(tree.content(main), Some("print(1)\n"));
    assert_eq!(tree.find_by_name("main.py"), Some(main));
}

#[test]
fn test_set_content_rejects_folders_and_stale_ids() {
    let mut tree = FileTree::new("root");
    let dir = tree.create_entry(None, "pkg", NodeKind::Folder).unwrap();
    assert_eq!(tree.set_content(dir, "x"), Err(FileTreeError::NotAFile));
    assert_eq!(tree.content(dir), None);

    let file = tree.create_entry(None, "a.py", NodeKind::File).unwrap();
    tree.replace_with(&NodeTemplate::folder("root", vec![]));
    assert_eq!(tree.set_content(file, "x"), Err(FileTreeError::InvalidNodeId));
}

#[test]
fn test_find_by_name_is_preorder_and_skips_folders() {
    let template = NodeTemplate::folder(
        "root",
        vec![
            NodeTemplate::folder(
                "a",
                vec![NodeTemplate::folder(
                    "deep",
                    vec![NodeTemplate::file("x.py", "deep")],
                )],
            ),
            NodeTemplate::file("x.py", "shallow"),
            NodeTemplate::folder("main.py", vec![]),
        ],
    );
    let tree = FileTree::from_template(&template);

    let found = tree.find_by_name("x.py").unwrap();
    assert_eq!(tree.content(found), Some("deep"));
    assert_eq!(tree.path_of(found).as_deref(), Some("a/deep/x.py"));

    assert_eq!(tree.find_by_name("main.py"), None);
    assert_eq!(tree.find_by_name("deep"), None);
    assert_eq!(tree.find_by_name("missing.py"), None);
}

#[test]
fn test_find_parent_by_identity() {
    let template = NodeTemplate::folder(
        "root",
        vec![
            NodeTemplate::folder("a", vec![NodeTemplate::file("same.py", "x")]),
            NodeTemplate::folder("b", vec![NodeTemplate::file("same.py", "x")]),
        ],
    );
    let tree = FileTree::from_template(&template);
    let root = tree.root();
    let a = tree.child_named(root, "a").unwrap();
    let b = tree.child_named(root, "b").unwrap();
    let in_b = tree.child_named(b, "same.py").unwrap();

    assert_eq!(tree.find_parent(in_b), Some(b));
    assert_eq!(tree.find_parent(a), Some(root));
    assert_eq!(tree.find_parent(root), None);
}

#[test]
fn test_list_children_keeps_insertion_order() {
    let mut tree = FileTree::new("root");
    let root = tree.root();
    for name in ["zeta.py", "alpha", "mid.txt"] {
        let kind = if name.contains('.') {
            NodeKind::File
        } else {
            NodeKind::Folder
        };
        tree.create_entry(None, name, kind).unwrap();
    }

    let entries = tree.list_children(root);
    let listed: Vec<_> = entries.iter().map(|e| (e.name, e.kind)).collect();
    assert_eq!(
        listed,
        [
            ("zeta.py", NodeKind::File),
            ("alpha", NodeKind::Folder),
            ("mid.txt", NodeKind::File),
        ]
    );

    let file = tree.find_by_name("zeta.py").unwrap();
    assert!(tree.list_children(file).is_empty());
}

#[test]
fn test_bulk_import_materializes_folders() {
    let mut tree = FileTree::new("root");
    let count = tree.bulk_import([ImportedFile::new("src/lib/helper.py", "x=1")]);

    assert_eq!(count, 1);
    let root = tree.root();
    let src = tree.child_named(root, "src").unwrap();
    let lib = tree.child_named(src, "lib").unwrap();
    let helper = tree.child_named(lib, "helper.py").unwrap();

    assert!(tree.is_folder(src));
    assert!(tree.is_folder(lib));
    assert_eq!(tree.node_count(), 4);
    assert_eq!(tree.content(helper), Some("x=1"));
    assert_eq!(tree.language(helper), Some(LanguageId::Python));
    assert_eq!(names(&tree, root), ["src"]);
}

#[test]
fn test_bulk_import_overwrites_existing_file() {
    let mut tree = FileTree::new("root");
    let first = tree.bulk_import([ImportedFile::new("pkg/a.py", "one")]);
    let second = tree.bulk_import([ImportedFile::new("pkg/a.py", "two")]);

    assert_eq!((first, second), (1, 1));
    assert_eq!(tree.node_count(), 3);
    let pkg = tree.child_named(tree.root(), "pkg").unwrap();
    assert_eq!(names(&tree, pkg), ["a.py"]);
    let a = tree.child_named(pkg, "a.py").unwrap();
    assert_eq!(tree.content(a), Some("two"));
}

#[test]
fn test_bulk_import_counts_overwrites_and_keeps_first_encounter_order() {
    let mut tree = FileTree::default_scaffold();
    let count = tree.bulk_import([
        ImportedFile::new("b/one.py", "1"),
        ImportedFile::new("a/two.py", "2"),
        ImportedFile::new("b/three.py", "3"),
        ImportedFile::new("main.py", "print('replaced')"),
    ]);

    assert_eq!(count, 4);
    let root = tree.root();
    assert_eq!(names(&tree, root), ["README.md", "main.py", "b", "a"]);
    let b = tree.child_named(root, "b").unwrap();
    assert_eq!(names(&tree, b), ["one.py", "three.py"]);
    assert_eq!(tree.selected(), None);
}

#[test]
fn test_bulk_import_skips_conflicting_paths() {
    let mut tree = FileTree::new("root");
    tree.create_entry(None, "data", NodeKind::File).unwrap();
    tree.create_entry(None, "pkg", NodeKind::Folder).unwrap();

    let count = tree.bulk_import([
        ImportedFile::new("data/x.py", "1"),
        ImportedFile::new("pkg", "2"),
        ImportedFile::new("", "3"),
        ImportedFile::new("ok.py", "4"),
    ]);

    assert_eq!(count, 1);
    assert_eq!(names(&tree, tree.root()), ["data", "pkg", "ok.py"]);
}

#[test]
fn test_replace_with_copies_template() {
    let template = NodeTemplate::folder("root", vec![NodeTemplate::file("utils.py", "a")]);
    let mut tree = FileTree::default_scaffold();
    tree.replace_with(&template);

    let utils = tree.find_by_name("utils.py").unwrap();
    tree.set_content(utils, "b").unwrap();

    assert_eq!(tree.name(tree.root()), Some("root"));
    assert_eq!(tree.selected(), None);
    assert_eq!(
        template,
        NodeTemplate::folder("root", vec![NodeTemplate::file("utils.py", "a")])
    );
}

#[test]
fn test_snapshot_elides_content() {
    let tree = FileTree::default_scaffold();
    let json = serde_json::to_value(tree.snapshot()).unwrap();

    assert_eq!(json["name"], "project-root");
    assert_eq!(json["type"], "folder");
    assert_eq!(json["children"][1]["name"], "main.py");
    assert_eq!(json["children"][1]["type"], "file");
    assert_eq!(json["children"][1]["language"], "python");
    assert!(json["children"][1].get("content").is_none());
}

#[test]
fn test_template_json_round_trip() {
    let json = r#"{"type":"folder","name":"root","children":[{"type":"file","name":"a.py","content":"x"}]}"#;
    let template: NodeTemplate = serde_json::from_str(json).unwrap();
    let tree = FileTree::from_template(&template);
    let a = tree.find_by_name("a.py").unwrap();
    assert_eq!(tree.content(a), Some("x"));
    assert_eq!(tree.language(a), Some(LanguageId::Python));
}

#[test]
fn test_find_by_path_walks_segments() {
    let mut tree = FileTree::new("root");
    tree.bulk_import([ImportedFile::new("src/lib/helper.py", "")]);

    let src = tree.find_by_path("src").unwrap();
    let helper = tree.find_by_path("/src//lib/helper.py").unwrap();
    assert!(tree.is_folder(src));
    assert_eq!(tree.path_of(helper).as_deref(), Some("src/lib/helper.py"));
    assert_eq!(tree.find_by_path(""), Some(tree.root()));
    assert_eq!(tree.find_by_path("src/missing"), None);
}

#[test]
fn test_path_of_root_and_stale_ids() {
    let mut tree = FileTree::default_scaffold();
    let main = tree.find_by_name("main.py").unwrap();
    assert_eq!(tree.path_of(tree.root()).as_deref(), Some(""));
    assert_eq!(tree.path_of(main).as_deref(), Some("main.py"));

    tree.replace_with(&NodeTemplate::folder("other", Vec::new()));
    assert_eq!(tree.path_of(main), None);
    assert_eq!(tree.node_count(), 1);
}
