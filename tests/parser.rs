use comprexxion::app::lexer::Lexer;
use comprexxion::app::models::{Schema, COMPRESS_LEVEL, COMPRESS_TYPE, PROJECT_NAME};
use comprexxion::app::parser::{parse_file, LoadError, ParseError, ParseErrorKind, Parser};
use comprexxion::app::tree::{DirTree, NodeType};
use std::fs;
use std::path::{Path, PathBuf};

fn schema() -> Schema {
    Schema::new("demo", "/work/demo", "gzip", 4)
}

fn parse_into(input: &str, schema: &mut Schema) -> Result<(), ParseError> {
    let lexer = Lexer::new(input.as_bytes(), "comprexxion.txt");
    Parser::new(lexer).parse(schema)
}

fn parse(input: &str) -> Result<Schema, ParseError> {
    let mut schema = schema();
    parse_into(input, &mut schema)?;
    Ok(schema)
}

fn parse_err(input: &str) -> ParseError {
    match parse(input) {
        Ok(_) => panic!("expected {input:?} to be rejected"),
        Err(err) => err,
    }
}

/// (relative path, is directory) for every node, depth-first.
fn shape(tree: &DirTree) -> Vec<(PathBuf, bool)> {
    tree.entries()
        .into_iter()
        .map(|e| (e.relative_path, e.node_type == NodeType::Directory))
        .collect()
}

const SAMPLE: &str = "\
# project description
project_name: 'bundle'
compress_type : \"xz\"
compress_level: 9

structure:
    + d \"src\"
        + f \"main.c\"
        + d \"lib\"
            + f \"util.c\"
        + f \"extra.c\"
    + f \"README.md\"
";

#[test]
fn parses_scalars_and_structure() {
    let schema = parse(SAMPLE).expect("sample should parse");

    assert_eq!(schema.project_name(), "bundle");
    assert_eq!(schema.project_root(), "/work/demo");
    assert_eq!(schema.compress_type(), "xz");
    assert_eq!(schema.compress_level(), 9);

    let tree = schema.structure().unwrap();
    assert_eq!(tree.node(tree.root()).name(), "/work/demo");
    assert_eq!(
        shape(tree),
        vec![
            (PathBuf::from("README.md"), false),
            (PathBuf::from("src"), true),
            (PathBuf::from("src/extra.c"), false),
            (PathBuf::from("src/lib"), true),
            (PathBuf::from("src/lib/util.c"), false),
            (PathBuf::from("src/main.c"), false),
        ]
    );
}

#[test]
fn unassigned_identifiers_keep_defaults() {
    let schema = parse("project_name: \"x\"\n").unwrap();
    assert_eq!(schema.project_name(), "x");
    assert_eq!(schema.compress_type(), "gzip");
    assert_eq!(schema.compress_level(), 4);
    assert!(schema.structure().unwrap().is_empty());
}

#[test]
fn empty_and_comment_only_files_are_valid() {
    assert!(parse("").is_ok());
    assert!(parse("\n\n# nothing here\n\n").is_ok());
}

#[test]
fn strings_keep_escapes_verbatim() {
    let schema = parse(r#"project_name: "a\"b""#).unwrap();
    assert_eq!(schema.project_name(), r#"a\"b"#);
}

#[test]
fn structure_root_follows_project_root() {
    let schema = parse("project_root: \"/srv/app\"\nstructure:\n  + f \"a\"\n").unwrap();
    let tree = schema.structure().unwrap();
    assert_eq!(tree.node(tree.root()).name(), "/srv/app");
}

#[test]
fn block_ends_at_next_identifier() {
    let schema = parse("structure:\n\t+ d \"a\"\n\t\t+ f \"b\"\ncompress_level: 1\n").unwrap();
    assert_eq!(schema.compress_level(), 1);
    assert_eq!(
        shape(schema.structure().unwrap()),
        vec![(PathBuf::from("a"), true), (PathBuf::from("a/b"), false)]
    );
}

#[test]
fn sibling_files_stay_in_their_directory() {
    let schema = parse(
        "structure:\n  + f \"one\"\n  + f \"two\"\n  + d \"dir\"\n    + f \"three\"\n    + f \"four\"\n  + f \"five\"\n",
    )
    .unwrap();
    assert_eq!(
        shape(schema.structure().unwrap()),
        vec![
            (PathBuf::from("dir"), true),
            (PathBuf::from("dir/four"), false),
            (PathBuf::from("dir/three"), false),
            (PathBuf::from("five"), false),
            (PathBuf::from("one"), false),
            (PathBuf::from("two"), false),
        ]
    );
}

#[test]
fn closing_several_scopes_at_once() {
    let schema = parse(
        "structure:\n + d \"a\"\n  + d \"b\"\n   + d \"c\"\n    + f \"deep\"\n + f \"top\"\n",
    )
    .unwrap();
    let tree = schema.structure().unwrap();
    assert!(tree.find("a/b/c/deep").is_some());
    assert_eq!(tree.node(tree.find("top").unwrap()).parent(), Some(tree.root()));
}

#[test]
fn blank_and_comment_lines_inside_block_are_skipped() {
    let schema = parse(
        "structure:\n\n    + d \"a\"\n      \n    # note\n        + f \"b\" # trailing\n\n",
    )
    .unwrap();
    assert_eq!(
        shape(schema.structure().unwrap()),
        vec![(PathBuf::from("a"), true), (PathBuf::from("a/b"), false)]
    );
}

#[test]
fn doubling_indentation_keeps_the_tree() {
    let narrow = parse(SAMPLE).unwrap();
    let wide_input: String = SAMPLE
        .lines()
        .map(|line| {
            let indent = line.len() - line.trim_start_matches(' ').len();
            format!("{}{}\n", " ".repeat(indent * 2), &line[indent..])
        })
        .collect();
    let wide = parse(&wide_input).unwrap();

    assert_eq!(
        shape(narrow.structure().unwrap()),
        shape(wide.structure().unwrap())
    );
}

#[test]
fn parsing_is_deterministic() {
    let first = parse(SAMPLE).unwrap();
    let second = parse(SAMPLE).unwrap();
    assert_eq!(first, second);
}

#[test]
fn level_jump_is_rejected_at_the_indentation() {
    let err = parse_err("structure:\n  + d \"a\"\n      + f \"b.txt\"\n");
    assert_eq!(err.kind, ParseErrorKind::IndentLevel { expected: 2, found: 3 });
    assert_eq!((err.line, err.column), (3, 1));
}

#[test]
fn empty_string_is_rejected() {
    let err = parse_err("project_name: \"\"\n");
    assert_eq!(err.kind, ParseErrorKind::EmptyString(PROJECT_NAME.to_string()));
    assert_eq!((err.line, err.column), (1, 15));
}

#[test]
fn integer_overflow_is_rejected() {
    let err = parse_err("compress_level: 99999999999\n");
    assert_eq!(
        err.kind,
        ParseErrorKind::IntegerOverflow("99999999999".to_string())
    );
}

#[test]
fn tabs_then_spaces_is_a_style_error() {
    let err = parse_err("structure:\n\t+ d \"a\"\n    + f \"b\"\n");
    assert_eq!(
        err.kind,
        ParseErrorKind::IndentStyleMismatch {
            expected: "indent tabs".to_string(),
            found: "indent spaces".to_string(),
        }
    );
    assert_eq!(err.line, 3);
}

#[test]
fn mixed_indentation_is_rejected() {
    let err = parse_err("structure:\n \t+ d \"a\"\n");
    assert_eq!(err.kind, ParseErrorKind::MixedIndentation);
}

#[test]
fn duplicate_identifier_is_rejected() {
    let err = parse_err("project_name: \"a\"\nproject_name: \"b\"\n");
    assert_eq!(
        err.kind,
        ParseErrorKind::DuplicateIdentifier(PROJECT_NAME.to_string())
    );
    assert_eq!((err.line, err.column), (2, 1));
}

#[test]
fn top_level_grammar_errors() {
    assert_eq!(
        parse_err(": \"a\"\n").kind,
        ParseErrorKind::IdentifierExpected(":".to_string())
    );
    assert_eq!(
        parse_err("colour: \"red\"\n").kind,
        ParseErrorKind::UnknownIdentifier("colour".to_string())
    );
    assert_eq!(
        parse_err("project_name \"a\"\n").kind,
        ParseErrorKind::ExpectedAssign(PROJECT_NAME.to_string())
    );
    assert_eq!(
        parse_err("compress_type: \"a\" \"b\"\n").kind,
        ParseErrorKind::ExpectedNewline("b".to_string())
    );
}

#[test]
fn value_kind_mismatches() {
    assert_eq!(
        parse_err("compress_level: \"9\"\n").kind,
        ParseErrorKind::TypeMismatch {
            expected: "valid integer".to_string(),
            identifier: COMPRESS_LEVEL.to_string(),
            found: "9".to_string(),
        }
    );
    assert_eq!(
        parse_err("compress_type: 3\n").kind,
        ParseErrorKind::TypeMismatch {
            expected: "string".to_string(),
            identifier: COMPRESS_TYPE.to_string(),
            found: "3".to_string(),
        }
    );
    assert_eq!(
        parse_err("compress_level: 9z\n").kind,
        ParseErrorKind::InvalidNumber("9z".to_string())
    );
    assert_eq!(
        parse_err("project_name: \"open\n").kind,
        ParseErrorKind::UnterminatedString("\"open".to_string())
    );
}

#[test]
fn structure_requires_an_indented_block() {
    assert_eq!(
        parse_err("structure: \"src\"\n").kind,
        ParseErrorKind::ExpectedNewline("src".to_string())
    );
    assert_eq!(
        parse_err("structure:\n+ d \"a\"\n").kind,
        ParseErrorKind::ExpectedIndentation("+".to_string())
    );
}

#[test]
fn extra_indentation_is_reported() {
    let err = parse_err("structure:\n    + d \"a\"\n      + f \"b\"\n");
    assert_eq!(err.kind, ParseErrorKind::ExtraIndentation(2));
    assert_eq!((err.line, err.column), (3, 1));
}

#[test]
fn files_cannot_have_nested_entries() {
    let err = parse_err("structure:\n  + f \"a\"\n    + f \"b\"\n");
    assert_eq!(
        err.kind,
        ParseErrorKind::NestedUnderFile {
            expected: 1,
            found: 2
        }
    );
    assert_eq!((err.line, err.column), (3, 1));
}

#[test]
fn entry_line_errors() {
    assert_eq!(
        parse_err("structure:\n  - f \"a\"\n").kind,
        ParseErrorKind::InvalidPathIndicator("-".to_string())
    );
    assert_eq!(
        parse_err("structure:\n  d \"a\"\n").kind,
        ParseErrorKind::ExpectedPathIndicator("d".to_string())
    );
    assert_eq!(
        parse_err("structure:\n  + x \"a\"\n").kind,
        ParseErrorKind::InvalidPathType("x".to_string())
    );
    assert_eq!(
        parse_err("structure:\n  + \"a\"\n").kind,
        ParseErrorKind::ExpectedPathType("a".to_string())
    );
    assert_eq!(
        parse_err("structure:\n  + f a\n").kind,
        ParseErrorKind::ExpectedPath("a".to_string())
    );
    assert_eq!(
        parse_err("structure:\n  + f \"\"\n").kind,
        ParseErrorKind::EmptyPath
    );
    assert_eq!(
        parse_err("structure:\n  + f \"a/b\"\n").kind,
        ParseErrorKind::InvalidPathName("a/b".to_string())
    );
    assert_eq!(
        parse_err("structure:\n  + f \"a\" *\n").kind,
        ParseErrorKind::SelectAllOnFile
    );
    assert_eq!(
        parse_err("structure:\n  + f \"a\" junk\n").kind,
        ParseErrorKind::ExpectedNewline("junk".to_string())
    );
}

#[test]
fn duplicate_sibling_is_reported_at_the_path() {
    let err = parse_err("structure:\n  + d \"a\"\n  + f \"a\"\n");
    assert_eq!(err.kind, ParseErrorKind::DuplicatePath("a".to_string()));
    assert_eq!((err.line, err.column), (3, 7));
}

#[test]
fn errors_render_with_absolute_position() {
    let err = parse_err("colour: 1\n");
    assert!(err.path.is_absolute());
    assert!(err.path.ends_with("comprexxion.txt"));
    let rendered = err.to_string();
    assert!(rendered.starts_with("File \""));
    assert!(rendered.contains("comprexxion.txt:1:1\""));
    assert!(rendered.ends_with("Error: Unknown identifier 'colour'"));
}

fn project_dir() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join("lib/nested")).unwrap();
    fs::write(dir.path().join("lib/a.c"), "a").unwrap();
    fs::write(dir.path().join("lib/nested/b.c"), "b").unwrap();
    fs::write(dir.path().join("README.md"), "readme").unwrap();
    dir
}

fn schema_rooted_at(root: &Path) -> Schema {
    Schema::new("demo", root.to_string_lossy(), "gzip", 4)
}

#[test]
fn select_all_imports_directory_contents() {
    let dir = project_dir();
    let mut schema = schema_rooted_at(dir.path());

    parse_into(
        "structure:\n  + d \"lib\" *\n  + f \"README.md\"\n",
        &mut schema,
    )
    .unwrap();

    assert_eq!(
        shape(schema.structure().unwrap()),
        vec![
            (PathBuf::from("README.md"), false),
            (PathBuf::from("lib"), true),
            (PathBuf::from("lib/a.c"), false),
            (PathBuf::from("lib/nested"), true),
            (PathBuf::from("lib/nested/b.c"), false),
        ]
    );
}

#[test]
fn select_all_of_missing_directory_fails() {
    let dir = project_dir();
    let mut schema = schema_rooted_at(dir.path());

    let err = parse_into("structure:\n  + d \"missing\" *\n", &mut schema).unwrap_err();
    assert!(matches!(err.kind, ParseErrorKind::SelectAll { .. }));
    assert_eq!((err.line, err.column), (2, 7));
}

#[test]
fn explicit_entries_under_select_all_are_redundant() {
    let dir = project_dir();
    let mut schema = schema_rooted_at(dir.path());

    let err = parse_into(
        "structure:\n  + d \"lib\" *\n    + f \"a.c\"\n",
        &mut schema,
    )
    .unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::RedundantUsage);
    assert_eq!(err.line, 3);
}

#[test]
fn parse_file_reads_from_disk() {
    let dir = project_dir();
    let config = dir.path().join("comprexxion.txt");
    fs::write(&config, "compress_level: 7\nstructure:\n    + d \"lib\"\n        + f \"a.c\"\n").unwrap();

    let mut schema = schema_rooted_at(dir.path());
    parse_file(&config, &mut schema).unwrap();
    assert_eq!(schema.compress_level(), 7);
    assert!(schema.structure().unwrap().find("lib/a.c").is_some());
}

#[test]
fn parse_file_reports_missing_files() {
    let dir = tempfile::tempdir().unwrap();
    let mut schema = schema();

    let err = parse_file(dir.path().join("absent.txt"), &mut schema).unwrap_err();
    assert!(matches!(err, LoadError::Open { .. }));
}
