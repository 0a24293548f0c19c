use std::fs;

use seminal_core::source::{assignment_rhs, FileSource, InMemorySource, NoSource, SourceProvider};
use tempfile::tempdir;

#[test]
fn rhs_follows_the_first_plain_assignment() {
    assert_eq!(assignment_rhs("int y = x + 1;"), "x + 1");
    assert_eq!(assignment_rhs("  c = getchar();  "), "getchar()");
    assert_eq!(assignment_rhs("total += n;"), "n");
    assert_eq!(assignment_rhs("ok = (a == b);"), "(a == b)");
}

#[test]
fn rhs_without_assignment_is_the_trimmed_line() {
    assert_eq!(assignment_rhs("  if (y >= 0 && y != 3) {"), "if (y >= 0 && y != 3) {");
    assert_eq!(assignment_rhs("scanf(\"%d\", &n);"), "scanf(\"%d\", &n)");
}

#[test]
fn in_memory_lines_are_one_based() {
    let source = InMemorySource::new().with_file("a.c", "first\nsecond\n");
    assert_eq!(source.line_text("a.c", 1).as_deref(), Some("first"));
    assert_eq!(source.line_text("a.c", 2).as_deref(), Some("second"));
    assert_eq!(source.line_text("a.c", 0), None);
    assert_eq!(source.line_text("a.c", 3), None);
    assert_eq!(source.line_text("b.c", 1), None);
    assert_eq!(NoSource.line_text("a.c", 1), None);
}

#[test]
fn file_source_resolves_relative_paths_against_root() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("prog.c"), "int main() {\n  int x = 5;\n}\n").unwrap();

    let source = FileSource::new(Some(dir.path().to_path_buf()));
    assert_eq!(source.line_text("prog.c", 2).as_deref(), Some("  int x = 5;"));

    let absolute = dir.path().join("prog.c");
    let unrooted = FileSource::new(None);
    assert_eq!(unrooted.line_text(absolute.to_str().unwrap(), 1).as_deref(), Some("int main() {"));
}

#[test]
fn missing_source_files_degrade_to_none() {
    let dir = tempdir().unwrap();
    let source = FileSource::new(Some(dir.path().to_path_buf()));
    assert_eq!(source.line_text("nowhere.c", 1), None);
    assert_eq!(source.line_text("nowhere.c", 2), None);
}
