//! Rule matcher tables and properties

use dist_archive::ignore::checker::{IgnoreChecker, IgnoreResult};
use dist_archive::ignore::matcher::{compile_rules, matches, MatchError};
use dist_archive::ignore::parser::parse_rules;
use dist_archive::RelativePath;
use proptest::prelude::*;
use rstest::rstest;

fn is_ignored(rules: &str, path: &str, is_dir: bool) -> bool {
    let compiled = compile_rules(&parse_rules(rules));
    matches(&RelativePath::new(path), is_dir, &compiled).unwrap()
}

#[rstest]
#[case("*.log", "/ignored.log", false, true)]
#[case("*.log", "/subdir/ignored.log", false, true)]
#[case("*.log", "/included.txt", false, false)]
#[case("/maybe.txt", "/maybe.txt", false, true)]
#[case("/maybe.txt", "/subdir/maybe.txt", false, false)]
#[case("maybe.txt", "/subdir/maybe.txt", false, true)]
#[case(".*", "/.hidden", false, true)]
#[case(".*", "/subdir/.hidden", false, true)]
#[case("/.*", "/subdir/.hidden", false, false)]
#[case("node_modules", "/node_modules", true, true)]
#[case("node_modules", "/node_modules/pkg/index.js", false, true)]
#[case("node_modules", "/src/node_modules", true, true)]
#[case("node_modules", "/my_node_modules", true, false)]
#[case("build/", "/build", true, true)]
#[case("build/", "/build", false, false)]
#[case("build/", "/build/app.js", false, true)]
#[case("docs/internal", "/docs/internal/notes.md", false, true)]
#[case("docs/internal", "/other/docs/internal", true, true)]
#[case("/*.zip", "/release.zip", false, true)]
#[case("/*.zip", "/subdir/release.zip", false, true)]
#[case("*.min.js", "/assets/app.min.js", false, true)]
#[case("*.min.js", "/assets/app.js", false, false)]
#[case("a+b(c)", "/a+b(c)", false, true)]
#[case("a+b(c)", "/aab(c)", false, false)]
fn test_rule_table(#[case] rules: &str, #[case] path: &str, #[case] is_dir: bool, #[case] expected: bool) {
    assert_eq!(
        is_ignored(rules, path, is_dir),
        expected,
        "rules {:?} on {}",
        rules,
        path
    );
}

#[rstest]
#[case("/a/../b", "contains `..`")]
#[case("/a/./b", "contains `.`")]
#[case("/a//b", "empty segment")]
#[case("/a\0b", "NUL byte")]
fn test_invalid_paths_are_rejected(#[case] path: &str, #[case] _why: &str) {
    let compiled = compile_rules(&parse_rules("*"));
    let result = matches(&RelativePath::new(path), false, &compiled);
    assert!(matches!(result, Err(MatchError::InvalidPath { .. })), "{}", path);
}

#[test]
fn test_negation_is_skipped_by_any_match_but_wins_in_checker() {
    let rules = parse_rules("*.log\n!keep.log\n");
    let path = RelativePath::new("/logs/keep.log");

    assert!(matches(&path, false, &compile_rules(&rules)).unwrap());

    let checker = IgnoreChecker::new(&rules);
    assert_eq!(
        checker.check(&path, false).unwrap(),
        IgnoreResult::IncludedByNegation("!keep.log".to_string())
    );
}

#[test]
fn test_later_rule_overrides_negation() {
    let checker = IgnoreChecker::new(&parse_rules("*.log\n!keep.log\n/logs\n"));
    let result = checker.check(&RelativePath::new("/logs/keep.log"), false).unwrap();
    assert!(result.is_ignored());
}

fn segment() -> impl Strategy<Value = String> {
    "[a-z_.*-]{1,8}".prop_filter("dot segments are invalid paths", |s| s != "." && s != "..")
}

fn relative_path() -> impl Strategy<Value = String> {
    prop::collection::vec(segment(), 1..5).prop_map(|segments| format!("/{}", segments.join("/")))
}

fn rule_lines() -> impl Strategy<Value = String> {
    prop::collection::vec("!?/?[a-z.*_]{1,6}/?", 0..6).prop_map(|lines| lines.join("\n"))
}

proptest! {
    #[test]
    fn prop_matches_is_deterministic(path in relative_path(), is_dir in any::<bool>(), rules in rule_lines()) {
        let compiled = compile_rules(&parse_rules(&rules));
        let path = RelativePath::new(path);

        let first = matches(&path, is_dir, &compiled);
        let second = matches(&path, is_dir, &compiled);

        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_checker_agrees_with_any_match_without_negations(path in relative_path(), is_dir in any::<bool>(), rules in rule_lines()) {
        let rules: String = rules
            .lines()
            .filter(|line| !line.starts_with('!'))
            .collect::<Vec<_>>()
            .join("\n");
        let parsed = parse_rules(&rules);
        let path = RelativePath::new(path);

        let any_match = matches(&path, is_dir, &compile_rules(&parsed)).unwrap();
        let checked = IgnoreChecker::new(&parsed).check(&path, is_dir).unwrap();

        prop_assert_eq!(any_match, checked.is_ignored());
    }

    #[test]
    fn prop_descendants_of_ignored_directories_are_ignored(dir in relative_path(), child in segment(), rules in rule_lines()) {
        let rules: String = rules
            .lines()
            .filter(|line| !line.starts_with('!'))
            .collect::<Vec<_>>()
            .join("\n");
        let compiled = compile_rules(&parse_rules(&rules));
        let dir = RelativePath::new(dir);

        if matches(&dir, true, &compiled).unwrap() {
            let child = dir.join(&child);
            prop_assert!(matches(&child, false, &compiled).unwrap());
            prop_assert!(matches(&child, true, &compiled).unwrap());
        }
    }
}
