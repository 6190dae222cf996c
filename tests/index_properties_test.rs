//! Index behaviour over a real directory tree.

use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use wikidex::index::FileUpdate;
use wikidex::{Term, WikiIndex, parse_document};

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

fn identities(terms: &[Arc<Term>]) -> HashSet<(String, String)> {
    terms
        .iter()
        .map(|t| (t.file_path.clone(), t.term.clone()))
        .collect()
}

#[test]
fn test_scope_listed_once_per_rebuild() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write(root, "combat/hp.md", "---\nscope: combat\n---\nHealth points");
    write(root, "combat/mp.md", "---\nscope: combat\n---\nMana points");
    write(root, "world/map.md", "---\nscope: world\n---\nThe map");
    write(root, "intro.md", "---\n---\nNo scope here");

    let index = WikiIndex::new(root);
    let stats = index.rebuild().unwrap();

    assert_eq!(stats.files_indexed, 4);
    assert_eq!(stats.scopes, 2);
    let mut scopes = index.scopes();
    scopes.sort();
    assert_eq!(scopes, vec!["combat".to_string(), "world".to_string()]);
}

#[test]
fn test_removed_file_leaves_no_trace_in_search() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write(root, "spell.md", "---\nalias: fireball\n---\nA spell");
    write(root, "other.md", "---\n---\nUnrelated");

    let index = WikiIndex::new(root);
    index.rebuild().unwrap();
    assert_eq!(index.search("fireball").len(), 1);

    index.remove_file("spell.md");

    assert!(index.search("fireball").is_empty());
    assert!(
        index
            .search("e")
            .iter()
            .all(|term| term.file_path != "spell.md")
    );
    // empty alias lists are dropped, not kept around
    assert!(!index.snapshot().terms().contains_key("spell"));
}

#[test]
fn test_update_file_is_idempotent() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write(
        root,
        "spell.md",
        "---\nalias: magic\n---\nCast it\n【法力】：蓝条\n%% [dmg] = <atk> * 2 %%\n",
    );

    let index = WikiIndex::new(root);
    index.update_file("spell.md");
    let first = index.snapshot();
    index.update_file("spell.md");
    let second = index.snapshot();

    assert_eq!(first.terms(), second.terms());
    assert_eq!(first.formulas(), second.formulas());
    assert_eq!(second.lookup("spell").len(), 1);
    assert_eq!(second.lookup("magic").len(), 1);
    assert_eq!(second.lookup("法力").len(), 1);
    assert_eq!(second.formulas_for("dmg").len(), 1);
}

#[test]
fn test_update_of_deleted_file_is_removal() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write(root, "spell.md", "---\n---\nCast it");

    let index = WikiIndex::new(root);
    index.rebuild().unwrap();
    fs::remove_file(root.join("spell.md")).unwrap();

    assert_eq!(index.update_file("spell.md"), FileUpdate::Removed);
    assert!(index.lookup("spell").is_empty());
}

#[test]
fn test_formula_tokens() {
    let document = parse_document("Damage: %% [dmg] = <atk> * 2 %%", "combat/skill.md");

    assert_eq!(document.formulas.len(), 1);
    let formula = &document.formulas[0];
    assert_eq!(formula.expression, "[dmg] = <atk> * 2");
    assert_eq!(formula.calculated_values, vec!["dmg"]);
    assert_eq!(formula.design_values, vec!["atk"]);
}

#[test]
fn test_inline_term_without_front_matter() {
    let document = parse_document("说明\n【治疗量】：按法强计算\n", "heal.md");

    assert_eq!(document.terms.len(), 1);
    let term = &document.terms[0];
    assert_eq!(term.term, "治疗量");
    assert_eq!(term.definition, "按法强计算");
    assert_eq!(term.aliases, vec!["治疗量"]);
    assert!(term.is_inline());
    assert!(!term.has_more);
}

#[test]
fn test_file_term_with_aliases_and_cut_marker() {
    let document = parse_document(
        "---\nalias: foo, bar\n---\nHello\n\n<!-- more -->\n\nWorld",
        "magic/spell.md",
    );

    let term = document.file_term().unwrap();
    assert_eq!(term.term, "spell");
    let aliases: HashSet<_> = term.aliases.iter().map(String::as_str).collect();
    assert_eq!(aliases, HashSet::from(["spell", "foo", "bar"]));
    assert_eq!(term.definition, "Hello");
    assert!(term.has_more);
}

#[test]
fn test_search_matches_both_files_once() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write(root, "fire.md", "---\nalias: fireball, firewall\n---\nHot");
    write(root, "ice.md", "---\nalias: iceball\n---\nCold");
    write(root, "rock.md", "---\n---\nHard");

    let index = WikiIndex::new(root);
    index.rebuild().unwrap();

    assert!(index.search("").is_empty());

    let results = index.search("BALL");
    assert_eq!(results.len(), 2);
    assert_eq!(
        identities(&results),
        HashSet::from([
            ("fire.md".to_string(), "fire".to_string()),
            ("ice.md".to_string(), "ice".to_string()),
        ])
    );
}

#[test]
fn test_failed_rebuild_keeps_previous_state() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().join("wiki");
    write(&root, "hp.md", "---\n---\nHealth");

    let index = WikiIndex::new(&root);
    index.rebuild().unwrap();
    let before = index.build_time();

    fs::remove_dir_all(&root).unwrap();
    assert!(index.rebuild().is_err());

    assert_eq!(index.lookup("hp").len(), 1);
    assert_eq!(index.build_time(), before);
}

#[test]
fn test_snapshot_json_shape() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write(
        root,
        "combat/hp.md",
        "---\nscope: combat\n---\nHealth\n%% [hp] = <base> + <growth> %%",
    );

    let index = WikiIndex::new(root);
    index.rebuild().unwrap();
    let json = serde_json::to_value(&*index.snapshot()).unwrap();

    assert_eq!(json["terms"]["hp"][0]["filePath"], "combat/hp.md");
    assert_eq!(json["formulas"]["hp"][0]["designValues"][1], "growth");
    assert_eq!(json["scopes"], serde_json::json!(["combat"]));
    assert!(json["buildTime"].as_i64().unwrap() > 0);
}

#[test]
fn test_hidden_documents_not_indexed() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write(root, ".trash/old.md", "---\n---\nGone");
    write(root, ".draft.md", "---\n---\nDraft");
    write(root, "live.md", "---\n---\nLive");

    let index = WikiIndex::new(root);
    let stats = index.rebuild().unwrap();

    assert_eq!(stats.files_indexed, 1);
    assert!(index.lookup("old").is_empty());
    assert!(index.lookup(".draft").is_empty());
}

#[test]
fn test_unclosed_bracket_keeps_next_declaration() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write(root, "armor.md", "见【治疗量\n【护甲】：减伤");

    let index = WikiIndex::new(root);
    index.rebuild().unwrap();

    let found = index.lookup("护甲");
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].definition, "减伤");
    assert!(index.search("治疗量").is_empty());
}
