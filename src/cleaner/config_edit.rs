//! Textual removal of extension entries from editor configuration files.
//!
//! Matching is pure text substitution: it does not parse JSON, so it works on
//! commented settings files and any other key/value text alike, at the price
//! of only approximating syntactic validity. After fragments are cut out the
//! punctuation they leave behind (doubled, leading, or trailing commas and
//! blank lines) is tidied up.
//!
//! An edited file is only overwritten after a verbatim backup of the original
//! has been written next to it, unless backups are switched off.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use chrono::{DateTime, Local};
use regex::Regex;

use crate::cleaner::CleanupContext;
use crate::core::errors::{CleanError, Result};
use crate::logger::ActivityEvent;
use crate::scanner::paths;

/// Extension-identifying fragments, applied in order. Each entry is a regex
/// and the replacement for a match. Object bodies may hold one level of
/// nested `{...}`. When a pattern has an `entry` group, only that group is
/// reported as removed.
const ENTRY_PATTERNS: &[(&str, &str)] = &[
    // Keybinding objects bound to an extension command (or its removal "-cmd").
    (
        r#"(?i)\s*\{(?:[^{}]|\{[^{}]*\})*"command"\s*:\s*"-?augment[^"]*"(?:[^{}]|\{[^{}]*\})*\},?"#,
        "",
    ),
    // "augment.*": <string | object | flat array | scalar>
    (
        r#"(?i)"augment[^"]*"\s*:\s*(?:"(?:[^"\\]|\\.)*"|\{(?:[^{}]|\{[^{}]*\})*\}|\[[^\[\]]*\]|[^,{}\[\]\s]+),?"#,
        "",
    ),
    // Any key whose value names the extension, e.g. a default formatter.
    (r#"(?i)"[^"]*"\s*:\s*"augment\.[^"]*",?"#, ""),
    // Bare array element such as a workspace recommendation.
    (
        r#"(?i)([\[,]\s*)(?P<entry>"augment\.[^"]*")(\s*[,\]])"#,
        "${1}${3}",
    ),
];

/// Punctuation clean-up, applied in order once something was removed.
const TIDY_PATTERNS: &[(&str, &str)] = &[
    (r",(?:\s*,)+", ","),
    (r",(\s*[}\]])", "${1}"),
    (r"([\[{])(\s*),", "${1}${2}"),
    (r"\n\s*\n", "\n"),
];

/// Compiled table, or the pattern that failed to compile and why.
type Rules = std::result::Result<Vec<(Regex, &'static str)>, (&'static str, String)>;

static ENTRY_RULES: LazyLock<Rules> = LazyLock::new(|| compile(ENTRY_PATTERNS));
static TIDY_RULES: LazyLock<Rules> = LazyLock::new(|| compile(TIDY_PATTERNS));

/// The edit computed for one file's text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigPatch {
    /// Text as read, kept for the backup.
    pub original: String,
    /// Text with fragments removed and punctuation tidied.
    pub modified: String,
    /// Fragments removed, in the order they were found.
    pub removed: Vec<String>,
}

impl ConfigPatch {
    /// Whether anything was removed.
    #[must_use]
    pub fn changed(&self) -> bool {
        !self.removed.is_empty()
    }
}

/// What happened to one config file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    /// File absent.
    NotFound,
    /// No extension entries; file untouched, no backup.
    Unchanged,
    /// Would be rewritten (dry-run).
    Simulated,
    /// Rewritten, with the backup written first when enabled.
    Modified { backup: Option<PathBuf> },
}

impl EditOutcome {
    /// Counts toward the `config_modified` tally.
    #[must_use]
    pub const fn counts_as_modified(&self) -> bool {
        matches!(self, Self::Simulated | Self::Modified { .. })
    }
}

fn compile(table: &[(&'static str, &'static str)]) -> Rules {
    table
        .iter()
        .map(|&(pattern, replacement)| {
            Regex::new(pattern)
                .map(|re| (re, replacement))
                .map_err(|e| (pattern, e.to_string()))
        })
        .collect()
}

fn rules(cell: &'static LazyLock<Rules>) -> Result<&'static [(Regex, &'static str)]> {
    LazyLock::force(cell)
        .as_deref()
        .map_err(|(pattern, details)| CleanError::Pattern {
            pattern: (*pattern).to_string(),
            details: details.clone(),
        })
}

/// Compute the edit for `content` without touching the filesystem.
pub fn compute_patch(content: &str) -> Result<ConfigPatch> {
    let mut working = content.to_string();
    let mut removed = Vec::new();

    for (re, replacement) in rules(&ENTRY_RULES)? {
        // Context-sensitive patterns can hide adjacent matches from a single
        // pass; repeat until the text stops changing.
        while re.is_match(&working) {
            removed.extend(
                re.captures_iter(&working)
                    .filter_map(|caps| caps.name("entry").or_else(|| caps.get(0)))
                    .map(|m| m.as_str().trim().to_string()),
            );
            let next = re.replace_all(&working, *replacement).into_owned();
            if next == working {
                break;
            }
            working = next;
        }
    }

    if !removed.is_empty() {
        for (re, replacement) in rules(&TIDY_RULES)? {
            working = re.replace_all(&working, *replacement).into_owned();
        }
    }

    Ok(ConfigPatch {
        original: content.to_string(),
        modified: working,
        removed,
    })
}

/// Sibling backup path: `<path>.backup_<YYYYMMDD_HHMMSS>`.
#[must_use]
pub fn backup_path(path: &Path, at: DateTime<Local>) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(format!(".backup_{}", at.format("%Y%m%d_%H%M%S")));
    PathBuf::from(name)
}

/// Remove extension entries from the config file at `path`.
///
/// Failures are logged and returned; the caller counts them.
pub fn clean_config(ctx: &mut CleanupContext, path: &Path, label: &str) -> Result<EditOutcome> {
    if !paths::exists(path) {
        ctx.reporter
            .info(format!("{label} config file does not exist: {}", path.display()));
        return Ok(EditOutcome::NotFound);
    }

    match apply(ctx, path, label) {
        Ok(outcome) => Ok(outcome),
        Err(err) => {
            ctx.reporter
                .error(format!("error while processing {label} config file: {err}"));
            ctx.reporter.record(&ActivityEvent::Failed {
                path: path.to_path_buf(),
                error: err.to_string(),
            });
            Err(err)
        }
    }
}

fn apply(ctx: &mut CleanupContext, path: &Path, label: &str) -> Result<EditOutcome> {
    let bytes = fs::read(path).map_err(|e| CleanError::io(path, e))?;
    let content = String::from_utf8(bytes).map_err(|_| CleanError::Encoding {
        path: path.to_path_buf(),
    })?;

    let patch = compute_patch(&content)?;
    if !patch.changed() {
        ctx.reporter
            .info(format!("no Augment entries found in {label} config file"));
        return Ok(EditOutcome::Unchanged);
    }
    for fragment in &patch.removed {
        ctx.reporter.info(format!("removing entry: {fragment}"));
    }

    if ctx.options.simulate {
        ctx.reporter
            .warn(format!("[simulate] would modify {label} config file"));
        ctx.reporter.record(&ActivityEvent::ConfigSimulated {
            path: path.to_path_buf(),
            fragments: patch.removed.len(),
        });
        return Ok(EditOutcome::Simulated);
    }

    let backup = if ctx.options.writes_backups() {
        let backup = backup_path(path, Local::now());
        fs::write(&backup, patch.original.as_bytes()).map_err(|e| CleanError::io(&backup, e))?;
        ctx.reporter
            .info(format!("created config backup: {}", backup.display()));
        ctx.reporter.record(&ActivityEvent::BackupWritten {
            path: path.to_path_buf(),
            backup: backup.clone(),
        });
        Some(backup)
    } else {
        None
    };

    fs::write(path, patch.modified.as_bytes()).map_err(|e| CleanError::io(path, e))?;
    ctx.reporter
        .success(format!("cleaned {label} config file"));
    ctx.reporter.record(&ActivityEvent::ConfigModified {
        path: path.to_path_buf(),
        fragments: patch.removed.len(),
    });
    Ok(EditOutcome::Modified { backup })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cleaner::confirm::ScriptedPrompter;
    use crate::cleaner::test_support::context;
    use crate::core::options::RunOptions;
    use chrono::TimeZone;
    use proptest::prelude::*;
    use tempfile::TempDir;

    const SETTINGS: &str = r#"{
  "editor.fontSize": 14,
  "augment.enable": true,
  "files.autoSave": "onFocusChange"
}
"#;

    #[test]
    fn removes_key_and_dangling_comma() {
        let patch = compute_patch(SETTINGS).unwrap();
        assert!(patch.changed());
        assert_eq!(patch.removed, vec![r#""augment.enable": true,"#]);
        assert_eq!(
            patch.modified,
            "{\n  \"editor.fontSize\": 14,\n  \"files.autoSave\": \"onFocusChange\"\n}\n"
        );
        assert_eq!(patch.original, SETTINGS);
    }

    #[test]
    fn last_key_leaves_no_trailing_comma() {
        let text = "{\n  \"a\": 1,\n  \"augment.chat.userGuidelines\": \"be, brief\"\n}\n";
        let patch = compute_patch(text).unwrap();
        assert_eq!(patch.modified, "{\n  \"a\": 1\n}\n");
    }

    #[test]
    fn case_insensitive_keys_and_object_values() {
        let text = "{\n  \"Augment.advanced\": {\"apiUrl\": \"x\"},\n  \"b\": [1, 2]\n}";
        let patch = compute_patch(text).unwrap();
        assert_eq!(patch.modified, "{\n  \"b\": [1, 2]\n}");
    }

    #[test]
    fn keybinding_objects_are_removed_whole() {
        let text = r#"[
  { "key": "ctrl+l", "command": "augment.chat", "when": "editorFocus" },
  { "key": "ctrl+k", "command": "editor.action.format" },
  { "key": "ctrl+i", "command": "-augment.insert" }
]"#;
        let patch = compute_patch(text).unwrap();
        assert_eq!(patch.removed.len(), 2);
        assert_eq!(
            patch.modified,
            "[\n  { \"key\": \"ctrl+k\", \"command\": \"editor.action.format\" }\n]"
        );
    }

    #[test]
    fn workspace_recommendations_lose_extension() {
        let text = r#"{
  "recommendations": ["augment.vscode-augment", "rust-lang.rust-analyzer", "AUGMENT.other"]
}"#;
        let patch = compute_patch(text).unwrap();
        assert_eq!(
            patch.modified,
            "{\n  \"recommendations\": [ \"rust-lang.rust-analyzer\" ]\n}"
        );
        assert_eq!(
            patch.removed,
            vec![r#""augment.vscode-augment""#, r#""AUGMENT.other""#]
        );
    }

    #[test]
    fn keybinding_with_nested_args_is_removed_whole() {
        let text = r#"[
  { "key": "ctrl+l", "command": "augment.chat", "args": { "mode": "x" } },
  { "key": "ctrl+k", "command": "editor.action.format" }
]"#;
        let patch = compute_patch(text).unwrap();
        assert_eq!(
            patch.removed,
            vec![r#"{ "key": "ctrl+l", "command": "augment.chat", "args": { "mode": "x" } },"#]
        );
        assert_eq!(
            patch.modified,
            "[\n  { \"key\": \"ctrl+k\", \"command\": \"editor.action.format\" }\n]"
        );
    }

    #[test]
    fn nested_object_values_are_removed_whole() {
        let text = "{\n  \"augment.advanced\": {\"nested\": {\"a\": 1}, \"b\": 2},\n  \"c\": 3\n}";
        let patch = compute_patch(text).unwrap();
        assert_eq!(patch.modified, "{\n  \"c\": 3\n}");
        assert_eq!(patch.removed.len(), 1);
    }

    #[test]
    fn values_naming_the_extension_drop_their_pair() {
        let text = r#"{
  "editor.defaultFormatter": "augment.vscode-augment",
  "[typescript]": {
    "editor.defaultFormatter": "Augment.vscode-augment"
  },
  "editor.tabSize": 2
}"#;
        let patch = compute_patch(text).unwrap();
        assert_eq!(
            patch.removed,
            vec![
                r#""editor.defaultFormatter": "augment.vscode-augment","#,
                r#""editor.defaultFormatter": "Augment.vscode-augment""#,
            ]
        );
        assert_eq!(
            patch.modified,
            "{\n  \"[typescript]\": {\n  },\n  \"editor.tabSize\": 2\n}"
        );
    }

    #[test]
    fn pattern_tables_compile() {
        assert_eq!(rules(&ENTRY_RULES).unwrap().len(), ENTRY_PATTERNS.len());
        assert_eq!(rules(&TIDY_RULES).unwrap().len(), TIDY_PATTERNS.len());
    }

    #[test]
    fn unrelated_string_values_survive() {
        let text = "{\n  \"window.title\": \"augmented reality\",\n  \"augment.x\": 1\n}";
        let patch = compute_patch(text).unwrap();
        assert_eq!(
            patch.modified,
            "{\n  \"window.title\": \"augmented reality\"\n}"
        );
    }

    #[test]
    fn no_match_returns_text_verbatim() {
        let text = "{\n\n  \"a\": 1,\n\n  \"b\": 2\n}\n";
        let patch = compute_patch(text).unwrap();
        assert!(!patch.changed());
        assert_eq!(patch.modified, text);
    }

    #[test]
    fn second_pass_finds_nothing() {
        let once = compute_patch(SETTINGS).unwrap();
        let twice = compute_patch(&once.modified).unwrap();
        assert!(!twice.changed());
        assert_eq!(twice.modified, once.modified);
    }

    #[test]
    fn backup_name_has_second_resolution() {
        let at = Local.with_ymd_and_hms(2025, 3, 9, 7, 5, 2).unwrap();
        assert_eq!(
            backup_path(Path::new("/u/settings.json"), at),
            PathBuf::from("/u/settings.json.backup_20250309_070502")
        );
    }

    fn backups_in(dir: &Path) -> Vec<PathBuf> {
        let mut found: Vec<PathBuf> = fs::read_dir(dir)
            .unwrap()
            .flatten()
            .map(|e| e.path())
            .filter(|p| p.to_string_lossy().contains(".backup_"))
            .collect();
        found.sort();
        found
    }

    #[test]
    fn edit_writes_backup_then_content() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("settings.json");
        fs::write(&path, SETTINGS).unwrap();
        let prompter = ScriptedPrompter::new(Vec::<String>::new());
        let (mut ctx, _sink) = context(RunOptions::default(), &prompter);

        let outcome = clean_config(&mut ctx, &path, "settings").unwrap();
        let EditOutcome::Modified {
            backup: Some(backup),
        } = outcome
        else {
            panic!("expected a modified file with backup, got {outcome:?}");
        };
        assert_eq!(fs::read_to_string(&backup).unwrap(), SETTINGS);
        assert!(!fs::read_to_string(&path).unwrap().contains("augment"));
        assert_eq!(backups_in(tmp.path()), vec![backup]);
        assert!(prompter.asked().is_empty());
    }

    #[test]
    fn skip_backup_writes_no_backup() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("settings.json");
        fs::write(&path, SETTINGS).unwrap();
        let prompter = ScriptedPrompter::new(Vec::<String>::new());
        let options = RunOptions {
            skip_backup: true,
            ..RunOptions::default()
        };
        let (mut ctx, _sink) = context(options, &prompter);

        let outcome = clean_config(&mut ctx, &path, "settings").unwrap();
        assert_eq!(outcome, EditOutcome::Modified { backup: None });
        assert!(backups_in(tmp.path()).is_empty());
    }

    #[test]
    fn simulate_changes_nothing() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("settings.json");
        fs::write(&path, SETTINGS).unwrap();
        let prompter = ScriptedPrompter::new(Vec::<String>::new());
        let options = RunOptions {
            simulate: true,
            ..RunOptions::default()
        };
        let (mut ctx, sink) = context(options, &prompter);

        let outcome = clean_config(&mut ctx, &path, "settings").unwrap();
        assert_eq!(outcome, EditOutcome::Simulated);
        assert!(outcome.counts_as_modified());
        assert_eq!(fs::read_to_string(&path).unwrap(), SETTINGS);
        assert!(backups_in(tmp.path()).is_empty());
        assert!(sink.contents().contains("[simulate] would modify settings"));
    }

    #[test]
    fn unchanged_file_gets_no_backup() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("settings.json");
        let text = "{\n  \"editor.fontSize\": 14\n}\n";
        fs::write(&path, text).unwrap();
        let prompter = ScriptedPrompter::new(Vec::<String>::new());
        let (mut ctx, _sink) = context(RunOptions::default(), &prompter);

        let outcome = clean_config(&mut ctx, &path, "settings").unwrap();
        assert_eq!(outcome, EditOutcome::Unchanged);
        assert!(!outcome.counts_as_modified());
        assert_eq!(fs::read_to_string(&path).unwrap(), text);
        assert!(backups_in(tmp.path()).is_empty());
    }

    #[test]
    fn missing_file_is_not_found() {
        let tmp = TempDir::new().unwrap();
        let prompter = ScriptedPrompter::new(Vec::<String>::new());
        let (mut ctx, _sink) = context(RunOptions::default(), &prompter);
        let outcome = clean_config(&mut ctx, &tmp.path().join("nope.json"), "settings").unwrap();
        assert_eq!(outcome, EditOutcome::NotFound);
    }

    #[test]
    fn non_utf8_file_is_an_error_and_untouched() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("settings.json");
        let bytes = [0xff, 0xfe, b'"', b'a', b'u'];
        fs::write(&path, bytes).unwrap();
        let prompter = ScriptedPrompter::new(Vec::<String>::new());
        let (mut ctx, sink) = context(RunOptions::default(), &prompter);

        let err = clean_config(&mut ctx, &path, "settings").unwrap_err();
        assert_eq!(err.code(), "ACL-2002");
        assert_eq!(fs::read(&path).unwrap(), bytes);
        assert!(sink.contents().contains("[ERROR]"));
    }

    fn settings_document(entries: &[(String, String)]) -> String {
        let body: Vec<String> = entries
            .iter()
            .map(|(key, value)| format!("  \"{key}\": {value}"))
            .collect();
        format!("{{\n{}\n}}\n", body.join(",\n"))
    }

    fn value_strategy() -> impl Strategy<Value = String> {
        prop_oneof![
            Just(String::from("true")),
            Just(String::from("false")),
            (0u32..10_000).prop_map(|n| n.to_string()),
            "[b-z0-9 ,]{0,12}".prop_map(|s| format!("\"{s}\"")),
        ]
    }

    fn plain_key() -> impl Strategy<Value = String> {
        "[b-z]{1,6}\\.[b-z]{1,8}"
    }

    fn any_key() -> impl Strategy<Value = String> {
        prop_oneof![
            plain_key(),
            "[b-z]{1,8}".prop_map(|s| format!("augment.{s}")),
            "[b-z]{1,8}".prop_map(|s| format!("Augment.{s}")),
        ]
    }

    proptest! {
        #[test]
        fn cleaning_is_idempotent(
            entries in prop::collection::vec((any_key(), value_strategy()), 0..8)
        ) {
            let text = settings_document(&entries);
            let once = compute_patch(&text).unwrap();
            let twice = compute_patch(&once.modified).unwrap();
            prop_assert!(!twice.changed());
            prop_assert_eq!(&twice.modified, &once.modified);
            prop_assert!(!once.modified.to_lowercase().contains("\"augment"));
        }

        #[test]
        fn documents_without_entries_are_untouched(
            entries in prop::collection::vec((plain_key(), value_strategy()), 0..8)
        ) {
            let text = settings_document(&entries);
            let patch = compute_patch(&text).unwrap();
            prop_assert!(!patch.changed());
            prop_assert_eq!(patch.modified, text);
        }
    }
}
