//! YAML corpus loading and personal-corpus merging (spec §6 external
//! interface — out of scope for the retrieval core itself, but needed to
//! produce the `Vec<Command>` the core builds its index over).
//!
//! Grounded on the teacher's `config.rs` load-then-normalize-then-merge
//! shape, adapted from JSON/TOML config-layer merging to YAML
//! corpus-entry merging. `serde_yaml` is attested across the pack's
//! retrieval/RAG repos for exactly this corpus-document shape.

use crate::models::Command;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("reading corpus file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("parsing corpus YAML in {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("expanding personal corpus glob {pattern}: {source}")]
    Glob {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },
}

/// Parse a single YAML document (spec §6's corpus input format: a
/// sequence of command mappings) into finalized `Command`s.
pub fn parse_corpus(yaml: &str, source_label: &str) -> Result<Vec<Command>, CorpusError> {
    let mut commands: Vec<Command> =
        serde_yaml::from_str(yaml).map_err(|source| CorpusError::Parse {
            path: source_label.to_string(),
            source,
        })?;
    for cmd in &mut commands {
        cmd.finalize();
    }
    Ok(commands)
}

/// Load the primary corpus file from disk.
pub fn load_corpus_file(path: &Path) -> Result<Vec<Command>, CorpusError> {
    let raw = std::fs::read_to_string(path).map_err(|source| CorpusError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_corpus(&raw, &path.display().to_string())
}

/// Default glob for personal-corpus fragments, used when the CLI doesn't
/// override it: `~/.config/revman/corpus.d/*.yaml`.
pub fn default_personal_corpus_glob() -> Option<String> {
    dirs::config_dir().map(|dir| {
        dir.join("revman")
            .join("corpus.d")
            .join("*.yaml")
            .display()
            .to_string()
    })
}

/// Merge the personal-corpus fragments matched by `glob_pattern` (e.g.
/// `~/.config/revman/corpus.d/*.yaml`) into `base`. Each fragment is itself
/// a full YAML sequence of `Command` entries; fragments are applied in
/// lexicographic path order for determinism. Entries are upserted by exact
/// `command` string match — a fragment entry whose `command` already
/// exists in `base` replaces it in place (later files win); otherwise it's
/// appended. A fragment that fails to parse is skipped with a warning
/// rather than aborting the whole merge — personal corpus entries are
/// optional enrichment, not load-bearing for the core corpus.
pub fn merge_personal_corpus(
    base: &mut Vec<Command>,
    glob_pattern: &str,
) -> Result<usize, CorpusError> {
    let mut paths: Vec<_> = glob::glob(glob_pattern)
        .map_err(|source| CorpusError::Glob {
            pattern: glob_pattern.to_string(),
            source,
        })?
        .filter_map(Result::ok)
        .collect();
    paths.sort();

    let mut merged = 0;
    for path in paths {
        match load_corpus_file(&path) {
            Ok(fragment) => {
                for entry in fragment {
                    merged += 1;
                    match base.iter_mut().find(|c| c.command == entry.command) {
                        Some(existing) => *existing = entry,
                        None => base.push(entry),
                    }
                }
            }
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "skipping unparseable personal corpus fragment");
            }
        }
    }
    Ok(merged)
}

/// Load the base corpus from `base_path`, then upsert the personal-corpus
/// fragments matched by `personal_glob` on top of it (spec §6.2). The
/// single entry point a caller needs for a complete, override-aware
/// corpus load.
pub fn load_with_overrides(
    base_path: &Path,
    personal_glob: &str,
) -> Result<Vec<Command>, CorpusError> {
    let mut commands = load_corpus_file(base_path)?;
    merge_personal_corpus(&mut commands, personal_glob)?;
    Ok(commands)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_required_and_optional_fields() {
        let yaml = r#"
- command: "git commit -m 'message'"
  description: "commit changes with message"
  keywords: ["git", "commit"]
- command: "ls -la"
  description: "list files"
"#;
        let commands = parse_corpus(yaml, "test").unwrap();
        assert_eq!(commands.len(), 2);
        assert_eq!(commands[0].keywords, vec!["git", "commit"]);
        assert!(commands[1].keywords.is_empty());
        assert!(commands[1].tags.is_empty());
        assert!(!commands[1].pipeline);
        assert_eq!(commands[0].command_lower, "git commit -m 'message'");
    }

    #[test]
    fn malformed_yaml_is_a_parse_error() {
        let result = parse_corpus("not: [valid, yaml", "test");
        assert!(matches!(result, Err(CorpusError::Parse { .. })));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let result = load_corpus_file(Path::new("/nonexistent/corpus.yaml"));
        assert!(matches!(result, Err(CorpusError::Io { .. })));
    }

    #[test]
    fn merge_with_no_matching_fragments_is_a_noop() {
        let mut base = vec![];
        let merged = merge_personal_corpus(&mut base, "/nonexistent/*.yaml").unwrap();
        assert_eq!(merged, 0);
        assert!(base.is_empty());
    }

    #[test]
    fn merge_upserts_by_command_string() {
        let mut base = parse_corpus(
            r#"
- command: "ls -la"
  description: "list files"
"#,
            "base",
        )
        .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let fragment_path = dir.path().join("personal.yaml");
        std::fs::write(
            &fragment_path,
            r#"
- command: "ls -la"
  description: "overridden description"
- command: "git status"
  description: "show status"
"#,
        )
        .unwrap();

        let glob_pattern = dir.path().join("*.yaml").display().to_string();
        let merged = merge_personal_corpus(&mut base, &glob_pattern).unwrap();

        assert_eq!(merged, 2);
        assert_eq!(base.len(), 2);
        let ls = base.iter().find(|c| c.command == "ls -la").unwrap();
        assert_eq!(ls.description, "overridden description");
        assert!(base.iter().any(|c| c.command == "git status"));
    }

    #[test]
    fn load_with_overrides_applies_personal_fragments_over_base() {
        let dir = tempfile::tempdir().unwrap();
        let base_path = dir.path().join("corpus.yaml");
        std::fs::write(
            &base_path,
            r#"
- command: "ls -la"
  description: "list files"
"#,
        )
        .unwrap();
        let personal_path = dir.path().join("personal.yaml");
        std::fs::write(
            &personal_path,
            r#"
- command: "ls -la"
  description: "overridden"
"#,
        )
        .unwrap();

        let glob_pattern = dir.path().join("personal.yaml").display().to_string();
        let commands = load_with_overrides(&base_path, &glob_pattern).unwrap();
        assert_eq!(commands.len(), 1);
        assert_eq!(commands[0].description, "overridden");
    }
}
