//! Intent boost table (spec §4.5): a small fixed mapping from detected
//! intent to command/description substrings worth amplifying, plus
//! action/target multipliers and a couple of hand-picked special cases.
//!
//! No direct teacher counterpart (the teacher has no intent concept) — this
//! follows the same plain substring-match-over-a-fixed-key-set style
//! `search/result_ranking.rs` uses for its reranker dispatch.

use crate::models::{Command, Intent, ProcessedQuery};

fn any_in(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

/// The fixed per-intent multiplier from spec §4.5's table. Multiple rows
/// for the same intent (e.g. View) both apply independently if matched.
fn intent_table_multiplier(intent: Intent, cmd: &Command) -> f64 {
    let command = &cmd.command_lower;
    let description = &cmd.description_lower;
    let mut multiplier = 1.0;

    match intent {
        Intent::Find => {
            if any_in(command, &["find", "search", "ls", "grep"]) {
                multiplier *= 2.0;
            }
        }
        Intent::View => {
            if any_in(command, &["cat", "less", "more", "head", "tail", "view"]) {
                multiplier *= 2.5;
            }
            if any_in(description, &["display", "show", "view", "print"]) {
                multiplier *= 2.0;
            }
        }
        Intent::Create => {
            if any_in(command, &["mkdir", "touch", "create", "make"]) {
                multiplier *= 2.0;
            }
            if command.contains("makepkg") && !description.contains("package") {
                multiplier *= 0.3;
            }
        }
        Intent::Delete => {
            if any_in(command, &["rm", "del", "delete", "remove"]) {
                multiplier *= 2.0;
            }
        }
        Intent::Modify => {
            if any_in(command, &["chmod", "chown", "edit", "modify", "change"]) {
                multiplier *= 2.0;
            }
        }
        Intent::Install => {
            if any_in(command, &["install", "add", "setup"]) || description.contains("install") {
                multiplier *= 2.0;
            }
        }
        Intent::Run => {
            if any_in(command, &["run", "exec", "start", "launch"]) {
                multiplier *= 2.0;
            }
        }
        Intent::Configure => {
            if any_in(command, &["config", "set", "configure"]) || description.contains("config")
            {
                multiplier *= 2.0;
            }
        }
        Intent::Unknown => {}
    }
    multiplier
}

/// Action/target presence multipliers, plus the compress/archive and
/// find/locate special cases from spec §4.5. All multipliers compose
/// multiplicatively with `intent_table_multiplier`.
fn action_target_multiplier(query: &ProcessedQuery, cmd: &Command) -> f64 {
    let command = &cmd.command_lower;
    let description = &cmd.description_lower;
    let mut multiplier = 1.0;

    for action in &query.actions {
        if command.contains(action.as_str()) {
            multiplier *= 1.5;
        } else if description.contains(action.as_str()) {
            multiplier *= 1.3;
        }
        if action == "compress" || action == "archive" {
            if any_in(command, &["tar", "zip", "gzip"]) {
                multiplier *= 2.5;
            }
            if any_in(command, &["find", "locate"]) {
                multiplier *= 0.2;
            }
        }
    }

    for target in &query.targets {
        if command.contains(target.as_str()) {
            multiplier *= 1.4;
        } else if description.contains(target.as_str()) {
            multiplier *= 1.2;
        }
    }

    multiplier
}

/// The full intent-boost multiplier for one result (spec §4.5), all
/// components composed multiplicatively.
pub fn intent_boost(cmd: &Command, query: &ProcessedQuery) -> f64 {
    let mut multiplier = 1.0;
    if let Some(intent) = query.intent {
        multiplier *= intent_table_multiplier(intent, cmd);
    }
    multiplier *= action_target_multiplier(query, cmd);
    multiplier
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_command(command: &str, description: &str) -> Command {
        let mut c = Command {
            command: command.to_string(),
            description: description.to_string(),
            keywords: vec![],
            tags: vec![],
            platform: vec![],
            pipeline: false,
            niche: None,
            command_lower: String::new(),
            description_lower: String::new(),
            keywords_lower: String::new(),
            tags_lower: String::new(),
        };
        c.finalize();
        c
    }

    #[test]
    fn find_intent_boosts_matching_command() {
        let cmd = make_command("find . -name '*.rs'", "find files");
        let query = ProcessedQuery {
            intent: Some(Intent::Find),
            ..Default::default()
        };
        assert_eq!(intent_boost(&cmd, &query), 2.0);
    }

    #[test]
    fn no_intent_leaves_multiplier_at_one() {
        let cmd = make_command("find . -name '*.rs'", "find files");
        let query = ProcessedQuery::default();
        assert_eq!(intent_boost(&cmd, &query), 1.0);
    }

    #[test]
    fn makepkg_without_package_in_description_is_suppressed() {
        let cmd = make_command("makepkg -si", "build stuff");
        let query = ProcessedQuery {
            intent: Some(Intent::Create),
            ..Default::default()
        };
        // "makepkg" also contains the substring "make", so the Create
        // table's make/mkdir/touch/create branch fires first (*2.0) before
        // the suppression special case (*0.3) — 2.0 * 0.3 = 0.6, per
        // spec §4.5's "all multipliers compose multiplicatively".
        assert!((intent_boost(&cmd, &query) - 0.6).abs() < 1e-12);
    }

    #[test]
    fn compress_action_on_tar_command_gets_archive_bonus() {
        let cmd = make_command("tar -czf out.tar.gz .", "create archive");
        let query = ProcessedQuery {
            actions: vec!["compress".to_string()],
            ..Default::default()
        };
        // command doesn't literally contain "compress", so no 1.5x, but
        // the tar/zip/gzip special case still fires.
        assert!((intent_boost(&cmd, &query) - 2.5).abs() < 1e-12);
    }

    #[test]
    fn compress_action_demotes_find_commands() {
        let cmd = make_command("find . -name '*.gz'", "find compressed files");
        let query = ProcessedQuery {
            actions: vec!["compress".to_string()],
            ..Default::default()
        };
        assert!((intent_boost(&cmd, &query) - 0.2).abs() < 1e-12);
    }

    #[test]
    fn target_match_in_command_applies_1_4x() {
        let cmd = make_command("rm file.txt", "remove a file");
        let query = ProcessedQuery {
            targets: vec!["file".to_string()],
            ..Default::default()
        };
        assert!((intent_boost(&cmd, &query) - 1.4).abs() < 1e-12);
    }
}
