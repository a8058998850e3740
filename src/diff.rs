use console::style;
use similar::{ChangeTag, TextDiff};

/// Colored unified diff between two versions of a file, or `None` if they match.
pub fn unified_diff(path: &str, old: &str, new: &str) -> Option<String> {
    if old == new {
        return None;
    }

    const CONTEXT_LINES: usize = 3;
    let diff = TextDiff::from_lines(old, new);

    let mut diff_lines = vec![
        style(format!("--- {path}")).bold().to_string(),
        style(format!("+++ {path}")).bold().to_string(),
    ];

    for group in diff.grouped_ops(CONTEXT_LINES) {
        let (Some(first), Some(last)) = (group.first(), group.last()) else {
            continue;
        };
        let old_start = first.old_range().start;
        let new_start = first.new_range().start;
        let old_len = last.old_range().end - old_start;
        let new_len = last.new_range().end - new_start;
        diff_lines.push(
            style(format!(
                "@@ -{},{old_len} +{},{new_len} @@",
                old_start + 1,
                new_start + 1
            ))
            .cyan()
            .to_string(),
        );

        for op in &group {
            for change in diff.iter_changes(op) {
                let line = change.value().trim_end_matches('\n');
                let rendered = match change.tag() {
                    ChangeTag::Delete => style(format!("-{line}")).red().to_string(),
                    ChangeTag::Insert => style(format!("+{line}")).green().to_string(),
                    ChangeTag::Equal => format!(" {line}"),
                };
                diff_lines.push(rendered);
            }
        }
    }
    Some(diff_lines.join("\n"))
}
