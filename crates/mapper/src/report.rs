use infomap_core::{MappingSet, MatchKind, ReconcileReport};
use std::fmt::Write;

/// Per-category counts, sorted by category name.
pub fn format_summary(mapping: &MappingSet) -> String {
    let mut out = format!("{} infographics\n", mapping.len());

    if mapping.is_empty() {
        return out;
    }

    out.push_str("\nSummary by category:\n");
    for (category, count) in mapping.count_by_category() {
        let _ = writeln!(out, "  {}: {}", category, count);
    }

    let themes = mapping.themes();
    if !themes.is_empty() {
        let names: Vec<&str> = themes.iter().map(|t| t.as_str()).collect();
        let label = if names.len() == 1 { "Theme" } else { "Themes" };
        let _ = writeln!(out, "\n{}: {}", label, names.join(", "));
    }

    out
}

pub fn format_reconcile_report(report: &ReconcileReport) -> String {
    let mut out = String::new();

    let renamed: Vec<_> = report
        .matched
        .iter()
        .filter(|(_, _, kind)| *kind == MatchKind::Stem)
        .collect();
    let _ = writeln!(
        out,
        "Matched {} existing ({} by name without extension), {} new",
        report.matched.len(),
        renamed.len(),
        report.new_count()
    );

    for (key, old, _) in renamed {
        let _ = writeln!(out, "  [~] {} (was {})", key, old);
    }
    for (key, slide) in report.pinned.iter().chain(&report.assigned) {
        let _ = writeln!(out, "  [+] {} -> slide {}", key, slide);
    }
    for name in &report.retained {
        let _ = writeln!(out, "  [=] {} kept (not found on disk)", name);
    }
    for name in &report.retired {
        let _ = writeln!(out, "  [-] {} removed (not found on disk)", name);
    }

    out
}
