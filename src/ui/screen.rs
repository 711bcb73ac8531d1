use crossterm::{style::Stylize, terminal};
use unicode_width::UnicodeWidthChar;

use crate::model::{Session, Task};
use crate::types::TaskStatus;
use crate::ui::symbols::Symbols;

const RULE_WIDTH: usize = 30;
const BANNER_WIDTH: usize = 50;
const FALLBACK_COLUMNS: usize = 80;

pub(crate) fn terminal_width() -> usize {
    terminal::size()
        .map(|(cols, _)| cols as usize)
        .ok()
        .filter(|cols| *cols > 0)
        .unwrap_or(FALLBACK_COLUMNS)
}

// ── Screens ───────────────────────────────────────────────────────────────────

pub(crate) fn welcome_lines(total_completed: usize, model: &str, base_url: &str) -> Vec<String> {
    let sym = Symbols::current();
    let version = env!("CARGO_PKG_VERSION");
    let host = extract_host_from_url(base_url).unwrap_or_else(|| base_url.to_string());
    let mut lines = vec![
        String::new(),
        sym.double_rule.repeat(BANNER_WIDTH),
        format!("   🎯 {}", "TASK COACH - Break it down, get it done!".bold()),
        sym.double_rule.repeat(BANNER_WIDTH),
        format!("   {}", format!("task-coach v{version} · {model} · {host}").dark_grey()),
        String::new(),
    ];
    if total_completed > 0 {
        lines.push(format!(
            "  {} You've completed {total_completed} goal{} so far.",
            sym.trophy,
            if total_completed == 1 { "" } else { "s" }
        ));
        lines.push(String::new());
    }
    lines
}

pub(crate) fn plan_lines(tasks: &[Task], width: usize) -> Vec<String> {
    let sym = Symbols::current();
    let mut lines = vec![
        String::new(),
        "Here's your plan:".bold().to_string(),
        sym.rule.repeat(RULE_WIDTH),
    ];
    for task in tasks {
        let icon = sym.status_icon(task.status());
        let prefix = format!("  {icon} Task {}: ", task.ordinal());
        let suffix = format!(" ({} min)", task.duration_minutes());
        let room = width
            .saturating_sub(rendered_text_width(&prefix) + rendered_text_width(&suffix))
            .max(8);
        let description = fit_single_line(task.description(), room);
        // resolved steps are dimmed when a plan is shown again on resume
        let description = if task.is_pending() {
            description
        } else {
            description.dark_grey().to_string()
        };
        lines.push(format!("{prefix}{description}{}", suffix.dark_grey()));
    }
    lines.push(sym.rule.repeat(RULE_WIDTH));
    lines.push(String::new());
    lines
}

/// Numbered list used when picking a task to re-time.
pub(crate) fn task_choice_lines(tasks: &[Task]) -> Vec<String> {
    tasks
        .iter()
        .map(|t| {
            format!(
                " {}. {} ({} min)",
                t.ordinal(),
                t.description(),
                t.duration_minutes()
            )
        })
        .collect()
}

pub(crate) fn task_header_lines(session: &Session, task: &Task) -> Vec<String> {
    let total = session.tasks().len();
    vec![
        format!(
            "{} {} {}",
            Symbols::current().current,
            format!("Task {} of {total}:", task.ordinal()).bold(),
            task.description()
        ),
        format!("   Time: {} minutes", task.duration_minutes()),
        format!(
            "   Progress: {}/{total} completed",
            session.completed_count()
        ),
        String::new(),
    ]
}

pub(crate) fn summary_lines(session: &Session) -> Vec<String> {
    let sym = Symbols::current();
    let total = session.tasks().len();
    let mut lines = vec![
        String::new(),
        sym.double_rule.repeat(BANNER_WIDTH),
        format!("   📊 {}", "SESSION SUMMARY".bold()),
        sym.double_rule.repeat(BANNER_WIDTH),
        String::new(),
        format!("  Goal: {}", session.goal()),
        String::new(),
        format!(
            "  {} Completed: {}/{total}",
            sym.completed,
            session.completed_count()
        ),
        format!(
            "  {}  Skipped: {}/{total}",
            sym.skipped,
            session.skipped_count()
        ),
        String::new(),
        "  Tasks:".to_string(),
    ];
    for task in session.tasks() {
        lines.push(format!(
            "    {} {}",
            sym.status_icon(task.status()),
            task.description()
        ));
    }
    lines.extend([
        String::new(),
        sym.double_rule.repeat(BANNER_WIDTH),
        "  🎉 Great work showing up today!".to_string(),
        sym.double_rule.repeat(BANNER_WIDTH),
        String::new(),
    ]);
    lines
}

pub(crate) fn history_lines(completed: &[Session]) -> Vec<String> {
    if completed.is_empty() {
        return vec![
            String::new(),
            "No completed goals yet. Let's change that!".to_string(),
            String::new(),
        ];
    }
    let sym = Symbols::current();
    let mut lines = vec![
        String::new(),
        format!("{} {}", sym.trophy, "Your Completed Goals:".bold()),
        sym.rule.repeat(RULE_WIDTH),
    ];
    for session in completed {
        lines.push(format!(
            "  {} {} {}",
            sym.status_icon(TaskStatus::Completed),
            session.goal(),
            session
                .created_at()
                .format("(%Y-%m-%d)")
                .to_string()
                .dark_grey()
        ));
    }
    lines.push(sym.rule.repeat(RULE_WIDTH));
    lines.push(String::new());
    lines
}

// ── Text measurement ──────────────────────────────────────────────────────────

fn extract_host_from_url(url: &str) -> Option<String> {
    let no_scheme = url.split("://").nth(1).unwrap_or(url);
    let host = no_scheme.split('/').next().unwrap_or(no_scheme).trim();
    if host.is_empty() {
        None
    } else {
        Some(host.to_string())
    }
}

pub(crate) fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '\u{1b}' && matches!(chars.peek(), Some('[')) {
            let _ = chars.next();
            for c in chars.by_ref() {
                if ('@'..='~').contains(&c) {
                    break;
                }
            }
            continue;
        }
        out.push(ch);
    }
    out
}

pub(crate) fn rendered_text_width(s: &str) -> usize {
    strip_ansi(s)
        .chars()
        .filter(|c| !c.is_control())
        .map(|c| UnicodeWidthChar::width(c).unwrap_or(0))
        .sum()
}

/// Clip `s` to one line of at most `max_width` columns, keeping the head.
pub(crate) fn fit_single_line(s: &str, max_width: usize) -> String {
    if max_width == 0 {
        return String::new();
    }

    let plain: String = strip_ansi(s)
        .chars()
        .map(|c| if c == '\t' || c == '\n' || c == '\r' { ' ' } else { c })
        .collect();
    if rendered_text_width(&plain) <= max_width {
        return plain;
    }

    let ellipsis = Symbols::current().ellipsis;
    let ellipsis_width = rendered_text_width(ellipsis);
    if max_width <= ellipsis_width {
        return ellipsis.to_string();
    }
    let budget = max_width - ellipsis_width;

    let mut out = String::new();
    let mut used = 0usize;
    for ch in plain.chars() {
        if ch.is_control() {
            continue;
        }
        let w = UnicodeWidthChar::width(ch).unwrap_or(0);
        if used + w > budget {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push_str(ellipsis);
    out
}
