use atty::Stream;
use color_eyre::Result;
use foldicon_core::{CommandGroup, CommandInfo, CommandStatus, ExecutionOutcome};
use serde_json::Value;

use crate::style::Style;

#[derive(Clone, Copy, Debug)]
pub struct OutputOptions {
    pub quiet: bool,
    pub json: bool,
    pub no_color: bool,
}

pub fn emit_output(
    opts: &OutputOptions,
    info: CommandInfo,
    outcome: &ExecutionOutcome,
) -> Result<i32> {
    let code = outcome.status.exit_code();

    if opts.json {
        let payload = foldicon_core::to_json_response(info, outcome);
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(code);
    }

    if outcome.status == CommandStatus::Ok {
        if opts.quiet {
            return Ok(code);
        }
        let style = Style::new(opts.no_color, atty::is(Stream::Stdout));
        if let Some(table) = render_icon_table(&style, info, &outcome.details) {
            let count = table.len().saturating_sub(2);
            let header = foldicon_core::format_status_message(info, &icon_count(count));
            println!("{}", style.status(outcome.status, &header));
            for line in table {
                println!("{line}");
            }
        } else {
            let message = foldicon_core::format_status_message(info, &outcome.message);
            println!("{}", style.status(outcome.status, &message));
        }
        for note in advisory_lines(&outcome.details) {
            println!("{}", style.warning(&format!("  note: {note}")));
        }
    } else {
        let style = Style::new(opts.no_color, atty::is(Stream::Stderr));
        let message = foldicon_core::format_status_message(info, &outcome.message);
        eprintln!("{}", style.status(outcome.status, &message));
        if let Some(reason) = reason_from_details(&outcome.details, &outcome.message) {
            eprintln!("  reason: {reason}");
        }
        if let Some(hint) = hint_from_details(&outcome.details) {
            eprintln!("{}", style.info(&format!("Tip: {hint}")));
        }
        for note in advisory_lines(&outcome.details) {
            eprintln!("{}", style.warning(&format!("  note: {note}")));
        }
    }

    Ok(code)
}

fn icon_count(count: usize) -> String {
    if count == 1 {
        "1 icon recorded".to_string()
    } else {
        format!("{count} icons recorded")
    }
}

fn hint_from_details(details: &Value) -> Option<&str> {
    details
        .as_object()
        .and_then(|map| map.get("hint"))
        .and_then(Value::as_str)
}

/// The detailed reason, unless the message already says the same thing.
fn reason_from_details<'a>(details: &'a Value, message: &str) -> Option<&'a str> {
    details
        .as_object()
        .and_then(|map| map.get("reason"))
        .and_then(Value::as_str)
        .filter(|reason| !message.contains(reason))
}

/// Top-level advisories, then those attached to restore entries.
fn advisory_lines(details: &Value) -> Vec<String> {
    let entries = details
        .get("entries")
        .and_then(Value::as_array)
        .into_iter()
        .flatten();
    std::iter::once(details)
        .chain(entries)
        .filter_map(|value| value.get("advisories").and_then(Value::as_array))
        .flatten()
        .filter_map(|item| {
            let kind = item.get("kind")?.as_str()?;
            let path = item.get("path")?.as_str()?;
            let message = item.get("message")?.as_str()?;
            Some(format!("{kind} failed for {path}: {message}"))
        })
        .collect()
}

/// Header, rule, then one line per icon. `None` when there is nothing to
/// tabulate.
fn render_icon_table(style: &Style, info: CommandInfo, details: &Value) -> Option<Vec<String>> {
    if info.group != CommandGroup::List {
        return None;
    }
    let icons = details.get("icons")?.as_array()?;
    if icons.is_empty() {
        return None;
    }

    let mut rows = Vec::new();
    for icon in icons {
        let obj = icon.as_object()?;
        rows.push(IconRow {
            folder: obj.get("folderPath")?.as_str()?.to_string(),
            icon: obj.get("sourceIconName")?.as_str()?.to_string(),
            applied: obj.get("appliedAt")?.as_str()?.to_string(),
        });
    }
    Some(format_icon_table(style, &rows))
}

struct IconRow {
    folder: String,
    icon: String,
    applied: String,
}

fn format_icon_table(style: &Style, rows: &[IconRow]) -> Vec<String> {
    let headers = ["Folder", "Icon", "Applied"];
    let mut widths = [headers[0].len(), headers[1].len(), headers[2].len()];
    for row in rows {
        widths[0] = widths[0].max(row.folder.chars().count());
        widths[1] = widths[1].max(row.icon.chars().count());
        widths[2] = widths[2].max(row.applied.chars().count());
    }

    let mut lines = Vec::with_capacity(rows.len() + 2);
    let header_line = format!(
        "{:<width0$}  {:<width1$}  {:<width2$}",
        headers[0],
        headers[1],
        headers[2],
        width0 = widths[0],
        width1 = widths[1],
        width2 = widths[2],
    );
    lines.push(style.table_header(header_line.trim_end()));
    lines.push(format!(
        "{:-<width0$}  {:-<width1$}  {:-<width2$}",
        "",
        "",
        "",
        width0 = widths[0],
        width1 = widths[1],
        width2 = widths[2],
    ));
    for row in rows {
        let line = format!(
            "{:<width0$}  {:<width1$}  {:<width2$}",
            row.folder,
            row.icon,
            row.applied,
            width0 = widths[0],
            width1 = widths[1],
            width2 = widths[2],
        );
        lines.push(line.trim_end().to_string());
    }
    lines
}
