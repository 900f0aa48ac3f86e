//! Pure projections of store state into terminal text.

use crate::bot::{BotOverview, BotRunOutcome, BotState};
use crate::resources::{Resource, ResourceStatus};
use crate::zoom::ZoomItem;

const EMPTY_CELL: &str = "—";

/// One table row derived from a cached resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRow {
    pub id: String,
    pub provider: String,
    pub label: String,
    pub status: String,
    pub phase: String,
    pub error: String,
    /// Toggle verb offered for the row; `None` when toggling is disabled.
    pub action: Option<&'static str>,
}

pub fn resource_row(resource: &Resource) -> ResourceRow {
    let action = resource.status.is_toggleable().then(|| {
        if resource.status == ResourceStatus::Active {
            "pause"
        } else {
            "activate"
        }
    });
    ResourceRow {
        id: resource.id.clone(),
        provider: resource.provider.to_lowercase(),
        label: non_empty(&resource.label),
        status: resource.status.to_string(),
        phase: resource.phase.as_deref().map_or_else(|| EMPTY_CELL.to_string(), non_empty),
        error: resource
            .display_error()
            .map_or_else(|| EMPTY_CELL.to_string(), non_empty),
        action,
    }
}

/// Render the resource table; an empty list gets a placeholder line.
pub fn resource_table(resources: &[Resource]) -> String {
    if resources.is_empty() {
        return "No resources yet".to_string();
    }
    let rows: Vec<ResourceRow> = resources.iter().map(resource_row).collect();
    let header = ["ID", "PROVIDER", "LABEL", "STATUS", "PHASE", "ERROR", "ACTION"];
    let cells: Vec<[String; 7]> = rows
        .iter()
        .map(|row| {
            [
                row.id.clone(),
                row.provider.clone(),
                row.label.clone(),
                row.status.clone(),
                row.phase.clone(),
                row.error.clone(),
                row.action.unwrap_or(EMPTY_CELL).to_string(),
            ]
        })
        .collect();

    let mut widths = header.map(|h| h.chars().count());
    for row in &cells {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let format_line = |values: Vec<&str>| -> String {
        values
            .iter()
            .zip(widths.iter())
            .map(|(value, width)| format!("{value:<width$}", width = *width))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut lines = vec![format_line(header.to_vec())];
    for row in &cells {
        lines.push(format_line(row.iter().map(String::as_str).collect()));
    }
    lines.join("\n")
}

/// Detail view with secrets masked.
pub fn resource_detail(resource: &Resource) -> String {
    let row = resource_row(resource);
    let metadata = serde_json::to_string_pretty(&resource.redacted_metadata())
        .unwrap_or_else(|_| "{}".to_string());
    let mut out = format!(
        "id:       {}\nprovider: {}\nlabel:    {}\nstatus:   {}\nphase:    {}\nerror:    {}\n",
        row.id, row.provider, row.label, row.status, row.phase, row.error
    );
    if !resource.issues.is_empty() {
        out.push_str(&format!("issues:   {}\n", resource.issues.join(", ")));
    }
    out.push_str(&format!("settings:\n{metadata}"));
    out
}

pub fn bot_line(state: &BotState) -> String {
    match state.running {
        Some(running) => format!(
            "Bot: {} ({})",
            state.label(),
            if running { "workers running" } else { "workers stopped" }
        ),
        None => format!("Bot: {}", state.label()),
    }
}

/// Bot line followed by one line per resource the workers know about.
pub fn bot_overview(overview: &BotOverview) -> String {
    let mut lines = vec![bot_line(&overview.state)];
    for resource in &overview.resources {
        let session = if resource.has_session { "session" } else { "no session" };
        let mut line = format!(
            "  {} {} {} ({session})",
            resource.id, resource.provider, resource.status
        );
        if let Some(error) = resource.error.as_deref().filter(|e| !e.is_empty()) {
            line.push_str(&format!(" ❌ {error}"));
        }
        lines.push(line);
    }
    lines.join("\n")
}

pub fn run_outcome(outcome: Option<BotRunOutcome>) -> String {
    match outcome {
        Some(BotRunOutcome::BotStarted) => "Bot started".to_string(),
        Some(BotRunOutcome::NoActiveResources) => "Nothing to start: no active resources".to_string(),
        Some(BotRunOutcome::BotStopped) => "Bot stopped".to_string(),
        Some(BotRunOutcome::NotRunning) => "Bot was not running".to_string(),
        Some(BotRunOutcome::Other) | None => "Done".to_string(),
    }
}

/// One line per recording: audio, transcript and report state.
pub fn zoom_items(items: &[ZoomItem]) -> String {
    if items.is_empty() {
        return "No recordings yet".to_string();
    }
    items
        .iter()
        .map(|item| {
            let audio = item
                .audio
                .as_ref()
                .map_or_else(|| EMPTY_CELL.to_string(), |a| format!("{} ({} B)", a.filename, a.size));
            let transcript = if item.transcript.exists { "transcribed" } else { "not transcribed" };
            let report = match (&item.report.filename, item.report.exists) {
                (Some(name), true) => format!("report {name}"),
                _ => "no report".to_string(),
            };
            format!("{audio}  {transcript}  {report}")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn non_empty(value: &str) -> String {
    if value.trim().is_empty() {
        EMPTY_CELL.to_string()
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn resource(id: &str, status: &str) -> Resource {
        serde_json::from_value(json!({
            "id": id,
            "provider": "Telegram",
            "label": "Sales",
            "status": status,
            "meta": {"creds": {"app_hash": "secret-hash"}}
        }))
        .unwrap()
    }

    #[test]
    fn row_offers_inverse_action() {
        assert_eq!(resource_row(&resource("r1", "active")).action, Some("pause"));
        assert_eq!(resource_row(&resource("r2", "paused")).action, Some("activate"));
        assert_eq!(resource_row(&resource("r3", "blocked")).action, None);
    }

    #[test]
    fn row_fills_missing_cells() {
        let row = resource_row(&resource("r1", "pending"));
        assert_eq!(row.provider, "telegram");
        assert_eq!(row.phase, EMPTY_CELL);
        assert_eq!(row.error, EMPTY_CELL);
    }

    #[test]
    fn empty_table_has_placeholder() {
        assert_eq!(resource_table(&[]), "No resources yet");
    }

    #[test]
    fn table_lists_every_resource() {
        let table = resource_table(&[resource("r1", "active"), resource("r2", "paused")]);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("ID"));
        assert!(lines[1].starts_with("r1"));
        assert!(lines[2].contains("activate"));
    }

    #[test]
    fn detail_never_prints_secrets() {
        let detail = resource_detail(&resource("r1", "active"));
        assert!(!detail.contains("secret-hash"));
        assert!(detail.contains("app_hash"));
    }

    #[test]
    fn zoom_items_show_missing_audio_and_reports() {
        let items: Vec<ZoomItem> = serde_json::from_value(json!([
            {
                "audio": null,
                "transcript": {"filename": "old.mp3.txt", "exists": true, "size": 10},
                "report": {"exists": false}
            }
        ]))
        .unwrap();
        assert_eq!(zoom_items(&items), format!("{EMPTY_CELL}  transcribed  no report"));
        assert_eq!(zoom_items(&[]), "No recordings yet");
    }

    #[test]
    fn bot_line_reflects_state() {
        let off = BotState { enabled: false, running: None };
        assert_eq!(bot_line(&off), "Bot: disabled");
        let on = BotState { enabled: true, running: Some(true) };
        assert_eq!(bot_line(&on), "Bot: enabled (workers running)");
    }
}
