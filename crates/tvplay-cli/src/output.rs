//! Output formatting for CLI

use chrono::{DateTime, Utc};
use console::style;
use serde::Serialize;
use tabled::{Table, Tabled};
use tvplay_core::{SavedPosition, SessionOutcome};

/// Output format options
pub enum OutputFormat {
    Text,
    Json,
    Table,
}

impl From<&str> for OutputFormat {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => OutputFormat::Json,
            "table" => OutputFormat::Table,
            _ => OutputFormat::Text,
        }
    }
}

fn print_json<T: Serialize>(data: &T) {
    match serde_json::to_string_pretty(data) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to serialize output: {}", e),
    }
}

/// Print the final report of a simulated session
pub fn print_outcome(outcome: &SessionOutcome, format: &str) {
    if let OutputFormat::Json = OutputFormat::from(format) {
        print_json(outcome);
        return;
    }

    let snapshot = &outcome.snapshot;
    let playback = &snapshot.playback;
    println!("Session {} ({})", snapshot.id, snapshot.video_id);
    println!("  Closed by: {}", outcome.reason);
    println!(
        "  Source: {}",
        snapshot
            .active_source
            .map(|s| s.to_string())
            .unwrap_or_else(|| "none".to_string())
    );
    println!("  Focus: {}", snapshot.focus);
    println!(
        "  Position: {:.1}s / {:.1}s",
        playback.current_time, playback.duration
    );
    println!(
        "  Playing: {}",
        if playback.is_playing {
            style("yes").green()
        } else {
            style("no").yellow()
        }
    );
    match &playback.error {
        Some(error) => println!("  Error: {}", style(error).red()),
        None => println!("  Error: none"),
    }
}

#[derive(Tabled)]
struct PositionRow {
    #[tabled(rename = "Content")]
    content_id: String,
    #[tabled(rename = "Position (s)")]
    position: String,
    #[tabled(rename = "Saved at")]
    saved_at: String,
}

impl From<&SavedPosition> for PositionRow {
    fn from(entry: &SavedPosition) -> Self {
        let saved_at = DateTime::<Utc>::from_timestamp_millis(entry.saved_at_epoch_ms)
            .map(|t| t.to_rfc3339())
            .unwrap_or_else(|| entry.saved_at_epoch_ms.to_string());
        Self {
            content_id: entry.content_id.clone(),
            position: format!("{:.1}", entry.position),
            saved_at,
        }
    }
}

/// Print saved positions
pub fn print_positions(entries: &[SavedPosition], format: &str) {
    match OutputFormat::from(format) {
        OutputFormat::Json => print_json(&entries),
        OutputFormat::Table => {
            let rows: Vec<PositionRow> = entries.iter().map(PositionRow::from).collect();
            println!("{}", Table::new(rows));
        }
        OutputFormat::Text => {
            if entries.is_empty() {
                println!("No saved positions");
            }
            for entry in entries {
                let row = PositionRow::from(entry);
                println!("{}  {}s  ({})", row.content_id, row.position, row.saved_at);
            }
        }
    }
}
