//! Human-readable run reports.

use std::fmt::Write as _;

use colored::Colorize;

use crate::sync::types::{DeckReport, DeckState, RunReport, SyncKind, Totals};

/// Print a run report to stdout.
pub fn print_report(report: &RunReport) {
    print!("{}", render_report(report));
}

/// Render a run report: one block per deck, then the totals.
#[must_use]
pub fn render_report(report: &RunReport) -> String {
    let mut out = String::new();
    let title = match report.kind {
        SyncKind::Export => "Export",
        SyncKind::Import => "Import",
    };
    let _ = writeln!(out, "{}", title.bold().underline());
    let _ = writeln!(out);

    if report.decks.is_empty() {
        let _ = writeln!(out, "{}", "No decks selected.".dimmed());
        return out;
    }

    for deck in &report.decks {
        render_deck(&mut out, report.kind, deck);
    }

    let _ = writeln!(out);
    render_totals(&mut out, report.kind, &report.totals);

    if let Some(finished) = report.finished_at {
        let elapsed = finished - report.started_at;
        let _ = writeln!(
            out,
            "{}",
            format!("Finished in {} ms", elapsed.num_milliseconds()).dimmed()
        );
    }
    out
}

fn render_deck(out: &mut String, kind: SyncKind, deck: &DeckReport) {
    let marker = match deck.state {
        DeckState::Done => "✓".green(),
        DeckState::Failed => "✗".red(),
        DeckState::Pending | DeckState::InProgress => "·".dimmed(),
    };
    let file = deck
        .file
        .as_ref()
        .map(|f| format!("  {} {}", "→".dimmed(), f.display()))
        .unwrap_or_default();
    let _ = writeln!(out, "  {marker} {}{file}", deck.deck.bold());

    if let Some(error) = &deck.error {
        let _ = writeln!(out, "      {}", error.red());
    }

    let mut parts = vec![note_count(kind, deck.notes)];
    if deck.notes_rejected > 0 {
        parts.push(format!("{} rejected", deck.notes_rejected).yellow().to_string());
    }
    if deck.notes_skipped > 0 {
        parts.push(format!("{} blank skipped", deck.notes_skipped));
    }
    if deck.rows_malformed > 0 {
        parts.push(format!("{} malformed rows", deck.rows_malformed).yellow().to_string());
    }
    if deck.media.total() > 0 {
        parts.push(media_summary(kind, &deck.media));
    }
    let _ = writeln!(out, "      {}", parts.join(", "));
}

fn render_totals(out: &mut String, kind: SyncKind, totals: &Totals) {
    let decks = if totals.decks_failed > 0 {
        format!(
            "{} done, {}",
            totals.decks_done,
            format!("{} failed", totals.decks_failed).red()
        )
    } else {
        format!("{} done", totals.decks_done).green().to_string()
    };
    let _ = writeln!(out, "{} {decks}", "Decks:".bold());

    let mut notes = note_count(kind, totals.notes);
    if totals.notes_rejected > 0 {
        let _ = write!(notes, ", {} rejected", totals.notes_rejected);
    }
    if totals.notes_skipped > 0 {
        let _ = write!(notes, ", {} blank skipped", totals.notes_skipped);
    }
    if totals.rows_malformed > 0 {
        let _ = write!(notes, ", {} malformed rows", totals.rows_malformed);
    }
    let _ = writeln!(out, "{} {notes}", "Notes:".bold());
    let _ = writeln!(out, "{} {}", "Media:".bold(), media_summary(kind, &totals.media));
}

fn note_count(kind: SyncKind, notes: usize) -> String {
    match kind {
        SyncKind::Export => format!("{notes} notes written"),
        SyncKind::Import => format!("{notes} notes added"),
    }
}

fn media_summary(kind: SyncKind, media: &crate::media::MediaStats) -> String {
    let verb = match kind {
        SyncKind::Export => "copied",
        SyncKind::Import => "uploaded",
    };
    let mut summary = format!("{} media {verb}", media.transferred);
    if media.unchanged > 0 {
        let _ = write!(summary, ", {} unchanged", media.unchanged);
    }
    if media.missing > 0 {
        let _ = write!(summary, ", {}", format!("{} missing", media.missing).yellow());
    }
    if media.failed > 0 {
        let _ = write!(summary, ", {}", format!("{} failed", media.failed).red());
    }
    summary
}
