//! Text Rendering
//!
//! Fixed-width table and status line for the terminal dashboard.

use chrono::{DateTime, Local, Utc};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::application::{Dashboard, DashboardState};
use crate::domain::Listing;

const RULE: &str = "+------+----------+------------------------+----------------+----------+------------+---+";
const HEADER: &str = "|    # | Symbol   | Name                   |          Price |      24h |     Volume | * |";

/// Compact magnitude formatting: 1.23T, 4.56B, 7.89M, 1.20K
pub fn format_compact(value: f64) -> String {
    let abs = value.abs();
    let (scaled, suffix) = if abs >= 1e12 {
        (value / 1e12, "T")
    } else if abs >= 1e9 {
        (value / 1e9, "B")
    } else if abs >= 1e6 {
        (value / 1e6, "M")
    } else if abs >= 1e3 {
        (value / 1e3, "K")
    } else {
        (value, "")
    };
    format!("{:.2}{}", scaled, suffix)
}

/// Price with precision scaled to magnitude so sub-cent coins stay readable
pub fn format_price(price: f64) -> String {
    let abs = price.abs();
    if abs >= 1.0 {
        format!("${:.2}", price)
    } else if abs >= 0.01 {
        format!("${:.4}", price)
    } else if abs == 0.0 {
        "$0.00".to_string()
    } else {
        format!("${:.8}", price)
    }
}

pub fn format_pct(pct: f64) -> String {
    format!("{:+.2}%", pct)
}

/// Left-aligned cell exactly `width` terminal columns wide. Overlong text
/// is cut and marked with `~`; wide glyphs count as two columns.
fn fit(s: &str, width: usize) -> String {
    let mut out = String::new();
    let mut used = 0;

    if s.width() <= width {
        out.push_str(s);
        used = s.width();
    } else {
        let budget = width.saturating_sub(1);
        for c in s.chars() {
            let w = c.width().unwrap_or(0);
            if used + w > budget {
                break;
            }
            out.push(c);
            used += w;
        }
        out.push('~');
        used += 1;
    }

    out.extend(std::iter::repeat(' ').take(width.saturating_sub(used)));
    out
}

/// One table row
pub fn format_row(listing: &Listing, favorite: bool) -> String {
    let rank = listing
        .market_cap_rank
        .map(|r| r.to_string())
        .unwrap_or_else(|| "-".to_string());
    let price = listing.current_price.map(format_price).unwrap_or_else(|| "-".to_string());
    let change = listing
        .price_change_percentage_24h
        .map(format_pct)
        .unwrap_or_else(|| "-".to_string());
    let volume = listing.total_volume.map(format_compact).unwrap_or_else(|| "-".to_string());

    format!(
        "| {:>4} | {} | {} | {:>14} | {:>8} | {:>10} | {} |",
        rank,
        fit(&listing.display_symbol(), 8),
        fit(&listing.name, 22),
        price,
        change,
        volume,
        if favorite { "*" } else { " " },
    )
}

/// Table for a set of rows
pub fn render_table(rows: &[Listing], dashboard: &Dashboard) -> String {
    let mut out = String::new();
    out.push_str(RULE);
    out.push('\n');
    out.push_str(HEADER);
    out.push('\n');
    out.push_str(RULE);
    out.push('\n');

    if rows.is_empty() {
        out.push_str(&format!("| {:<85} |\n", "No listings match this view"));
    } else {
        for listing in rows {
            out.push_str(&format_row(listing, dashboard.is_favorite(&listing.id)));
            out.push('\n');
        }
    }

    out.push_str(RULE);
    out
}

/// Status line: view, row count, freshness and any error
pub fn render_status(dashboard: &Dashboard, state: &DashboardState, shown: usize) -> String {
    let mut parts = vec![format!("View: {}", dashboard.view())];

    if !dashboard.search().is_empty() {
        parts.push(format!("Search: \"{}\"", dashboard.search()));
    }

    parts.push(format!("{} of {} coins", shown, state.listings.len()));

    match state.last_updated {
        Some(ts) => parts.push(format!("Updated {}", format_time(ts))),
        None => parts.push("Not loaded yet".to_string()),
    }

    if state.is_loading {
        parts.push("Loading...".to_string());
    }

    let mut line = parts.join(" | ");
    if let Some(ref err) = state.last_error {
        line.push_str("\n  ! ");
        line.push_str(err);
    }
    line
}

fn format_time(ts: DateTime<Utc>) -> String {
    ts.with_timezone(&Local).format("%H:%M:%S").to_string()
}

/// Full screen: header, table, status and an optional notice
pub fn render_screen(
    dashboard: &Dashboard,
    state: &DashboardState,
    now: DateTime<Utc>,
    notice: Option<&str>,
) -> String {
    let rows = dashboard.visible(&state.listings, now);
    let mut out = String::new();
    out.push_str("======================================\n");
    out.push_str("    coinwatch - crypto market watch\n");
    out.push_str("======================================\n");
    out.push_str(&render_table(&rows, dashboard));
    out.push('\n');
    out.push_str(&render_status(dashboard, state, rows.len()));
    out.push('\n');
    if let Some(notice) = notice {
        out.push_str("  > ");
        out.push_str(notice);
        out.push('\n');
    }
    out.push_str("[r]efresh  [v]iew NAME  [f]av ID  [s]earch TEXT  [h]elp  [q]uit\n");
    out
}
