//! Console rendering for the interactive client: ASCII tables capped to
//! the terminal width plus a couple of detail views.

use crate::admin::DirectoryRow;
use crate::claims::ReviewRow;
use crate::model::{Claim, DashboardStats, Item, ItemKind};

const FALLBACK_WIDTH: usize = 100;
const MIN_COL_WIDTH: usize = 6;

fn terminal_width() -> usize {
    terminal_size::terminal_size()
        .map(|(w, _)| w.0 as usize)
        .unwrap_or(FALLBACK_WIDTH)
}

fn display_len(s: &str) -> usize {
    s.chars().count()
}

fn truncate(s: &str, max: usize) -> String {
    if display_len(s) <= max {
        return s.to_string();
    }
    if max <= 1 {
        return "…".to_string();
    }
    s.chars().take(max - 1).collect::<String>() + "…"
}

fn build_separator(widths: &[usize]) -> String {
    let mut out = String::from("+");
    for w in widths {
        out.push_str(&"-".repeat(*w + 2));
        out.push('+');
    }
    out
}

fn build_row(cells: &[String], widths: &[usize]) -> String {
    let mut out = String::from("|");
    for (i, w) in widths.iter().enumerate() {
        let cell = cells.get(i).cloned().unwrap_or_default();
        let text = truncate(&cell, *w);
        out.push(' ');
        out.push_str(&text);
        out.push_str(&" ".repeat(w.saturating_sub(display_len(&text))));
        out.push_str(" |");
    }
    out
}

/// Render a table; column widths grow to fit content and shrink together
/// when the terminal is narrower than the natural width.
pub fn print_table(columns: &[&str], rows: &[Vec<String>]) {
    if rows.is_empty() {
        println!("(no rows)");
        return;
    }
    let mut widths: Vec<usize> = columns.iter().map(|c| display_len(c)).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate().take(widths.len()) {
            widths[i] = widths[i].max(display_len(cell));
        }
    }
    // shave the widest columns until the table fits
    let budget = terminal_width().saturating_sub(3 * widths.len() + 1);
    while widths.iter().sum::<usize>() > budget {
        let Some(widest) = widths.iter().cloned().max() else { break };
        if widest <= MIN_COL_WIDTH {
            break;
        }
        if let Some(slot) = widths.iter_mut().find(|w| **w == widest) {
            *slot = widest - 1;
        }
    }

    let header: Vec<String> = columns.iter().map(|c| c.to_string()).collect();
    let sep = build_separator(&widths);
    println!("{}", sep);
    println!("{}", build_row(&header, &widths));
    println!("{}", sep);
    for row in rows {
        println!("{}", build_row(row, &widths));
    }
    println!("{}", sep);
    println!("rows: {}", rows.len());
}

pub fn item_rows(items: &[Item]) -> Vec<Vec<String>> {
    items
        .iter()
        .map(|i| {
            vec![
                i.id.clone(),
                i.title.clone(),
                i.category.clone(),
                i.location.clone(),
                i.event_date.format("%Y-%m-%d").to_string(),
                if i.claimed { "claimed".into() } else { "open".into() },
            ]
        })
        .collect()
}

pub const ITEM_COLUMNS: &[&str] = &["id", "title", "category", "location", "date", "state"];

pub fn review_rows(rows: &[ReviewRow]) -> Vec<Vec<String>> {
    rows.iter()
        .map(|r| {
            let c = &r.claim;
            let item_title = c.item.as_ref().map(|i| i.title.clone()).unwrap_or_else(|| c.item_id.clone());
            let status = if r.processing { format!("{}*", c.status) } else { c.status.to_string() };
            vec![
                c.id.clone(),
                match c.item_kind {
                    ItemKind::Lost => "lost".into(),
                    ItemKind::Found => "found".into(),
                },
                item_title,
                c.claimant.name.clone(),
                c.created_at.format("%Y-%m-%d").to_string(),
                status,
            ]
        })
        .collect()
}

pub const REVIEW_COLUMNS: &[&str] = &["id", "kind", "item", "claimant", "filed", "status"];

pub fn claim_rows(claims: &[Claim]) -> Vec<Vec<String>> {
    claims
        .iter()
        .map(|c| {
            vec![
                c.id.clone(),
                match c.item_kind {
                    ItemKind::Lost => "lost".into(),
                    ItemKind::Found => "found".into(),
                },
                c.item.as_ref().map(|i| i.title.clone()).unwrap_or_else(|| c.item_id.clone()),
                c.status.to_string(),
                c.created_at.format("%Y-%m-%d").to_string(),
            ]
        })
        .collect()
}

pub const CLAIM_COLUMNS: &[&str] = &["id", "kind", "item", "status", "filed"];

pub fn account_rows(rows: &[DirectoryRow]) -> Vec<Vec<String>> {
    rows.iter()
        .map(|r| {
            let a = &r.account;
            let state = match (a.enabled, r.processing) {
                (true, true) => "enabled*",
                (true, false) => "enabled",
                (false, true) => "disabled*",
                (false, false) => "disabled",
            };
            vec![a.id.clone(), a.name.clone(), a.email.clone(), format!("{:?}", a.role).to_uppercase(), state.to_string()]
        })
        .collect()
}

pub const ACCOUNT_COLUMNS: &[&str] = &["id", "name", "email", "role", "state"];

pub fn print_item(item: &Item, viewer: Option<&str>) {
    println!("{}: {}", item.id, item.title);
    println!("  category: {}", item.category);
    println!("  location: {}", item.location);
    println!("  date:     {}", item.event_date.format("%Y-%m-%d"));
    println!("  contact:  {}", item.contact_info);
    println!("  reporter: {} <{}>", item.reported_by.name, item.reported_by.email);
    if let Some(url) = &item.image_url {
        println!("  image:    {}", url);
    }
    println!("  {}", item.description);
    if item.claimed {
        println!("  status:   claimed (awaiting adjudication or resolved)");
    } else if let Some(viewer) = viewer {
        if item.can_be_claimed(viewer) {
            println!("  status:   open; claim it if you believe it is yours");
        } else {
            println!("  status:   open (your own report)");
        }
    }
}

pub fn print_stats(stats: &DashboardStats) {
    println!("users: {}", stats.total_users);
    println!("lost items: {}   found items: {}", stats.total_lost_items, stats.total_found_items);
    println!(
        "claims: {} total / {} pending / {} approved / {} rejected",
        stats.total_claims, stats.pending_claims, stats.approved_claims, stats.rejected_claims
    );
}
