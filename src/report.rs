// src/report.rs
//! Plain-text run report.

use chrono::{DateTime, Local, TimeZone};

use crate::ingest::Candidate;

pub const NO_NEW_ITEMS: &str = "No new RFPs or calls for proposals found today.";
pub const EMAIL_SUBJECT: &str = "New RFPs / Calls for Proposals";

/// New items of one source, in discovery order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportEntry {
    pub source_name: String,
    pub items: Vec<Candidate>,
}

/// Insertion-ordered; only sources with at least one item are pushed.
pub type Report = Vec<ReportEntry>;

/// Report stamped with the current local time.
pub fn format_report(report: &[ReportEntry]) -> String {
    format_report_at(report, &Local::now())
}

pub fn format_report_at<Tz: TimeZone>(report: &[ReportEntry], now: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    if report.is_empty() {
        return NO_NEW_ITEMS.to_string();
    }

    let mut lines = Vec::new();
    lines.push(format!("RFP Monitor Report – {}", now.format("%Y-%m-%d %H:%M")));
    lines.push("=".repeat(60));
    for entry in report {
        lines.push(format!("\n{}", entry.source_name));
        lines.push("-".repeat(entry.source_name.chars().count()));
        for item in &entry.items {
            lines.push(format!("- {}", item.title));
            if let Some(reason) = &item.reason {
                lines.push(format!("  Reason: {reason}"));
            }
            lines.push(format!("  {}", item.url));
        }
    }
    lines.join("\n")
}
