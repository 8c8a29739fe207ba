//! Markdown and JSON breakdown rendering.
//!
//! Mirrors the site's breakdown table: one row per voter, rank columns
//! 1..N, each cell the team ranked at that position.

use crate::config::ReportConfig;
use crate::models::{Report, ReportMetadata, Team, VoterBreakdown};
use anyhow::Result;
use std::io::Write;
use std::path::Path;

/// Generate a complete Markdown report.
pub fn generate_markdown_report(report: &Report, config: &ReportConfig) -> String {
    let mut output = String::new();

    // Title
    output.push_str("# Voter Breakdown\n\n");

    // Metadata section
    output.push_str(&generate_metadata_section(&report.metadata));

    // Breakdown table
    output.push_str(&generate_breakdown_table(&report.breakdowns, config));

    // Footer
    output.push_str(&generate_footer());

    output
}

/// Generate the metadata section.
fn generate_metadata_section(metadata: &ReportMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    if let Some(ref poll) = metadata.poll {
        section.push_str(&format!("- **Poll:** {}\n", poll));
    }
    section.push_str(&format!("- **Source:** `{}`\n", metadata.source));
    section.push_str(&format!(
        "- **Generated:** {}\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!("- **Store:** {}\n", metadata.store_url));
    section.push_str(&format!("- **Perspective:** {}\n", metadata.perspective));
    section.push_str(&format!("- **Voters:** {}\n", metadata.voters));
    section.push_str(&format!(
        "- **Slots Resolved:** {}\n",
        metadata.slots_resolved
    ));
    if metadata.slots_missing > 0 {
        section.push_str(&format!(
            "- **Slots Missing:** {}\n",
            metadata.slots_missing
        ));
    }
    section.push_str(&format!(
        "- **Duration:** {:.1}s\n",
        metadata.duration_seconds
    ));
    section.push_str("\n");

    section
}

/// Generate the voter breakdown table.
fn generate_breakdown_table(breakdowns: &[VoterBreakdown], config: &ReportConfig) -> String {
    let mut section = String::new();

    section.push_str("## Breakdown\n\n");

    if breakdowns.is_empty() {
        section.push_str("No ballots were submitted.\n\n");
        return section;
    }

    // Header row: Voter | 1 | 2 | ... | N
    section.push_str("| Voter |");
    for rank in 1..=config.max_rank {
        section.push_str(&format!(" {} |", rank));
    }
    section.push_str("\n|:---|");
    for _ in 0..config.max_rank {
        section.push_str(":---:|");
    }
    section.push('\n');

    for voter in breakdowns {
        section.push_str(&format!(
            "| **{}**<br>*{} ({})* |",
            escape_cell(&voter.name),
            escape_cell(&voter.organization),
            escape_cell(&voter.organization_role)
        ));

        for rank in 0..config.max_rank {
            match voter.ballot.get(rank) {
                Some(team) => section.push_str(&format!(" {} |", team_cell(team, config))),
                // Short ballots leave trailing cells empty.
                None => section.push_str(" |"),
            }
        }
        section.push('\n');
    }
    section.push('\n');

    section
}

/// Render one team cell, linking the crest image when configured.
fn team_cell(team: &Team, config: &ReportConfig) -> String {
    let name = escape_cell(&team.name);
    match (&team.image, config.include_images) {
        (Some(image), true) => format!("[{}]({})", name, image),
        _ => name,
    }
}

/// Escape characters that would break a Markdown table cell.
fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}

/// Generate the report footer.
fn generate_footer() -> String {
    let mut footer = String::new();

    footer.push_str("---\n\n");
    footer.push_str("*Generated by ballotboard*\n");

    footer
}

/// Generate a JSON report.
pub fn generate_json_report(report: &Report) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}

/// Write a Markdown report to a file.
#[allow(dead_code)] // Convenience wrapper
pub fn write_report(report: &Report, config: &ReportConfig, path: &Path) -> Result<()> {
    let content = generate_markdown_report(report, config);

    let mut file = std::fs::File::create(path)?;
    file.write_all(content.as_bytes())?;

    Ok(())
}
