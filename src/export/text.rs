//! Plain-text report layout.
//!
//! Headers are uppercase and underlined with a rule of the same character
//! length. Lists
//! are numbered from 1. Sections are separated by one blank line.

use super::ExportDocument;

/// Header followed by a rule of `rule` matching its character length.
pub fn underline(header: &str, rule: char) -> String {
    let line: String = std::iter::repeat(rule).take(header.chars().count()).collect();
    format!("{}\n{}", header, line)
}

fn push_block(out: &mut String, header: &str, body: &str) {
    out.push_str(&underline(header, '-'));
    out.push('\n');
    out.push_str(body);
    out.push_str("\n\n");
}

fn numbered(items: &[String]) -> String {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| format!("{}. {}", i + 1, item))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Plain-text rendering of a document.
pub fn export_text(doc: &ExportDocument) -> String {
    let report = &doc.report;
    let mut out = String::new();

    out.push_str(&underline(&report.title, '='));
    out.push_str("\n\n");
    out.push_str(&format!("Topic: {}\n", doc.topic));
    out.push_str(&format!("Generated: {}\n", doc.generated_at.to_rfc3339()));
    out.push_str(&format!(
        "Sources: {} (average credibility {:.1}/10)\n\n",
        doc.metadata.source_count, doc.metadata.average_credibility
    ));

    push_block(&mut out, "EXECUTIVE SUMMARY", &report.executive_summary);
    push_block(&mut out, "KEY FINDINGS", &numbered(&report.key_findings));

    for section in &report.sections {
        push_block(&mut out, &section.title.to_uppercase(), &section.content);
    }

    push_block(&mut out, "RECOMMENDATIONS", &numbered(&report.recommendations));
    push_block(&mut out, "CONCLUSION", &report.conclusion);

    let sources = doc
        .sources
        .iter()
        .enumerate()
        .map(|(i, s)| {
            format!(
                "{}. {}\n   Author: {} ({})\n   Category: {} | Credibility: {}/10\n   {}",
                i + 1,
                s.title,
                s.author,
                s.published,
                s.category,
                s.credibility,
                s.url
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n");
    out.push_str(&underline("SOURCES", '-'));
    out.push('\n');
    out.push_str(&sources);
    out.push('\n');

    out
}
