//! Document display formatting
//!
//! Formats document listings and details for terminal output.

use crate::models::{DocumentId, DocumentSummary, DownloadedDocument};

/// Format a list of documents as a table
pub fn format_document_list(docs: &[DocumentSummary]) -> String {
    if docs.is_empty() {
        return "No documents found.\n".to_string();
    }

    // Calculate column widths
    let name_width = docs
        .iter()
        .map(|d| d.name.chars().count())
        .max()
        .unwrap_or(4)
        .max(4);

    let subject_width = docs
        .iter()
        .map(|d| d.subject.chars().count())
        .max()
        .unwrap_or(7)
        .max(7);

    // Build header
    let mut output = String::new();
    output.push_str(&format!(
        "{:<8}  {:<name_width$}  {:<subject_width$}  {:>9}  {:<16}  {}\n",
        "ID",
        "Name",
        "Subject",
        "Size",
        "Created",
        "Type",
        name_width = name_width,
        subject_width = subject_width,
    ));

    // Separator line
    output.push_str(&format!(
        "{:-<8}  {:-<name_width$}  {:-<subject_width$}  {:->9}  {:-<16}  {:-<10}\n",
        "",
        "",
        "",
        "",
        "",
        "",
        name_width = name_width,
        subject_width = subject_width,
    ));

    for doc in docs {
        output.push_str(&format!(
            "{:<8}  {:<name_width$}  {:<subject_width$}  {:>9}  {:<16}  {}\n",
            doc.id.short(),
            doc.name,
            doc.subject,
            format_size(doc.metadata.size),
            doc.metadata.created_at.format("%Y-%m-%d %H:%M"),
            doc.metadata.mime_type,
            name_width = name_width,
            subject_width = subject_width,
        ));
    }

    output.push_str(&format!(
        "\n{} document{}\n",
        docs.len(),
        if docs.len() == 1 { "" } else { "s" }
    ));

    output
}

/// Format details of a downloaded document
pub fn format_document_details(id: &DocumentId, doc: &DownloadedDocument) -> String {
    let mut output = String::new();

    output.push_str(&format!("Document: {}\n", doc.name));
    output.push_str(&format!("{}\n", "=".repeat(doc.name.chars().count() + 10)));
    output.push_str(&format!("  ID:        {}\n", id));
    output.push_str(&format!("  Subject:   {}\n", doc.subject));
    output.push_str(&format!("  Size:      {}\n", format_size(doc.metadata.size)));
    output.push_str(&format!("  Type:      {}\n", doc.metadata.mime_type));
    if !doc.metadata.original_file_name.is_empty() {
        output.push_str(&format!("  File:      {}\n", doc.metadata.original_file_name));
    }
    output.push_str(&format!(
        "  Created:   {}\n",
        doc.metadata.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));

    output
}

/// Human-readable byte size
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KB", "MB", "GB", "TB"];

    if bytes < 1024 {
        return format!("{} B", bytes);
    }

    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    format!("{:.1} {}", value, UNITS[unit])
}
