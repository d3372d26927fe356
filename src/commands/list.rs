//! List site content

use anyhow::Result;
use std::collections::BTreeMap;

use crate::content::{ContentKind, ContentRecord};
use crate::page::RecordSummary;
use crate::Folio;

/// List site content by type
pub fn run(folio: &Folio, content_type: &str, json: bool) -> Result<()> {
    print!("{}", listing(folio, content_type, json)?);
    Ok(())
}

/// The text `run` prints
pub fn listing(folio: &Folio, content_type: &str, json: bool) -> Result<String> {
    match content_type {
        "post" | "posts" => records(folio, ContentKind::Post, json),
        "edition" | "editions" => records(folio, ContentKind::Edition, json),
        "tag" | "tags" => tags(folio, ContentKind::Post, json),
        "topic" | "topics" => tags(folio, ContentKind::Edition, json),
        _ => {
            anyhow::bail!(
                "Unknown type: {}. Available: post, edition, tag, topic",
                content_type
            );
        }
    }
}

fn records(folio: &Folio, kind: ContentKind, json: bool) -> Result<String> {
    let records = folio.collection(kind).get_all()?;

    if json {
        let summaries: Vec<RecordSummary> = records
            .iter()
            .map(|r| RecordSummary::new(&folio.config, r))
            .collect();
        return Ok(format!("{}\n", serde_json::to_string_pretty(&summaries)?));
    }

    let mut out = format!("{} ({}):\n", kind.label(), records.len());
    for record in &records {
        out.push_str(&format!("  {}\n", line(record)));
    }
    Ok(out)
}

fn line(record: &ContentRecord) -> String {
    let number = record
        .number
        .map(|n| format!("#{} ", n))
        .unwrap_or_default();
    format!(
        "{} - {}{} [{}]",
        record.published_at.format("%Y-%m-%d"),
        number,
        record.title,
        record.slug
    )
}

fn tags(folio: &Folio, kind: ContentKind, json: bool) -> Result<String> {
    let counts: BTreeMap<String, usize> = folio.collection(kind).tag_counts()?;

    if json {
        return Ok(format!("{}\n", serde_json::to_string_pretty(&counts)?));
    }

    let mut sorted: Vec<_> = counts.into_iter().collect();
    sorted.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    let title = match kind {
        ContentKind::Post => "Tags",
        ContentKind::Edition => "Topics",
    };
    let mut out = format!("{} ({}):\n", title, sorted.len());
    for (tag, count) in sorted {
        out.push_str(&format!("  {} ({})\n", tag, count));
    }
    Ok(out)
}
