//! Live preview of a single document
//!
//! Watches one file and re-renders it on every change. Renders run in the
//! background; a change arriving mid-render supersedes it.

use anyhow::{Context, Result};
use notify::RecursiveMode;
use notify_debouncer_mini::new_debouncer;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::{mpsc, watch};

use crate::content::{FrontMatter, FrontMatterError};
use crate::helpers::error_panel;
use crate::render::{LiveOutput, LiveRenderer, LiveState};
use crate::Folio;

/// The renderable part of a document: everything after the front-matter,
/// or the whole text when there is none
pub fn document_body(source: &str) -> Result<&str, FrontMatterError> {
    match FrontMatter::parse(source) {
        Ok((_, body)) => Ok(body),
        Err(FrontMatterError::Missing) => Ok(source),
        Err(e) => Err(e),
    }
}

/// Watch `file` and re-render it until Ctrl+C
pub async fn run(folio: &Folio, file: &Path, output: Option<PathBuf>) -> Result<()> {
    let file = file
        .canonicalize()
        .with_context(|| format!("cannot preview {}", file.display()))?;
    let dir = file
        .parent()
        .map(Path::to_path_buf)
        .context("preview file has no parent directory")?;

    let live = LiveRenderer::new(folio.renderer());
    let publisher = tokio::spawn(publish(live.subscribe(), file.clone(), output));

    request(&live, &file);

    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut debouncer = new_debouncer(Duration::from_millis(200), move |events| {
        let _ = tx.send(events);
    })?;
    // Editors often replace the file, so watch its directory
    debouncer
        .watcher()
        .watch(&dir, RecursiveMode::NonRecursive)?;

    println!("Previewing {}. Press Ctrl+C to stop.", file.display());

    loop {
        tokio::select! {
            events = rx.recv() => {
                match events {
                    Some(Ok(events)) => {
                        if events.iter().any(|e| e.path == file) {
                            request(&live, &file);
                        }
                    }
                    Some(Err(e)) => tracing::error!("Watch error: {:?}", e),
                    None => break,
                }
            }
            _ = tokio::signal::ctrl_c() => {
                live.cancel();
                break;
            }
        }
    }

    publisher.abort();
    Ok(())
}

/// Queue a render of the file's current contents
fn request(live: &LiveRenderer, file: &Path) {
    let source = match fs::read_to_string(file) {
        Ok(source) => source,
        Err(e) => {
            // mid-save; the next event will pick it up
            tracing::debug!("Cannot read {:?}: {}", file, e);
            return;
        }
    };

    match document_body(&source) {
        Ok(body) => {
            live.request(body.to_string());
        }
        Err(e) => println!("❌ {}: {}", file.display(), e),
    }
}

/// Report every newly published render
async fn publish(mut updates: watch::Receiver<LiveState>, file: PathBuf, output: Option<PathBuf>) {
    let mut last = 0;
    while updates.changed().await.is_ok() {
        let latest = updates.borrow_and_update().latest.clone();
        let Some(latest) = latest else { continue };
        if latest.generation == last {
            continue;
        }
        last = latest.generation;

        if let Err(e) = report(&latest, &file, output.as_deref()) {
            tracing::error!("Failed to write preview: {:#}", e);
        }
    }
}

fn report(latest: &LiveOutput, file: &Path, output: Option<&Path>) -> Result<()> {
    let html = match &latest.result {
        Ok(doc) => {
            println!(
                "✅ Rendered {} ({} headings)",
                file.display(),
                doc.headings.len()
            );
            doc.html.clone()
        }
        Err(e) => {
            println!("❌ {}: {}", file.display(), e);
            error_panel(&e.to_string(), "")
        }
    };

    match output {
        Some(path) => fs::write(path, html)?,
        None if latest.result.is_ok() => println!("{}", html),
        None => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RenderError;
    use crate::render::RenderedDocument;

    #[test]
    fn test_document_body() {
        assert_eq!(
            document_body("---\ntitle: T\n---\n# Body").unwrap(),
            "# Body"
        );
        assert_eq!(document_body("# Just markdown").unwrap(), "# Just markdown");
        assert!(document_body("---\ntitle: T\n").is_err());
    }

    #[test]
    fn test_report_writes_output() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("preview.html");

        let ok = LiveOutput {
            generation: 1,
            result: Ok(RenderedDocument {
                html: "<p>hi</p>".to_string(),
                headings: Vec::new(),
            }),
        };
        report(&ok, Path::new("doc.mdx"), Some(&out)).unwrap();
        assert_eq!(fs::read_to_string(&out).unwrap(), "<p>hi</p>");

        let failed = LiveOutput {
            generation: 2,
            result: Err(RenderError::ModuleStatement { line: 1 }),
        };
        report(&failed, Path::new("doc.mdx"), Some(&out)).unwrap();
        assert!(fs::read_to_string(&out).unwrap().contains("render-error"));
    }

    #[tokio::test]
    async fn test_publish_reports_latest() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("preview.html");
        let live = LiveRenderer::new(crate::render::Renderer::new(crate::render::Bindings::new()));

        let publisher = tokio::spawn(publish(
            live.subscribe(),
            PathBuf::from("doc.mdx"),
            Some(out.clone()),
        ));
        assert!(live.request("*first*").await.unwrap());
        assert!(live.request("**second**").await.unwrap());

        for _ in 0..50 {
            if fs::read_to_string(&out).map_or(false, |s| s.contains("second")) {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        publisher.abort();
        assert_eq!(
            fs::read_to_string(&out).unwrap(),
            "<p><strong>second</strong></p>"
        );
    }
}
