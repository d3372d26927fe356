//! Validate every content file

use anyhow::Result;
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

use crate::content::ContentKind;
use crate::Folio;

/// Something wrong with one file
#[derive(Debug, Clone, PartialEq)]
pub struct Problem {
    pub path: PathBuf,
    pub message: String,
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path.display(), self.message)
    }
}

/// Load every file of every kind, render every published body and report
/// what failed. Unpublished files are parsed but not rendered.
pub fn check(folio: &Folio) -> Result<Vec<Problem>> {
    let renderer = folio.renderer();
    let mut problems = Vec::new();

    for kind in ContentKind::ALL {
        let index = folio.collection(kind);
        let loader = index.loader();
        let mut seen: HashMap<String, PathBuf> = HashMap::new();
        let mut checked = 0;

        for path in loader.list_files()? {
            checked += 1;
            let record = match loader.load_file(&path) {
                Ok(record) => record,
                Err(e) => {
                    problems.push(Problem {
                        path,
                        message: e.to_string(),
                    });
                    continue;
                }
            };

            if !record.published {
                continue;
            }

            if let Some(first) = seen.get(&record.slug) {
                problems.push(Problem {
                    path: path.clone(),
                    message: format!(
                        "duplicate slug '{}' (also used by {})",
                        record.slug,
                        first.display()
                    ),
                });
            } else {
                seen.insert(record.slug.clone(), path.clone());
            }

            if let Err(e) = renderer.render(&record.body) {
                problems.push(Problem {
                    path,
                    message: format!("render error: {}", e),
                });
            }
        }

        tracing::info!("Checked {} {} files", checked, kind);
    }

    Ok(problems)
}

/// Print the problems; fails when there are any
pub fn run(folio: &Folio) -> Result<()> {
    let problems = check(folio)?;

    if problems.is_empty() {
        println!("All content is valid.");
        return Ok(());
    }

    for problem in &problems {
        println!("  {}", problem);
    }
    anyhow::bail!("{} problem(s) found", problems.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_check_reports_each_problem() {
        let dir = tempfile::tempdir().unwrap();
        let posts = dir.path().join("content/blog");
        fs::create_dir_all(&posts).unwrap();

        fs::write(posts.join("good.md"), "---\ntitle: Good\ndescription: d\ndate: 2024-01-01\n---\n# Fine").unwrap();
        fs::write(posts.join("undated.md"), "---\ntitle: Undated\ndescription: d\n---\nbody").unwrap();
        fs::write(
            posts.join("widget.md"),
            "---\ntitle: W\ndescription: d\ndate: 2024-01-01\n---\n<Unknown />",
        )
        .unwrap();
        fs::write(
            posts.join("copy.md"),
            "---\ntitle: Copy\ndescription: d\ndate: 2024-01-01\nslug: good\n---\ncopy",
        )
        .unwrap();
        fs::write(
            posts.join("draft.md"),
            "---\ntitle: Draft\ndescription: d\ndate: 2024-01-01\npublished: false\n---\n<Unknown />",
        )
        .unwrap();

        let folio = Folio::new(dir.path()).unwrap();
        let problems = check(&folio).unwrap();
        let mut found: Vec<(String, bool)> = problems
            .iter()
            .map(|p| {
                let name = p.path.file_name().unwrap().to_string_lossy().to_string();
                (name, p.message.contains("duplicate"))
            })
            .collect();
        found.sort();

        assert_eq!(
            found,
            vec![
                ("good.md".to_string(), true),
                ("undated.md".to_string(), false),
                ("widget.md".to_string(), false),
            ]
        );
        assert!(run(&folio).is_err());
    }

    #[test]
    fn test_clean_site_passes() {
        let dir = tempfile::tempdir().unwrap();
        let folio = Folio::new(dir.path()).unwrap();
        assert!(check(&folio).unwrap().is_empty());
        assert!(run(&folio).is_ok());
    }
}
