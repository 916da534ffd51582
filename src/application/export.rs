// src/application/export.rs
use crate::domain::{EditorData, ExportError};
use crate::infrastructure::bundle::{
    archive_file_name, build_archive, used_images, ExportSettings,
};
use crate::infrastructure::markdown::frontmatter;
use crate::infrastructure::markdown::ImageSource;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    /// No stored images referenced: a single Markdown file.
    Markdown(PathBuf),
    /// Markdown plus referenced images in a zip archive.
    Archive { path: PathBuf, images: usize },
    /// The archive could not be built, the Markdown file was written instead.
    MarkdownFallback { path: PathBuf, reason: String },
}

impl ExportOutcome {
    pub fn path(&self) -> &Path {
        match self {
            ExportOutcome::Markdown(path)
            | ExportOutcome::Archive { path, .. }
            | ExportOutcome::MarkdownFallback { path, .. } => path,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Exporter {
    settings: ExportSettings,
}

impl Exporter {
    pub fn new(settings: ExportSettings) -> Self {
        Self { settings }
    }

    /// Write the draft to `dir` as Markdown with frontmatter, bundled with
    /// its local images when the body references any.
    #[instrument(level = "debug", skip(self, data, images), fields(title = %data.title))]
    pub fn export<S: ImageSource + ?Sized>(
        &self,
        data: &EditorData,
        images: &S,
        dir: &Path,
    ) -> Result<ExportOutcome, ExportError> {
        fs::create_dir_all(dir)?;
        let document = frontmatter::generate(data);
        let used = used_images(&data.markdown, images);

        if used.is_empty() {
            let path = self.write_markdown(&document, dir)?;
            info!(path = %path.display(), "Exported Markdown");
            return Ok(ExportOutcome::Markdown(path));
        }

        match build_archive(&document, &used, &self.settings.markdown_file_name) {
            Ok(bytes) => {
                let path = dir.join(archive_file_name(&data.title, &self.settings.archive_stem));
                fs::write(&path, bytes)?;
                info!(path = %path.display(), images = used.len(), "Exported archive");
                Ok(ExportOutcome::Archive {
                    path,
                    images: used.len(),
                })
            }
            Err(e) => {
                warn!(error = %e, "Archive generation failed, exporting Markdown only");
                let path = self.write_markdown(&document, dir)?;
                Ok(ExportOutcome::MarkdownFallback {
                    path,
                    reason: e.to_string(),
                })
            }
        }
    }

    fn write_markdown(&self, document: &str, dir: &Path) -> Result<PathBuf, ExportError> {
        let path = dir.join(&self.settings.markdown_file_name);
        fs::write(&path, document)?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Cursor;
    use tempfile::TempDir;
    use zip::ZipArchive;

    struct Images(HashMap<String, String>);

    impl ImageSource for Images {
        fn image_data_by_name(&self, name: &str) -> Option<String> {
            self.0.get(name).cloned()
        }
    }

    fn images(entries: &[(&str, &str)]) -> Images {
        Images(
            entries
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    fn data(markdown: &str) -> EditorData {
        EditorData {
            title: "Trip report".to_string(),
            date: "2026-05-05".to_string(),
            markdown: markdown.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn given_body_without_local_images_when_exporting_then_writes_markdown() {
        let dir = TempDir::new().unwrap();

        let outcome = Exporter::default()
            .export(&data("plain body"), &images(&[]), dir.path())
            .unwrap();

        assert_eq!(outcome, ExportOutcome::Markdown(dir.path().join("blog.md")));
        let written = fs::read_to_string(outcome.path()).unwrap();
        assert!(written.starts_with("---\ntitle: \"Trip report\"\n"));
        assert!(written.ends_with("---\nplain body"));
    }

    #[test]
    fn given_body_with_stored_image_when_exporting_then_writes_archive() {
        let dir = TempDir::new().unwrap();
        let store = images(&[("image_1", "data:image/png;base64,iVBO")]);

        let outcome = Exporter::default()
            .export(&data("![a](./image_1)"), &store, dir.path())
            .unwrap();

        assert_eq!(
            outcome,
            ExportOutcome::Archive {
                path: dir.path().join("Trip report.zip"),
                images: 1
            }
        );
        let bytes = fs::read(outcome.path()).unwrap();
        let archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut names: Vec<&str> = archive.file_names().collect();
        names.sort();
        assert_eq!(names, vec!["blog.md", "image_1.png"]);
    }

    #[test]
    fn given_corrupt_image_data_when_exporting_then_falls_back_to_markdown() {
        let dir = TempDir::new().unwrap();
        let store = images(&[("image_1", "data:image/png;base64,***")]);

        let outcome = Exporter::default()
            .export(&data("![a](./image_1)"), &store, dir.path())
            .unwrap();

        match outcome {
            ExportOutcome::MarkdownFallback { path, reason } => {
                assert_eq!(path, dir.path().join("blog.md"));
                assert!(reason.contains("image_1"));
                assert!(path.exists());
            }
            other => panic!("expected fallback, got {other:?}"),
        }
    }

    #[test]
    fn given_unknown_image_reference_when_exporting_then_writes_markdown_only() {
        let dir = TempDir::new().unwrap();

        let outcome = Exporter::default()
            .export(&data("![a](./image_7)"), &images(&[]), dir.path())
            .unwrap();

        assert!(matches!(outcome, ExportOutcome::Markdown(_)));
    }
}
