// src/lib.rs
pub mod application;
pub mod cli;
pub mod constants;
pub mod domain;
pub mod infrastructure;
pub mod ports;
pub mod util;

use crate::application::{
    AutoSaver, EditorCommand, EditorSession, ExportOutcome, Exporter, SessionSettings,
};
use crate::cli::args::{Args, Command, ImageAction, TagAction};
use crate::domain::EditorData;
use crate::infrastructure::markdown::frontmatter;
use crate::infrastructure::markdown::{MarkdownConverter, Previewer, PulldownConverter};
use crate::infrastructure::renderer::ContentRenderer;
use crate::infrastructure::{Config, FileStore, ImageStore};
use crate::ports::PreviewPage;
use crate::util::text::extract_first_line;
use anyhow::{bail, Context, Result};
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

type Session = EditorSession<PulldownConverter, FileStore>;

pub fn run(args: Args) -> Result<()> {
    debug!(?args, "Starting blogmark with arguments");

    let config = Config::load_or_default(args.config.as_deref())?;
    let store_path = match args.store {
        Some(path) => path,
        None => config.store_path()?,
    };
    debug!(store = %store_path.display(), "Using draft store");

    match args.command {
        Command::Preview { path, output, open } => {
            handle_preview_command(&config, &store_path, &path, output.as_deref(), open)
        }
        Command::Import { path } => handle_import_command(&config, &store_path, &path),
        Command::Export { output } => handle_export_command(&config, &store_path, &output),
        Command::Show { json } => handle_show_command(&config, &store_path, json),
        Command::Tag { action } => handle_tag_command(&config, &store_path, action),
        Command::Image { action } => handle_image_command(&config, &store_path, action),
        Command::Watch { path, output } => {
            handle_watch_command(&config, &store_path, &path, output.as_deref())
        }
        Command::Clear => handle_clear_command(&config, &store_path),
    }
}

fn open_store(config: &Config, store_path: &Path) -> Result<FileStore> {
    FileStore::open(store_path, config.storage.quota_bytes)
        .with_context(|| format!("Failed to open draft store {}", store_path.display()))
}

fn open_session(config: &Config, store_path: &Path) -> Result<Session> {
    let store = open_store(config, store_path)?;
    let converter = PulldownConverter::with_options(config.markdown);
    let settings = SessionSettings {
        max_record_bytes: config.storage.max_record_bytes,
        image: config.image,
    };

    let mut session = EditorSession::new(converter, store, settings);
    if session.load().context("Failed to load stored draft")? {
        debug!("Restored stored draft");
    }
    Ok(session)
}

fn read_markdown_file(path: &Path) -> Result<String> {
    let is_markdown = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| matches!(ext.to_lowercase().as_str(), "md" | "markdown"))
        .unwrap_or(false);
    if !is_markdown {
        bail!("Not a Markdown file (expected .md or .markdown): {}", path.display());
    }
    std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))
}

fn page_data(content: &str) -> (EditorData, String) {
    let parsed = frontmatter::parse(content);
    let fm = parsed.frontmatter;
    let data = EditorData {
        title: fm.title.unwrap_or_default(),
        date: fm.date.unwrap_or_default(),
        lead: fm.lead.unwrap_or_default(),
        tags: fm.tags.unwrap_or_default(),
        author_name_main: fm.author_name_main.unwrap_or_default(),
        markdown: parsed.body.clone(),
        ..Default::default()
    };
    (data, parsed.body)
}

fn handle_preview_command(
    config: &Config,
    store_path: &Path,
    path: &Path,
    output: Option<&Path>,
    open: bool,
) -> Result<()> {
    info!(path = %path.display(), "Rendering preview");
    let content = read_markdown_file(path)?;
    let (data, body) = page_data(&content);

    let mut store = open_store(config, store_path)?;
    let images = ImageStore::open(&mut store, config.image)?;
    let previewer = Previewer::new(PulldownConverter::with_options(config.markdown));
    let fragment = previewer
        .render_with_images(&body, &images)
        .context("Failed to render preview")?;

    if output.is_none() && !open {
        println!("{fragment}");
        return Ok(());
    }

    let page = PreviewPage::new().render(&data, &fragment);
    let mut renderer = ContentRenderer::new();
    let page_path = match output {
        Some(out) => {
            renderer.write_file(out, &page)?;
            println!("Wrote preview to {}", out.display());
            out.to_path_buf()
        }
        None => renderer.create_temp_file(&page)?,
    };
    if open {
        renderer.open_in_browser(&page_path)?;
    }
    Ok(())
}

fn handle_import_command(config: &Config, store_path: &Path, path: &Path) -> Result<()> {
    let content = read_markdown_file(path)?;
    let mut session = open_session(config, store_path)?;

    session
        .import_markdown(&content)
        .with_context(|| format!("Failed to import {}", path.display()))?;

    let data = session.editor_data();
    println!(
        "Imported \"{}\" ({} tags, {} characters)",
        data.title,
        data.tags.len(),
        data.markdown.chars().count()
    );
    Ok(())
}

fn handle_export_command(config: &Config, store_path: &Path, output: &Path) -> Result<()> {
    let mut session = open_session(config, store_path)?;
    let data = session.editor_data();
    let images = session.images()?;

    let outcome = Exporter::new(config.export.clone())
        .export(&data, &images, output)
        .context("Failed to export draft")?;

    match &outcome {
        ExportOutcome::Markdown(path) => println!("Exported {}", path.display()),
        ExportOutcome::Archive { path, images } => {
            println!("Exported {} ({} images)", path.display(), images)
        }
        ExportOutcome::MarkdownFallback { path, reason } => {
            eprintln!("Warning: could not build archive ({reason}); exported Markdown only");
            println!("Exported {}", path.display());
        }
    }
    Ok(())
}

fn handle_show_command(config: &Config, store_path: &Path, json: bool) -> Result<()> {
    let mut session = open_session(config, store_path)?;
    let data = session.editor_data();

    if json {
        let output = serde_json::to_string_pretty(&data).context("Failed to serialize draft")?;
        println!("{output}");
        return Ok(());
    }

    let preview = session.preview().context("Failed to render preview")?;
    println!("Title:   {}", data.title);
    println!("Date:    {}", data.date);
    println!("Author:  {}", data.author_name_main);
    println!("Tags:    {}", data.tags.join(", "));
    println!("Lead:    {}", data.lead);
    if let Some(cover) = &data.cover {
        println!("Cover:   {cover}");
    }
    println!("Status:  {}", session.status());
    println!("Summary: {}", extract_first_line(&preview));
    Ok(())
}

fn handle_tag_command(config: &Config, store_path: &Path, action: TagAction) -> Result<()> {
    let mut session = open_session(config, store_path)?;

    match action {
        TagAction::Add { tag } => {
            session
                .dispatch(EditorCommand::AddTag(tag.clone()))
                .with_context(|| format!("Failed to add tag '{tag}'"))?;
            session.save()?;
            println!("Added tag '{}'", tag.trim());
        }
        TagAction::Remove { tag } => {
            session.dispatch(EditorCommand::RemoveTag(tag.clone()))?;
            session.save()?;
            println!("Removed tag '{}'", tag.trim());
        }
        TagAction::List => {
            if session.tags().is_empty() {
                println!("No tags");
            }
            for tag in session.tags() {
                println!("{tag}");
            }
        }
    }
    Ok(())
}

fn handle_image_command(config: &Config, store_path: &Path, action: ImageAction) -> Result<()> {
    let mut session = open_session(config, store_path)?;

    match action {
        ImageAction::Add { path, no_insert } => {
            let bytes = std::fs::read(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let stored = if no_insert {
                session.images()?.save_image(&bytes)?
            } else {
                let stored = session.insert_image(&bytes)?;
                session.save()?;
                stored
            };
            println!("Stored {} as ![{name}](./{name})", path.display(), name = stored.name);
        }
        ImageAction::List => {
            let images = session.images()?.all_images()?;
            if images.is_empty() {
                println!("No stored images");
            }
            for image in images {
                println!("{}\t{}", image.name, image.key);
            }
        }
    }
    Ok(())
}

fn handle_watch_command(
    config: &Config,
    store_path: &Path,
    path: &Path,
    output: Option<&Path>,
) -> Result<()> {
    let mut session = open_session(config, store_path)?;
    let mut saver = AutoSaver::new(Duration::from_millis(config.autosave.interval_ms));
    let renderer = ContentRenderer::new();
    let poll = saver.interval().min(Duration::from_millis(500));
    let mut last_modified = None;

    info!(path = %path.display(), interval = ?saver.interval(), "Watching for changes");
    loop {
        let modified = std::fs::metadata(path)
            .and_then(|meta| meta.modified())
            .with_context(|| format!("Failed to stat {}", path.display()))?;

        if last_modified != Some(modified) {
            last_modified = Some(modified);
            if let Err(e) = reload(&mut session, &renderer, path, output) {
                warn!(error = %e, "Failed to apply changes");
                eprintln!("Error: {e:#}");
            }
        }

        if let Err(e) = saver.tick(&mut session, Instant::now()) {
            warn!(error = %e, "Auto-save failed");
            eprintln!("Auto-save failed: {e}");
        }
        std::thread::sleep(poll);
    }
}

fn handle_clear_command(config: &Config, store_path: &Path) -> Result<()> {
    let mut session = open_session(config, store_path)?;
    session.clear()?;
    println!("Cleared stored draft");
    Ok(())
}

fn reload<C: MarkdownConverter>(
    session: &mut EditorSession<C, FileStore>,
    renderer: &ContentRenderer,
    path: &Path,
    output: Option<&Path>,
) -> Result<()> {
    let content = read_markdown_file(path)?;
    session.apply_document(&content)?;
    let fragment = session.preview()?;
    debug!(bytes = fragment.len(), "Re-rendered preview");

    if let Some(out) = output {
        let page = PreviewPage::new().render(&session.editor_data(), &fragment);
        renderer.write_file(out, &page)?;
    }
    println!("Updated ({})", session.status());
    Ok(())
}
