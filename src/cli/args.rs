// src/cli/args.rs
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)] // Read from `Cargo.toml`
#[command(arg_required_else_help = true, disable_help_subcommand = true)]
pub struct Args {
    /// Path to config file (default: platform config dir)
    #[arg(long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Path to the draft store (overrides `[storage].path`)
    #[arg(long, value_name = "FILE", global = true)]
    pub store: Option<PathBuf>,

    /// Verbosity level (-v = debug, -vv = trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Render a Markdown file to a sanitized HTML preview
    Preview {
        /// Markdown file (frontmatter optional)
        #[arg(value_name = "PATH")]
        path: PathBuf,

        /// Write the full preview page to this file instead of stdout
        #[arg(short, long, value_name = "OUT")]
        output: Option<PathBuf>,

        /// Open the preview page in the browser
        #[arg(long)]
        open: bool,
    },

    /// Import a Markdown file into the stored draft
    Import {
        /// Markdown file (.md or .markdown)
        #[arg(value_name = "PATH")]
        path: PathBuf,
    },

    /// Export the stored draft as Markdown, or a zip bundle when it uses stored images
    Export {
        /// Target directory
        #[arg(short, long, value_name = "DIR", default_value = ".")]
        output: PathBuf,
    },

    /// Show the stored draft
    Show {
        /// Output the draft as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage the draft's tags
    Tag {
        #[command(subcommand)]
        action: TagAction,
    },

    /// Manage stored images
    Image {
        #[command(subcommand)]
        action: ImageAction,
    },

    /// Re-import a Markdown file on change, re-render the preview and auto-save
    Watch {
        /// Markdown file to watch
        #[arg(value_name = "PATH")]
        path: PathBuf,

        /// Preview page to keep up to date
        #[arg(short, long, value_name = "OUT")]
        output: Option<PathBuf>,
    },

    /// Delete the stored draft
    Clear,
}

#[derive(Subcommand, Debug, Clone)]
pub enum TagAction {
    /// Add a tag (at most five, no duplicates)
    Add {
        #[arg(value_name = "TAG")]
        tag: String,
    },
    /// Remove a tag
    Remove {
        #[arg(value_name = "TAG")]
        tag: String,
    },
    /// List tags in order
    List,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ImageAction {
    /// Resize, store and reference an image in the draft
    Add {
        /// Image file (jpeg, png, gif or webp)
        #[arg(value_name = "FILE")]
        path: PathBuf,

        /// Store the image without appending a reference to the body
        #[arg(long)]
        no_insert: bool,
    },
    /// List stored images
    List,
}
