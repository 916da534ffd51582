// src/infrastructure/mod.rs
pub mod bundle;
pub mod config;
pub mod image;
pub mod markdown;
pub mod renderer;
pub mod storage;

pub use config::Config;
pub use image::{ImageSettings, ImageStore};
pub use storage::{EditorStore, FileStore, KeyValueStore};
