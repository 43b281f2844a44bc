#![allow(dead_code)]

use anyhow::{Context, Result};
use serde_json::{Value, json};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

// A throwaway library root laid out like a deployed site:
// <root>/books/books.json plus the files it points at.
pub struct FixtureLibrary {
    dir: TempDir,
}

impl FixtureLibrary {
    pub fn new(catalog: &Value) -> Result<Self> {
        let dir = TempDir::new()?;
        let books = dir.path().join("books");
        fs::create_dir_all(&books)?;
        fs::write(books.join("books.json"), serde_json::to_vec_pretty(catalog)?)
            .context("writing fixture catalog")?;
        Ok(Self { dir })
    }

    pub fn with_raw_catalog(contents: &str) -> Result<Self> {
        let dir = TempDir::new()?;
        let books = dir.path().join("books");
        fs::create_dir_all(&books)?;
        fs::write(books.join("books.json"), contents)?;
        Ok(Self { dir })
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn catalog_path(&self) -> PathBuf {
        self.dir.path().join("books/books.json")
    }

    pub fn write_file(&self, relative: &str, contents: &[u8]) -> Result<PathBuf> {
        let path = self.dir.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, contents)
            .with_context(|| format!("writing fixture file {}", path.display()))?;
        Ok(path)
    }
}

pub fn sample_catalog() -> Value {
    json!([
        {
            "title": "Dom Casmurro",
            "description": "Bentinho relembra a juventude e o ciúme de Capitu.",
            "size": 1_250_000,
            "url": "books/pdf/dom-casmurro.pdf",
            "files": {"epub": "books/epub/dom-casmurro.epub"}
        },
        {
            "title": "Iracema",
            "description": "Lenda do Ceará.",
            "size": 640_000,
            "format": "epub",
            "url": "books/epub/iracema.epub"
        },
        {
            "title": "O Cortiço",
            "size": 2_000_000,
            "filename": "books/mobi/o-cortico.mobi"
        },
        {
            "title": "Café & Açaí?!",
            "description": "Receitas.",
            "url": "books/pdf/cafe.pdf"
        }
    ])
}

pub fn numbered_catalog(count: usize) -> Value {
    Value::Array(
        (1..=count)
            .map(|n| {
                json!({
                    "title": format!("Volume {n:02}"),
                    "url": format!("books/pdf/volume-{n:02}.pdf"),
                    "size": 1_000_000
                })
            })
            .collect(),
    )
}

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn run_command(mut cmd: Command) -> Result<Output> {
    let output = cmd
        .output()
        .with_context(|| format!("failed to execute {:?}", cmd.get_program()))?;
    if !output.status.success() {
        anyhow::bail!(
            "command {:?} failed with {}\nstdout:\n{}\nstderr:\n{}",
            cmd.get_program(),
            output.status,
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
    }
    Ok(output)
}
