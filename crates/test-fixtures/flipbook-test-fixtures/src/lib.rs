use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;
use serde::Deserialize;

static MANIFEST: Lazy<Manifest> = Lazy::new(|| {
    let raw = include_str!("../../../../fixtures/manifest.json");
    serde_json::from_str(raw).expect("fixtures manifest should parse")
});

#[derive(Debug, Deserialize)]
struct Manifest {
    books: HashMap<String, String>,
    gestures: HashMap<String, GestureEntry>,
}

/// Gesture scripts name the book they run against.
#[derive(Debug, Deserialize)]
struct GestureEntry {
    script: String,
    book: String,
}

/// Fixture families listed in the manifest. Both resolve a name to a file
/// under `fixtures/`, so every accessor goes through `file`.
#[derive(Copy, Clone, Debug)]
enum Kind {
    Book,
    Gesture,
}

impl Kind {
    fn label(self) -> &'static str {
        match self {
            Kind::Book => "book",
            Kind::Gesture => "gesture",
        }
    }

    fn keys(self) -> Vec<String> {
        let mut keys: Vec<String> = match self {
            Kind::Book => MANIFEST.books.keys().cloned().collect(),
            Kind::Gesture => MANIFEST.gestures.keys().cloned().collect(),
        };
        keys.sort();
        keys
    }

    fn file(self, name: &str) -> Result<PathBuf> {
        let rel = match self {
            Kind::Book => MANIFEST.books.get(name),
            Kind::Gesture => MANIFEST.gestures.get(name).map(|e| &e.script),
        }
        .ok_or_else(|| anyhow!("unknown {} fixture '{name}'", self.label()))?;
        Ok(Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("../../../fixtures")
            .join(rel))
    }

    fn text(self, name: &str) -> Result<String> {
        let path = self.file(name)?;
        fs::read_to_string(&path)
            .with_context(|| format!("failed to read fixture at {}", path.display()))
    }

    fn parse<T: DeserializeOwned>(self, name: &str) -> Result<T> {
        serde_json::from_str(&self.text(name)?)
            .with_context(|| format!("failed to parse JSON {} fixture {name}", self.label()))
    }
}

/// Book definitions: engine config, page contents and host bounds.
pub mod books {
    use super::*;

    pub fn keys() -> Vec<String> {
        Kind::Book.keys()
    }

    pub fn json(name: &str) -> Result<String> {
        Kind::Book.text(name)
    }

    pub fn load<T: DeserializeOwned>(name: &str) -> Result<T> {
        Kind::Book.parse(name)
    }

    pub fn path(name: &str) -> Result<PathBuf> {
        Kind::Book.file(name)
    }
}

/// Recorded pointer scripts: per-frame inputs plus the expected end state.
pub mod gestures {
    use super::*;

    pub fn keys() -> Vec<String> {
        Kind::Gesture.keys()
    }

    /// Name of the book fixture a script runs against.
    pub fn book(name: &str) -> Result<String> {
        MANIFEST
            .gestures
            .get(name)
            .map(|e| e.book.clone())
            .ok_or_else(|| anyhow!("unknown gesture fixture '{name}'"))
    }

    pub fn json(name: &str) -> Result<String> {
        Kind::Gesture.text(name)
    }

    pub fn load<T: DeserializeOwned>(name: &str) -> Result<T> {
        Kind::Gesture.parse(name)
    }

    pub fn path(name: &str) -> Result<PathBuf> {
        Kind::Gesture.file(name)
    }
}
