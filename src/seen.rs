// src/seen.rs
//! Per-source record of URLs already reported, persisted as one JSON file.
//!
//! The store only grows. A bad or missing file is an empty store, never an error.

use anyhow::{Context, Result};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io::Write;
use std::path::Path;

use crate::config::Source;
use crate::ingest::Candidate;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeenStore {
    by_source: BTreeMap<String, BTreeSet<String>>,
}

impl SeenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read `path`. Missing → empty; unreadable or corrupt → warn and empty.
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            return Self::new();
        }
        let parsed = fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))
            .and_then(|s| Self::from_json(&s));
        match parsed {
            Ok(store) => store,
            Err(e) => {
                tracing::warn!(error = ?e, path = %path.display(), "seen-state unusable; starting fresh");
                Self::new()
            }
        }
    }

    pub fn from_json(s: &str) -> Result<Self> {
        let by_source: BTreeMap<String, BTreeSet<String>> =
            serde_json::from_str(s).context("parsing seen-state json")?;
        Ok(Self { by_source })
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.by_source).context("serializing seen-state")
    }

    /// Whole-file rewrite through a temp file + rename.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        let json = self.to_json()?;
        let tmp = path.with_extension("json.tmp");
        let mut f =
            fs::File::create(&tmp).with_context(|| format!("creating {}", tmp.display()))?;
        f.write_all(json.as_bytes())?;
        f.sync_all()?;
        fs::rename(&tmp, path).with_context(|| format!("replacing {}", path.display()))?;
        Ok(())
    }

    /// Delete the persisted file so the next `load` starts empty.
    pub fn reset(path: &Path) -> Result<()> {
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("removing {}", path.display())),
        }
    }

    pub fn contains(&self, source: &str, url: &str) -> bool {
        self.by_source
            .get(source)
            .is_some_and(|urls| urls.contains(url))
    }

    pub fn urls(&self, source: &str) -> Option<&BTreeSet<String>> {
        self.by_source.get(source)
    }

    pub fn source_count(&self) -> usize {
        self.by_source.len()
    }

    /// Candidates whose URL this source has not reported yet, in input order.
    ///
    /// When at least one is new, every URL of `items` is folded into the
    /// source's entry; otherwise the entry is left alone.
    pub fn diff_new_items(&mut self, source: &Source, items: &[Candidate]) -> Vec<Candidate> {
        let known = self.by_source.get(&source.name);
        let new_items: Vec<Candidate> = items
            .iter()
            .filter(|c| known.map_or(true, |k| !k.contains(&c.url)))
            .cloned()
            .collect();

        tracing::debug!(
            source = %source.name,
            current = items.len(),
            previously_seen = known.map_or(0, BTreeSet::len),
            new = new_items.len(),
            "seen-state diff"
        );

        if !new_items.is_empty() {
            self.by_source
                .entry(source.name.clone())
                .or_default()
                .extend(items.iter().map(|c| c.url.clone()));
        }
        new_items
    }
}
