//! # Library Scan
//!
//! Collects the markup files under a directory into a catalog the editor
//! offers for insertion.
//!
//! The scan runs on a worker thread and never touches a document. Turning a
//! catalog item into an edit happens on the edit thread, through
//! [`EditSession::insert_document`](crate::EditSession::insert_document).
//!
//! Cancellation is cooperative: the flag is checked before every directory
//! entry, and a cancelled scan reports [`ScanOutcome::Cancelled`] rather than
//! an error.

use crate::config::LibraryConfig;
use crate::errors::{EditorError, EditorResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, info, instrument, warn};
use walkdir::WalkDir;

/// Shared stop request for a running scan
#[derive(Clone, Debug, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// One insertable markup file
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LibraryItem {
    /// Directory relative to the scan root, `/`-separated; empty at the top
    pub section: String,
    /// File stem
    pub name: String,
    pub path: PathBuf,
}

/// Immutable result of a completed scan, sorted by section then name
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryCatalog {
    items: Vec<LibraryItem>,
}

impl LibraryCatalog {
    pub fn new(mut items: Vec<LibraryItem>) -> Self {
        items.sort();
        Self { items }
    }

    pub fn items(&self) -> &[LibraryItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Distinct sections in order
    pub fn sections(&self) -> Vec<&str> {
        let mut sections: Vec<&str> = self.items.iter().map(|i| i.section.as_str()).collect();
        sections.dedup();
        sections
    }

    pub fn find(&self, section: &str, name: &str) -> Option<&LibraryItem> {
        self.items
            .iter()
            .find(|item| item.section == section && item.name == name)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum ScanOutcome {
    Completed(LibraryCatalog),
    Cancelled,
}

impl ScanOutcome {
    pub fn catalog(self) -> Option<LibraryCatalog> {
        match self {
            ScanOutcome::Completed(catalog) => Some(catalog),
            ScanOutcome::Cancelled => None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct LibraryScanner {
    root: PathBuf,
    config: LibraryConfig,
}

impl LibraryScanner {
    pub fn new(root: impl Into<PathBuf>, config: LibraryConfig) -> Self {
        Self {
            root: root.into(),
            config,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Walks the root directory on the calling thread.
    ///
    /// An unreadable root is an error. Unreadable entries below it are
    /// skipped.
    #[instrument(skip_all, fields(root = %self.root.display()))]
    pub fn scan(&self, cancel: &CancellationFlag) -> EditorResult<ScanOutcome> {
        let mut walker = WalkDir::new(&self.root).follow_links(self.config.follow_links);
        if let Some(max_depth) = self.config.max_depth {
            walker = walker.max_depth(max_depth);
        }

        let mut items = Vec::new();
        for entry in walker {
            if cancel.is_cancelled() {
                info!(found = items.len(), "library scan cancelled");
                return Ok(ScanOutcome::Cancelled);
            }
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) if err.depth() == 0 => return Err(err.into()),
                Err(err) => {
                    warn!(error = %err, "skipping unreadable entry");
                    continue;
                }
            };
            if !entry.file_type().is_file() || !self.config.matches(entry.path()) {
                continue;
            }
            if let Some(item) = self.item(entry.path()) {
                debug!(name = %item.name, section = %item.section, "found");
                items.push(item);
            }
        }

        info!(found = items.len(), "library scan completed");
        Ok(ScanOutcome::Completed(LibraryCatalog::new(items)))
    }

    /// Runs [`scan`](Self::scan) on a worker thread
    pub fn spawn(self) -> ScanHandle {
        let cancel = CancellationFlag::new();
        let flag = cancel.clone();
        let worker = thread::spawn(move || self.scan(&flag));
        ScanHandle { cancel, worker }
    }

    fn item(&self, path: &Path) -> Option<LibraryItem> {
        let relative = path.strip_prefix(&self.root).ok()?;
        let name = relative.file_stem()?.to_str()?.to_string();
        let section = relative
            .parent()
            .map(|parent| {
                parent
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy())
                    .collect::<Vec<_>>()
                    .join("/")
            })
            .unwrap_or_default();
        Some(LibraryItem {
            section,
            name,
            path: path.to_path_buf(),
        })
    }
}

/// Running background scan
#[derive(Debug)]
pub struct ScanHandle {
    cancel: CancellationFlag,
    worker: JoinHandle<EditorResult<ScanOutcome>>,
}

impl ScanHandle {
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.worker.is_finished()
    }

    /// Waits for the worker and returns its outcome
    pub fn join(self) -> EditorResult<ScanOutcome> {
        self.worker.join().map_err(|_| EditorError::ScanPanicked)?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn library() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("forms/inputs")).unwrap();
        fs::write(root.join("Main.fxml"), "<VBox/>").unwrap();
        fs::write(root.join("README.md"), "docs").unwrap();
        fs::write(root.join("forms/Login.fxml"), "<GridPane/>").unwrap();
        fs::write(root.join("forms/Address.fxml"), "<GridPane/>").unwrap();
        fs::write(root.join("forms/inputs/Search.fxml"), "<TextField/>").unwrap();
        dir
    }

    #[test]
    fn test_scan_collects_sorted_items() {
        let dir = library();
        let scanner = LibraryScanner::new(dir.path(), LibraryConfig::default());

        let catalog = scanner
            .scan(&CancellationFlag::new())
            .unwrap()
            .catalog()
            .unwrap();
        let names: Vec<(&str, &str)> = catalog
            .items()
            .iter()
            .map(|i| (i.section.as_str(), i.name.as_str()))
            .collect();
        assert_eq!(
            names,
            vec![
                ("", "Main"),
                ("forms", "Address"),
                ("forms", "Login"),
                ("forms/inputs", "Search"),
            ]
        );
        assert_eq!(catalog.sections(), vec!["", "forms", "forms/inputs"]);
        assert!(catalog.find("forms", "Login").is_some());
    }

    #[test]
    fn test_scan_honors_max_depth() {
        let dir = library();
        let config = LibraryConfig {
            max_depth: Some(1),
            ..LibraryConfig::default()
        };
        let catalog = LibraryScanner::new(dir.path(), config)
            .scan(&CancellationFlag::new())
            .unwrap()
            .catalog()
            .unwrap();
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn test_cancelled_scan_is_not_an_error() {
        let dir = library();
        let cancel = CancellationFlag::new();
        cancel.cancel();
        let outcome = LibraryScanner::new(dir.path(), LibraryConfig::default())
            .scan(&cancel)
            .unwrap();
        assert_eq!(outcome, ScanOutcome::Cancelled);
    }

    #[test]
    fn test_missing_root_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let scanner = LibraryScanner::new(dir.path().join("missing"), LibraryConfig::default());
        assert!(matches!(
            scanner.scan(&CancellationFlag::new()),
            Err(EditorError::Scan(_))
        ));
    }

    #[test]
    fn test_spawned_scan() {
        let dir = library();
        let handle = LibraryScanner::new(dir.path(), LibraryConfig::default()).spawn();
        let outcome = handle.join().unwrap();
        assert_eq!(outcome.catalog().map(|c| c.len()), Some(4));
    }
}
