//! Dataset loading orchestration.
//!
//! A dataset is one root document plus everything its import graph
//! reaches. The loader runs a worklist in discovery order: pop a path,
//! decode, parse, append records, resolve the document's imports
//! against the root's base directory, push. Each resolved path is
//! visited at most once per load, so two documents importing the same
//! file contribute its records exactly once.
//!
//! Per-file failures degrade: a missing import is logged and skipped,
//! a shapeless file contributes nothing. Only a missing root or an
//! unrecoverable I/O error aborts the load.

use crate::parse::{parse_document, ParseStrategy};
use crate::progress::{ProgressEvent, ProgressObserver};
use crate::resolve::resolve_import;
use idb_common::{Diagnostic, Error, Item, Result};
use idb_encoding::TextEncoding;
use std::collections::{HashSet, VecDeque};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Caller-supplied loader configuration.
#[derive(Debug, Clone, Default)]
pub struct LoaderConfig {
    /// Base directory for import resolution. Defaults to the root
    /// document's directory.
    pub base_dir: Option<PathBuf>,

    /// Forced encoding, overriding byte-level detection.
    pub encoding: Option<TextEncoding>,
}

/// How a dataset load ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStatus {
    /// The worklist drained.
    Complete,
    /// The cancellation flag was raised; the aggregate is partial.
    Cancelled,
}

/// Result of loading a single file.
#[derive(Debug)]
pub struct LoadOutcome {
    /// Valid records in body order.
    pub records: Vec<Item>,
    /// Raw import declarations, not followed or resolved.
    pub imports: Vec<String>,
    pub diagnostics: Vec<Diagnostic>,
    /// The encoding actually used to decode the file.
    pub encoding: TextEncoding,
    /// Strategy that produced the records, when any matched.
    pub strategy: Option<ParseStrategy>,
}

/// Result of loading a dataset.
#[derive(Debug)]
pub struct DatasetOutcome {
    /// Records in file-visit order, body order within each file.
    pub records: Vec<Item>,
    /// Files that contributed to the aggregate, in visit order.
    pub visited: Vec<PathBuf>,
    pub diagnostics: Vec<Diagnostic>,
    /// Encoding used for the root document.
    pub encoding: TextEncoding,
    pub status: LoadStatus,
}

/// Loads item databases, following imports transitively.
///
/// One instance per load operation; instances own their worklist and
/// aggregate and share nothing.
#[derive(Default)]
pub struct DatasetLoader {
    config: LoaderConfig,
    observer: Option<Box<dyn ProgressObserver>>,
    cancel: Option<Arc<AtomicBool>>,
}

impl DatasetLoader {
    pub fn new(config: LoaderConfig) -> Self {
        Self {
            config,
            observer: None,
            cancel: None,
        }
    }

    /// Attach a progress observer. Advisory only.
    pub fn with_observer(mut self, observer: impl ProgressObserver + 'static) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    /// Attach a cancellation flag. When raised, the worklist loop
    /// stops after the file in flight and reports a partial aggregate.
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// Load a single file without following its imports.
    ///
    /// The imports extracted from the footer are returned raw so the
    /// caller can resolve them if it wants to.
    pub fn load_file(&self, path: &Path) -> Result<LoadOutcome> {
        if !path.is_file() {
            return Err(Error::FileNotFound {
                path: path.to_path_buf(),
            });
        }

        let bytes = fs::read(path)?;
        let encoding = match self.config.encoding {
            Some(forced) => {
                debug!(encoding = forced.name(), "using caller-forced encoding");
                forced
            }
            None => idb_encoding::detect(&bytes),
        };
        let (text, had_decode_errors) = encoding.decode(&bytes);

        let mut diagnostics = Vec::new();
        if had_decode_errors {
            diagnostics.push(
                Diagnostic::warning(format!(
                    "some byte sequences were not valid {} and were replaced",
                    encoding.name()
                ))
                .with_path(path),
            );
        }

        let parsed = parse_document(&text);
        if let Some(header) = &parsed.header {
            debug!(kind = %header.kind, version = header.version, "document header");
        }
        match parsed.strategy {
            Some(strategy) => diagnostics.push(
                Diagnostic::info(format!(
                    "parsed {} records via {strategy} strategy",
                    parsed.records.len()
                ))
                .with_path(path),
            ),
            None => diagnostics.push(
                Diagnostic::warning("no parsing strategy matched, file contributes nothing")
                    .with_path(path),
            ),
        }
        diagnostics.extend(parsed.diagnostics);

        info!(
            path = %path.display(),
            encoding = encoding.name(),
            codepage = encoding.codepage(),
            records = parsed.records.len(),
            imports = parsed.imports.len(),
            "loaded item database file"
        );

        Ok(LoadOutcome {
            records: parsed.records,
            imports: parsed.imports,
            diagnostics,
            encoding,
            strategy: parsed.strategy,
        })
    }

    /// Load a root document and every file its import graph reaches.
    pub fn load_dataset(&self, root: &Path) -> Result<DatasetOutcome> {
        if !root.is_file() {
            return Err(Error::FileNotFound {
                path: root.to_path_buf(),
            });
        }

        // Imports are resolved against the root's base directory, not
        // the directory of the file that declared them.
        let base_dir = match &self.config.base_dir {
            Some(dir) => dir.clone(),
            None => root
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from(".")),
        };

        let mut worklist: VecDeque<PathBuf> = VecDeque::new();
        worklist.push_back(root.to_path_buf());

        let mut seen: HashSet<PathBuf> = HashSet::new();
        let mut records: Vec<Item> = Vec::new();
        let mut visited: Vec<PathBuf> = Vec::new();
        let mut diagnostics: Vec<Diagnostic> = Vec::new();
        let mut root_encoding: Option<TextEncoding> = None;
        let mut status = LoadStatus::Complete;

        while let Some(path) = worklist.pop_front() {
            if self.is_cancelled() {
                warn!("dataset load cancelled, returning partial aggregate");
                diagnostics.push(Diagnostic::warning("load cancelled by caller"));
                status = LoadStatus::Cancelled;
                break;
            }

            if !seen.insert(visit_key(&path)) {
                debug!(path = %path.display(), "already visited, skipping");
                continue;
            }

            self.emit_progress(&path, visited.len(), worklist.len());

            let outcome = match self.load_file(&path) {
                Ok(outcome) => outcome,
                Err(Error::FileNotFound { path }) => {
                    // Missing imports never abort the rest of the walk
                    warn!(path = %path.display(), "import file not found, skipping");
                    diagnostics
                        .push(Diagnostic::warning("import file not found").with_path(&path));
                    continue;
                }
                Err(err) => return Err(err),
            };

            if root_encoding.is_none() {
                root_encoding = Some(outcome.encoding);
            }
            records.extend(outcome.records);
            diagnostics.extend(outcome.diagnostics);
            visited.push(path);

            for raw in &outcome.imports {
                let resolved = resolve_import(raw, &base_dir);
                debug!(
                    raw,
                    resolved = %resolved.path.display(),
                    origin = %resolved.origin,
                    "resolved import declaration"
                );
                worklist.push_back(resolved.path);
            }
        }

        info!(
            records = records.len(),
            files = visited.len(),
            "dataset load finished"
        );

        Ok(DatasetOutcome {
            records,
            visited,
            diagnostics,
            // The root exists and decoded, so this is always set
            encoding: root_encoding.unwrap_or(TextEncoding::Gb18030),
            status,
        })
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }

    fn emit_progress(&self, current: &Path, done: usize, pending: usize) {
        let Some(observer) = &self.observer else {
            return;
        };
        let total = done + 1 + pending;
        let event = ProgressEvent {
            percent: ((done * 100) / total) as u8,
            current_file: current.to_path_buf(),
            files_done: done,
            files_pending: pending,
        };
        observer.on_progress(&event);
    }
}

/// Key used for visited-set deduplication.
///
/// Canonicalization collapses distinct spellings of the same file;
/// paths that don't exist keep their literal form.
fn visit_key(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}
