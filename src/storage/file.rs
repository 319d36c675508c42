//! Directory-backed generation store.
//!
//! Layout of an index directory:
//!
//! ```text
//! <dir>/gen-000000000000002a.idx   encoded generation 42
//! <dir>/CURRENT                    "gen-000000000000002a.idx\n"
//! ```
//!
//! Every file is written under a `.tmp` name, fsynced and renamed into
//! place, and the directory is fsynced after the rename. Readers follow
//! `CURRENT`, so they see either the old generation or the new one.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use memmap2::MmapOptions;

use crate::error::{LoupeError, Result};
use crate::index::codec;
use crate::index::generation::IndexGeneration;
use crate::storage::structured::CHECKSUM_LEN;

/// Name of the pointer file.
pub const CURRENT_FILE: &str = "CURRENT";

const GENERATION_PREFIX: &str = "gen-";
const GENERATION_SUFFIX: &str = ".idx";
const TEMP_SUFFIX: &str = ".tmp";

/// File name of a generation.
pub fn generation_file_name(id: u64) -> String {
    format!("{GENERATION_PREFIX}{id:016x}{GENERATION_SUFFIX}")
}

/// Parse a generation id out of a file name.
pub fn parse_generation_file_name(name: &str) -> Option<u64> {
    let hex = name
        .strip_prefix(GENERATION_PREFIX)?
        .strip_suffix(GENERATION_SUFFIX)?;
    if hex.len() != 16 {
        return None;
    }
    u64::from_str_radix(hex, 16).ok()
}

/// A directory holding index generations.
#[derive(Clone, Debug)]
pub struct IndexStore {
    directory: PathBuf,
}

impl IndexStore {
    /// Open (creating if needed) an index directory.
    pub fn open<P: AsRef<Path>>(directory: P) -> Result<Self> {
        let directory = directory.as_ref().to_path_buf();

        if !directory.exists() {
            fs::create_dir_all(&directory).map_err(|e| {
                LoupeError::storage(format!(
                    "failed to create directory {}: {e}",
                    directory.display()
                ))
            })?;
        }
        if !directory.is_dir() {
            return Err(LoupeError::storage(format!(
                "path is not a directory: {}",
                directory.display()
            )));
        }

        Ok(IndexStore { directory })
    }

    /// The index directory.
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Write a generation and make it current.
    ///
    /// Returns the path of the generation file.
    pub fn save(&self, generation: &IndexGeneration) -> Result<PathBuf> {
        let name = generation_file_name(generation.id());
        let bytes = codec::encode(generation)?;
        let path = self.write_atomic(&name, &bytes)?;
        self.write_atomic(CURRENT_FILE, format!("{name}\n").as_bytes())?;

        info!(
            "Saved generation {} ({} bytes) to {}",
            generation.id(),
            bytes.len(),
            path.display()
        );
        Ok(path)
    }

    /// Id named by `CURRENT`, if any.
    pub fn current_id(&self) -> Result<Option<u64>> {
        let pointer = self.directory.join(CURRENT_FILE);
        if !pointer.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&pointer)?;
        let name = content.trim();
        parse_generation_file_name(name)
            .map(Some)
            .ok_or_else(|| LoupeError::corrupted(format!("CURRENT names {name:?}")))
    }

    /// Load the current generation, or `None` for a fresh directory.
    pub fn load_current(&self) -> Result<Option<IndexGeneration>> {
        match self.current_id()? {
            Some(id) => self.load(id).map(Some),
            None => Ok(None),
        }
    }

    /// Load a generation by id.
    pub fn load(&self, id: u64) -> Result<IndexGeneration> {
        let path = self.directory.join(generation_file_name(id));
        let file = File::open(&path).map_err(|e| {
            LoupeError::storage(format!("failed to open {}: {e}", path.display()))
        })?;

        let len = file.metadata()?.len();
        if len < CHECKSUM_LEN as u64 {
            return Err(LoupeError::corrupted(format!(
                "{} is only {len} bytes",
                path.display()
            )));
        }

        // SAFETY: generation files are never modified after the rename that
        // publishes them; stale ones are only ever unlinked.
        let mmap = unsafe {
            MmapOptions::new().map(&file).map_err(|e| {
                LoupeError::storage(format!("failed to mmap {}: {e}", path.display()))
            })?
        };

        let generation = codec::decode(&mmap)?;
        if generation.id() != id {
            return Err(LoupeError::corrupted(format!(
                "{} holds generation {}",
                path.display(),
                generation.id()
            )));
        }

        debug!(
            "Loaded generation {id} with {} documents",
            generation.doc_count()
        );
        Ok(generation)
    }

    /// Ids of all generation files, ascending.
    pub fn list_generations(&self) -> Result<Vec<u64>> {
        let mut ids = Vec::new();
        for entry in fs::read_dir(&self.directory)? {
            let entry = entry?;
            if let Some(id) = entry.file_name().to_str().and_then(parse_generation_file_name) {
                ids.push(id);
            }
        }
        ids.sort_unstable();
        Ok(ids)
    }

    /// Id to use for the next build.
    pub fn next_generation_id(&self) -> Result<u64> {
        let latest = self.list_generations()?.last().copied().unwrap_or(0);
        Ok(latest + 1)
    }

    /// Delete all but the newest `keep` generations, never the current one.
    ///
    /// Leftover temporary files are removed as well. Returns the number of
    /// generation files deleted.
    pub fn prune(&self, keep: usize) -> Result<usize> {
        let current = self.current_id()?;
        let ids = self.list_generations()?;
        let cutoff = ids.len().saturating_sub(keep);

        let mut removed = 0;
        for &id in &ids[..cutoff] {
            if Some(id) == current {
                continue;
            }
            let path = self.directory.join(generation_file_name(id));
            fs::remove_file(&path)?;
            debug!("Removed stale generation {}", path.display());
            removed += 1;
        }

        for entry in fs::read_dir(&self.directory)? {
            let entry = entry?;
            let name = entry.file_name();
            if name.to_str().is_some_and(|n| n.ends_with(TEMP_SUFFIX)) {
                if let Err(e) = fs::remove_file(entry.path()) {
                    warn!("Failed to remove {}: {e}", entry.path().display());
                }
            }
        }

        Ok(removed)
    }

    fn write_atomic(&self, name: &str, bytes: &[u8]) -> Result<PathBuf> {
        let path = self.directory.join(name);
        let temp = self.directory.join(format!("{name}{TEMP_SUFFIX}"));

        let mut file = File::create(&temp)?;
        file.write_all(bytes)?;
        file.sync_all()?;
        drop(file);

        fs::rename(&temp, &path).map_err(|e| {
            LoupeError::storage(format!("failed to rename {}: {e}", temp.display()))
        })?;
        self.sync_directory()?;
        Ok(path)
    }

    #[cfg(unix)]
    fn sync_directory(&self) -> Result<()> {
        File::open(&self.directory)?.sync_all()?;
        Ok(())
    }

    #[cfg(not(unix))]
    fn sync_directory(&self) -> Result<()> {
        Ok(())
    }
}
