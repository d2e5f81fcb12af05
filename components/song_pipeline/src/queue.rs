// components/song_pipeline/src/queue.rs
use song_primitives::SongReference;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum QueueError {
    #[error("Failed to read batch list {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to update batch list {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Pending song references backed by a newline-delimited list file
///
/// Every mutation rewrites the file before returning, so the file always
/// holds exactly the references that have not been settled yet.
#[derive(Debug)]
pub struct BatchQueue {
    path: PathBuf,
    entries: Vec<SongReference>,
}

impl BatchQueue {
    /// Read the list, skipping blank lines
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, QueueError> {
        let path = path.into();
        let contents = std::fs::read_to_string(&path).map_err(|source| QueueError::Read {
            path: path.clone(),
            source,
        })?;

        let entries = contents
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(SongReference::new)
            .collect();

        Ok(Self { path, entries })
    }

    /// Write `references` as a new list file, replacing any existing one
    pub fn create(
        path: impl Into<PathBuf>,
        references: Vec<SongReference>,
    ) -> Result<Self, QueueError> {
        let queue = Self {
            path: path.into(),
            entries: references,
        };
        queue.persist()?;
        Ok(queue)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn references(&self) -> &[SongReference] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop the first occurrence of `reference`; `false` if it wasn't listed
    pub fn remove(&mut self, reference: &SongReference) -> Result<bool, QueueError> {
        if !self.take_first(reference) {
            return Ok(false);
        }
        self.persist()?;
        Ok(true)
    }

    pub fn append(&mut self, reference: SongReference) -> Result<(), QueueError> {
        self.entries.push(reference);
        self.persist()
    }

    /// Move the first occurrence of `reference` to the end of the list
    pub fn requeue(&mut self, reference: &SongReference) -> Result<(), QueueError> {
        self.take_first(reference);
        self.entries.push(reference.clone());
        self.persist()
    }

    fn take_first(&mut self, reference: &SongReference) -> bool {
        match self.entries.iter().position(|entry| entry == reference) {
            Some(index) => {
                self.entries.remove(index);
                true
            }
            None => false,
        }
    }

    /// Replace the list file atomically with the current entries
    fn persist(&self) -> Result<(), QueueError> {
        let write_error = |source: std::io::Error| QueueError::Write {
            path: self.path.clone(),
            source,
        };

        let directory = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut file = NamedTempFile::new_in(directory).map_err(write_error)?;
        for entry in &self.entries {
            writeln!(file, "{entry}").map_err(write_error)?;
        }
        file.as_file().sync_all().map_err(write_error)?;
        file.persist(&self.path).map_err(|e| write_error(e.error))?;

        debug!(path = %self.path.display(), pending = self.entries.len(), "batch list updated");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn list(contents: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("songs.txt");
        fs::write(&path, contents).unwrap();
        (dir, path)
    }

    fn on_disk(path: &Path) -> Vec<String> {
        fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn load_skips_blank_lines_and_trims() {
        let (_dir, path) = list("first\n\n  second  \n\n\nthird");
        let queue = BatchQueue::load(&path).unwrap();

        let names: Vec<_> = queue.references().iter().map(SongReference::as_str).collect();
        assert_eq!(names, vec!["first", "second", "third"]);
        assert_eq!(queue.len(), 3);
    }

    #[test]
    fn missing_list_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = BatchQueue::load(dir.path().join("nope.txt"));
        assert!(matches!(result, Err(QueueError::Read { .. })));
    }

    #[test]
    fn remove_takes_only_the_first_occurrence() {
        let (_dir, path) = list("a\nb\na\n");
        let mut queue = BatchQueue::load(&path).unwrap();

        assert!(queue.remove(&SongReference::new("a")).unwrap());
        assert_eq!(on_disk(&path), vec!["b", "a"]);

        assert!(!queue.remove(&SongReference::new("zzz")).unwrap());
        assert_eq!(on_disk(&path), vec!["b", "a"]);
    }

    #[test]
    fn requeue_moves_to_the_end_on_disk() {
        let (_dir, path) = list("a\nb\nc\n");
        let mut queue = BatchQueue::load(&path).unwrap();

        queue.requeue(&SongReference::new("a")).unwrap();

        assert_eq!(on_disk(&path), vec!["b", "c", "a"]);
        assert_eq!(BatchQueue::load(&path).unwrap().references(), queue.references());
    }

    #[test]
    fn append_and_create_persist_immediately() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("playlist.txt");

        let mut queue =
            BatchQueue::create(&path, vec![SongReference::new("x"), SongReference::new("y")]).unwrap();
        assert_eq!(on_disk(&path), vec!["x", "y"]);

        queue.append(SongReference::new("z")).unwrap();
        assert_eq!(on_disk(&path), vec!["x", "y", "z"]);
    }

    #[test]
    fn emptied_queue_leaves_an_empty_file() {
        let (_dir, path) = list("only\n");
        let mut queue = BatchQueue::load(&path).unwrap();

        queue.remove(&SongReference::new("only")).unwrap();

        assert!(queue.is_empty());
        assert_eq!(fs::read_to_string(&path).unwrap(), "");
    }
}
