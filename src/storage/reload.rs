//! Change detection for the data files
//!
//! Used by `serve --reload`: the server polls the watcher and reloads every
//! repository when a data file's modification time moves.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::SystemTime;

use super::file_io::modified_time;

/// Remembers the last seen modification time of a set of files
#[derive(Debug)]
pub struct DataFileWatcher {
    seen: HashMap<PathBuf, Option<SystemTime>>,
}

impl DataFileWatcher {
    /// Start watching, taking the current state as the baseline
    pub fn new(files: Vec<PathBuf>) -> Self {
        let seen = files
            .into_iter()
            .map(|path| {
                let stamp = modified_time(&path);
                (path, stamp)
            })
            .collect();
        Self { seen }
    }

    /// Files whose modification time changed since the last poll
    pub fn poll(&mut self) -> Vec<PathBuf> {
        let mut changed = Vec::new();
        for (path, last) in self.seen.iter_mut() {
            let current = modified_time(path);
            if current != *last {
                *last = current;
                changed.push(path.clone());
            }
        }
        changed.sort();
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;

    #[test]
    fn test_detects_new_and_modified_files() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("users.json");

        let mut watcher = DataFileWatcher::new(vec![path.clone()]);
        assert!(watcher.poll().is_empty());

        std::fs::write(&path, "{}").unwrap();
        assert_eq!(watcher.poll(), vec![path.clone()]);
        assert!(watcher.poll().is_empty());

        let later = SystemTime::now() + Duration::from_secs(5);
        let file = std::fs::File::options().write(true).open(&path).unwrap();
        file.set_modified(later).unwrap();
        assert_eq!(watcher.poll(), vec![path]);
    }
}
