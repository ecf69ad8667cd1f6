//! Read-only word list, bucketed by word length.
//!
//! Words are compared case-insensitively (lower-cased on load and on lookup);
//! diacritics are kept as they appear in the source. A dictionary that fails to
//! load is fatal: a missing bucket would silently reject every word of that length.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DictionaryError {
    #[error("dictionary source {} does not exist", .path.display())]
    NotFound { path: PathBuf },
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("dictionary source {} contains no words", .path.display())]
    Empty { path: PathBuf },
}

#[derive(Debug, Clone, Default)]
pub struct Dictionary {
    buckets: HashMap<usize, HashSet<String>>,
    word_count: usize,
}

fn normalize(word: &str) -> String {
    word.trim().to_lowercase()
}

/// One word per line; blank lines and `#` comments are skipped.
fn parse_words(content: &str) -> impl Iterator<Item = &str> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
}

impl Dictionary {
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut dictionary = Self::default();
        for word in words {
            dictionary.insert(word.as_ref());
        }
        dictionary
    }

    /// Load from a single word-list file, or from every `*.txt` file in a directory.
    pub fn load(path: &Path) -> Result<Self, DictionaryError> {
        if !path.exists() {
            return Err(DictionaryError::NotFound {
                path: path.to_path_buf(),
            });
        }

        let files = if path.is_dir() {
            list_word_files(path)?
        } else {
            vec![path.to_path_buf()]
        };

        let contents: Vec<String> = files
            .par_iter()
            .map(|file| {
                fs::read_to_string(file).map_err(|source| DictionaryError::Io {
                    path: file.clone(),
                    source,
                })
            })
            .collect::<Result<_, _>>()?;

        let dictionary = Self::from_words(contents.iter().flat_map(|c| parse_words(c)));
        if dictionary.word_count == 0 {
            return Err(DictionaryError::Empty {
                path: path.to_path_buf(),
            });
        }

        tracing::info!(
            path = %path.display(),
            files = files.len(),
            words = dictionary.word_count,
            "loaded dictionary"
        );
        Ok(dictionary)
    }

    fn insert(&mut self, word: &str) {
        let word = normalize(word);
        if word.is_empty() {
            return;
        }
        let length = word.chars().count();
        if self.buckets.entry(length).or_default().insert(word) {
            self.word_count += 1;
        }
    }

    pub fn is_valid(&self, word: &str) -> bool {
        let word = normalize(word);
        self.buckets
            .get(&word.chars().count())
            .map_or(false, |bucket| bucket.contains(&word))
    }

    pub fn word_count(&self) -> usize {
        self.word_count
    }

    /// Number of words per length, ordered by length.
    pub fn bucket_sizes(&self) -> BTreeMap<usize, usize> {
        self.buckets
            .iter()
            .map(|(&length, words)| (length, words.len()))
            .collect()
    }
}

fn list_word_files(dir: &Path) -> Result<Vec<PathBuf>, DictionaryError> {
    let io_error = |source| DictionaryError::Io {
        path: dir.to_path_buf(),
        source,
    };
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_error)? {
        let path = entry.map_err(io_error)?.path();
        if path.is_file() && path.extension().map_or(false, |ext| ext == "txt") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}
