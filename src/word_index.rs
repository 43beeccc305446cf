//! Chained hash table holding a dictionary of words.
//!
//! The table has a fixed number of buckets chosen at construction. Each bucket
//! heads a singly linked chain of entries; loading prepends, lookups walk the
//! chain comparing ASCII-case-insensitively.

use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::iter;
use std::path::Path;

use log::{debug, info};
use serde::Deserialize;

use crate::error::{Error, Result};

/// Longest word, in bytes, the index accepts.
pub const MAX_LENGTH: usize = 45;

pub const DEFAULT_BUCKETS: usize = 28;

/// Sums the lowercased bytes of `word` and reduces the sum modulo `buckets`.
///
/// `buckets` must be non-zero.
pub fn hash(word: &str, buckets: usize) -> usize {
    let sum = word
        .bytes()
        .fold(0u64, |acc, b| acc.wrapping_add(b.to_ascii_lowercase() as u64));
    (sum % buckets as u64) as usize
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Uninitialized,
    Loaded,
    Unloaded,
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            State::Uninitialized => "uninitialized",
            State::Loaded => "loaded",
            State::Unloaded => "unloaded",
        };
        f.write_str(name)
    }
}

/// What `load` does with a word that is already in its bucket.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicatePolicy {
    /// Insert it again; `size` counts every copy.
    #[default]
    Keep,
    /// Scan the chain first and drop the repeat.
    Skip,
}

struct Word(String);

impl Word {
    fn copy_from(token: &str, line: usize) -> Result<Word> {
        let len = token.len();
        if len > MAX_LENGTH {
            return Err(Error::OversizedWord {
                line,
                len,
                max: MAX_LENGTH,
            });
        }
        let mut word = String::new();
        word.try_reserve_exact(len)
            .map_err(|_| Error::AllocationFailure { len })?;
        word.push_str(token);
        Ok(Word(word))
    }

    fn matches(&self, other: &str) -> bool {
        self.0.eq_ignore_ascii_case(other)
    }
}

struct Entry {
    word: Word,
    next: Link,
}

type Link = Option<Box<Entry>>;

fn chain(head: &Link) -> impl Iterator<Item = &Entry> {
    iter::successors(head.as_deref(), |entry| entry.next.as_deref())
}

struct Table {
    buckets: Box<[Link]>,
    count: usize,
}

impl Table {
    fn empty(buckets: usize) -> Table {
        Table {
            buckets: iter::repeat_with(|| None).take(buckets).collect(),
            count: 0,
        }
    }

    /// Returns false when the word was dropped as a duplicate.
    fn insert(&mut self, word: Word, duplicates: DuplicatePolicy) -> bool {
        let id = hash(&word.0, self.buckets.len());
        let bucket = &mut self.buckets[id];
        if duplicates == DuplicatePolicy::Skip && chain(bucket).any(|e| e.word.matches(&word.0)) {
            return false;
        }
        let next = bucket.take();
        *bucket = Some(Box::new(Entry { word, next }));
        self.count += 1;
        true
    }

    fn contains(&self, word: &str) -> bool {
        chain(&self.buckets[hash(word, self.buckets.len())]).any(|e| e.word.matches(word))
    }

    fn longest_chain(&self) -> usize {
        self.buckets
            .iter()
            .map(|head| chain(head).count())
            .max()
            .unwrap_or(0)
    }

    // Walks each chain front to back, detaching the tail before the node is
    // dropped, so a long chain never drops recursively.
    fn clear(&mut self) {
        for bucket in self.buckets.iter_mut() {
            let mut cursor = bucket.take();
            while let Some(mut entry) = cursor {
                cursor = entry.next.take();
            }
        }
        self.count = 0;
    }
}

impl Drop for Table {
    fn drop(&mut self) {
        self.clear();
    }
}

pub struct WordIndex {
    table: Table,
    state: State,
    duplicates: DuplicatePolicy,
}

impl Default for WordIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl WordIndex {
    pub fn new() -> Self {
        Self {
            table: Table::empty(DEFAULT_BUCKETS),
            state: State::Uninitialized,
            duplicates: DuplicatePolicy::default(),
        }
    }

    pub fn with_buckets(buckets: usize) -> Result<Self> {
        if buckets == 0 {
            return Err(Error::InvalidBucketCount);
        }
        Ok(Self {
            table: Table::empty(buckets),
            ..Self::new()
        })
    }

    pub fn with_duplicates(mut self, duplicates: DuplicatePolicy) -> Self {
        self.duplicates = duplicates;
        self
    }

    pub fn hash(&self, word: &str) -> usize {
        hash(word, self.bucket_count())
    }

    /// Loads every whitespace-separated word in the file at `path`.
    ///
    /// Either the whole file is loaded or the index is left untouched.
    pub fn load<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.ensure_not_loaded()?;
        let path = path.as_ref();
        let name = path.display().to_string();
        let file = File::open(path).map_err(|source| Error::SourceUnavailable {
            name: name.clone(),
            source,
        })?;
        self.load_named(BufReader::new(file), &name)
    }

    pub fn load_from<R: BufRead>(&mut self, reader: R) -> Result<()> {
        self.ensure_not_loaded()?;
        self.load_named(reader, "<reader>")
    }

    fn load_named<R: BufRead>(&mut self, reader: R, name: &str) -> Result<()> {
        let mut staged = Table::empty(self.bucket_count());
        for (idx, line) in reader.lines().enumerate() {
            let line = line.map_err(|source| Error::SourceUnavailable {
                name: name.to_string(),
                source,
            })?;
            for token in line.split_whitespace() {
                let word = Word::copy_from(token, idx + 1)?;
                if !staged.insert(word, self.duplicates) {
                    debug!("skipped duplicate word {token:?}");
                }
            }
        }

        self.table = staged;
        self.state = State::Loaded;
        info!("loaded {} words from {name}", self.size());
        debug!(
            "{} buckets, load factor {:.2}, longest chain {}",
            self.bucket_count(),
            self.load_factor(),
            self.longest_chain()
        );
        Ok(())
    }

    pub fn check(&self, word: &str) -> Result<bool> {
        match self.state {
            State::Loaded => Ok(self.table.contains(word)),
            state => Err(Error::InvalidState {
                operation: "check",
                state,
            }),
        }
    }

    /// Number of loaded words; zero until a load succeeds and after `unload`.
    pub fn size(&self) -> usize {
        self.table.count
    }

    /// Releases every entry. The index may be loaded again afterwards.
    pub fn unload(&mut self) -> Result<()> {
        if self.state != State::Loaded {
            return Err(Error::InvalidState {
                operation: "unload",
                state: self.state,
            });
        }
        self.table.clear();
        self.state = State::Unloaded;
        debug!("unloaded word index");
        Ok(())
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn bucket_count(&self) -> usize {
        self.table.buckets.len()
    }

    pub fn load_factor(&self) -> f64 {
        self.size() as f64 / self.bucket_count() as f64
    }

    pub fn longest_chain(&self) -> usize {
        self.table.longest_chain()
    }

    fn ensure_not_loaded(&self) -> Result<()> {
        if self.state == State::Loaded {
            return Err(Error::InvalidState {
                operation: "load",
                state: self.state,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn loaded(words: &str) -> WordIndex {
        let mut index = WordIndex::new();
        index.load_from(words.as_bytes()).unwrap();
        index
    }

    #[test]
    fn hash_ignores_case() {
        assert_eq!(hash("cat", 28), hash("CAT", 28));
        assert_eq!(hash("cat", 28), hash("Cat", 28));
        assert_eq!(hash("Apple", 28), hash("aPPLE", 28));
    }

    #[test]
    fn hash_sums_lowercase_bytes() {
        // 'a' + 'b' = 97 + 98 = 195, 195 % 28 = 27
        assert_eq!(hash("AB", 28), 27);
        assert_eq!(hash("", 28), 0);
        assert!(hash("zzzzzzzzzzzzzzzzzzzz", 7) < 7);
    }

    #[test]
    fn load_then_check() {
        let mut index = loaded("apple\nbanana\ncherry\n");
        assert_eq!(index.state(), State::Loaded);
        assert_eq!(index.size(), 3);
        assert!(index.check("APPLE").unwrap());
        assert!(index.check("Banana").unwrap());
        assert!(!index.check("grape").unwrap());

        index.unload().unwrap();
        assert_eq!(index.size(), 0);
        assert!(matches!(
            index.check("apple"),
            Err(Error::InvalidState {
                state: State::Unloaded,
                ..
            })
        ));
    }

    #[test]
    fn preserves_case_of_loaded_word() {
        let index = loaded("Apple");
        assert!(index.check("aPPLE").unwrap());
        assert!(index.check("apple").unwrap());
    }

    #[test]
    fn whitespace_delimited_tokens() {
        let index = loaded("  one two\tthree\n\n\nfour  \n");
        assert_eq!(index.size(), 4);
        assert!(index.check("three").unwrap());
    }

    #[test]
    fn empty_source() {
        let index = loaded("");
        assert_eq!(index.size(), 0);
        assert!(!index.check("anything").unwrap());
    }

    #[test]
    fn load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "apple\nbanana\ncherry").unwrap();

        let mut index = WordIndex::new();
        index.load(file.path()).unwrap();
        assert_eq!(index.size(), 3);
        assert!(index.check("cherry").unwrap());
    }

    #[test]
    fn missing_source() {
        let dir = tempfile::tempdir().unwrap();
        let mut index = WordIndex::new();
        let err = index.load(dir.path().join("missing.txt")).unwrap_err();
        assert!(matches!(err, Error::SourceUnavailable { .. }));
        assert_eq!(index.size(), 0);
        assert_eq!(index.state(), State::Uninitialized);
    }

    #[test]
    fn duplicates_kept_by_default() {
        let index = loaded("apple\napple\nAPPLE\n");
        assert_eq!(index.size(), 3);
        assert!(index.check("apple").unwrap());
    }

    #[test]
    fn duplicates_skipped() {
        let mut index = WordIndex::new().with_duplicates(DuplicatePolicy::Skip);
        index.load_from("apple\nApple\nbanana\napple\n".as_bytes()).unwrap();
        assert_eq!(index.size(), 2);
        assert!(index.check("APPLE").unwrap());
    }

    #[test]
    fn longest_word_accepted() {
        let word = "p".repeat(MAX_LENGTH);
        let index = loaded(&word);
        assert!(index.check(&word.to_uppercase()).unwrap());
    }

    #[test]
    fn oversized_word_leaves_index_untouched() {
        let source = format!("apple\nbanana {}\ncherry\n", "x".repeat(MAX_LENGTH + 1));
        let mut index = WordIndex::new();
        let err = index.load_from(source.as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            Error::OversizedWord {
                line: 2,
                len: 46,
                max: MAX_LENGTH
            }
        ));
        assert_eq!(index.size(), 0);
        assert_eq!(index.state(), State::Uninitialized);
        assert!(index.check("apple").is_err());

        index.load_from("apple\n".as_bytes()).unwrap();
        assert_eq!(index.size(), 1);
    }

    #[test]
    fn entries_live_in_their_hash_bucket() {
        let index = loaded("apple banana cherry date elderberry fig grape Kiwi LEMON");
        let mut total = 0;
        for (i, head) in index.table.buckets.iter().enumerate() {
            for entry in chain(head) {
                assert_eq!(index.hash(&entry.word.0), i);
                total += 1;
            }
        }
        assert_eq!(total, index.size());
    }

    #[test]
    fn chain_is_most_recent_first() {
        let mut index = WordIndex::with_buckets(1).unwrap();
        index.load_from("first second third".as_bytes()).unwrap();
        let words = chain(&index.table.buckets[0])
            .map(|e| e.word.0.as_str())
            .collect::<Vec<_>>();
        assert_eq!(words, vec!["third", "second", "first"]);
        assert_eq!(index.longest_chain(), 3);
    }

    #[test]
    fn zero_buckets_rejected() {
        assert!(matches!(
            WordIndex::with_buckets(0),
            Err(Error::InvalidBucketCount)
        ));
    }

    #[test]
    fn misuse_is_reported() {
        let mut index = WordIndex::new();
        assert!(matches!(
            index.check("apple"),
            Err(Error::InvalidState {
                operation: "check",
                state: State::Uninitialized
            })
        ));
        assert!(matches!(
            index.unload(),
            Err(Error::InvalidState {
                operation: "unload",
                ..
            })
        ));

        index.load_from("apple".as_bytes()).unwrap();
        assert!(matches!(
            index.load_from("banana".as_bytes()),
            Err(Error::InvalidState {
                operation: "load",
                state: State::Loaded
            })
        ));
        assert_eq!(index.size(), 1);

        index.unload().unwrap();
        assert!(index.unload().is_err());
    }

    #[test]
    fn reload_after_unload() {
        let mut index = loaded("apple");
        index.unload().unwrap();
        index.load_from("banana\ncherry".as_bytes()).unwrap();
        assert_eq!(index.size(), 2);
        assert!(!index.check("apple").unwrap());
        assert!(index.check("cherry").unwrap());
    }

    #[test]
    fn long_chain_teardown() {
        let words = (0..200_000).map(|i| format!("w{i}\n")).collect::<String>();
        let mut index = WordIndex::with_buckets(1).unwrap();
        index.load_from(words.as_bytes()).unwrap();
        assert_eq!(index.longest_chain(), 200_000);
        index.unload().unwrap();

        index.load_from(words.as_bytes()).unwrap();
        drop(index);
    }

    #[test]
    fn load_factor() {
        let mut index = WordIndex::with_buckets(4).unwrap();
        assert_eq!(index.load_factor(), 0.0);
        index.load_from("a b c d e f".as_bytes()).unwrap();
        assert_eq!(index.load_factor(), 1.5);
    }
}
