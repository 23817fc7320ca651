use std::collections::BTreeMap;

use crate::cache::CacheDocument;

pub const MD_EXTENSION: &str = ".md";

/// One place a tag occurred: the owning file's content hash and, when the
/// cache recorded it, the zero-based source line.
#[derive(Debug, Clone, PartialEq)]
pub struct Occurrence {
    pub hash: String,
    pub line: Option<u64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FileRecord {
    /// Filename with the markdown extension stripped, folders included.
    pub title: String,
    /// Filename as recorded in the cache, relative to the vault root.
    pub filename: String,
    pub mtime: f64,
}

/// Lowercased tag text -> every place it occurred. Duplicates are kept,
/// including repeated occurrences within a single note.
pub type TagIndex = BTreeMap<String, Vec<Occurrence>>;

pub fn build_tag_index(cache: &CacheDocument) -> TagIndex {
    let mut index = TagIndex::new();

    for (hash, entry) in &cache.metadata {
        for occurrence in &entry.tags {
            index
                .entry(occurrence.tag.to_lowercase())
                .or_default()
                .push(Occurrence {
                    hash: hash.clone(),
                    line: occurrence.source_line(),
                });
        }
    }

    index
}

/// Invert the files map into hash -> record. Two files sharing a hash
/// overwrite each other; last write wins (known limitation).
pub fn build_file_records(cache: &CacheDocument) -> BTreeMap<String, FileRecord> {
    let mut records = BTreeMap::new();

    for (filename, info) in &cache.files {
        let title = filename
            .strip_suffix(MD_EXTENSION)
            .unwrap_or(filename)
            .to_string();
        records.insert(
            info.hash.clone(),
            FileRecord {
                title,
                filename: filename.clone(),
                mtime: info.mtime,
            },
        );
    }

    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheDocument;

    fn document(raw: &str) -> CacheDocument {
        serde_json::from_str(raw).unwrap()
    }

    #[test]
    fn test_tags_merge_case_insensitively() {
        let cache = document(
            r##"{
                "metadata": {
                    "h1": { "tags": [{ "tag": "#Foo", "line": 1 }] },
                    "h2": { "tags": [{ "tag": "#foo", "line": 9 }] }
                },
                "files": {}
            }"##,
        );

        let index = build_tag_index(&cache);
        assert_eq!(index.len(), 1);
        assert_eq!(index["#foo"].len(), 2);
    }

    #[test]
    fn test_repeated_occurrences_in_one_note_kept() {
        let cache = document(
            r##"{
                "metadata": {
                    "h1": {
                        "tags": [
                            { "tag": "#x", "line": 1 },
                            { "tag": "#x", "line": 8 }
                        ]
                    }
                },
                "files": {}
            }"##,
        );

        let occurrences = &build_tag_index(&cache)["#x"];
        assert_eq!(occurrences.len(), 2);
        assert_eq!(occurrences[0].line, Some(1));
        assert_eq!(occurrences[1].line, Some(8));
    }

    #[test]
    fn test_file_record_strips_md_extension() {
        let cache = document(
            r##"{
                "metadata": {},
                "files": {
                    "Proj/Alpha.md": { "mtime": 10, "hash": "a" },
                    "raw.txt": { "mtime": 4, "hash": "b" }
                }
            }"##,
        );

        let records = build_file_records(&cache);
        assert_eq!(records["a"].title, "Proj/Alpha");
        assert_eq!(records["a"].filename, "Proj/Alpha.md");
        assert_eq!(records["b"].title, "raw.txt");
    }

    #[test]
    fn test_hash_collision_last_write_wins() {
        let cache = document(
            r##"{
                "metadata": {},
                "files": {
                    "A.md": { "mtime": 1, "hash": "shared" },
                    "B.md": { "mtime": 2, "hash": "shared" }
                }
            }"##,
        );

        let records = build_file_records(&cache);
        assert_eq!(records.len(), 1);
        assert_eq!(records["shared"].title, "B");
    }
}
