use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::Semaphore;

use crate::cache;
use crate::error::{Error, Result};
use crate::heading;
use crate::index::{self, FileRecord, Occurrence, MD_EXTENSION};
use crate::render::{self, ResolvedNote};

/// Per-run settings parsed from the command line.
#[derive(Debug, Clone)]
pub struct Options {
    pub vault: String,
    pub tag_folder: String,
    pub minimum: usize,
    pub headings: bool,
}

// Both bounds cap simultaneously open file handles, nothing else: output is
// identical under any interleaving because every list is sorted before
// rendering.
const MAX_CONCURRENT_TAGS: usize = 2;
const MAX_CONCURRENT_READS: usize = 5;

fn resolve_vault_path(raw: &str) -> PathBuf {
    let expanded = shellexpand::tilde(raw).to_string();
    let path = PathBuf::from(expanded);
    path.canonicalize().unwrap_or(path)
}

pub async fn run(options: &Options) -> Result<()> {
    let vault = resolve_vault_path(&options.vault);

    let cache_path = cache::locate(&vault)?;
    log::info!("reading cache from {}", cache_path.display());
    let document = cache::load(&cache_path)?;

    let tags = index::build_tag_index(&document);
    let records = Arc::new(index::build_file_records(&document));
    log::info!(
        "{} distinct tags across {} indexed files",
        tags.len(),
        document.files.len()
    );

    let tag_dir = vault.join(&options.tag_folder);
    tokio::fs::create_dir_all(&tag_dir)
        .await
        .map_err(|source| Error::CreateDir {
            path: tag_dir.clone(),
            source,
        })?;

    let tag_limit = Arc::new(Semaphore::new(MAX_CONCURRENT_TAGS));
    let read_limit = Arc::new(Semaphore::new(MAX_CONCURRENT_READS));

    let mut tasks = Vec::new();
    for (tag, occurrences) in tags {
        tasks.push(tokio::spawn(process_tag(TagJob {
            tag,
            occurrences,
            vault: vault.clone(),
            tag_dir: tag_dir.clone(),
            records: Arc::clone(&records),
            minimum: options.minimum,
            headings: options.headings,
            tag_limit: Arc::clone(&tag_limit),
            read_limit: Arc::clone(&read_limit),
        })));
    }

    for task in tasks {
        task.await??;
    }

    Ok(())
}

struct TagJob {
    tag: String,
    occurrences: Vec<Occurrence>,
    vault: PathBuf,
    tag_dir: PathBuf,
    records: Arc<BTreeMap<String, FileRecord>>,
    minimum: usize,
    headings: bool,
    tag_limit: Arc<Semaphore>,
    read_limit: Arc<Semaphore>,
}

async fn process_tag(job: TagJob) -> Result<()> {
    let _permit = job.tag_limit.acquire().await?;

    // Occurrences whose hash has no file record are dropped.
    let tagged: Vec<(FileRecord, Option<u64>)> = job
        .occurrences
        .iter()
        .filter_map(|occurrence| {
            job.records
                .get(&occurrence.hash)
                .map(|record| (record.clone(), occurrence.line))
        })
        .collect();

    if tagged.len() < job.minimum {
        log::debug!(
            "skipping {}: {} tagged notes, minimum is {}",
            job.tag,
            tagged.len(),
            job.minimum
        );
        return Ok(());
    }

    let notes = if job.headings {
        resolve_with_headings(&job.vault, &tagged, &job.read_limit).await?
    } else {
        tagged
            .iter()
            .map(|(record, _)| ResolvedNote {
                title: record.title.clone(),
                mtime: record.mtime,
                heading: None,
            })
            .collect()
    };

    let contents = render::render_tag(&notes);
    let name = job.tag.strip_prefix('#').unwrap_or(&job.tag);
    let path = job.tag_dir.join(format!("{name}{MD_EXTENSION}"));
    tokio::fs::write(&path, contents)
        .await
        .map_err(|source| Error::WriteTag {
            path: path.clone(),
            source,
        })?;
    log::info!("wrote {} ({} notes)", path.display(), notes.len());

    Ok(())
}

/// Read each distinct tagged note once, with at most `read_limit` files open
/// at a time, then resolve a heading for every occurrence that carried a
/// source line.
async fn resolve_with_headings(
    vault: &Path,
    tagged: &[(FileRecord, Option<u64>)],
    read_limit: &Arc<Semaphore>,
) -> Result<Vec<ResolvedNote>> {
    let mut distinct: Vec<String> = tagged
        .iter()
        .map(|(record, _)| record.filename.clone())
        .collect();
    distinct.sort();
    distinct.dedup();

    let mut reads = Vec::new();
    for filename in distinct {
        let path = vault.join(&filename);
        let limit = Arc::clone(read_limit);
        reads.push(tokio::spawn(async move {
            let _permit = limit.acquire_owned().await?;
            let text = tokio::fs::read_to_string(&path)
                .await
                .map_err(|source| Error::NoteRead {
                    path: path.clone(),
                    source,
                })?;
            Ok::<(String, String), Error>((filename, text))
        }));
    }

    let mut contents: BTreeMap<String, String> = BTreeMap::new();
    for read in reads {
        let (filename, text) = read.await??;
        contents.insert(filename, text);
    }

    Ok(tagged
        .iter()
        .map(|(record, line)| {
            let heading = line.and_then(|line| {
                contents
                    .get(&record.filename)
                    .and_then(|text| heading::nearest_heading(text, line as usize))
            });
            ResolvedNote {
                title: record.title.clone(),
                mtime: record.mtime,
                heading,
            }
        })
        .collect())
}
