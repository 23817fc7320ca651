use std::cmp::Ordering;
use std::collections::BTreeMap;

/// A tagged note ready for rendering. `title` still carries its folder
/// segments; the grouper splits them off.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedNote {
    pub title: String,
    pub mtime: f64,
    pub heading: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
struct GroupedNote {
    title: String,
    mtime: f64,
    heading: Option<String>,
}

/// Bucket notes by folder key: everything before the last `/` of the title,
/// empty string for vault-root notes. Input order is kept within a bucket.
fn group_by_folder(notes: &[ResolvedNote]) -> BTreeMap<String, Vec<GroupedNote>> {
    let mut grouped: BTreeMap<String, Vec<GroupedNote>> = BTreeMap::new();

    for note in notes {
        let mut segments: Vec<&str> = note.title.split('/').collect();
        let title = segments.pop().unwrap_or("").to_string();
        let folder = segments.join("/");

        grouped.entry(folder).or_default().push(GroupedNote {
            title,
            mtime: note.mtime,
            heading: note.heading.clone(),
        });
    }

    grouped
}

// Case-insensitive stand-in for locale collation, with a byte-order
// tiebreak so equal-ignoring-case keys still sort deterministically.
fn compare_folders(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

fn render_link(folder: &str, note: &GroupedNote) -> String {
    let path = if folder.is_empty() {
        note.title.clone()
    } else {
        format!("{folder}/{}", note.title)
    };

    match &note.heading {
        Some(heading) => format!("- [[{path}#{heading}|{}#{heading}]]", note.title),
        None => format!("- [[{path}|{}]]", note.title),
    }
}

/// Render one tag's markdown: folder blocks sorted by folder name, notes
/// within a block sorted by mtime ascending (stable, so equal mtimes keep
/// input order). The output starts with a newline, matching the format the
/// note application's users already have in their vaults.
pub fn render_tag(notes: &[ResolvedNote]) -> String {
    let grouped = group_by_folder(notes);

    let mut folders: Vec<(String, Vec<GroupedNote>)> = grouped.into_iter().collect();
    folders.sort_by(|(a, _), (b, _)| compare_folders(a, b));

    let blocks: Vec<String> = folders
        .into_iter()
        .map(|(folder, mut notes)| {
            notes.sort_by(|a, b| a.mtime.partial_cmp(&b.mtime).unwrap_or(Ordering::Equal));
            let list = notes
                .iter()
                .map(|note| render_link(&folder, note))
                .collect::<Vec<_>>()
                .join("\n");

            if folder.is_empty() {
                format!("{list}\n")
            } else {
                format!("## {folder}\n\n{list}\n")
            }
        })
        .collect();

    format!("\n{}", blocks.join("\n"))
}
