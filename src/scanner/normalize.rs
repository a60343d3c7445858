//! Canonical name derivation.
//!
//! A canonical name is a file's base name with duplicate-marker suffixes
//! removed and case folded, e.g. `Document copy (2).TXT` → `document.txt`.
//!
//! The stem is split from the extension at the last `.`, then the strip
//! rules below are applied in order, repeatedly, until a full pass changes
//! nothing. Digits and separating whitespace are ASCII only. Every rule is anchored at the end of the stem, so interior
//! digits (`file2023.txt`) and words that merely contain `copy`
//! (`copywriter.txt`) are left alone.
//!
//! | Rule      | Matches                        |
//! |-----------|--------------------------------|
//! | copy      | `_copy`, ` copy`, `-copy` (any case) |
//! | paren     | `(1)`, ` (12)`                 |
//! | underscore| `_1`, ` _2`                    |
//! | hyphen    | `-1`, ` -2`                    |
//! | space     | ` 1`                           |

use std::sync::LazyLock;

use regex::Regex;

static STRIP_RULES: LazyLock<[Regex; 5]> = LazyLock::new(|| {
    [
        compile(r"(?i)(?:_|(?-u:\s)|-)copy$"),
        compile(r"(?-u:\s)*\([0-9]+\)$"),
        compile(r"(?-u:\s)*_[0-9]+$"),
        compile(r"(?-u:\s)*-[0-9]+$"),
        compile(r"(?-u:\s)+[0-9]+$"),
    ]
});

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("built-in duplicate-marker pattern must compile")
}

/// Split a base name into `(stem, extension)` at the last `.`.
///
/// The extension is returned without its dot; `None` means the name has no
/// dot at all, `Some("")` that it ends with one.
#[must_use]
pub fn split_extension(base_name: &str) -> (&str, Option<&str>) {
    match base_name.rfind('.') {
        Some(idx) => (&base_name[..idx], Some(&base_name[idx + 1..])),
        None => (base_name, None),
    }
}

/// Strip duplicate markers from a stem until it stops changing.
fn strip_markers(stem: &str) -> String {
    let mut current = stem.trim().to_string();

    loop {
        let mut next = current.clone();
        for rule in STRIP_RULES.iter() {
            next = rule.replace(&next, "").trim().to_string();
        }
        if next == current {
            return current;
        }
        current = next;
    }
}

/// Map a file's base name to its canonical form.
///
/// Total function: any input yields a name, possibly with an empty stem
/// (`(1).txt` → `.txt`).
///
/// # Example
///
/// ```
/// use halcyon::scanner::canonical_name;
///
/// assert_eq!(canonical_name("Document COPY.TXT"), "document.txt");
/// assert_eq!(canonical_name("photo_copy_1.jpg"), "photo.jpg");
/// assert_eq!(canonical_name("file2023.txt"), "file2023.txt");
/// ```
#[must_use]
pub fn canonical_name(base_name: &str) -> String {
    let (stem, extension) = split_extension(base_name);
    let stem = strip_markers(stem).to_lowercase();

    match extension {
        Some(extension) => format!("{}.{}", stem, extension.to_lowercase()),
        None => stem,
    }
}
