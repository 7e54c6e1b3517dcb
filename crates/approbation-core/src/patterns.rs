//! Pattern library for spec filenames and acceptance criteria codes
//!
//! Three patterns drive every check:
//!
//! - the spec filename: `0001-EXMP-example_name.md`, optionally with an `-NP`
//!   marker after the sequence number (`0011-NP-CLIE-client.md`)
//! - the spec prefix: the `NNNN[-NP]-XXXX` part of a filename
//! - the AC code: a prefix followed by a 3-digit criterion number
//!   (`0001-EXMP-001`), matched anywhere in arbitrary text

use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

/// Matches a complete spec filename and captures its elements.
static SPEC_FILENAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<sequence>[0-9]{4}(?P<np>-NP)?)-(?P<code>[A-Z]{4})-(?P<slug>[a-z_]+)")
        .expect("spec filename regex is valid")
});

/// Matches the sequence number and 4-letter code at the start of a filename.
static SPEC_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<prefix>[0-9]{4}(?:-NP)?-[A-Z]{4})").expect("spec prefix regex is valid")
});

/// Matches any AC code in text.
static AC_CODE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?P<prefix>(?P<sequence>[0-9]{4})(?P<np>-NP)?-(?P<code>[A-Z]{4}))-(?P<number>[0-9]{3})",
    )
    .expect("AC code regex is valid")
});

/// The elements of a valid spec filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecFilename<'a> {
    /// Sequence number including any `-NP` marker, e.g. `0011-NP`
    pub sequence: &'a str,
    /// Whether the filename carries the `-NP` marker
    pub non_protocol: bool,
    /// The 4-letter code, e.g. `CLIE`
    pub code: &'a str,
    /// The lowercase descriptive part after the code
    pub slug: &'a str,
}

impl SpecFilename<'_> {
    /// The 4-digit sequence number without the `-NP` marker
    pub fn number(&self) -> u32 {
        self.sequence[..4].parse().unwrap_or(0)
    }

    /// The prefix shared by every AC in this spec, e.g. `0011-NP-CLIE`
    pub fn prefix(&self) -> String {
        format!("{}-{}", self.sequence, self.code)
    }
}

/// Parse a file name (not a path) against the spec filename pattern.
pub fn parse_spec_filename(file_name: &str) -> Option<SpecFilename<'_>> {
    let caps = SPEC_FILENAME.captures(file_name)?;
    Some(SpecFilename {
        sequence: caps.name("sequence")?.as_str(),
        non_protocol: caps.name("np").is_some(),
        code: caps.name("code")?.as_str(),
        slug: caps.name("slug")?.as_str(),
    })
}

/// Extract the `NNNN[-NP]-XXXX` prefix from the start of a file name or code.
pub fn spec_prefix(text: &str) -> Option<&str> {
    SPEC_PREFIX
        .captures(text)
        .and_then(|caps| caps.name("prefix"))
        .map(|m| m.as_str())
}

/// Build the regex that finds one spec's own AC codes (`<prefix>-NNN`).
pub fn criteria_regex(prefix: &str) -> Regex {
    Regex::new(&format!(r"{}-[0-9]{{3}}", regex::escape(prefix)))
        .expect("escaped prefix always forms a valid regex")
}

/// Every occurrence of `<prefix>-NNN` in `content`, in order, duplicates kept.
pub fn find_criteria<'c>(prefix: &str, content: &'c str) -> Vec<&'c str> {
    criteria_regex(prefix)
        .find_iter(content)
        .map(|m| m.as_str())
        .collect()
}

/// Every AC-code-shaped substring in `content`, in order, duplicates kept.
pub fn find_ac_codes(content: &str) -> impl Iterator<Item = &str> {
    AC_CODE.find_iter(content).map(|m| m.as_str())
}

pub(crate) fn ac_code_captures(text: &str) -> Option<regex::Captures<'_>> {
    AC_CODE.captures(text)
}

/// README files are never specs and are never scanned for codes.
pub fn is_readme(path: &Path) -> bool {
    path.file_name()
        .map(|name| name.to_string_lossy().to_lowercase().contains("readme"))
        .unwrap_or(false)
}

/// The base name of a path as a string, or the whole path if it has none.
pub fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
