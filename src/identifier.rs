//! Package identifier normalization.
//!
//! Package identity comes in two pieces: a short name used as the scaffold
//! directory and the final path segment of the dotted identifier, and the
//! dotted identifier itself (`tld.owner.project`). Both are coerced into
//! shape here; malformed input is repaired, never rejected.

use std::sync::LazyLock;

use regex::Regex;

/// Runs of whitespace or Unicode punctuation, removed entirely when
/// normalizing a name segment.
static SPACE_OR_PUNCTUATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\s\p{P}]+").expect("separator pattern is valid"));

/// Leading segments accepted in a dotted identifier. Anything else falls
/// back to the first entry.
pub const ALLOWED_TLDS: &[&str] = &["com", "org", "net", "cool"];

/// Segment appended when a dotted identifier has fewer than three parts.
const PLACEHOLDER_PART: &str = "temp";

/// A normalized package identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedId {
    /// Single-token short name, safe as a directory name.
    pub short: String,
    /// Dotted identifier with at least three parts; the last part always
    /// equals `short`.
    pub full: String,
}

impl NormalizedId {
    /// The owner segment of the dotted identifier (part 1).
    pub fn owner(&self) -> &str {
        self.full.split('.').nth(1).unwrap_or_default()
    }
}

/// Remove every run of whitespace-or-punctuation characters.
pub fn strip_separators(raw: &str) -> String {
    SPACE_OR_PUNCTUATION.replace_all(raw, "").into_owned()
}

/// Normalize a free-form short name and dotted identifier pair.
///
/// The short name is stripped of separators. The dotted identifier is padded
/// to at least three parts, its leading segment is forced onto the TLD
/// allow-list, interior segments are stripped like the short name, and the
/// trailing segment is overwritten with the freshly computed short name so
/// the two never drift apart. Extra middle segments are preserved.
pub fn normalize(raw_short: &str, raw_full: &str) -> NormalizedId {
    let short = strip_separators(raw_short);

    let mut parts: Vec<String> = raw_full.split('.').map(str::to_string).collect();
    while parts.len() < 3 {
        parts.push(PLACEHOLDER_PART.to_string());
    }

    if !ALLOWED_TLDS.contains(&parts[0].as_str()) {
        parts[0] = ALLOWED_TLDS[0].to_string();
    }

    for part in &mut parts[1..] {
        *part = strip_separators(part);
    }

    let last = parts.len() - 1;
    if parts[last] != short {
        parts[last] = short.clone();
    }

    NormalizedId {
        short,
        full: parts.join("."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_separators_removes_spaces_and_punctuation() {
        assert_eq!(strip_separators("My Cool Thing!"), "MyCoolThing");
        assert_eq!(strip_separators("a-b_c.d"), "abcd");
        assert_eq!(strip_separators("  lots   of\tspace  "), "lotsofspace");
    }

    #[test]
    fn test_strip_separators_is_idempotent() {
        let once = strip_separators("My Cool Thing!");
        assert_eq!(strip_separators(&once), once);
    }

    #[test]
    fn test_normalize_keeps_valid_identifier() {
        let id = normalize("core", "com.srawls1.core");
        assert_eq!(id.short, "core");
        assert_eq!(id.full, "com.srawls1.core");
    }

    #[test]
    fn test_normalize_forces_last_part_to_short_name() {
        let id = normalize("My Cool Thing!", "net.srawls1.old");
        assert_eq!(id.short, "MyCoolThing");
        assert_eq!(id.full, "net.srawls1.MyCoolThing");
    }

    #[test]
    fn test_normalize_pads_short_identifiers_to_three_parts() {
        for input in ["", "single", "two.parts"] {
            let id = normalize("pkg", input);
            assert_eq!(id.full.split('.').count(), 3, "input: {input:?}");
            assert!(id.full.ends_with(".pkg"), "input: {input:?}");
        }
    }

    #[test]
    fn test_normalize_two_part_input_keeps_owner_segment() {
        // "xyz.owner" is missing a TLD, not an owner: the owner segment
        // survives as the middle part.
        let id = normalize("pkg", "xyz.owner");
        assert_eq!(id.full, "com.owner.pkg");
    }

    #[test]
    fn test_normalize_replaces_disallowed_tld() {
        let id = normalize("pkg", "xyz.owner.pkg");
        assert_eq!(id.full, "com.owner.pkg");
    }

    #[test]
    fn test_normalize_accepts_every_allowed_tld() {
        for tld in ALLOWED_TLDS {
            let id = normalize("pkg", &format!("{tld}.owner.pkg"));
            assert_eq!(id.full, format!("{tld}.owner.pkg"));
        }
    }

    #[test]
    fn test_normalize_strips_interior_parts() {
        let id = normalize("pkg", "com.my owner!.pkg");
        assert_eq!(id.full, "com.myowner.pkg");
    }

    #[test]
    fn test_normalize_preserves_extra_middle_segments() {
        let id = normalize("pkg", "com.owner.team.old");
        assert_eq!(id.full, "com.owner.team.pkg");
    }

    #[test]
    fn test_owner_segment_accessor() {
        let id = normalize("pkg", "com.srawls1.pkg");
        assert_eq!(id.owner(), "srawls1");
    }
}
