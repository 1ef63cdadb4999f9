//! Holder tag validation and sorting-filter matching.
//!
//! Tags are short strings attached to a holder and read by sorting
//! segments. The character set is restricted to alphanumerics, commas and
//! spaces so tags survive being round-tripped through config files and
//! sorter filter lists.

/// Whether a tag uses only the permitted character set and is non-empty.
pub fn is_valid_tag(tag: &str) -> bool {
    !tag.is_empty()
        && tag
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == ',' || c == ' ')
}

/// Whether any held tag appears in the filter list.
pub fn tags_overlap<'a, H, F>(held: H, filter: F) -> bool
where
    H: IntoIterator<Item = &'a str>,
    F: IntoIterator<Item = &'a str>,
{
    let filter: Vec<&str> = filter.into_iter().collect();
    if filter.is_empty() {
        return false;
    }
    held.into_iter().any(|tag| filter.contains(&tag))
}
