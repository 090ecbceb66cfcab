/// Strips byte-order marks and zero-width spaces that spreadsheet exports
/// leave in header cells, and collapses inner whitespace.
pub(crate) fn normalize_header(value: &str) -> String {
    let cleaned = value.replace(['\u{feff}', '\u{200b}'], "");
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}
