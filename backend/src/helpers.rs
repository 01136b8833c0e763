use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // ৷৷1.1.1৷৷ -- the number marker enclosing a canonical verse number
    pub static ref RE_VERSE_NUMBER_MARKER: Regex = Regex::new(r"৷৷([\d.]+)৷৷").unwrap();

    // Any bare volume.chapter.verse triple, e.g. "1.1.1" in running text.
    // Fallback when a body carries no ৷৷..৷৷ marker.
    pub static ref RE_NUMBER_TRIPLE: Regex = Regex::new(r"(\d+)\.(\d+)\.(\d+)").unwrap();

    static ref RE_MARKER_WITH_WS: Regex = Regex::new(r"\s*৷৷[\d.]+৷৷\s*").unwrap();
    static ref RE_WS_RUN: Regex = Regex::new(r"\s+").unwrap();
}

/// Chapter-end formula of the upstream English renderings. Translations of
/// a chapter's last verse carry it; presentation trims there.
pub static CLOSING_FORMULA_MARKER: &'static str = "Thus ends";

/// Characters that make up punctuation-only filler lines in verse bodies:
/// space, period, comma, danda marks.
pub static FILLER_CHARS: &'static str = " .,।৷";

/// Collapse all whitespace runs (including newlines) to single spaces.
pub fn normalize_ws(text: &str) -> String {
    RE_WS_RUN.replace_all(text.trim(), " ").to_string()
}

/// Remove a ৷৷n.n.n৷৷ number marker and its surrounding whitespace.
pub fn strip_number_marker(line: &str) -> String {
    RE_MARKER_WITH_WS.replace_all(line, "").to_string()
}

/// True for lines with no verse content left once the number marker is gone.
pub fn is_filler_line(line: &str) -> bool {
    strip_number_marker(line)
        .chars()
        .all(|c| FILLER_CHARS.contains(c))
}

/// "{volume}.{chapter}." -- the prefix every canonical number in that
/// chapter must carry.
pub fn canonical_prefix(volume: u32, chapter: u32) -> String {
    format!("{}.{}.", volume, chapter)
}

/// Presentation-side trim of the chapter-end formula. The stored
/// translation keeps the full text.
pub fn trim_closing_formula(text: &str) -> &str {
    match text.find(CLOSING_FORMULA_MARKER) {
        Some(pos) => text[..pos].trim_end(),
        None => text,
    }
}
