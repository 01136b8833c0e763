//! Chapter-page parsing.
//!
//! A chapter page contains zero or more verse blocks. Each block has three
//! sections: the body (number marker plus verse lines), the word gloss
//! (alternating token/meaning pairs) and the translation. The section
//! selectors are coupled to the upstream site's markup; an upstream layout
//! change means updating them here.

use std::collections::HashMap;

use scraper::{ElementRef, Html, Selector};

use crate::helpers::{is_filler_line, normalize_ws, strip_number_marker, RE_VERSE_NUMBER_MARKER};
use crate::logger::debug;
use crate::types::ParsedVerse;

static VERSE_BLOCK_SELECTOR: &'static str = ".views-row";
static BODY_SELECTOR: &'static str = ".views-field-body .field-content";
static GLOSS_SELECTOR: &'static str = ".views-field-field-htetrans .field-content";
static TRANSLATION_SELECTOR: &'static str = ".views-field-field-explanation .field-content";

/// Parse one chapter page into verse records, in document order.
///
/// A page with no verse blocks (including empty input) yields an empty Vec;
/// whether that means "chapter does not exist" is the caller's call.
pub fn parse_chapter(raw_html: &str) -> Vec<ParsedVerse> {
    let document = Html::parse_document(raw_html);

    let block_sel = Selector::parse(VERSE_BLOCK_SELECTOR).unwrap();
    let body_sel = Selector::parse(BODY_SELECTOR).unwrap();
    let gloss_sel = Selector::parse(GLOSS_SELECTOR).unwrap();
    let trans_sel = Selector::parse(TRANSLATION_SELECTOR).unwrap();

    let mut verses = Vec::new();
    for (i, block) in document.select(&block_sel).enumerate() {
        let verse = extract_verse(&block, &body_sel, &gloss_sel, &trans_sel);
        if verse.number.is_none() {
            debug(&format!("verse block {} has no number marker", i));
        }
        verses.push(verse);
    }

    verses
}

fn extract_verse(
    block: &ElementRef,
    body_sel: &Selector,
    gloss_sel: &Selector,
    trans_sel: &Selector,
) -> ParsedVerse {
    let body_lines = block
        .select(body_sel)
        .next()
        .map(section_lines)
        .unwrap_or_default();

    let number = body_lines
        .iter()
        .find_map(|l| RE_VERSE_NUMBER_MARKER.captures(l).map(|c| c[1].to_string()));

    let text = extract_verse_text(&body_lines);

    let gloss = block
        .select(gloss_sel)
        .next()
        .map(|el| parse_gloss_pairs(&section_text(el)))
        .unwrap_or_default();

    let translation = block
        .select(trans_sel)
        .next()
        .map(|el| normalize_ws(&section_text(el)))
        .unwrap_or_default();

    ParsedVerse { number, text, gloss, translation }
}

/// Text nodes of a section, trimmed, empty nodes dropped. Source markup
/// puts each verse line in its own element, so nodes map to lines.
fn section_lines(el: ElementRef) -> Vec<String> {
    el.text()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_string())
        .collect()
}

fn section_text(el: ElementRef) -> String {
    section_lines(el).join(" ")
}

/// Body lines minus the number marker, bracketed metadata annotations and
/// punctuation-only filler. Line order is source order; the result is a
/// multi-line stanza, not a single collapsed line.
fn extract_verse_text(body_lines: &[String]) -> String {
    let kept: Vec<String> = body_lines
        .iter()
        .filter(|l| !l.starts_with('['))
        .filter(|l| !is_filler_line(l))
        .map(|l| strip_number_marker(l).trim().to_string())
        .collect();

    kept.join("\n").trim().to_string()
}

/// Extract (surface token, meaning) pairs from a gloss section.
///
/// A small state machine over the whitespace token stream: the first token
/// opens a pair, following tokens accumulate into the meaning, a trailing
/// comma closes the pair. Pairs whose surface token is purely
/// Latin-alphabetic are English annotation fragments leaking into the gloss
/// stream and are dropped, as are pairs with no meaning text. Best-effort:
/// ambiguous boundaries may lose a pair, never corrupt verse text.
pub fn parse_gloss_pairs(text: &str) -> HashMap<String, String> {
    let mut pairs = HashMap::new();
    let mut surface: Option<String> = None;
    let mut meaning: Vec<String> = Vec::new();

    fn flush(
        pairs: &mut HashMap<String, String>,
        surface: &mut Option<String>,
        meaning: &mut Vec<String>,
    ) {
        if let Some(token) = surface.take() {
            let joined = meaning.join(" ");
            let trimmed = joined.trim_end_matches('.').trim();
            let latin_noise = token.chars().all(|c| c.is_ascii_alphabetic());
            if !trimmed.is_empty() && !latin_noise {
                pairs.insert(token, trimmed.to_string());
            }
        }
        meaning.clear();
    }

    for raw in text.split_whitespace() {
        let closes_pair = raw.ends_with(',');
        let word = raw.trim_end_matches(',');

        if !word.is_empty() {
            match surface {
                None => surface = Some(word.to_string()),
                Some(_) => meaning.push(word.to_string()),
            }
        }

        if closes_pair {
            flush(&mut pairs, &mut surface, &mut meaning);
        }
    }
    flush(&mut pairs, &mut surface, &mut meaning);

    pairs
}
