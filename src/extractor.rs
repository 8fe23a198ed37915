// 🔎 Announcement Extractor - Keyword spans + naive product-name recovery
// Heuristic by nature: a capitalized-word run near the keyword, nothing smarter

use std::collections::HashSet;

pub const DEFAULT_WINDOW_CHARS: usize = 150;
pub const DEFAULT_MAX_SNIPPET_CHARS: usize = 300;

/// Longest name the scanner will return, in tokens
const MAX_NAME_TOKENS: usize = 6;

/// Leading words dropped from a capitalized run ("The Vision Pro" → "Vision Pro")
const DETERMINERS: &[&str] = &["The", "A", "An", "Its", "Our", "Their", "This", "These", "New"];

// ============================================================================
// RESULT TYPES
// ============================================================================

/// Outcome of the name heuristic
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameGuess {
    Found(String),
    NotFound,
}

impl NameGuess {
    /// Name, or "" when nothing was found
    pub fn as_str(&self) -> &str {
        match self {
            NameGuess::Found(name) => name,
            NameGuess::NotFound => "",
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, NameGuess::Found(_))
    }
}

/// One keyword occurrence with its context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Announcement {
    /// Keyword as configured (original casing)
    pub matched_keyword: String,
    pub extracted_name: NameGuess,
    pub context_snippet: String,
}

// ============================================================================
// EXTRACTOR
// ============================================================================

pub struct AnnouncementExtractor {
    /// Characters of context on each side of the match start (default: 150)
    pub window_chars: usize,

    /// Upper bound on snippet length in characters (default: 300)
    pub max_snippet_chars: usize,
}

impl AnnouncementExtractor {
    pub fn new(window_chars: usize, max_snippet_chars: usize) -> Self {
        AnnouncementExtractor {
            window_chars,
            max_snippet_chars: max_snippet_chars.max(1),
        }
    }

    /// Every non-overlapping, case-insensitive occurrence of every keyword
    ///
    /// Results follow keyword order, then text order. Identical
    /// (keyword, snippet) pairs are reported once.
    pub fn extract(&self, text: &str, keywords: &[String]) -> Vec<Announcement> {
        let chars: Vec<char> = text.chars().collect();
        let mut announcements = Vec::new();

        if chars.is_empty() {
            return announcements;
        }

        let mut seen: HashSet<(String, String)> = HashSet::new();

        for keyword in keywords {
            let canonical = keyword.trim();
            if canonical.is_empty() {
                continue;
            }

            let needle: Vec<char> = canonical.chars().map(fold).collect();

            for offset in find_occurrences(&chars, &needle) {
                let (start, end) = self.window(&chars, offset, needle.len());
                let snippet = chars[start..end].iter().collect::<String>().trim().to_string();

                if !seen.insert((canonical.to_string(), snippet.clone())) {
                    continue;
                }

                let keyword_end = (offset + needle.len()).min(end);
                let extracted_name = guess_name(&chars[start..offset], &chars[keyword_end..end]);

                announcements.push(Announcement {
                    matched_keyword: canonical.to_string(),
                    extracted_name,
                    context_snippet: snippet,
                });
            }
        }

        announcements
    }

    /// Char range [start, end) around a match, clamped to the text and the snippet bound
    fn window(&self, chars: &[char], offset: usize, len: usize) -> (usize, usize) {
        let n = chars.len();

        // Keyword always fits unless it is longer than the whole bound
        let after = self.window_chars.max(len).min(self.max_snippet_chars);
        let before = self.window_chars.min(self.max_snippet_chars - after);

        let mut start = offset.saturating_sub(before);
        let mut end = (offset + after).min(n);

        // Don't open or close on half a word
        if start > 0 && !chars[start - 1].is_whitespace() {
            if let Some(ws) = chars[start..offset].iter().position(|c| c.is_whitespace()) {
                start += ws + 1;
            }
        }

        let keyword_end = (offset + len).min(end);
        if end < n && !chars[end].is_whitespace() {
            if let Some(ws) = chars[keyword_end..end].iter().rposition(|c| c.is_whitespace()) {
                end = keyword_end + ws;
            }
        }

        (start, end)
    }
}

impl Default for AnnouncementExtractor {
    fn default() -> Self {
        AnnouncementExtractor::new(DEFAULT_WINDOW_CHARS, DEFAULT_MAX_SNIPPET_CHARS)
    }
}

fn fold(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}

/// Char offsets of non-overlapping matches of an already-folded needle
fn find_occurrences(haystack: &[char], needle: &[char]) -> Vec<usize> {
    let mut offsets = Vec::new();
    if needle.is_empty() || needle.len() > haystack.len() {
        return offsets;
    }

    let mut i = 0;
    while i + needle.len() <= haystack.len() {
        let matched = haystack[i..i + needle.len()]
            .iter()
            .zip(needle)
            .all(|(h, n)| fold(*h) == *n);

        if matched {
            offsets.push(i);
            i += needle.len();
        } else {
            i += 1;
        }
    }

    offsets
}

// ============================================================================
// NAME HEURISTIC
// ============================================================================

/// Nearest capitalized run before the keyword, else the first one after it
fn guess_name(before: &[char], after: &[char]) -> NameGuess {
    match backward_run(before).or_else(|| forward_run(after)) {
        Some(name) => NameGuess::Found(name),
        None => NameGuess::NotFound,
    }
}

fn backward_run(before: &[char]) -> Option<String> {
    let text: String = before.iter().collect();
    let mut tokens: Vec<&str> = text.split_whitespace().collect();

    // A fragment glued to the keyword is part of the keyword's word
    if before.last().map_or(false, |c| !c.is_whitespace()) {
        tokens.pop();
    }

    // Nearest run wins; lowercase words in between are skipped
    let mut run: Vec<&str> = Vec::new();
    for token in tokens.iter().rev() {
        if ends_sentence(token) {
            break;
        }

        let closes = !run.is_empty() && (ends_clause(token) || run.len() == MAX_NAME_TOKENS);
        if continues_name(token) && !closes {
            run.push(clean(token));
            continue;
        }

        if let Some(name) = finish_reversed(&run) {
            return Some(name);
        }
        run.clear();

        if continues_name(token) {
            run.push(clean(token));
        }
    }

    finish_reversed(&run)
}

fn finish_reversed(run: &[&str]) -> Option<String> {
    let ordered: Vec<&str> = run.iter().rev().copied().collect();
    finish_run(&ordered)
}

fn forward_run(after: &[char]) -> Option<String> {
    let text: String = after.iter().collect();
    let tokens: Vec<&str> = text.split_whitespace().collect();

    let mut skip = 0;
    if after.first().map_or(false, |c| !c.is_whitespace()) {
        if let Some(tail) = tokens.first() {
            if ends_sentence(tail) {
                return None;
            }
        }
        skip = 1;
    }

    let mut run: Vec<&str> = Vec::new();
    for token in tokens.iter().skip(skip) {
        let joins = if run.is_empty() {
            starts_name(token)
        } else {
            continues_name(token)
        };

        if joins {
            run.push(clean(token));
            if ends_clause(token) || run.len() == MAX_NAME_TOKENS {
                if let Some(name) = finish_run(&run) {
                    return Some(name);
                }
                if ends_sentence(token) {
                    return None;
                }
                run.clear();
            }
            continue;
        }

        if let Some(name) = finish_run(&run) {
            return Some(name);
        }
        run.clear();

        if ends_sentence(token) {
            return None;
        }
    }

    finish_run(&run)
}

/// Drop determiners and leading numbers; a name must start with a capital
fn finish_run(run: &[&str]) -> Option<String> {
    let name: Vec<&str> = run
        .iter()
        .copied()
        .skip_while(|t| DETERMINERS.contains(t) || !starts_name(t))
        .collect();

    if name.is_empty() {
        None
    } else {
        Some(name.join(" "))
    }
}

fn clean(token: &str) -> &str {
    token.trim_matches(|c: char| !c.is_alphanumeric())
}

fn starts_name(token: &str) -> bool {
    clean(token).chars().next().map_or(false, |c| c.is_uppercase())
}

/// Capitalized words and bare numbers ("Surface Pro 9") may extend a run
fn continues_name(token: &str) -> bool {
    clean(token)
        .chars()
        .next()
        .map_or(false, |c| c.is_uppercase() || c.is_ascii_digit())
}

fn trailing(token: &str) -> Option<char> {
    token
        .trim_end_matches(|c: char| matches!(c, '"' | '\'' | ')' | ']' | '\u{201d}' | '\u{2019}'))
        .chars()
        .last()
}

fn ends_sentence(token: &str) -> bool {
    matches!(trailing(token), Some('.' | '!' | '?'))
}

fn ends_clause(token: &str) -> bool {
    matches!(trailing(token), Some('.' | '!' | '?' | ',' | ';' | ':'))
}
