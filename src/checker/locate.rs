use crate::error::{Error, Result};
use crate::LineLocations;
use regex::RegexSet;
use std::fs;
use std::path::Path;

/// Find the 1-based lines on which each word appears as a whole word.
///
/// A match needs a non-letter (or the line edge) on both sides, so `cat`
/// is found in `the cat sat` but not in `category`. Only ASCII letters count
/// as word characters. Words that never appear are left out.
pub fn locate(content: &str, words: &[String]) -> Result<LineLocations> {
    let mut locations = LineLocations::new();
    if words.is_empty() {
        return Ok(locations);
    }

    let patterns = words
        .iter()
        .map(|word| format!("(?:^|[^A-Za-z]){}(?:[^A-Za-z]|$)", regex::escape(word)));
    let set = RegexSet::new(patterns)?;

    for (index, line) in content.lines().enumerate() {
        for matched in set.matches(line).iter() {
            locations
                .entry(words[matched].clone())
                .or_default()
                .push(index + 1);
        }
    }

    Ok(locations)
}

pub fn locate_file(path: &Path, words: &[String]) -> Result<LineLocations> {
    let bytes = fs::read(path).map_err(|e| Error::io("Failed to read file", path, e))?;
    locate(&String::from_utf8_lossy(&bytes), words)
}
