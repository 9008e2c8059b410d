use super::SpellChecker;
use crate::error::{Error, Result};
use std::collections::BTreeSet;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Words the checker flags in `file` that it still flags when shown on their own.
///
/// The first pass lists candidates in context; the second feeds just those
/// candidates back as a plain word list. Anything flagged only because of its
/// surroundings (capitalization rules, compounds) drops out. The result is
/// sorted and free of duplicates, and is always a subset of the first pass.
pub fn validate<C>(checker: &C, file: &Path) -> Result<Vec<String>>
where
    C: SpellChecker + ?Sized,
{
    let candidates = normalized(checker, checker.list_misspelled(file)?);
    tracing::debug!(file = %file.display(), candidates = candidates.len(), "first pass");

    if candidates.is_empty() {
        return Ok(Vec::new());
    }

    let word_list = write_word_list(&candidates)?;
    let flagged = normalized(checker, checker.list_misspelled(word_list.path())?);
    drop(word_list);

    let confirmed: Vec<String> = candidates.intersection(&flagged).cloned().collect();
    tracing::debug!(file = %file.display(), confirmed = confirmed.len(), "second pass");

    Ok(confirmed)
}

fn normalized<C>(checker: &C, raw: Vec<String>) -> BTreeSet<String>
where
    C: SpellChecker + ?Sized,
{
    raw.iter()
        .map(|word| checker.normalize(word))
        .filter(|word| !word.is_empty())
        .collect()
}

/// The candidates, one per line, in a temp file removed when the guard drops.
fn write_word_list(words: &BTreeSet<String>) -> Result<NamedTempFile> {
    let mut file = NamedTempFile::new()
        .map_err(|e| Error::io("Failed to create word list", std::env::temp_dir(), e))?;

    for word in words {
        writeln!(file, "{}", word)
            .map_err(|e| Error::io("Failed to write word list", file.path(), e))?;
    }
    file.flush()
        .map_err(|e| Error::io("Failed to write word list", file.path(), e))?;

    Ok(file)
}
