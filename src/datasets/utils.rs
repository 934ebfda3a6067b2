use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use anyhow::{Context, Result};

use crate::error::DataError;

/// Whitespace separated tokens of every non-blank line, with 1-based line numbers.
pub(crate) fn read_tokens<P: AsRef<Path>>(path: P) -> Result<Vec<(usize, Vec<String>)>> {
    let path = path.as_ref();
    let reader = BufReader::new(
        File::open(path).with_context(|| format!("cannot open {}", path.display()))?,
    );
    let mut rows = Vec::new();
    for (i, buf) in reader.lines().enumerate() {
        let line = buf.with_context(|| format!("reading {}", path.display()))?;
        let tokens: Vec<String> = line.split_whitespace().map(str::to_owned).collect();
        if !tokens.is_empty() {
            rows.push((i + 1, tokens));
        }
    }
    Ok(rows)
}

pub(crate) fn parse_token<T: std::str::FromStr>(
    path: &Path,
    line: usize,
    token: &str,
    what: &str,
) -> Result<T, DataError> {
    token
        .parse()
        .map_err(|_| DataError::malformed(path, line, format!("invalid {what}: {token:?}")))
}
