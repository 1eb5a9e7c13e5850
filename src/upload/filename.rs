use lazy_static::lazy_static;
use regex::Regex;
use std::fs::{File, OpenOptions};
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

lazy_static! {
    static ref UNSAFE_FILENAME_CHARS: Regex =
        Regex::new(r"[^A-Za-z0-9_.-]").expect("filename pattern compiles");
}

/// Lower-cased text after the last '.', if any.
pub fn extension_of(filename: &str) -> Option<String> {
    let (_, ext) = filename.rsplit_once('.')?;
    if ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// Reduces a client-supplied name to something safe to join onto the
/// upload directory. May return an empty string.
pub fn secure_filename(filename: &str) -> String {
    let flattened = filename.replace(['/', '\\'], " ");
    let joined = flattened.split_whitespace().collect::<Vec<_>>().join("_");
    let stripped = UNSAFE_FILENAME_CHARS.replace_all(&joined, "");
    stripped
        .trim_matches(|c: char| c == '.' || c == '_')
        .to_string()
}

fn split_stem(filename: &str) -> (&str, &str) {
    match filename.rfind('.') {
        Some(idx) if idx > 0 => filename.split_at(idx),
        _ => (filename, ""),
    }
}

/// Creates `dir/filename`, or `stem_1.ext`, `stem_2.ext`, ... when taken.
/// Creation is exclusive so two concurrent uploads never share a file.
pub(crate) fn create_unique(dir: &Path, filename: &str) -> io::Result<(PathBuf, File)> {
    let (stem, ext) = split_stem(filename);
    let mut candidate = filename.to_string();
    let mut counter: u32 = 1;
    loop {
        let path = dir.join(&candidate);
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => return Ok((path, file)),
            Err(err) if err.kind() == ErrorKind::AlreadyExists => {
                candidate = format!("{}_{}{}", stem, counter, ext);
                counter = counter.checked_add(1).ok_or_else(|| {
                    io::Error::new(ErrorKind::Other, "exhausted duplicate filename suffixes")
                })?;
            }
            Err(err) => return Err(err),
        }
    }
}
