//! Opened dependencies
//!
//! A [`Dependency`] is a readable handle on a resolved target, carrying
//! the options it was opened with so text reads decode and translate
//! newlines the way the caller asked.

use crate::error::{MuckError, MuckResult};
use crate::loader::options::{Buffering, DecodeErrors, Encoding, Newline, OpenOptions};
use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read};

/// A dependency opened for reading
pub struct Dependency {
    path: String,
    target: String,
    options: OpenOptions,
    reader: Box<dyn Read + Send>,
}

impl Dependency {
    pub(crate) fn from_file(
        file: File,
        path: String,
        target: String,
        options: OpenOptions,
    ) -> Self {
        let reader: Box<dyn Read + Send> = match options.buffering {
            Buffering::Unbuffered => Box::new(file),
            Buffering::Default | Buffering::Line => Box::new(BufReader::new(file)),
            Buffering::Size(n) => Box::new(BufReader::with_capacity(n, file)),
        };
        Self {
            path,
            target,
            options,
            reader,
        }
    }

    /// Wrap an in-memory reader; used by custom loaders and tests
    pub fn from_reader(
        reader: impl Read + Send + 'static,
        path: impl Into<String>,
        options: OpenOptions,
    ) -> Self {
        let path = path.into();
        Self {
            target: path.clone(),
            path,
            options,
            reader: Box::new(reader),
        }
    }

    /// Path that was actually opened
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Target path that was requested
    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn options(&self) -> &OpenOptions {
        &self.options
    }

    pub fn is_binary(&self) -> bool {
        self.options.binary
    }

    /// Read the remaining raw bytes
    pub fn read_bytes(mut self) -> MuckResult<Vec<u8>> {
        let mut buf = Vec::new();
        self.reader
            .read_to_end(&mut buf)
            .map_err(|e| MuckError::io(format!("reading {}", self.path), e))?;
        Ok(buf)
    }

    /// Read and decode the remaining content as text
    pub fn read_text(self) -> MuckResult<String> {
        if self.options.binary {
            return Err(MuckError::invalid(format!(
                "{} was opened in binary mode; read bytes instead",
                self.path
            )));
        }
        let path = self.path.clone();
        let options = self.options.clone();
        let bytes = self.read_bytes()?;
        let text = decode(&bytes, options.encoding(), options.errors(), &path)?;
        Ok(translate_newlines(text, options.newline))
    }

    /// Read the remaining text split into lines, without terminators
    pub fn read_lines(self) -> MuckResult<Vec<String>> {
        let newline = self.options.newline;
        let text = self.read_text()?;
        Ok(split_lines(&text, newline).map(str::to_string).collect())
    }
}

impl Read for Dependency {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.reader.read(buf)
    }
}

impl fmt::Debug for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dependency")
            .field("path", &self.path)
            .field("target", &self.target)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

fn decode_error(path: &str, encoding: Encoding, offset: usize, byte: u8) -> MuckError {
    MuckError::Decode {
        path: path.to_string(),
        reason: format!(
            "'{}' codec can't decode byte 0x{:02x} in position {}",
            encoding, byte, offset
        ),
    }
}

/// Decode bytes with the given encoding and error policy
pub fn decode(
    bytes: &[u8],
    encoding: Encoding,
    errors: DecodeErrors,
    path: &str,
) -> MuckResult<String> {
    match encoding {
        Encoding::Utf8Sig => {
            let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
            decode_utf8(bytes, errors, path, encoding)
        }
        Encoding::Utf8 => decode_utf8(bytes, errors, path, encoding),
        Encoding::Latin1 => Ok(bytes.iter().map(|&b| char::from(b)).collect()),
        Encoding::Ascii => {
            let mut out = String::with_capacity(bytes.len());
            for (i, &b) in bytes.iter().enumerate() {
                if b.is_ascii() {
                    out.push(char::from(b));
                } else {
                    match errors {
                        DecodeErrors::Strict => return Err(decode_error(path, encoding, i, b)),
                        DecodeErrors::Replace => out.push(char::REPLACEMENT_CHARACTER),
                        DecodeErrors::Ignore => {}
                    }
                }
            }
            Ok(out)
        }
    }
}

fn decode_utf8(
    bytes: &[u8],
    errors: DecodeErrors,
    path: &str,
    encoding: Encoding,
) -> MuckResult<String> {
    match errors {
        DecodeErrors::Strict => match std::str::from_utf8(bytes) {
            Ok(s) => Ok(s.to_string()),
            Err(e) => {
                let offset = e.valid_up_to();
                Err(decode_error(path, encoding, offset, bytes[offset]))
            }
        },
        DecodeErrors::Replace => Ok(String::from_utf8_lossy(bytes).into_owned()),
        DecodeErrors::Ignore => Ok(bytes.utf8_chunks().map(|chunk| chunk.valid()).collect()),
    }
}

/// Apply newline translation for reads
pub fn translate_newlines(text: String, newline: Newline) -> String {
    if newline == Newline::Universal && text.contains('\r') {
        text.replace("\r\n", "\n").replace('\r', "\n")
    } else {
        text
    }
}

/// Split text into lines according to the newline mode
pub fn split_lines(text: &str, newline: Newline) -> impl Iterator<Item = &str> {
    let mut rest = text;
    std::iter::from_fn(move || {
        if rest.is_empty() {
            return None;
        }
        let (end, term_len) = match newline {
            Newline::Universal | Newline::Lf => match rest.find('\n') {
                Some(i) => (i, 1),
                None => (rest.len(), 0),
            },
            Newline::Cr => match rest.find('\r') {
                Some(i) => (i, 1),
                None => (rest.len(), 0),
            },
            Newline::CrLf => match rest.find("\r\n") {
                Some(i) => (i, 2),
                None => (rest.len(), 0),
            },
            Newline::Untranslated => match rest.find(['\r', '\n']) {
                Some(i) if rest[i..].starts_with("\r\n") => (i, 2),
                Some(i) => (i, 1),
                None => (rest.len(), 0),
            },
        };
        let line = &rest[..end];
        rest = &rest[end + term_len..];
        Some(line)
    })
}
