//! Built-in loaders
//!
//! | Extension | Result | Open defaults |
//! |-----------|--------|---------------|
//! | `.csv` | rows of strings | `newline = ""` |
//! | `.json` | one document | `encoding = null` |
//! | `.jsonl` | one document per line | `encoding = null` |
//! | `.jsons` | whitespace-separated documents | `encoding = null` |
//! | `.txt` | the open stream | all open options at their defaults |

use crate::error::{MuckError, MuckResult};
use crate::loader::options::{OpenOptionSet, ParserOptions};
use crate::loader::registry::Loaded;
use crate::loader::stream::Dependency;
use serde_json::{json, Value};

/// Extensions that may be re-registered to override the built-in loader
pub const BUILTIN_EXTS: [&str; 5] = [".csv", ".json", ".jsonl", ".jsons", ".txt"];

pub fn is_builtin_ext(ext: &str) -> bool {
    BUILTIN_EXTS.contains(&ext)
}

/// Signature shared by the built-in parse functions
pub(crate) type BuiltinLoader = fn(Dependency, &ParserOptions) -> MuckResult<Loaded>;

/// The built-in loaders with the open defaults each is registered with
pub(crate) fn builtin_loaders() -> [(&'static str, BuiltinLoader, OpenOptionSet); 5] {
    let json_defaults = || OpenOptionSet::trusted([("encoding", Value::Null)]);
    [
        (
            ".csv",
            load_csv as BuiltinLoader,
            OpenOptionSet::trusted([("newline", json!(""))]),
        ),
        (".json", load_json as BuiltinLoader, json_defaults()),
        (".jsonl", load_jsonl as BuiltinLoader, json_defaults()),
        (".jsons", load_jsons as BuiltinLoader, json_defaults()),
        (
            ".txt",
            load_txt as BuiltinLoader,
            OpenOptionSet::trusted([
                ("binary", json!(false)),
                ("buffering", json!(-1)),
                ("encoding", Value::Null),
                ("errors", Value::Null),
                ("newline", Value::Null),
            ]),
        ),
    ]
}

fn reject_options(loader: &str, options: &ParserOptions) -> MuckResult<()> {
    match options.keys().next() {
        Some(key) => Err(MuckError::ParserOption {
            loader: loader.to_string(),
            key: key.to_string(),
            reason: "unexpected keyword argument".to_string(),
        }),
        None => Ok(()),
    }
}

fn parse_error(dep_path: &str, reason: impl std::fmt::Display) -> MuckError {
    MuckError::Parse {
        path: dep_path.to_string(),
        reason: reason.to_string(),
    }
}

/// Read a dependency as text, decoding binary handles as strict UTF-8
fn content(dep: Dependency) -> MuckResult<(String, String)> {
    let path = dep.path().to_string();
    if dep.is_binary() {
        let bytes = dep.read_bytes()?;
        let text = String::from_utf8(bytes).map_err(|e| parse_error(&path, e))?;
        Ok((path, text))
    } else {
        Ok((path.clone(), dep.read_text()?))
    }
}

/// `.txt`: the open stream itself
pub fn load_txt(dep: Dependency, options: &ParserOptions) -> MuckResult<Loaded> {
    reject_options("txt", options)?;
    Ok(Loaded::Stream(dep))
}

/// `.json`: a single document
pub fn load_json(dep: Dependency, options: &ParserOptions) -> MuckResult<Loaded> {
    reject_options("json", options)?;
    let (path, text) = content(dep)?;
    let value = serde_json::from_str(&text).map_err(|e| parse_error(&path, e))?;
    Ok(Loaded::Json(value))
}

/// `.jsonl`: one document per line; blank lines are skipped
pub fn load_jsonl(dep: Dependency, options: &ParserOptions) -> MuckResult<Loaded> {
    reject_options("jsonl", options)?;
    let (path, text) = content(dep)?;
    let mut docs = Vec::new();
    for (i, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let doc = serde_json::from_str(line)
            .map_err(|e| parse_error(&path, format!("line {}: {}", i + 1, e)))?;
        docs.push(doc);
    }
    Ok(Loaded::Documents(docs))
}

/// `.jsons`: a stream of documents separated by whitespace
pub fn load_jsons(dep: Dependency, options: &ParserOptions) -> MuckResult<Loaded> {
    reject_options("jsons", options)?;
    let (path, text) = content(dep)?;
    let docs = serde_json::Deserializer::from_str(&text)
        .into_iter::<Value>()
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| parse_error(&path, e))?;
    Ok(Loaded::Documents(docs))
}

/// Dialect options understood by the CSV loader.
///
/// `escapechar` and `skipinitialspace` are accepted only at their
/// defaults: the reader cannot unescape outside quoted fields, nor drop
/// the spaces before an opening quote.
#[derive(Debug, Clone, PartialEq, Eq)]
struct CsvDialect {
    delimiter: u8,
    quote: u8,
    strict: bool,
}

impl Default for CsvDialect {
    fn default() -> Self {
        Self {
            delimiter: b',',
            quote: b'"',
            strict: false,
        }
    }
}

fn csv_option_error(key: &str, reason: &str) -> MuckError {
    MuckError::ParserOption {
        loader: "csv".to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

fn single_byte(key: &str, value: &Value) -> MuckResult<u8> {
    let s = value
        .as_str()
        .ok_or_else(|| csv_option_error(key, "must be a 1-character string"))?;
    match s.as_bytes() {
        [b] if b.is_ascii() => Ok(*b),
        _ => Err(csv_option_error(key, "must be a 1-character ASCII string")),
    }
}

impl CsvDialect {
    fn from_options(options: &ParserOptions) -> MuckResult<Self> {
        let mut dialect = Self::default();
        for (key, value) in options.iter() {
            match key {
                "delimiter" => dialect.delimiter = single_byte(key, value)?,
                "quotechar" => dialect.quote = single_byte(key, value)?,
                "escapechar" => {
                    if !value.is_null() {
                        return Err(csv_option_error(key, "only null is supported"));
                    }
                }
                "skipinitialspace" => match value.as_bool() {
                    Some(false) => {}
                    Some(true) => return Err(csv_option_error(key, "only false is supported")),
                    None => return Err(csv_option_error(key, "must be a boolean")),
                },
                "strict" => {
                    dialect.strict = value
                        .as_bool()
                        .ok_or_else(|| csv_option_error(key, "must be a boolean"))?
                }
                other => return Err(csv_option_error(other, "unexpected keyword argument")),
            }
        }
        Ok(dialect)
    }

    fn reader<R: std::io::Read>(&self, input: R) -> csv::Reader<R> {
        csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(!self.strict)
            .delimiter(self.delimiter)
            .quote(self.quote)
            .from_reader(input)
    }
}

/// `.csv`: every row as a list of fields, header row included
pub fn load_csv(dep: Dependency, options: &ParserOptions) -> MuckResult<Loaded> {
    let dialect = CsvDialect::from_options(options)?;
    let (path, text) = content(dep)?;
    let mut rows = Vec::new();
    for record in dialect.reader(text.as_bytes()).records() {
        let record = record.map_err(|e| parse_error(&path, e))?;
        rows.push(record.iter().map(str::to_string).collect());
    }
    Ok(Loaded::Rows(rows))
}
