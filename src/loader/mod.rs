//! Format loaders
//!
//! Turns dependencies into values. A [`LoaderRegistry`] maps extensions
//! to parse functions; `load` resolves the target, opens it with the
//! loader's default open options (overridden per call), and hands the
//! stream plus the remaining keyword arguments to the parser.

pub mod builtin;
pub mod options;
pub mod registry;
pub mod stream;

pub use builtin::{is_builtin_ext, BUILTIN_EXTS};
pub use options::{
    Buffering, DecodeErrors, Encoding, Kwargs, LoadOptions, Newline, OpenOptionSet, OpenOptions,
    ParserOptions, OPEN_OPTION_KEYS,
};
pub use registry::{Loaded, LoaderEntry, LoaderFn, LoaderRegistry};
pub use stream::Dependency;
