//! Line rendering: prefix, timestamp, caller fragment and `?` substitution

use std::io::Write;
use std::panic::Location;

use chrono::{DateTime, TimeZone};

use crate::pool::{BufferPool, PooledBuffer};
use crate::severity::Severity;
use crate::value::LogValue;

/// The reserved placeholder character
pub const PLACEHOLDER: char = '?';

/// Timestamp layout, millisecond precision
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Text used when part of the call site cannot be determined
pub const UNKNOWN: &str = "???";

/// Where a log call came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    pub file: Option<&'static str>,
    pub line: Option<u32>,
    pub function: Option<&'static str>,
}

impl Caller {
    /// Nothing known about the call site
    pub const UNKNOWN: Caller = Caller {
        file: None,
        line: None,
        function: None,
    };

    /// Capture the file and line of the caller of the `#[track_caller]` chain
    #[track_caller]
    pub fn here() -> Self {
        Self::from_location(Location::caller())
    }

    pub fn from_location(location: &'static Location<'static>) -> Self {
        Self {
            file: Some(location.file()),
            line: Some(location.line()),
            function: None,
        }
    }

    /// Caller with every part known, as produced by the logging macros
    pub fn new(file: &'static str, line: u32, function: &'static str) -> Self {
        Self {
            file: Some(file),
            line: Some(line),
            function: Some(function),
        }
    }

    /// Append the caller fragment, trailing space included
    ///
    /// `skip_file_name` gives `function:line `, otherwise `file:lineL(function) `.
    pub fn write_fragment(&self, out: &mut Vec<u8>, skip_file_name: bool) {
        let function = self.function.unwrap_or(UNKNOWN);
        let line = self.line.unwrap_or(0);
        if skip_file_name {
            let _ = write!(out, "{}:{} ", function, line);
        } else {
            let file = self.file.unwrap_or(UNKNOWN);
            let _ = write!(out, "{}:{}L({}) ", file, line, function);
        }
    }
}

/// Name of the item the marker function `__levelog_here` is declared in
///
/// Used by the logging macros, which declare the marker inside the calling
/// function. Closure frames are stripped so a call inside a closure (or an
/// `async` block) reports the enclosing function.
#[doc(hidden)]
pub fn enclosing_function<T>(_marker: T) -> &'static str {
    let name = std::any::type_name::<T>();
    let mut name = name.strip_suffix("::__levelog_here").unwrap_or(name);
    while let Some(outer) = name.strip_suffix("::{{closure}}") {
        name = outer;
    }
    name
}

/// Append `format` with its placeholders filled from `args`
///
/// Substitutes `min(placeholders, args)` times from the left; anything after
/// the last consumed placeholder is copied as is, so unused placeholders stay
/// in the output and unused arguments are dropped.
pub fn write_substituted(out: &mut Vec<u8>, format: &str, args: &[&dyn LogValue]) {
    if args.is_empty() {
        out.extend_from_slice(format.as_bytes());
        return;
    }

    let mut rest = format;
    for arg in args {
        match rest.find(PLACEHOLDER) {
            Some(pos) => {
                out.extend_from_slice(rest[..pos].as_bytes());
                arg.write_to(out);
                rest = &rest[pos + PLACEHOLDER.len_utf8()..];
            }
            None => break,
        }
    }
    out.extend_from_slice(rest.as_bytes());
}

/// Render one complete line into a buffer from `pool`
///
/// Layout: `<tag> <timestamp> <caller fragment><body>\n`. Returns the line
/// length together with the buffer.
pub fn render<'p, Tz>(
    pool: &'p BufferPool,
    severity: Severity,
    timestamp: &DateTime<Tz>,
    caller: &Caller,
    skip_file_name: bool,
    format: &str,
    args: &[&dyn LogValue],
) -> (usize, PooledBuffer<'p>)
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let mut buf = pool.get();
    buf.extend_from_slice(severity.tag().as_bytes());
    buf.push(b' ');
    let _ = write!(buf, "{}", timestamp.format(TIMESTAMP_FORMAT));
    buf.push(b' ');
    caller.write_fragment(&mut buf, skip_file_name);
    write_substituted(&mut buf, format, args);
    buf.push(b'\n');
    (buf.len(), buf)
}
