use std::borrow::Cow;
use std::fmt;
use std::panic::Location;
use std::path::Path;

/// Rendered in place of the function path when it cannot be resolved.
pub const UNKNOWN_FUNCTION: &str = "<unknown>";

/// Rendered instead of a call site when no location is available at all.
pub const UNKNOWN_LOCATION: &str = "unable to find caller location";

/// Where a tracked queue was constructed.
///
/// File and line always come from the compiler. The function path is known
/// when the source was built by [`source!`](crate::source); otherwise it is
/// looked up from debug info when the source is rendered.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Source {
    function: Option<&'static str>,
    file: &'static str,
    line: u32,
}

impl Source {
    pub const fn new(function: &'static str, file: &'static str, line: u32) -> Self {
        Self {
            function: Some(function),
            file,
            line,
        }
    }

    /// Location of the caller, without a function path.
    #[track_caller]
    pub fn caller() -> Self {
        Self::from_location(Location::caller())
    }

    pub fn from_location(location: &'static Location<'static>) -> Self {
        Self {
            function: None,
            file: location.file(),
            line: location.line(),
        }
    }

    pub fn function(self) -> Option<&'static str> {
        self.function
    }

    pub fn file(self) -> &'static str {
        self.file
    }

    pub fn line(self) -> u32 {
        self.line
    }

    /// Renders `"<function path> <file name>:<line>"`.
    ///
    /// Sources without a function path walk the current stack for a frame at
    /// this file and line, so this has to run while the registering frame is
    /// still live. Never fails: missing pieces render as [`UNKNOWN_FUNCTION`]
    /// or [`UNKNOWN_LOCATION`].
    pub fn render(self) -> String {
        if self.file.is_empty() || self.line == 0 {
            return UNKNOWN_LOCATION.to_string();
        }
        let function = match self.function {
            Some(function) => Cow::Borrowed(function),
            None => resolve_function(self.file, self.line)
                .map(Cow::Owned)
                .unwrap_or(Cow::Borrowed(UNKNOWN_FUNCTION)),
        };
        format!("{function} {}:{}", file_name(self.file), self.line)
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// Builds a [`Source`] for the invocation site, including the path of the
/// enclosing function.
#[macro_export]
macro_rules! source {
    () => {{
        fn __brim_here() {}
        fn __brim_type_name_of<T>(_: T) -> &'static str {
            ::core::any::type_name::<T>()
        }
        $crate::Source::new(
            $crate::__function_path(__brim_type_name_of(__brim_here)),
            file!(),
            line!(),
        )
    }};
}

#[doc(hidden)]
pub fn __function_path(item_path: &'static str) -> &'static str {
    trim_closures(item_path.strip_suffix("::__brim_here").unwrap_or(item_path))
}

fn trim_closures(mut path: &str) -> &str {
    while let Some(outer) = path.strip_suffix("::{{closure}}") {
        path = outer;
    }
    path
}

fn file_name(file: &str) -> &str {
    file.rsplit(['/', '\\']).next().unwrap_or(file)
}

fn resolve_function(file: &str, line: u32) -> Option<String> {
    let wanted = Path::new(file);
    let mut found = None;
    backtrace::trace(|frame| {
        backtrace::resolve_frame(frame, |symbol| {
            if found.is_some() || symbol.lineno() != Some(line) {
                return;
            }
            if !symbol.filename().is_some_and(|path| path.ends_with(wanted)) {
                return;
            }
            found = symbol
                .name()
                .map(|name| trim_closures(&format!("{name:#}")).to_string());
        });
        found.is_none()
    });
    found
}
