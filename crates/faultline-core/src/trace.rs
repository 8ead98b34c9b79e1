use std::backtrace::{Backtrace, BacktraceStatus};
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// One frame of a captured stack trace, in wire form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StackFrame {
    /// Symbol path without its last segment (`app::orders` for `app::orders::create`)
    pub declaring_class: String,
    /// Last segment of the symbol path
    pub method_name: String,
    /// Source file, when debug info resolves one
    pub file_name: Option<String>,
    /// Source line, `-1` when unknown
    pub line_number: i32,
}

impl StackFrame {
    pub fn new(
        declaring_class: impl Into<String>,
        method_name: impl Into<String>,
        file_name: Option<String>,
        line_number: i32,
    ) -> Self {
        Self {
            declaring_class: declaring_class.into(),
            method_name: method_name.into(),
            file_name,
            line_number,
        }
    }

    /// Split a demangled symbol into declaring path and method name
    fn from_symbol(symbol: &str) -> Self {
        let (declaring_class, method_name) = symbol.rsplit_once("::").unwrap_or(("", symbol));
        Self::new(declaring_class, method_name, None, -1)
    }
}

/// Symbol prefixes of frames that belong to raising the error rather than to the caller
const CAPTURE_FRAME_PREFIXES: &[&str] = &[
    "std::backtrace",
    "faultline_core::trace::StackTrace::",
    "faultline_core::failure::ApiError::",
    "<faultline_core::failure::ApiError as ",
    "<T as core::convert::Into<U>>::into",
    "<core::result::Result<T,F> as core::ops::try_trait::FromResidual",
];

/// Stack trace captured when an error was raised
///
/// [`ApiError`](crate::ApiError) always captures one, whatever
/// `RUST_BACKTRACE` says. Leading frames of the capture machinery are dropped
/// so the first frame is the code that raised the error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StackTrace {
    frames: Vec<StackFrame>,
}

impl StackTrace {
    /// Capture the current stack if backtraces are enabled in the environment
    pub fn capture() -> Self {
        Self::from_backtrace(&Backtrace::capture())
    }

    /// Capture the current stack regardless of environment settings
    pub fn force_capture() -> Self {
        Self::from_backtrace(&Backtrace::force_capture())
    }

    pub const fn empty() -> Self {
        Self { frames: Vec::new() }
    }

    pub const fn from_frames(frames: Vec<StackFrame>) -> Self {
        Self { frames }
    }

    /// Convert a std backtrace; disabled or unsupported backtraces yield an empty trace
    pub fn from_backtrace(backtrace: &Backtrace) -> Self {
        if backtrace.status() != BacktraceStatus::Captured {
            return Self::empty();
        }

        let mut frames = parse_frames(&backtrace.to_string());
        let skip = frames.iter().take_while(|frame| is_capture_frame(frame)).count();
        frames.drain(..skip);

        Self::from_frames(frames)
    }

    pub fn frames(&self) -> &[StackFrame] {
        &self.frames
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// First `limit` frames in original order; `None` keeps every frame
    pub fn limited(&self, limit: Option<usize>) -> Vec<StackFrame> {
        let end = limit.map_or(self.frames.len(), |limit| limit.min(self.frames.len()));
        self.frames[..end].to_vec()
    }
}

impl FromIterator<StackFrame> for StackTrace {
    fn from_iter<I: IntoIterator<Item = StackFrame>>(iter: I) -> Self {
        Self::from_frames(iter.into_iter().collect())
    }
}

fn is_capture_frame(frame: &StackFrame) -> bool {
    let symbol = format!("{}::{}", frame.declaring_class, frame.method_name);
    CAPTURE_FRAME_PREFIXES.iter().any(|prefix| symbol.starts_with(prefix))
}

/// Parse the std `Display` rendering of a captured backtrace
///
/// Each symbol prints as `N: path::to::symbol`, optionally followed by an
/// indented `at file:line:column` line.
fn parse_frames(rendered: &str) -> Vec<StackFrame> {
    fn symbol_re() -> &'static Regex {
        static RE: OnceLock<Regex> = OnceLock::new();
        RE.get_or_init(|| Regex::new(r"^\s*\d+:\s+(.+?)\s*$").expect("must be valid regex"))
    }

    fn location_re() -> &'static Regex {
        static RE: OnceLock<Regex> = OnceLock::new();
        RE.get_or_init(|| Regex::new(r"^\s*at\s+(.+?):(\d+)(?::\d+)?\s*$").expect("must be valid regex"))
    }

    let mut frames: Vec<StackFrame> = Vec::new();

    for line in rendered.lines() {
        if let Some(captures) = location_re().captures(line) {
            if let Some(frame) = frames.last_mut() {
                frame.file_name = Some(captures[1].to_owned());
                frame.line_number = captures[2].parse().unwrap_or(-1);
            }
        } else if let Some(captures) = symbol_re().captures(line) {
            frames.push(StackFrame::from_symbol(&captures[1]));
        }
    }

    frames
}

#[cfg(test)]
mod tests {
    use super::*;

    const RENDERED: &str = "   0: shop::orders::create
             at ./src/orders.rs:42:17
   1: shop::orders::create::{{closure}}
             at ./src/orders.rs:30:5
   2: <unknown>
   3: std::rt::lang_start_internal
             at /rustc/library/std/src/rt.rs:148:20
";

    #[test]
    fn parses_symbols_and_locations() {
        let frames = parse_frames(RENDERED);

        assert_eq!(frames.len(), 4);
        assert_eq!(
            frames[0],
            StackFrame::new("shop::orders", "create", Some("./src/orders.rs".to_owned()), 42)
        );
        assert_eq!(frames[1].declaring_class, "shop::orders::create");
        assert_eq!(frames[1].method_name, "{{closure}}");
        assert_eq!(frames[3].line_number, 148);
    }

    #[test]
    fn unresolved_symbol_has_no_location() {
        let frames = parse_frames(RENDERED);

        assert_eq!(frames[2].declaring_class, "");
        assert_eq!(frames[2].method_name, "<unknown>");
        assert!(frames[2].file_name.is_none());
        assert_eq!(frames[2].line_number, -1);
    }

    #[test]
    fn location_without_column() {
        let frames = parse_frames("   0: app::run\n             at src/main.rs:9\n");
        assert_eq!(frames[0].line_number, 9);
        assert_eq!(frames[0].file_name.as_deref(), Some("src/main.rs"));
    }

    #[test]
    fn disabled_backtrace_is_empty() {
        assert!(StackTrace::from_backtrace(&Backtrace::disabled()).is_empty());
    }

    #[test]
    fn forced_capture_resolves_frames() {
        let trace = StackTrace::force_capture();
        assert!(!trace.is_empty());
    }

    #[test]
    fn forced_capture_starts_at_caller() {
        let trace = StackTrace::force_capture();
        let first = &trace.frames()[0];

        assert!(!first.declaring_class.starts_with("std::backtrace"));
        assert_ne!(first.declaring_class, "faultline_core::trace::StackTrace");
    }

    #[test]
    fn capture_frames_are_recognized() {
        assert!(is_capture_frame(&StackFrame::from_symbol(
            "faultline_core::failure::ApiError::new"
        )));
        assert!(is_capture_frame(&StackFrame::from_symbol(
            "<faultline_core::failure::ApiError as core::convert::From<tokio::time::error::Elapsed>>::from"
        )));
        assert!(!is_capture_frame(&StackFrame::from_symbol("shop::orders::create")));
    }

    #[test]
    fn limited_keeps_leading_frames_in_order() {
        let trace: StackTrace = (0..20)
            .map(|i| StackFrame::new("app", format!("f{i}"), None, i))
            .collect();

        let limited = trace.limited(Some(15));
        assert_eq!(limited.len(), 15);
        assert_eq!(limited[0].method_name, "f0");
        assert_eq!(limited[14].method_name, "f14");

        assert_eq!(trace.limited(None).len(), 20);
        assert_eq!(trace.limited(Some(50)).len(), 20);
    }
}
