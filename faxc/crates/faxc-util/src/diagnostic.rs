//! The compiler's unified diagnostic shape.
//!
//! The reference compiler raises one exception type, `CompilerMessage`,
//! carrying a level drawn from `{error, warning, success, important}`
//! and prints it with an ANSI-colored, emoji-prefixed `__str__`. Errors
//! abort the pipeline; everything else accumulates. This module keeps
//! that four-level taxonomy (wider than the teacher's own
//! `{Error, Warning, Note, Help}`) since the driver needs `success`/
//! `important` to report normal pipeline progress, not just problems.

use std::fmt;

/// Severity of a [`Diagnostic`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    /// Fatal; aborts the compilation pipeline.
    Error,
    /// Non-fatal; compilation continues.
    Warning,
    /// A stage completed successfully (progress reporting).
    Success,
    /// A noteworthy announcement, e.g. a dumped artifact header.
    Important,
}

impl Level {
    fn glyph(self) -> &'static str {
        match self {
            Level::Error => "\u{2716}",
            Level::Warning => "\u{26a0}",
            Level::Success => "\u{2714}",
            Level::Important => "\u{2728}",
        }
    }
}

/// A single compiler message.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub level: Level,
    pub message: String,
}

impl Diagnostic {
    pub fn error(message: impl Into<String>) -> Self {
        Diagnostic {
            level: Level::Error,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Diagnostic {
            level: Level::Warning,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Diagnostic {
            level: Level::Success,
            message: message.into(),
        }
    }

    pub fn important(message: impl Into<String>) -> Self {
        Diagnostic {
            level: Level::Important,
            message: message.into(),
        }
    }

    pub fn is_fatal(&self) -> bool {
        self.level == Level::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.level.glyph(), self.message)
    }
}

/// Accumulates diagnostics for one compilation.
///
/// Mirrors the reference's module-level `MessageCollector` (`add` prints
/// immediately and records the message), but does not print on its own —
/// `faxc-drv` decides where diagnostics go (stdout, a `tracing`
/// subscriber, etc.) so this type stays usable from library code and
/// from tests without capturing stdout.
#[derive(Debug, Default)]
pub struct Handler {
    messages: Vec<Diagnostic>,
}

impl Handler {
    pub fn new() -> Self {
        Handler::default()
    }

    pub fn emit(&mut self, diag: Diagnostic) {
        self.messages.push(diag);
    }

    pub fn has_errors(&self) -> bool {
        self.messages.iter().any(Diagnostic::is_fatal)
    }

    pub fn messages(&self) -> &[Diagnostic] {
        &self.messages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn has_errors_only_true_after_an_error_level_diagnostic() {
        let mut h = Handler::new();
        h.emit(Diagnostic::warning("default grammar chosen"));
        assert!(!h.has_errors());
        h.emit(Diagnostic::error("identifier x is undefined"));
        assert!(h.has_errors());
    }
}
