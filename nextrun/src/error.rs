use std::fmt;

/// Byte range within the schedule string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

/// All errors produced by nextrun.
///
/// `Syntax` and `Infeasible` describe schedules that cannot be resolved; the
/// resolver turns them into "no occurrence" rather than returning them.
/// `Misuse` means the caller broke a contract (unseeded cursor, invalid
/// builder) and is always returned.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ScheduleError {
    Syntax {
        message: String,
        span: Span,
        input: String,
    },

    Infeasible {
        message: String,
    },

    Misuse {
        message: String,
    },

    Calendar {
        message: String,
    },
}

impl fmt::Display for ScheduleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Syntax { message, .. } => write!(f, "{message}"),
            Self::Infeasible { message } => write!(f, "{message}"),
            Self::Misuse { message } => write!(f, "{message}"),
            Self::Calendar { message } => write!(f, "{message}"),
        }
    }
}

impl std::error::Error for ScheduleError {}

impl ScheduleError {
    pub fn syntax(message: impl Into<String>, span: Span, input: impl Into<String>) -> Self {
        Self::Syntax {
            message: message.into(),
            span,
            input: input.into(),
        }
    }

    pub fn infeasible(message: impl Into<String>) -> Self {
        Self::Infeasible {
            message: message.into(),
        }
    }

    pub fn misuse(message: impl Into<String>) -> Self {
        Self::Misuse {
            message: message.into(),
        }
    }

    pub fn calendar(message: impl Into<String>) -> Self {
        Self::Calendar {
            message: message.into(),
        }
    }

    /// Whether this error is a caller contract violation rather than a
    /// property of the schedule itself.
    pub fn is_misuse(&self) -> bool {
        matches!(self, Self::Misuse { .. })
    }

    /// Format a rich error with the offending token underlined.
    pub fn display_rich(&self) -> String {
        match self {
            Self::Syntax {
                message,
                span,
                input,
            } => format_span_error("error", message, span, input),
            Self::Infeasible { message } => format!("error: {message}"),
            Self::Misuse { message } => format!("error: {message}"),
            Self::Calendar { message } => format!("error: {message}"),
        }
    }
}

fn format_span_error(prefix: &str, message: &str, span: &Span, input: &str) -> String {
    let mut out = format!("{prefix}: {message}\n");
    out.push_str(&format!("  {input}\n"));
    let padding = " ".repeat(span.start + 2);
    let underline = "^".repeat(span.end.saturating_sub(span.start).max(1));
    out.push_str(&padding);
    out.push_str(&underline);
    out
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}
