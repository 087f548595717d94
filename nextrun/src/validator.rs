use std::str::FromStr;

use crate::error::{ScheduleError, Span};
use crate::part::{Field, PartKind, SyntaxValidatorPart};

const FIELD_COUNT: usize = 5;

/// A token read from a cron expression: `N`, `*` or `*/N`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Token {
    kind: PartKind,
    value: u8,
    span: Span,
}

struct Lexer<'a> {
    bytes: &'a [u8],
}

impl<'a> Lexer<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            bytes: input.as_bytes(),
        }
    }

    /// Split the input into exactly five tokens, or `None`.
    fn tokenize(&self) -> Option<Vec<Token>> {
        let mut tokens = Vec::with_capacity(FIELD_COUNT);
        if self.split(0, &mut tokens) {
            Some(tokens)
        } else {
            None
        }
    }

    /// Tokens may be written without separators (`"*****"`, `"0 0 1*/2*"`),
    /// so each reading of a token is tried longest first and abandoned when
    /// the rest of the input cannot be split into the remaining fields.
    fn split(&self, pos: usize, tokens: &mut Vec<Token>) -> bool {
        let pos = self.skip_whitespace(pos);
        if tokens.len() == FIELD_COUNT {
            return pos == self.bytes.len();
        }
        for token in self.candidates(pos) {
            tokens.push(token);
            if self.split(token.span.end, tokens) {
                return true;
            }
            tokens.pop();
        }
        false
    }

    fn skip_whitespace(&self, mut pos: usize) -> usize {
        while pos < self.bytes.len() && self.bytes[pos].is_ascii_whitespace() {
            pos += 1;
        }
        pos
    }

    /// Every reading of the token starting at `pos`, longest first.
    fn candidates(&self, pos: usize) -> Vec<Token> {
        let mut out = Vec::new();
        match self.bytes.get(pos) {
            Some(b'*') => {
                if self.bytes.get(pos + 1) == Some(&b'/') {
                    for len in [2, 1] {
                        if let Some(step) = self.digits(pos + 2, len) {
                            out.push(Token {
                                kind: PartKind::Step,
                                value: step,
                                span: Span::new(pos, pos + 2 + len),
                            });
                        }
                    }
                }
                out.push(Token {
                    kind: PartKind::Step,
                    value: 1,
                    span: Span::new(pos, pos + 1),
                });
            }
            Some(b) if b.is_ascii_digit() => {
                for len in [2, 1] {
                    if let Some(value) = self.digits(pos, len) {
                        out.push(Token {
                            kind: PartKind::Exact,
                            value,
                            span: Span::new(pos, pos + len),
                        });
                    }
                }
            }
            _ => {}
        }
        out
    }

    /// Read exactly `len` ASCII digits at `pos`.
    fn digits(&self, pos: usize, len: usize) -> Option<u8> {
        let slice = self.bytes.get(pos..pos + len)?;
        if !slice.iter().all(u8::is_ascii_digit) {
            return None;
        }
        Some(slice.iter().fold(0u8, |acc, d| acc * 10 + (d - b'0')))
    }
}

/// Parses a 5-field cron expression and reports whether it is well formed.
///
/// Construction never fails: an expression that does not split into five
/// fields leaves every part `Unset`, and out-of-range fields are kept with
/// `valid == false`. [`error`](Self::error) holds the first problem found.
#[derive(Debug, Clone)]
pub struct SyntaxValidator {
    input: String,
    parts: [SyntaxValidatorPart; FIELD_COUNT],
    matched: bool,
    error: Option<ScheduleError>,
}

impl SyntaxValidator {
    pub fn new(input: &str) -> Self {
        let input = input.trim();
        let mut parts = Field::ALL.map(SyntaxValidatorPart::new);

        let Some(tokens) = Lexer::new(input).tokenize() else {
            let error = ScheduleError::syntax(
                "expected 5 cron fields, each `*`, `*/N` or a number of at most two digits",
                Span::new(0, input.len()),
                input,
            );
            return Self {
                input: input.to_string(),
                parts,
                matched: false,
                error: Some(error),
            };
        };

        let mut error = None;
        for (part, token) in parts.iter_mut().zip(&tokens) {
            let raw = &input[token.span.start..token.span.end];
            part.update(raw, token.kind, token.value, token.span);
            if !part.is_valid() && error.is_none() {
                error = Some(range_error(part, token, input));
            }
        }

        Self {
            input: input.to_string(),
            parts,
            matched: true,
            error,
        }
    }

    /// True when the expression split into five fields and every field is
    /// inside its range.
    pub fn is_valid(&self) -> bool {
        self.matched && self.parts.iter().all(SyntaxValidatorPart::is_valid)
    }

    /// The trimmed input.
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Parts in positional order: minute, hour, day-of-month, month, day-of-week.
    pub fn parts(&self) -> &[SyntaxValidatorPart; FIELD_COUNT] {
        &self.parts
    }

    pub fn part(&self, field: Field) -> &SyntaxValidatorPart {
        &self.parts[field as usize]
    }

    /// The first syntax problem, if any.
    pub fn error(&self) -> Option<&ScheduleError> {
        self.error.as_ref()
    }
}

fn range_error(part: &SyntaxValidatorPart, token: &Token, input: &str) -> ScheduleError {
    let (min, max) = part.range();
    let name = part.field().as_str();
    let message = match token.kind {
        PartKind::Step => format!("{name} step must be 1-{max}, got {}", token.value),
        _ => format!("{name} must be {min}-{max}, got {}", token.value),
    };
    ScheduleError::syntax(message, token.span, input)
}

impl FromStr for SyntaxValidator {
    type Err = ScheduleError;

    /// Parse, failing with the first syntax error instead of returning an
    /// invalid validator.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let validator = Self::new(s);
        if let Some(err) = validator.error() {
            return Err(err.clone());
        }
        Ok(validator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(input: &str) -> Vec<(PartKind, u8)> {
        SyntaxValidator::new(input)
            .parts()
            .iter()
            .map(|p| (p.kind(), p.value()))
            .collect()
    }

    #[test]
    fn test_all_stars() {
        let v = SyntaxValidator::new("* * * * *");
        assert!(v.is_valid());
        assert!(v.parts().iter().all(|p| p.is_unrestricted()));
        assert!(v.error().is_none());
    }

    #[test]
    fn test_mixed_fields() {
        assert_eq!(
            summary("*/15 3 1 */2 0"),
            vec![
                (PartKind::Step, 15),
                (PartKind::Exact, 3),
                (PartKind::Exact, 1),
                (PartKind::Step, 2),
                (PartKind::Exact, 0),
            ]
        );
    }

    #[test]
    fn test_surrounding_and_repeated_whitespace() {
        let v = SyntaxValidator::new("  5\t5   29 2 *  ");
        assert!(v.is_valid());
        assert_eq!(v.input(), "5\t5   29 2 *");
        assert_eq!(v.part(Field::DayOfMonth).value(), 29);
    }

    #[test]
    fn test_concatenated_stars() {
        let v = SyntaxValidator::new("*****");
        assert!(v.is_valid());
        assert_eq!(v.parts().len(), 5);
    }

    #[test]
    fn test_concatenated_digits_backtrack() {
        // Five digits can only be read as five single-digit fields.
        assert_eq!(
            summary("12345"),
            vec![
                (PartKind::Exact, 1),
                (PartKind::Exact, 2),
                (PartKind::Exact, 3),
                (PartKind::Exact, 4),
                (PartKind::Exact, 5),
            ]
        );
    }

    #[test]
    fn test_greedy_digits_first() {
        // "30" and "12" are read as two-digit tokens when that still leaves
        // five fields.
        assert_eq!(
            summary("3012*5*"),
            vec![
                (PartKind::Exact, 30),
                (PartKind::Exact, 12),
                (PartKind::Step, 1),
                (PartKind::Exact, 5),
                (PartKind::Step, 1),
            ]
        );
        // Without the trailing star, "12" has to be split to reach five.
        assert_eq!(
            summary("3012*5"),
            vec![
                (PartKind::Exact, 30),
                (PartKind::Exact, 1),
                (PartKind::Exact, 2),
                (PartKind::Step, 1),
                (PartKind::Exact, 5),
            ]
        );
    }

    #[test]
    fn test_glued_step() {
        let v = SyntaxValidator::new("*/5*/2***");
        assert!(v.is_valid());
        assert_eq!(v.part(Field::Minute).value(), 5);
        assert_eq!(v.part(Field::Hour).value(), 2);
        assert_eq!(v.part(Field::Hour).raw(), "*/2");
    }

    #[test]
    fn test_wrong_field_count() {
        for input in ["* * * *", "* * * * * *", "", "now"] {
            let v = SyntaxValidator::new(input);
            assert!(!v.is_valid(), "{input:?} should be invalid");
            assert!(v.parts().iter().all(|p| p.kind() == PartKind::Unset));
        }
    }

    #[test]
    fn test_unsupported_syntax() {
        for input in ["1,2 * * * *", "1-5 * * * *", "* * * JAN *", "*/ * * * *", "100 * * * *"] {
            assert!(!SyntaxValidator::new(input).is_valid(), "{input:?} should be invalid");
        }
    }

    #[test]
    fn test_range_checks() {
        assert!(!SyntaxValidator::new("60 * * * *").is_valid());
        assert!(!SyntaxValidator::new("* 24 * * *").is_valid());
        assert!(!SyntaxValidator::new("* * 0 * *").is_valid());
        assert!(!SyntaxValidator::new("* * 32 * *").is_valid());
        assert!(!SyntaxValidator::new("* * * 0 *").is_valid());
        assert!(!SyntaxValidator::new("* * * 13 *").is_valid());
        assert!(!SyntaxValidator::new("* * * * 7").is_valid());
        assert!(SyntaxValidator::new("59 23 31 12 6").is_valid());
        assert!(SyntaxValidator::new("0 0 1 1 0").is_valid());
    }

    #[test]
    fn test_zero_step_invalid_everywhere() {
        for i in 0..5 {
            let mut fields = vec!["*"; 5];
            fields[i] = "*/0";
            let input = fields.join(" ");
            assert!(!SyntaxValidator::new(&input).is_valid(), "{input}");
        }
    }

    #[test]
    fn test_out_of_range_keeps_parts() {
        let v = SyntaxValidator::new("75 * * * *");
        assert!(!v.is_valid());
        let minute = v.part(Field::Minute);
        assert_eq!(minute.kind(), PartKind::Exact);
        assert_eq!(minute.value(), 75);
        assert!(!minute.is_valid());
        assert!(v.part(Field::Hour).is_valid());
    }

    #[test]
    fn test_error_points_at_token() {
        let v = SyntaxValidator::new("0 0 1 */13 *");
        let err = v.error().unwrap();
        assert_eq!(err.to_string(), "month step must be 1-12, got 13");
        match err {
            ScheduleError::Syntax { span, .. } => assert_eq!(*span, Span::new(6, 10)),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_from_str() {
        assert!("*/5 * * * *".parse::<SyntaxValidator>().is_ok());
        let err = "* * 32 * *".parse::<SyntaxValidator>().unwrap_err();
        assert_eq!(err.to_string(), "day-of-month must be 1-31, got 32");
    }
}
