use crate::error::Span;

/// The five positional fields of a cron expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Field {
    Minute,
    Hour,
    DayOfMonth,
    Month,
    DayOfWeek,
}

impl Field {
    /// Fields in positional order.
    pub const ALL: [Field; 5] = [
        Field::Minute,
        Field::Hour,
        Field::DayOfMonth,
        Field::Month,
        Field::DayOfWeek,
    ];

    /// Inclusive numeric range accepted for this field.
    pub fn range(self) -> (u8, u8) {
        match self {
            Field::Minute => (0, 59),
            Field::Hour => (0, 23),
            Field::DayOfMonth => (1, 31),
            Field::Month => (1, 12),
            // 0 is Sunday
            Field::DayOfWeek => (0, 6),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Field::Minute => "minute",
            Field::Hour => "hour",
            Field::DayOfMonth => "day-of-month",
            Field::Month => "month",
            Field::DayOfWeek => "day-of-week",
        }
    }
}

/// How a field token was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum PartKind {
    /// `15`
    Exact,
    /// `*` (step 1) or `*/N`
    Step,
    /// Not parsed (the expression did not split into five tokens).
    Unset,
}

/// One parsed cron field.
///
/// Filled in once by [`SyntaxValidator`](crate::validator::SyntaxValidator)
/// and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SyntaxValidatorPart {
    pub(crate) field: Field,
    pub(crate) raw: String,
    pub(crate) kind: PartKind,
    pub(crate) value: u8,
    pub(crate) valid: bool,
    pub(crate) range: (u8, u8),
    #[cfg_attr(feature = "serde", serde(skip))]
    pub(crate) span: Option<Span>,
}

impl SyntaxValidatorPart {
    /// An unset part for `field`.
    pub fn new(field: Field) -> Self {
        Self {
            field,
            raw: String::new(),
            kind: PartKind::Unset,
            value: 0,
            valid: false,
            range: field.range(),
            span: None,
        }
    }

    /// Record the token parsed for this field and re-check its range.
    ///
    /// A step of 0 is never valid; otherwise exact values and steps must both
    /// fall inside the field's range.
    pub(crate) fn update(&mut self, raw: &str, kind: PartKind, value: u8, span: Span) {
        self.raw = raw.to_string();
        self.kind = kind;
        self.value = value;
        self.span = Some(span);
        let (min, max) = self.range;
        self.valid = match kind {
            PartKind::Exact => value >= min && value <= max,
            PartKind::Step => value >= 1 && value <= max,
            PartKind::Unset => false,
        };
    }

    pub fn field(&self) -> Field {
        self.field
    }

    /// The token exactly as written (`"*/5"`, `"07"`, `"*"`).
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn kind(&self) -> PartKind {
        self.kind
    }

    /// The exact value, or the step size for `Step` (1 for a bare `*`).
    pub fn value(&self) -> u8 {
        self.value
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn range(&self) -> (u8, u8) {
        self.range
    }

    pub fn span(&self) -> Option<Span> {
        self.span
    }

    /// `*` or `*/1`: the field places no constraint on its unit.
    pub fn is_unrestricted(&self) -> bool {
        self.kind == PartKind::Step && self.value == 1
    }
}
