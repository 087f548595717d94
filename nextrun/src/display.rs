use std::fmt;

use crate::part::{Field, PartKind, SyntaxValidatorPart};
use crate::validator::SyntaxValidator;

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical token: `7`, `*`, `*/15`. Unset parts print their raw text.
impl fmt::Display for SyntaxValidatorPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind() {
            PartKind::Exact => write!(f, "{}", self.value()),
            PartKind::Step if self.value() == 1 => write!(f, "*"),
            PartKind::Step => write!(f, "*/{}", self.value()),
            PartKind::Unset => write!(f, "{}", self.raw()),
        }
    }
}

/// Five canonical tokens separated by single spaces, or the trimmed input
/// when it did not split into five fields.
impl fmt::Display for SyntaxValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.parts().iter().any(|p| p.kind() == PartKind::Unset) {
            return write!(f, "{}", self.input());
        }
        for (i, part) in self.parts().iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{part}")?;
        }
        Ok(())
    }
}
