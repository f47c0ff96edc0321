//! HGVS positions and intervals

use std::fmt;

use serde::{Deserialize, Serialize};

/// A position in HGVS numbering
///
/// - genomic (`g.`/`m.`): `base` >= 1, no offset
/// - coding (`c.`): `base` < 0 for the 5' UTR (`c.-12`), `utr3` for `c.*5`,
///   `offset` for intronic positions (`c.544+1`, `c.545-2`)
/// - non-coding (`n.`): `base` >= 1 with optional `offset`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HgvsPosition {
    pub base: i64,
    #[serde(default)]
    pub utr3: bool,
    #[serde(default)]
    pub offset: i64,
}

impl HgvsPosition {
    /// Plain position without offset
    pub fn new(base: i64) -> Self {
        Self {
            base,
            utr3: false,
            offset: 0,
        }
    }

    /// Position with an intronic offset
    pub fn with_offset(base: i64, offset: i64) -> Self {
        Self {
            base,
            utr3: false,
            offset,
        }
    }

    /// 3' UTR position (`*base`)
    pub fn utr3(base: i64, offset: i64) -> Self {
        Self {
            base,
            utr3: true,
            offset,
        }
    }

    /// Whether the position lies in an intron
    pub fn is_intronic(&self) -> bool {
        self.offset != 0
    }
}

impl fmt::Display for HgvsPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.utr3 {
            write!(f, "*")?;
        }
        write!(f, "{}", self.base)?;
        match self.offset {
            0 => Ok(()),
            o if o > 0 => write!(f, "+{}", o),
            o => write!(f, "{}", o),
        }
    }
}

/// A single position or a `start_end` range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HgvsInterval {
    pub start: HgvsPosition,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<HgvsPosition>,
}

impl HgvsInterval {
    pub fn point(pos: HgvsPosition) -> Self {
        Self {
            start: pos,
            end: None,
        }
    }

    pub fn range(start: HgvsPosition, end: HgvsPosition) -> Self {
        if start == end {
            return Self::point(start);
        }
        Self {
            start,
            end: Some(end),
        }
    }

    /// Last position of the interval (the start for a point)
    pub fn last(&self) -> HgvsPosition {
        self.end.unwrap_or(self.start)
    }
}

impl fmt::Display for HgvsInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.end {
            Some(end) => write!(f, "{}_{}", self.start, end),
            None => write!(f, "{}", self.start),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_display() {
        assert_eq!(HgvsPosition::new(544).to_string(), "544");
        assert_eq!(HgvsPosition::with_offset(544, 1).to_string(), "544+1");
        assert_eq!(HgvsPosition::with_offset(545, -2).to_string(), "545-2");
        assert_eq!(HgvsPosition::new(-12).to_string(), "-12");
        assert_eq!(HgvsPosition::utr3(5, 0).to_string(), "*5");
        assert_eq!(HgvsPosition::utr3(5, -3).to_string(), "*5-3");
    }

    #[test]
    fn test_interval_display() {
        let iv = HgvsInterval::range(HgvsPosition::new(10), HgvsPosition::new(12));
        assert_eq!(iv.to_string(), "10_12");
        let point = HgvsInterval::range(HgvsPosition::new(10), HgvsPosition::new(10));
        assert_eq!(point.to_string(), "10");
        assert_eq!(point.last(), HgvsPosition::new(10));
    }
}
