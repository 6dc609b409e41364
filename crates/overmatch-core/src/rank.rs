//! The conversion ranking ladder.

use num_enum::{IntoPrimitive, TryFromPrimitive};
use std::fmt;

/// How well an argument type fits a formal parameter type.
///
/// Ranks are ordered best-first; comparisons use that order directly, so
/// `ExactMatch < Promotion` reads "exact match beats promotion". A
/// candidate's overall rank is the worst rank among its bound arguments,
/// and candidates compete on overall rank alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum ConversionRank {
    /// Identity, or a cv-qualification adjustment.
    ExactMatch = 0,
    /// Integral promotion, unscoped-enumeration promotion, or floating
    /// promotion.
    Promotion = 1,
    /// Any other standard conversion between arithmetic types.
    Conversion = 2,
    /// A registered converting constructor or conversion operator.
    UserDefinedConversion = 3,
    /// Bound through a variadic ellipsis tail.
    EllipsisMatch = 4,
    /// No admissible binding; the candidate is not viable.
    NoMatch = 5,
}

impl ConversionRank {
    /// Whether an argument at this rank keeps its candidate viable.
    #[inline]
    pub fn is_viable(self) -> bool {
        self != ConversionRank::NoMatch
    }

    /// The worse of two ranks.
    #[inline]
    pub fn worst(self, other: Self) -> Self {
        self.max(other)
    }
}

impl fmt::Display for ConversionRank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ConversionRank::ExactMatch => "exact match",
            ConversionRank::Promotion => "promotion",
            ConversionRank::Conversion => "conversion",
            ConversionRank::UserDefinedConversion => "user-defined conversion",
            ConversionRank::EllipsisMatch => "ellipsis match",
            ConversionRank::NoMatch => "no match",
        };
        f.write_str(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranks_order_best_first() {
        assert!(ConversionRank::ExactMatch < ConversionRank::Promotion);
        assert!(ConversionRank::Promotion < ConversionRank::Conversion);
        assert!(ConversionRank::Conversion < ConversionRank::UserDefinedConversion);
        assert!(ConversionRank::UserDefinedConversion < ConversionRank::EllipsisMatch);
        assert!(ConversionRank::EllipsisMatch < ConversionRank::NoMatch);
    }

    #[test]
    fn worst_picks_the_later_rank() {
        assert_eq!(
            ConversionRank::ExactMatch.worst(ConversionRank::Conversion),
            ConversionRank::Conversion
        );
        assert_eq!(
            ConversionRank::EllipsisMatch.worst(ConversionRank::Promotion),
            ConversionRank::EllipsisMatch
        );
    }

    #[test]
    fn ranks_round_trip_through_repr() {
        for raw in 0u8..=5 {
            let rank = ConversionRank::try_from(raw).unwrap();
            assert_eq!(u8::from(rank), raw);
        }
        assert!(ConversionRank::try_from(6u8).is_err());
    }

    #[test]
    fn only_no_match_is_nonviable() {
        assert!(ConversionRank::EllipsisMatch.is_viable());
        assert!(!ConversionRank::NoMatch.is_viable());
    }
}
