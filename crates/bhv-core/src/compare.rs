//! Six-way comparison operator shared by threshold-style conditions.

/// How a sampled value is compared against a configured threshold.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Comparison {
    Less,
    LessOrEqual,
    #[default]
    Equal,
    NotEqual,
    GreaterOrEqual,
    Greater,
}

impl Comparison {
    /// All variants in ordinal order (the binary wire encoding order).
    pub const ALL: [Comparison; 6] = [
        Comparison::Less,
        Comparison::LessOrEqual,
        Comparison::Equal,
        Comparison::NotEqual,
        Comparison::GreaterOrEqual,
        Comparison::Greater,
    ];

    /// Apply the comparison: `lhs <op> rhs`.
    #[inline]
    pub fn evaluate<T: PartialOrd>(self, lhs: T, rhs: T) -> bool {
        match self {
            Comparison::Less           => lhs < rhs,
            Comparison::LessOrEqual    => lhs <= rhs,
            Comparison::Equal          => lhs == rhs,
            Comparison::NotEqual       => lhs != rhs,
            Comparison::GreaterOrEqual => lhs >= rhs,
            Comparison::Greater        => lhs > rhs,
        }
    }

    /// Canonical name, used by the textual codec.
    pub fn as_str(self) -> &'static str {
        match self {
            Comparison::Less           => "less",
            Comparison::LessOrEqual    => "less_or_equal",
            Comparison::Equal          => "equal",
            Comparison::NotEqual       => "not_equal",
            Comparison::GreaterOrEqual => "greater_or_equal",
            Comparison::Greater        => "greater",
        }
    }

    /// Operator-symbol alias accepted by the textual codec alongside the
    /// canonical name.
    pub fn symbol(self) -> &'static str {
        match self {
            Comparison::Less           => "<",
            Comparison::LessOrEqual    => "<=",
            Comparison::Equal          => "==",
            Comparison::NotEqual       => "!=",
            Comparison::GreaterOrEqual => ">=",
            Comparison::Greater        => ">",
        }
    }
}

impl std::fmt::Display for Comparison {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
