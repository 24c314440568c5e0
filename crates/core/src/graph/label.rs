use alloc::string::String;
use core::fmt::{Display, Formatter, Result};
use core::str::FromStr;

/// Kind of dependency between two transactions.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[cfg_attr(feature = "schemars", derive(::schemars::JsonSchema))]
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DependencyLabel {
    /// `ww`: the target overwrites a version installed by the source.
    #[cfg_attr(feature = "serde", serde(rename = "ww"))]
    WriteWrite,
    /// `wr`: the target reads a version installed by the source.
    #[cfg_attr(feature = "serde", serde(rename = "wr"))]
    WriteRead,
    /// `rw`: anti-dependency, the target overwrites a version the source read.
    #[cfg_attr(feature = "serde", serde(rename = "rw"))]
    ReadWrite,
}

impl DependencyLabel {
    pub const ALL: [Self; 3] = [Self::WriteWrite, Self::WriteRead, Self::ReadWrite];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::WriteWrite => "ww",
            Self::WriteRead => "wr",
            Self::ReadWrite => "rw",
        }
    }

    #[must_use]
    pub const fn is_anti_dependency(self) -> bool {
        matches!(self, Self::ReadWrite)
    }

    const fn bit(self) -> u8 {
        match self {
            Self::WriteWrite => 0b001,
            Self::WriteRead => 0b010,
            Self::ReadWrite => 0b100,
        }
    }
}

impl Display for DependencyLabel {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        f.write_str(self.as_str())
    }
}

/// A token that is not one of `ww`, `wr`, `rw`.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseLabelError {
    pub token: String,
}

impl FromStr for DependencyLabel {
    type Err = ParseLabelError;

    fn from_str(s: &str) -> core::result::Result<Self, Self::Err> {
        match s {
            "ww" => Ok(Self::WriteWrite),
            "wr" => Ok(Self::WriteRead),
            "rw" => Ok(Self::ReadWrite),
            _ => Err(ParseLabelError {
                token: s.into(),
            }),
        }
    }
}

/// A set of [`DependencyLabel`]s used to filter edges.
///
/// The empty set is read as "no restriction" wherever a filter is applied,
/// see [`LabelSet::normalized`].
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct LabelSet(u8);

impl LabelSet {
    pub const EMPTY: Self = Self(0);
    pub const ALL: Self = Self(0b111);
    /// `{ww, wr}`, the edges examined by PL-2.
    pub const WRITE_DEPENDENCIES: Self = Self(0b011);
    /// `{ww}`, the edges examined by PL-1.
    pub const WRITE_WRITE: Self = Self(0b001);

    #[must_use]
    pub const fn with(self, label: DependencyLabel) -> Self {
        Self(self.0 | label.bit())
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Returns [`LabelSet::ALL`] for the empty set, `self` otherwise.
    #[must_use]
    pub const fn normalized(self) -> Self {
        if self.is_empty() {
            Self::ALL
        } else {
            self
        }
    }

    /// Membership test after normalization.
    #[must_use]
    pub const fn contains(self, label: DependencyLabel) -> bool {
        self.normalized().0 & label.bit() != 0
    }

    pub fn iter(self) -> impl Iterator<Item = DependencyLabel> {
        DependencyLabel::ALL
            .into_iter()
            .filter(move |label| self.contains(*label))
    }
}

impl Default for LabelSet {
    fn default() -> Self {
        Self::ALL
    }
}

impl FromIterator<DependencyLabel> for LabelSet {
    fn from_iter<I: IntoIterator<Item = DependencyLabel>>(iter: I) -> Self {
        iter.into_iter().fold(Self::EMPTY, Self::with)
    }
}

impl Display for LabelSet {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        f.write_str("{")?;
        for (i, label) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{label}")?;
        }
        f.write_str("}")
    }
}
