use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The kind of an analyzed provider. Selects which metric schema and scoring formula apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Offchain,
    Onchain,
    Hybrid,
    /// Carried through normalization but skipped by every analyzer.
    Unknown,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Offchain => "offchain",
            ProviderKind::Onchain => "onchain",
            ProviderKind::Hybrid => "hybrid",
            ProviderKind::Unknown => "unknown",
        }
    }

    /// Returns true for the kinds scored with the traditional (agent/float) formula.
    pub fn is_offchain_like(&self) -> bool {
        matches!(self, ProviderKind::Offchain | ProviderKind::Hybrid)
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses a declared provider `type`. Matching is exact: only the three lowercase
/// kinds parse, anything else is an error that becomes `ProviderKind::Unknown`.
impl FromStr for ProviderKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "offchain" => Ok(ProviderKind::Offchain),
            "onchain" => Ok(ProviderKind::Onchain),
            "hybrid" => Ok(ProviderKind::Hybrid),
            _ => Err(CoreError::InvalidInput(
                "provider type".to_string(),
                s.to_string(),
            )),
        }
    }
}

/// Letter grade attached to an offchain efficiency score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Grade {
    #[serde(rename = "A+")]
    APlus,
    #[serde(rename = "A")]
    A,
    #[serde(rename = "A-")]
    AMinus,
    #[serde(rename = "B+")]
    BPlus,
    #[serde(rename = "B")]
    B,
    #[serde(rename = "B-")]
    BMinus,
    #[serde(rename = "C+")]
    CPlus,
    #[serde(rename = "C")]
    C,
    #[serde(rename = "C-")]
    CMinus,
    #[serde(rename = "F")]
    F,
}

/// Inclusive lower bounds, evaluated in descending order. Anything below the last is `F`.
const GRADE_BOUNDARIES: [(f64, Grade); 9] = [
    (90.0, Grade::APlus),
    (85.0, Grade::A),
    (80.0, Grade::AMinus),
    (75.0, Grade::BPlus),
    (70.0, Grade::B),
    (65.0, Grade::BMinus),
    (60.0, Grade::CPlus),
    (55.0, Grade::C),
    (50.0, Grade::CMinus),
];

impl Grade {
    /// Maps an overall score onto the grade scale.
    pub fn from_score(score: f64) -> Self {
        GRADE_BOUNDARIES
            .iter()
            .find(|(lower, _)| score >= *lower)
            .map(|(_, grade)| *grade)
            .unwrap_or(Grade::F)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Grade::APlus => "A+",
            Grade::A => "A",
            Grade::AMinus => "A-",
            Grade::BPlus => "B+",
            Grade::B => "B",
            Grade::BMinus => "B-",
            Grade::CPlus => "C+",
            Grade::C => "C",
            Grade::CMinus => "C-",
            Grade::F => "F",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Grade {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GRADE_BOUNDARIES
            .iter()
            .map(|(_, grade)| *grade)
            .chain(std::iter::once(Grade::F))
            .find(|grade| grade.as_str() == s.trim())
            .ok_or_else(|| CoreError::InvalidInput("grade".to_string(), s.to_string()))
    }
}
