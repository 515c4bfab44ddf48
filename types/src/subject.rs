//! Subjects: the entities a claim is verified against.

use crate::error::TypeError;
use crate::time::Timestamp;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier of a dare, campaign slot, or points batch.
///
/// Non-empty, at most [`SubjectId::MAX_LEN`] characters drawn from
/// `[A-Za-z0-9_.:-]`. The character set never includes a NUL byte, which the
/// LMDB backend relies on as a key separator.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SubjectId(String);

impl SubjectId {
    pub const MAX_LEN: usize = 128;

    pub fn parse(raw: impl Into<String>) -> Result<Self, TypeError> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(TypeError::InvalidSubjectId("empty".into()));
        }
        if raw.len() > Self::MAX_LEN {
            return Err(TypeError::InvalidSubjectId(format!(
                "longer than {} characters",
                Self::MAX_LEN
            )));
        }
        if let Some(bad) = raw
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | ':' | '-')))
        {
            return Err(TypeError::InvalidSubjectId(format!(
                "{raw}: unexpected character {bad:?}"
            )));
        }
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SubjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for SubjectId {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(s)
    }
}

impl From<SubjectId> for String {
    fn from(id: SubjectId) -> Self {
        id.0
    }
}

/// What kind of on-chain action a subject represents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubjectKind {
    /// A dare decided by an on-chain vote tally.
    Dare,
    /// A campaign slot filled by an on-chain transaction.
    CampaignSlot,
    /// A points batch awarded on-chain.
    PointsBatch,
}

impl SubjectKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dare => "dare",
            Self::CampaignSlot => "campaign_slot",
            Self::PointsBatch => "points_batch",
        }
    }
}

impl fmt::Display for SubjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubjectKind {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dare" => Ok(Self::Dare),
            "campaign_slot" => Ok(Self::CampaignSlot),
            "points_batch" => Ok(Self::PointsBatch),
            other => Err(TypeError::UnknownSubjectKind(other.to_string())),
        }
    }
}

/// A registered subject.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    pub id: SubjectId,
    pub kind: SubjectKind,
    pub registered_at: Timestamp,
}
