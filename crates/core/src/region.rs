use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::UnknownRegion;

/// The fixed set of deployment-status partitions.
///
/// Declaration order is display order: `Overall` first, then the regional
/// partitions. Every status board carries exactly one entry per variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Region {
    Overall,
    Au,
    Ca,
    Or,
    Us,
}

impl Region {
    pub const COUNT: usize = 5;

    pub const ALL: [Region; Region::COUNT] =
        [Region::Overall, Region::Au, Region::Ca, Region::Or, Region::Us];

    pub fn key(self) -> &'static str {
        match self {
            Self::Overall => "overall",
            Self::Au => "au",
            Self::Ca => "ca",
            Self::Or => "or",
            Self::Us => "us",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Overall => "Overall",
            Self::Au => "AU",
            Self::Ca => "CA",
            Self::Or => "OR",
            Self::Us => "US",
        }
    }

    /// Heading shown in front of the status text. The overall partition is
    /// presented as the headline `Status`.
    pub fn heading(self) -> &'static str {
        match self {
            Self::Overall => "Status",
            other => other.label(),
        }
    }

    pub fn index(self) -> usize {
        match self {
            Self::Overall => 0,
            Self::Au => 1,
            Self::Ca => 2,
            Self::Or => 3,
            Self::Us => 4,
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Region {
    type Err = UnknownRegion;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "overall" => Ok(Self::Overall),
            "au" => Ok(Self::Au),
            "ca" => Ok(Self::Ca),
            "or" => Ok(Self::Or),
            "us" => Ok(Self::Us),
            other => Err(UnknownRegion(other.to_owned())),
        }
    }
}
