use crate::fetch::RetryPolicy;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::time::Duration;

/// The profile sources this crate knows how to read
///
/// Config files name them in lower case; reports use the canonical name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    CodeChef,
    Codeforces,
    HackerRank,
    Skillrack,
    GitHub,
    LeetCode,
}

impl Platform {
    /// All platforms, in the default report order
    pub const ALL: [Platform; 6] = [
        Platform::CodeChef,
        Platform::Codeforces,
        Platform::HackerRank,
        Platform::Skillrack,
        Platform::GitHub,
        Platform::LeetCode,
    ];

    /// Canonical display name
    pub fn name(&self) -> &'static str {
        match self {
            Self::CodeChef => "CodeChef",
            Self::Codeforces => "Codeforces",
            Self::HackerRank => "HackerRank",
            Self::Skillrack => "Skillrack",
            Self::GitHub => "GitHub",
            Self::LeetCode => "LeetCode",
        }
    }

    /// Base URL requests are built against. Skillrack takes full URLs instead.
    pub fn default_base_url(&self) -> &'static str {
        match self {
            Self::CodeChef => "https://www.codechef.com",
            Self::Codeforces => "https://codeforces.com",
            Self::HackerRank => "https://www.hackerrank.com",
            Self::Skillrack => "https://www.skillrack.com",
            Self::GitHub => "https://api.github.com",
            Self::LeetCode => "https://leetcode.com",
        }
    }

    /// Per-request timeout
    pub fn default_timeout(&self) -> Duration {
        match self {
            Self::CodeChef | Self::Codeforces => Duration::from_secs(15),
            Self::HackerRank | Self::GitHub | Self::LeetCode => Duration::from_secs(20),
            Self::Skillrack => Duration::from_secs(5),
        }
    }

    /// Attempts and linear backoff base
    pub fn default_retry(&self) -> RetryPolicy {
        match self {
            Self::CodeChef => RetryPolicy::linear(5, Duration::from_millis(3000)),
            Self::Codeforces | Self::HackerRank => {
                RetryPolicy::linear(5, Duration::from_millis(2000))
            }
            Self::Skillrack => RetryPolicy::linear(5, Duration::from_millis(1000)),
            Self::GitHub | Self::LeetCode => RetryPolicy::linear(3, Duration::from_millis(2000)),
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for Platform {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl std::str::FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Platform::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown platform '{}'", s))
    }
}
