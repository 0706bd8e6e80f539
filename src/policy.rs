use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Guild subscription tier as supplied by the chat gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum, Default)]
pub enum GuildTier {
    #[default]
    None,
    Tier1,
    Tier2,
    Tier3,
}

impl GuildTier {
    /// Maximum permitted output size in megabytes for this tier.
    pub fn max_file_size_mb(&self) -> u64 {
        match self {
            GuildTier::Tier3 => 100,
            GuildTier::Tier2 => 50,
            _ => 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn top_tier_gets_the_largest_ceiling() {
        assert_eq!(GuildTier::Tier3.max_file_size_mb(), 100);
        assert_eq!(GuildTier::Tier2.max_file_size_mb(), 50);
    }

    #[test]
    fn unrecognized_tiers_fall_back_to_the_default_ceiling() {
        assert_eq!(GuildTier::None.max_file_size_mb(), 10);
        assert_eq!(GuildTier::Tier1.max_file_size_mb(), 10);
    }
}
