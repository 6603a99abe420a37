//! Forge configuration.

/// Configuration for block assembly and mining.
#[derive(Clone, Debug)]
pub struct ForgeConfig {
    /// Maximum transactions per block.
    pub max_block_transactions: usize,
    /// Target difficulty for new candidates (leading zero hex digits).
    pub difficulty: u32,
    /// Nonce attempts per difficulty level before the stuck-search guard
    /// relaxes the target.
    pub attempt_budget: u64,
}

impl Default for ForgeConfig {
    fn default() -> Self {
        Self {
            max_block_transactions: 100,
            difficulty: 4,
            attempt_budget: 1_000_000,
        }
    }
}

impl ForgeConfig {
    /// Creates a fast config for testing.
    pub fn for_testing() -> Self {
        Self {
            max_block_transactions: 10,
            difficulty: 2,
            attempt_budget: 10_000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ForgeConfig::default();
        assert_eq!(config.difficulty, 4);
        assert_eq!(config.attempt_budget, 1_000_000);
        assert_eq!(config.max_block_transactions, 100);
    }
}
