// This file is part of Warden.
//
// Warden is free software: you can redistribute it and/or modify it under the
// terms of the GNU Lesser General Public License as published by the Free Software
// Foundation, either version 3 of the License, or (at your option) any later version.
//
// Warden is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.
// See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with Warden.
// If not, see https://www.gnu.org/licenses/.

//! Chain specification.
//!
//! All per-chain behavior lives here: calldata gas accounting, fee bump
//! percentages, priority-fee minimums, fee floors, and the gas-station
//! endpoint for chains that publish one. Code elsewhere reads these fields
//! instead of matching on chain ids.

use serde::{Deserialize, Serialize};

/// Wei per gwei.
pub const GWEI: u128 = 1_000_000_000;

// Chain ids with table entries.
const MAINNET: u64 = 1;
const SEPOLIA: u64 = 11_155_111;
const POLYGON: u64 = 137;
const POLYGON_MUMBAI: u64 = 80_001;
const CELO: u64 = 42_220;
const CELO_ALFAJORES: u64 = 44_787;
const DFK: u64 = 53_935;
const ARBITRUM_ONE: u64 = 42_161;
const BASE: u64 = 8_453;
const SCROLL: u64 = 534_352;
const AVALANCHE: u64 = 43_114;

const POLYGON_GAS_STATION_URL: &str = "https://gasstation.polygon.technology/v2";
const MUMBAI_GAS_STATION_URL: &str = "https://gasstation-testnet.polygon.technology/v2";

/// Chain specification.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct ChainSpec {
    /// Chain name, for logs and metrics labels
    pub name: String,
    /// Chain id
    pub id: u64,
    /// False on chains whose nodes reject EIP-1559 fee fields
    pub eip1559_enabled: bool,

    // Calldata gas accounting, used by pre-verification gas estimation.
    /// Intrinsic gas of the enclosing transaction
    pub transaction_intrinsic_gas: u64,
    /// Gas per zero calldata byte
    pub calldata_zero_byte_gas: u64,
    /// Gas per non-zero calldata byte
    pub calldata_non_zero_byte_gas: u64,
    /// EntryPoint bookkeeping gas per 32-byte word of the packed operation
    pub per_user_op_word_gas: u64,
    /// Fixed EntryPoint overhead per v0.6 operation
    pub per_user_op_v0_6_gas: u64,
    /// Fixed EntryPoint overhead per v0.7 operation
    pub per_user_op_v0_7_gas: u64,
    /// Extra overhead when the operation deploys the account
    pub per_user_op_deploy_overhead_gas: u64,

    // Fee pricing.
    /// Percentage points added to both fee components after estimation
    pub fee_bump_percent: u128,
    /// Lower bound applied to the priority fee before bumping, wei
    pub min_max_priority_fee_per_gas: u128,
    /// Floors applied to the final estimate, wei
    pub min_max_fee_per_gas: u128,
    /// True on chains that price both fee components identically
    pub collapse_fees_to_max: bool,
    /// Gas station endpoint, for chains that publish one
    pub gas_station_url: Option<String>,
}

impl Default for ChainSpec {
    fn default() -> Self {
        Self {
            name: "unknown".to_string(),
            id: 0,
            eip1559_enabled: true,
            transaction_intrinsic_gas: 21_000,
            calldata_zero_byte_gas: 4,
            calldata_non_zero_byte_gas: 16,
            per_user_op_word_gas: 4,
            per_user_op_v0_6_gas: 18_300,
            per_user_op_v0_7_gas: 19_500,
            per_user_op_deploy_overhead_gas: 0,
            fee_bump_percent: 0,
            min_max_priority_fee_per_gas: 0,
            min_max_fee_per_gas: 0,
            collapse_fees_to_max: false,
            gas_station_url: None,
        }
    }
}

impl ChainSpec {
    /// Looks up the spec for a chain id, falling back to defaults for
    /// chains with no table entry.
    pub fn for_chain(id: u64) -> Self {
        match id {
            MAINNET => Self::mainnet(),
            SEPOLIA => Self::sepolia(),
            POLYGON => Self::polygon(),
            POLYGON_MUMBAI => Self::polygon_mumbai(),
            CELO => Self::celo(),
            CELO_ALFAJORES => Self::celo_alfajores(),
            DFK => Self::dfk(),
            ARBITRUM_ONE => Self::arbitrum_one(),
            BASE => Self::base(),
            SCROLL => Self::scroll(),
            AVALANCHE => Self::avalanche(),
            id => Self {
                id,
                ..Self::default()
            },
        }
    }

    /// Ethereum mainnet.
    pub fn mainnet() -> Self {
        Self {
            name: "ethereum".to_string(),
            id: MAINNET,
            fee_bump_percent: 11,
            ..Self::default()
        }
    }

    /// Sepolia testnet.
    pub fn sepolia() -> Self {
        Self {
            name: "sepolia".to_string(),
            id: SEPOLIA,
            fee_bump_percent: 20,
            ..Self::default()
        }
    }

    /// Polygon PoS.
    pub fn polygon() -> Self {
        Self {
            name: "polygon".to_string(),
            id: POLYGON,
            min_max_priority_fee_per_gas: 31 * GWEI,
            gas_station_url: Some(POLYGON_GAS_STATION_URL.to_string()),
            ..Self::default()
        }
    }

    /// Polygon Mumbai testnet.
    pub fn polygon_mumbai() -> Self {
        Self {
            name: "polygon-mumbai".to_string(),
            id: POLYGON_MUMBAI,
            min_max_priority_fee_per_gas: GWEI,
            gas_station_url: Some(MUMBAI_GAS_STATION_URL.to_string()),
            ..Self::default()
        }
    }

    /// Celo.
    pub fn celo() -> Self {
        Self {
            name: "celo".to_string(),
            id: CELO,
            fee_bump_percent: 50,
            collapse_fees_to_max: true,
            ..Self::default()
        }
    }

    /// Celo Alfajores testnet.
    pub fn celo_alfajores() -> Self {
        Self {
            name: "celo-alfajores".to_string(),
            id: CELO_ALFAJORES,
            fee_bump_percent: 50,
            collapse_fees_to_max: true,
            ..Self::default()
        }
    }

    /// DFK Chain.
    pub fn dfk() -> Self {
        Self {
            name: "dfk".to_string(),
            id: DFK,
            min_max_fee_per_gas: 5 * GWEI,
            min_max_priority_fee_per_gas: 5 * GWEI,
            ..Self::default()
        }
    }

    /// Arbitrum One.
    pub fn arbitrum_one() -> Self {
        Self {
            name: "arbitrum".to_string(),
            id: ARBITRUM_ONE,
            fee_bump_percent: 11,
            ..Self::default()
        }
    }

    /// Base.
    pub fn base() -> Self {
        Self {
            name: "base".to_string(),
            id: BASE,
            fee_bump_percent: 11,
            ..Self::default()
        }
    }

    /// Scroll.
    pub fn scroll() -> Self {
        Self {
            name: "scroll".to_string(),
            id: SCROLL,
            fee_bump_percent: 11,
            ..Self::default()
        }
    }

    /// Avalanche C-Chain.
    pub fn avalanche() -> Self {
        Self {
            name: "avalanche".to_string(),
            id: AVALANCHE,
            fee_bump_percent: 11,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_chain_known() {
        let spec = ChainSpec::for_chain(137);
        assert_eq!(spec.name, "polygon");
        assert_eq!(spec.min_max_priority_fee_per_gas, 31 * GWEI);
        assert!(spec.gas_station_url.is_some());
    }

    #[test]
    fn test_for_chain_unknown() {
        let spec = ChainSpec::for_chain(123_456);
        assert_eq!(spec.id, 123_456);
        assert_eq!(spec.fee_bump_percent, 0);
        assert!(spec.eip1559_enabled);
    }

    #[test]
    fn test_dfk_floors() {
        let spec = ChainSpec::dfk();
        assert_eq!(spec.min_max_fee_per_gas, 5 * GWEI);
        assert_eq!(spec.min_max_priority_fee_per_gas, 5 * GWEI);
    }

    #[test]
    fn test_serde_round_trip() {
        let spec = ChainSpec::celo();
        let json = serde_json::to_string(&spec).unwrap();
        let parsed: ChainSpec = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.id, spec.id);
        assert!(parsed.collapse_fees_to_max);
        assert_eq!(parsed.fee_bump_percent, 50);
    }
}
