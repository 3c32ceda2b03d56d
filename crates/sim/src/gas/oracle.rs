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

//! Fee sources.
//!
//! Each source knows one way of coming up with a fee suggestion: the node's
//! EIP-1559 estimator (with fee-history and base-fee fallbacks), the legacy
//! `eth_gasPrice` path, or an external gas station. The fee estimator picks
//! a source per chain and applies chain pricing policy on top.

use anyhow::Context;
use serde::Deserialize;
use url::Url;
use warden_provider::{BlockId, BlockNumberOrTag, EvmProvider};
use warden_types::{chain::GWEI, GasFees};

/// Number of blocks of fee history consulted for the priority-fee fallback.
const FEE_HISTORY_BLOCK_COUNT: u64 = 10;

/// Reward percentile consulted for the priority-fee fallback.
const FEE_HISTORY_PERCENTILE: f64 = 20.0;

/// Divisor for the minimum priority fee relative to the max fee.
const MIN_PRIORITY_FEE_DIVISOR: u128 = 200;

/// A source of fee suggestions.
#[async_trait::async_trait]
pub trait FeeOracle: Send + Sync {
    /// Produces a raw fee suggestion, before chain pricing policy.
    async fn estimate_fees(&self) -> anyhow::Result<GasFees>;
}

/// EIP-1559 estimation through the node, with fallbacks for nodes that
/// return partial estimates.
#[derive(Clone, Debug)]
pub struct ProviderOracle<P> {
    provider: P,
}

impl<P> ProviderOracle<P> {
    /// Creates the oracle.
    pub fn new(provider: P) -> Self {
        Self { provider }
    }
}

impl<P: EvmProvider> ProviderOracle<P> {
    /// Average of the rewards at the configured percentile over recent
    /// blocks, capped at `max_fee`.
    async fn priority_fee_from_history(&self, max_fee: u128) -> anyhow::Result<u128> {
        let history = self
            .provider
            .fee_history(
                FEE_HISTORY_BLOCK_COUNT,
                BlockNumberOrTag::Latest,
                &[FEE_HISTORY_PERCENTILE],
            )
            .await?;
        let rewards: Vec<u128> = history
            .reward
            .unwrap_or_default()
            .iter()
            .filter_map(|block| block.first().copied())
            .collect();
        if rewards.is_empty() {
            return Ok(0);
        }
        let avg = rewards.iter().sum::<u128>() / rewards.len() as u128;
        Ok(avg.min(max_fee))
    }

    async fn projected_base_fee(&self) -> anyhow::Result<u128> {
        let block = self
            .provider
            .get_block(BlockId::latest())
            .await?
            .context("latest block should exist")?;
        Ok(next_base_fee(
            block.header.base_fee_per_gas.unwrap_or_default() as u128,
            block.header.gas_used as u128,
            block.header.gas_limit as u128,
        ))
    }
}

#[async_trait::async_trait]
impl<P: EvmProvider> FeeOracle for ProviderOracle<P> {
    async fn estimate_fees(&self) -> anyhow::Result<GasFees> {
        let estimate = self.provider.estimate_fees(false).await?;

        let mut max_priority_fee_per_gas = match estimate.max_priority_fee_per_gas {
            Some(fee) => fee,
            None => {
                self.priority_fee_from_history(estimate.max_fee_per_gas.unwrap_or_default())
                    .await?
            }
        };

        let max_fee_per_gas = match estimate.max_fee_per_gas {
            Some(fee) => fee,
            None => self.projected_base_fee().await? + max_priority_fee_per_gas,
        };

        if max_priority_fee_per_gas == 0 {
            max_priority_fee_per_gas = max_fee_per_gas / MIN_PRIORITY_FEE_DIVISOR;
        }

        Ok(GasFees {
            max_fee_per_gas,
            max_priority_fee_per_gas,
        })
    }
}

/// The base fee the next block will charge, from the latest block's fields.
pub fn next_base_fee(base: u128, gas_used: u128, gas_limit: u128) -> u128 {
    let target = gas_limit / 2;
    if target == 0 || gas_used == target {
        return base;
    }
    if gas_used > target {
        base + (base * (gas_used - target) / target / 8).max(1)
    } else {
        base - base * (target - gas_used) / target / 8
    }
}

/// Legacy pricing for chains without EIP-1559 support: one gas price fills
/// both fee fields.
#[derive(Clone, Debug)]
pub struct LegacyOracle<P> {
    provider: P,
}

impl<P> LegacyOracle<P> {
    /// Creates the oracle.
    pub fn new(provider: P) -> Self {
        Self { provider }
    }
}

#[async_trait::async_trait]
impl<P: EvmProvider> FeeOracle for LegacyOracle<P> {
    async fn estimate_fees(&self) -> anyhow::Result<GasFees> {
        let gas_price = match self.provider.estimate_fees(true).await?.gas_price {
            Some(price) => price,
            None => self.provider.gas_price().await?,
        };
        Ok(GasFees {
            max_fee_per_gas: gas_price,
            max_priority_fee_per_gas: gas_price,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
struct GasStationTier {
    max_fee_per_gas: f64,
    max_priority_fee_per_gas: f64,
}

/// Gas station response: four pricing tiers, each in gwei.
///
/// Tier shapes are strict so a format change on the station's side fails
/// loudly instead of producing nonsense prices.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GasStationResponse {
    #[allow(dead_code)]
    safe_low: GasStationTier,
    #[allow(dead_code)]
    standard: GasStationTier,
    fast: GasStationTier,
    #[allow(dead_code)]
    fastest: GasStationTier,
}

fn gwei_to_wei(gwei: f64) -> u128 {
    (gwei * GWEI as f64) as u128
}

fn parse_gas_station_response(body: &str) -> anyhow::Result<GasFees> {
    let response: GasStationResponse =
        serde_json::from_str(body).context("gas station response should match schema")?;
    Ok(GasFees {
        max_fee_per_gas: gwei_to_wei(response.fast.max_fee_per_gas),
        max_priority_fee_per_gas: gwei_to_wei(response.fast.max_priority_fee_per_gas),
    })
}

/// Fee suggestions from a public gas station endpoint, using its `fast`
/// tier. Polygon chains publish one.
#[derive(Clone, Debug)]
pub struct GasStationOracle {
    url: Url,
    client: reqwest::Client,
}

impl GasStationOracle {
    /// Creates an oracle for the station at `url`.
    pub fn new(url: &str) -> anyhow::Result<Self> {
        Ok(Self {
            url: url.parse().context("invalid gas station url")?,
            client: reqwest::Client::new(),
        })
    }
}

#[async_trait::async_trait]
impl FeeOracle for GasStationOracle {
    async fn estimate_fees(&self) -> anyhow::Result<GasFees> {
        let body = self
            .client
            .get(self.url.clone())
            .send()
            .await
            .context("gas station request failed")?
            .error_for_status()
            .context("gas station returned an error status")?
            .text()
            .await
            .context("gas station response should be readable")?;
        parse_gas_station_response(&body)
    }
}

#[cfg(test)]
mod tests {
    use warden_provider::{test_utils::MockEvmProvider, FeeEstimate};

    use super::*;

    #[test]
    fn test_next_base_fee_at_target() {
        assert_eq!(next_base_fee(1000, 500, 1000), 1000);
    }

    #[test]
    fn test_next_base_fee_above_target() {
        // 25% above target: 1000 * 125 / 500 / 8 = 31
        assert_eq!(next_base_fee(1000, 625, 1000), 1031);
        // Tiny overshoot still moves the fee by at least one wei.
        assert_eq!(next_base_fee(2, 501, 1000), 3);
    }

    #[test]
    fn test_next_base_fee_below_target() {
        // 25% below target: 1000 * 125 / 500 / 8 = 31
        assert_eq!(next_base_fee(1000, 375, 1000), 969);
        // An empty block shaves off a full eighth.
        assert_eq!(next_base_fee(1000, 0, 1000), 875);
    }

    #[tokio::test]
    async fn test_provider_oracle_passthrough() {
        let mut provider = MockEvmProvider::new();
        provider.expect_estimate_fees().returning(|_| {
            Ok(FeeEstimate {
                gas_price: None,
                max_fee_per_gas: Some(100),
                max_priority_fee_per_gas: Some(7),
            })
        });

        let fees = ProviderOracle::new(provider).estimate_fees().await.unwrap();
        assert_eq!(fees.max_fee_per_gas, 100);
        assert_eq!(fees.max_priority_fee_per_gas, 7);
    }

    #[tokio::test]
    async fn test_provider_oracle_priority_fee_from_history() {
        let mut provider = MockEvmProvider::new();
        provider.expect_estimate_fees().returning(|_| {
            Ok(FeeEstimate {
                gas_price: None,
                max_fee_per_gas: Some(100),
                max_priority_fee_per_gas: None,
            })
        });
        provider.expect_fee_history().returning(|_, _, _| {
            Ok(warden_provider::FeeHistory {
                reward: Some(vec![vec![10], vec![20], vec![30]]),
                ..Default::default()
            })
        });

        let fees = ProviderOracle::new(provider).estimate_fees().await.unwrap();
        // Average reward (20) is below the max fee, so it wins.
        assert_eq!(fees.max_priority_fee_per_gas, 20);
        assert_eq!(fees.max_fee_per_gas, 100);
    }

    #[tokio::test]
    async fn test_provider_oracle_history_capped_at_max_fee() {
        let mut provider = MockEvmProvider::new();
        provider.expect_estimate_fees().returning(|_| {
            Ok(FeeEstimate {
                gas_price: None,
                max_fee_per_gas: Some(15),
                max_priority_fee_per_gas: None,
            })
        });
        provider.expect_fee_history().returning(|_, _, _| {
            Ok(warden_provider::FeeHistory {
                reward: Some(vec![vec![100], vec![200]]),
                ..Default::default()
            })
        });

        let fees = ProviderOracle::new(provider).estimate_fees().await.unwrap();
        assert_eq!(fees.max_priority_fee_per_gas, 15);
    }

    #[tokio::test]
    async fn test_provider_oracle_zero_priority_fee_floor() {
        let mut provider = MockEvmProvider::new();
        provider.expect_estimate_fees().returning(|_| {
            Ok(FeeEstimate {
                gas_price: None,
                max_fee_per_gas: Some(10_000),
                max_priority_fee_per_gas: Some(0),
            })
        });

        let fees = ProviderOracle::new(provider).estimate_fees().await.unwrap();
        assert_eq!(fees.max_priority_fee_per_gas, 10_000 / 200);
    }

    #[tokio::test]
    async fn test_legacy_oracle_gas_price_fallback() {
        let mut provider = MockEvmProvider::new();
        provider
            .expect_estimate_fees()
            .returning(|_| Ok(FeeEstimate::default()));
        provider.expect_gas_price().returning(|| Ok(42));

        let fees = LegacyOracle::new(provider).estimate_fees().await.unwrap();
        assert_eq!(fees.max_fee_per_gas, 42);
        assert_eq!(fees.max_priority_fee_per_gas, 42);
    }

    #[test]
    fn test_gas_station_parse() {
        let body = r#"{
            "safeLow": {"maxFeePerGas": 30.0, "maxPriorityFeePerGas": 1.0},
            "standard": {"maxFeePerGas": 32.5, "maxPriorityFeePerGas": 2.0},
            "fast": {"maxFeePerGas": 35.5, "maxPriorityFeePerGas": 3.5},
            "fastest": {"maxFeePerGas": 40.0, "maxPriorityFeePerGas": 5.0}
        }"#;
        let fees = parse_gas_station_response(body).unwrap();
        assert_eq!(fees.max_fee_per_gas, 35_500_000_000);
        assert_eq!(fees.max_priority_fee_per_gas, 3_500_000_000);
    }

    #[test]
    fn test_gas_station_rejects_unknown_tier_shape() {
        let body = r#"{
            "safeLow": {"maxFeePerGas": 30.0, "maxPriorityFeePerGas": 1.0, "surprise": 1},
            "standard": {"maxFeePerGas": 32.5, "maxPriorityFeePerGas": 2.0},
            "fast": {"maxFeePerGas": 35.5, "maxPriorityFeePerGas": 3.5},
            "fastest": {"maxFeePerGas": 40.0, "maxPriorityFeePerGas": 5.0}
        }"#;
        assert!(parse_gas_station_response(body).is_err());
    }

    #[test]
    fn test_gas_station_rejects_missing_tier() {
        let body = r#"{
            "fast": {"maxFeePerGas": 35.5, "maxPriorityFeePerGas": 3.5}
        }"#;
        assert!(parse_gas_station_response(body).is_err());
    }
}
