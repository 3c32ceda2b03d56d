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

//! Gas pricing and accounting.
//!
//! [`FeeEstimatorImpl`] produces fee suggestions per chain and polices
//! client-submitted fees against a rolling record of recent minima. The
//! free functions cover pre-verification gas and the gas limits derived
//! from simulation output.

use std::time::{SystemTime, UNIX_EPOCH};

use tokio::sync::Mutex;
use warden_provider::EvmProvider;
use warden_types::{chain::ChainSpec, GasFees, UserOperationVariant};
use warden_utils::math;

mod oracle;
pub use oracle::{next_base_fee, FeeOracle, GasStationOracle, LegacyOracle, ProviderOracle};

mod tracker;
use tracker::RollingMinimum;

/// Default seconds of fee observations kept per rolling queue.
pub const DEFAULT_TIME_VALIDITY_SECONDS: u32 = 10;

/// Gas added to the derived call gas limit for the EntryPoint's inner call
/// overhead.
const INNER_CALL_GAS_OVERHEAD: u128 = 9_000;

/// Lower bound on the derived call gas limit.
const MIN_CALL_GAS_LIMIT: u128 = 21_000;

/// Headroom percentage applied to the observed verification gas.
const VERIFICATION_GAS_HEADROOM_PERCENT: u128 = 150;

/// Fee estimation settings.
#[derive(Clone, Copy, Debug)]
pub struct FeeSettings {
    /// Seconds of observations kept per rolling fee queue
    pub time_validity_seconds: u32,
}

impl Default for FeeSettings {
    fn default() -> Self {
        Self {
            time_validity_seconds: DEFAULT_TIME_VALIDITY_SECONDS,
        }
    }
}

/// Errors from fee estimation and fee validation.
#[derive(Debug, thiserror::Error)]
pub enum FeeError {
    /// Submitted max fee is below the recently observed minimum
    #[error("maxFeePerGas is too low, expected at least {minimum}, got: {submitted}")]
    MaxFeeTooLow {
        /// Submitted fee, wei
        submitted: u128,
        /// Minimum acceptable fee, wei
        minimum: u128,
    },
    /// Submitted priority fee is below the recently observed minimum
    #[error("maxPriorityFeePerGas is too low, expected at least {minimum}, got: {submitted}")]
    MaxPriorityFeeTooLow {
        /// Submitted fee, wei
        submitted: u128,
        /// Minimum acceptable fee, wei
        minimum: u128,
    },
    /// Anything infrastructural
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Produces fee suggestions and validates client-submitted fees.
#[async_trait::async_trait]
pub trait FeeEstimator: Send + Sync {
    /// Produces the fees a user operation should declare right now.
    async fn get_gas_price(&self) -> Result<GasFees, FeeError>;

    /// Checks submitted fees against the minima observed over the
    /// configured validity window.
    async fn validate_gas_price(&self, submitted: GasFees) -> Result<(), FeeError>;
}

struct FeeTrackers {
    max_fee: RollingMinimum,
    max_priority_fee: RollingMinimum,
}

/// Fee estimator over a chain-selected fee source.
///
/// Chains with a gas station use it first and fall back to the node
/// estimator when the fetch fails. Every successful estimate is bumped and
/// floored per the chain's pricing table, then recorded into the rolling
/// minimum queues that back [`FeeEstimator::validate_gas_price`].
pub struct FeeEstimatorImpl {
    chain_spec: ChainSpec,
    oracle: Box<dyn FeeOracle>,
    gas_station: Option<GasStationOracle>,
    trackers: Mutex<FeeTrackers>,
}

impl FeeEstimatorImpl {
    /// Creates an estimator for `chain_spec`, picking the fee source from
    /// its EIP-1559 support and gas station fields.
    pub fn new<P: EvmProvider + 'static>(
        chain_spec: ChainSpec,
        provider: P,
        settings: FeeSettings,
    ) -> anyhow::Result<Self> {
        let oracle: Box<dyn FeeOracle> = if chain_spec.eip1559_enabled {
            Box::new(ProviderOracle::new(provider))
        } else {
            Box::new(LegacyOracle::new(provider))
        };
        let gas_station = chain_spec
            .gas_station_url
            .as_deref()
            .map(GasStationOracle::new)
            .transpose()?;
        let capacity = settings.time_validity_seconds as usize;
        Ok(Self {
            chain_spec,
            oracle,
            gas_station,
            trackers: Mutex::new(FeeTrackers {
                max_fee: RollingMinimum::new(capacity),
                max_priority_fee: RollingMinimum::new(capacity),
            }),
        })
    }

    async fn fetch_fees(&self) -> Result<GasFees, FeeError> {
        if let Some(station) = &self.gas_station {
            match station.estimate_fees().await {
                Ok(fees) => return Ok(fees),
                Err(e) => {
                    tracing::warn!("gas station fetch failed, using node estimate: {e:#}");
                }
            }
        }
        Ok(self.oracle.estimate_fees().await?)
    }

    /// Chain pricing policy: raise the priority fee to the chain minimum,
    /// keep the max fee at least as large, bump both by the chain
    /// percentage, and collapse them on chains that price both the same.
    fn apply_pricing(&self, fees: GasFees) -> GasFees {
        let spec = &self.chain_spec;

        let max_priority_fee_per_gas = fees
            .max_priority_fee_per_gas
            .max(spec.min_max_priority_fee_per_gas);
        let max_fee_per_gas = fees.max_fee_per_gas.max(max_priority_fee_per_gas);

        let mut bumped = GasFees {
            max_fee_per_gas: math::increase_by_percent(max_fee_per_gas, spec.fee_bump_percent),
            max_priority_fee_per_gas: math::increase_by_percent(
                max_priority_fee_per_gas,
                spec.fee_bump_percent,
            ),
        };
        if spec.collapse_fees_to_max {
            let collapsed = bumped.max_fee_per_gas.max(bumped.max_priority_fee_per_gas);
            bumped = GasFees {
                max_fee_per_gas: collapsed,
                max_priority_fee_per_gas: collapsed,
            };
        }

        bumped.max(GasFees {
            max_fee_per_gas: spec.min_max_fee_per_gas,
            max_priority_fee_per_gas: spec.min_max_priority_fee_per_gas,
        })
    }

    async fn record(&self, fees: GasFees) {
        let now_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or_default();
        let mut trackers = self.trackers.lock().await;
        trackers.max_fee.record(fees.max_fee_per_gas, now_ms);
        trackers
            .max_priority_fee
            .record(fees.max_priority_fee_per_gas, now_ms);
    }
}

#[async_trait::async_trait]
impl FeeEstimator for FeeEstimatorImpl {
    async fn get_gas_price(&self) -> Result<GasFees, FeeError> {
        let fees = self.fetch_fees().await?;
        let fees = self.apply_pricing(fees);
        self.record(fees).await;
        Ok(fees)
    }

    async fn validate_gas_price(&self, submitted: GasFees) -> Result<(), FeeError> {
        let cold = self.trackers.lock().await.max_fee.is_empty();
        if cold {
            self.get_gas_price().await?;
        }

        let (min_max_fee, min_priority_fee) = {
            let trackers = self.trackers.lock().await;
            (
                trackers.max_fee.minimum().unwrap_or_default(),
                trackers.max_priority_fee.minimum().unwrap_or_default(),
            )
        };

        if submitted.max_fee_per_gas < min_max_fee {
            return Err(FeeError::MaxFeeTooLow {
                submitted: submitted.max_fee_per_gas,
                minimum: min_max_fee,
            });
        }
        if submitted.max_priority_fee_per_gas < min_priority_fee {
            return Err(FeeError::MaxPriorityFeeTooLow {
                submitted: submitted.max_priority_fee_per_gas,
                minimum: min_priority_fee,
            });
        }
        Ok(())
    }
}

/// Minimum `preVerificationGas` an operation must declare on this chain.
///
/// Chains that charge for data availability add their surcharge through
/// `da_gas`; everywhere else the static calldata accounting stands alone.
pub fn calc_required_pre_verification_gas(
    chain_spec: &ChainSpec,
    op: &UserOperationVariant,
    da_gas: u128,
) -> u128 {
    op.static_pre_verification_gas(chain_spec) + da_gas
}

/// Gas limits implied by a simulation's `(preOpGas, prefund)` observation.
///
/// The verification limit is the observed pre-call gas net of
/// pre-verification gas, with 50% headroom. The call limit is what the
/// prefund can still buy at the operation's fee after the pre-call phase,
/// plus the EntryPoint's inner call overhead.
pub fn calc_verification_and_call_gas_limits(
    op: &UserOperationVariant,
    pre_op_gas: alloy_primitives::U256,
    prefund: alloy_primitives::U256,
) -> (u128, u128) {
    let pre_op_gas: u128 = pre_op_gas.saturating_to();
    let verification_gas_limit = math::scale_by_percent(
        pre_op_gas.saturating_sub(op.pre_verification_gas()),
        VERIFICATION_GAS_HEADROOM_PERCENT,
    );

    let gas_price = op.max_fee_per_gas().max(1);
    let call_gas_limit = (prefund / alloy_primitives::U256::from(gas_price))
        .saturating_to::<u128>()
        .saturating_add(INNER_CALL_GAS_OVERHEAD)
        .saturating_sub(pre_op_gas)
        .max(MIN_CALL_GAS_LIMIT);

    (verification_gas_limit, call_gas_limit)
}

#[cfg(test)]
mod tests {
    use alloy_primitives::U256;
    use warden_provider::{test_utils::MockEvmProvider, FeeEstimate};
    use warden_types::{chain::GWEI, v0_6};

    use super::*;

    fn estimator_with_fees(
        chain_spec: ChainSpec,
        max_fee: u128,
        priority_fee: u128,
    ) -> FeeEstimatorImpl {
        let mut provider = MockEvmProvider::new();
        provider.expect_estimate_fees().returning(move |_| {
            Ok(FeeEstimate {
                gas_price: None,
                max_fee_per_gas: Some(max_fee),
                max_priority_fee_per_gas: Some(priority_fee),
            })
        });
        FeeEstimatorImpl::new(chain_spec, provider, FeeSettings::default()).unwrap()
    }

    #[tokio::test]
    async fn test_bump_percent() {
        let estimator = estimator_with_fees(ChainSpec::sepolia(), 1000, 100);
        let fees = estimator.get_gas_price().await.unwrap();
        assert_eq!(fees.max_fee_per_gas, 1200);
        assert_eq!(fees.max_priority_fee_per_gas, 120);
    }

    #[tokio::test]
    async fn test_no_bump_on_unknown_chain() {
        let estimator = estimator_with_fees(ChainSpec::for_chain(999), 1000, 100);
        let fees = estimator.get_gas_price().await.unwrap();
        assert_eq!(fees.max_fee_per_gas, 1000);
        assert_eq!(fees.max_priority_fee_per_gas, 100);
    }

    #[tokio::test]
    async fn test_priority_minimum_raises_max_fee() {
        // Polygon's 31 gwei priority minimum pulls the max fee up with it.
        let mut spec = ChainSpec::polygon();
        spec.gas_station_url = None;
        let estimator = estimator_with_fees(spec, GWEI, GWEI / 2);
        let fees = estimator.get_gas_price().await.unwrap();
        assert_eq!(fees.max_priority_fee_per_gas, 31 * GWEI);
        assert_eq!(fees.max_fee_per_gas, 31 * GWEI);
    }

    #[tokio::test]
    async fn test_celo_collapses_fees() {
        let estimator = estimator_with_fees(ChainSpec::celo(), 1000, 100);
        let fees = estimator.get_gas_price().await.unwrap();
        // 150% bump, then both components take the larger value.
        assert_eq!(fees.max_fee_per_gas, 1500);
        assert_eq!(fees.max_priority_fee_per_gas, 1500);
    }

    #[tokio::test]
    async fn test_dfk_floor() {
        let estimator = estimator_with_fees(ChainSpec::dfk(), 1000, 100);
        let fees = estimator.get_gas_price().await.unwrap();
        assert_eq!(fees.max_fee_per_gas, 5 * GWEI);
        assert_eq!(fees.max_priority_fee_per_gas, 5 * GWEI);
    }

    #[tokio::test]
    async fn test_validate_primes_cold_queues() {
        let estimator = estimator_with_fees(ChainSpec::for_chain(999), 1000, 100);
        // No get_gas_price has run; validation fetches one itself.
        let ok = GasFees {
            max_fee_per_gas: 1000,
            max_priority_fee_per_gas: 100,
        };
        estimator.validate_gas_price(ok).await.unwrap();
    }

    #[tokio::test]
    async fn test_validate_rejects_below_minimum() {
        let estimator = estimator_with_fees(ChainSpec::for_chain(999), 1000, 100);
        estimator.get_gas_price().await.unwrap();

        let low_fee = GasFees {
            max_fee_per_gas: 999,
            max_priority_fee_per_gas: 100,
        };
        let err = estimator.validate_gas_price(low_fee).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "maxFeePerGas is too low, expected at least 1000, got: 999"
        );

        let low_priority = GasFees {
            max_fee_per_gas: 1000,
            max_priority_fee_per_gas: 99,
        };
        let err = estimator
            .validate_gas_price(low_priority)
            .await
            .unwrap_err();
        assert!(matches!(err, FeeError::MaxPriorityFeeTooLow { .. }));
    }

    #[tokio::test]
    async fn test_validate_monotone() {
        let estimator = estimator_with_fees(ChainSpec::for_chain(999), 1000, 100);
        estimator.get_gas_price().await.unwrap();

        let accepted = GasFees {
            max_fee_per_gas: 1000,
            max_priority_fee_per_gas: 100,
        };
        estimator.validate_gas_price(accepted).await.unwrap();

        // Componentwise-larger fees stay accepted.
        let larger = GasFees {
            max_fee_per_gas: 2000,
            max_priority_fee_per_gas: 150,
        };
        estimator.validate_gas_price(larger).await.unwrap();
    }

    #[test]
    fn test_gas_limit_derivation() {
        let op = UserOperationVariant::V0_6(v0_6::UserOperation {
            pre_verification_gas: 50_000,
            max_fee_per_gas: 10 * GWEI,
            ..Default::default()
        });
        let (vgl, cgl) =
            calc_verification_and_call_gas_limits(&op, U256::from(100_000), U256::from(170_000));
        assert_eq!(vgl, 75_000);
        // The prefund buys nothing at this fee; the floor holds.
        assert_eq!(cgl, MIN_CALL_GAS_LIMIT);

        let rich_prefund = U256::from(10).pow(U256::from(18));
        let (_, cgl) = calc_verification_and_call_gas_limits(&op, U256::from(100_000), rich_prefund);
        assert_eq!(cgl, 100_000_000 + 9_000 - 100_000);
    }
}
