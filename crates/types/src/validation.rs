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

//! Validation results and the packed `validationData` codec.
//!
//! Accounts and paymasters return a single 256-bit word from their
//! signature checks. Big-endian layout: bytes `[0..6)` hold `validAfter`,
//! bytes `[6..12)` hold `validUntil`, bytes `[12..32)` hold the aggregator
//! address. A zero aggregator means the signature verified; the sentinel
//! address `0x...01` means it did not; anything else names a signature
//! aggregator contract.

use alloy_primitives::{Address, Bytes, U256};
use warden_contracts::{v0_6, v0_7};

use crate::{Timestamp, ValidTimeRange};

/// An unpacked `validationData` word.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct ValidationData {
    /// Aggregator address. Zero means a valid signature.
    pub aggregator: Address,
    /// Start of the validity window
    pub valid_after: Timestamp,
    /// End of the validity window
    pub valid_until: Timestamp,
}

/// Account- and paymaster-side validation data merged into one record.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct MergedValidationData {
    /// True if the account's signature check did not pass
    pub account_sig_failed: bool,
    /// True if the paymaster's signature check did not pass
    pub paymaster_sig_failed: bool,
    /// Intersection of the two validity windows
    pub time_range: ValidTimeRange,
}

/// A timestamp that does not fit the 48-bit packed encoding.
#[derive(Copy, Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[error("timestamp {0} does not fit in 48 bits")]
pub struct TimestampTooLarge(pub u64);

/// Unpacks a `validationData` word.
///
/// A zero `validUntil` is canonicalized to `2^48 - 1`: the on-chain
/// convention for "never expires".
pub fn parse_validation_data(data: U256) -> ValidationData {
    let bytes = data.to_be_bytes::<32>();

    let mut u48_buf = [0_u8; 8];
    u48_buf[2..8].copy_from_slice(&bytes[0..6]);
    let valid_after = u64::from_be_bytes(u48_buf);

    u48_buf[2..8].copy_from_slice(&bytes[6..12]);
    let valid_until = u64::from_be_bytes(u48_buf);

    ValidationData {
        aggregator: Address::from_slice(&bytes[12..32]),
        valid_after: Timestamp::new(valid_after),
        valid_until: if valid_until == 0 {
            Timestamp::MAX_U48
        } else {
            Timestamp::new(valid_until)
        },
    }
}

/// Packs a triple back into a `validationData` word.
///
/// Rejects timestamps that would overflow their 48-bit fields.
pub fn pack_validation_data(data: ValidationData) -> Result<U256, TimestampTooLarge> {
    if !data.valid_after.fits_u48() {
        return Err(TimestampTooLarge(data.valid_after.seconds_since_epoch()));
    }
    if !data.valid_until.fits_u48() {
        return Err(TimestampTooLarge(data.valid_until.seconds_since_epoch()));
    }

    let mut bytes = [0_u8; 32];
    bytes[0..6].copy_from_slice(&data.valid_after.seconds_since_epoch().to_be_bytes()[2..8]);
    bytes[6..12].copy_from_slice(&data.valid_until.seconds_since_epoch().to_be_bytes()[2..8]);
    bytes[12..32].copy_from_slice(data.aggregator.as_slice());
    Ok(U256::from_be_bytes(bytes))
}

impl ValidationData {
    /// Merges account- and paymaster-side validation data.
    ///
    /// A party's signature is considered failed whenever its aggregator
    /// field is non-zero; the validity window is the intersection of the
    /// two windows.
    pub fn merge(account: Self, paymaster: Self) -> MergedValidationData {
        MergedValidationData {
            account_sig_failed: account.aggregator != Address::ZERO,
            paymaster_sig_failed: paymaster.aggregator != Address::ZERO,
            time_range: ValidTimeRange::new(
                account.valid_after.max(paymaster.valid_after),
                account.valid_until.min(paymaster.valid_until),
            ),
        }
    }
}

/// Stake of one entity touched by a user operation, as reported by the
/// EntryPoint, augmented with the entity's address.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct StakeInfo {
    /// Entity address
    pub address: Address,
    /// Staked wei
    pub stake: U256,
    /// Unstake delay in seconds
    pub unstake_delay_sec: U256,
}

impl StakeInfo {
    fn from_v0_6(address: Address, info: &v0_6::StakeInfo) -> Self {
        Self {
            address,
            stake: info.stake,
            unstake_delay_sec: info.unstakeDelaySec,
        }
    }

    fn from_v0_7(address: Address, info: &v0_7::StakeInfo) -> Self {
        Self {
            address,
            stake: info.stake,
            unstake_delay_sec: info.unstakeDelaySec,
        }
    }
}

/// Stake of a signature aggregator.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AggregatorInfo {
    /// Aggregator contract address
    pub address: Address,
    /// Aggregator stake
    pub stake_info: StakeInfo,
}

/// The EntryPoint's per-operation validation summary, in a shape common to
/// both contract versions.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ValidationReturnInfo {
    /// Gas used before the operation's call phase
    pub pre_op_gas: U256,
    /// Wei the EntryPoint requires held in reserve
    pub prefund: U256,
    /// True if the account signature check failed
    pub account_sig_failed: bool,
    /// True if the paymaster signature check failed
    pub paymaster_sig_failed: bool,
    /// Start of the validity window
    pub valid_after: Timestamp,
    /// End of the validity window
    pub valid_until: Timestamp,
    /// Opaque context the paymaster passes to its postOp call
    pub paymaster_context: Bytes,
}

impl ValidationReturnInfo {
    /// The validity window as a range.
    pub fn valid_time_range(&self) -> ValidTimeRange {
        ValidTimeRange::new(self.valid_after, self.valid_until)
    }
}

/// Normalized output of an EntryPoint `simulateValidation` call.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ValidationOutput {
    /// Validation summary
    pub return_info: ValidationReturnInfo,
    /// Sender stake
    pub sender_info: StakeInfo,
    /// Factory stake, if the operation deploys the account
    pub factory_info: Option<StakeInfo>,
    /// Paymaster stake, if a paymaster sponsors the operation
    pub paymaster_info: Option<StakeInfo>,
    /// Aggregator stake, if the account delegates signature checking
    pub aggregator_info: Option<AggregatorInfo>,
}

/// Entity addresses read off a user operation, used to attach addresses to
/// the EntryPoint's address-less stake records.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct EntityAddresses {
    /// Sender address
    pub sender: Address,
    /// Factory address, if present
    pub factory: Option<Address>,
    /// Paymaster address, if present
    pub paymaster: Option<Address>,
}

impl ValidationOutput {
    /// Normalizes a v0.6 `ValidationResult` revert payload.
    pub fn from_v0_6(value: v0_6::ValidationResult, entities: EntityAddresses) -> Self {
        let v0_6::ValidationResult {
            returnInfo,
            senderInfo,
            factoryInfo,
            paymasterInfo,
        } = value;
        Self {
            return_info: return_info_from_v0_6(returnInfo),
            sender_info: StakeInfo::from_v0_6(entities.sender, &senderInfo),
            factory_info: entities
                .factory
                .map(|addr| StakeInfo::from_v0_6(addr, &factoryInfo)),
            paymaster_info: entities
                .paymaster
                .map(|addr| StakeInfo::from_v0_6(addr, &paymasterInfo)),
            aggregator_info: None,
        }
    }

    /// Normalizes a v0.6 `ValidationResultWithAggregation` revert payload.
    pub fn from_v0_6_with_aggregation(
        value: v0_6::ValidationResultWithAggregation,
        entities: EntityAddresses,
    ) -> Self {
        let v0_6::ValidationResultWithAggregation {
            returnInfo,
            senderInfo,
            factoryInfo,
            paymasterInfo,
            aggregatorInfo,
        } = value;
        Self {
            return_info: return_info_from_v0_6(returnInfo),
            sender_info: StakeInfo::from_v0_6(entities.sender, &senderInfo),
            factory_info: entities
                .factory
                .map(|addr| StakeInfo::from_v0_6(addr, &factoryInfo)),
            paymaster_info: entities
                .paymaster
                .map(|addr| StakeInfo::from_v0_6(addr, &paymasterInfo)),
            aggregator_info: Some(AggregatorInfo {
                address: aggregatorInfo.aggregator,
                stake_info: StakeInfo::from_v0_6(
                    aggregatorInfo.aggregator,
                    &aggregatorInfo.stakeInfo,
                ),
            }),
        }
    }

    /// Normalizes a v0.7 EntryPointSimulations `ValidationResult` return.
    ///
    /// The packed account and paymaster `validationData` words are unpacked
    /// and merged into the signature bits and time window of the summary.
    pub fn from_v0_7(value: v0_7::ValidationResult, entities: EntityAddresses) -> Self {
        let v0_7::ValidationResult {
            returnInfo,
            senderInfo,
            factoryInfo,
            paymasterInfo,
            aggregatorInfo,
        } = value;

        let account = parse_validation_data(returnInfo.accountValidationData);
        let paymaster = parse_validation_data(returnInfo.paymasterValidationData);
        let merged = ValidationData::merge(account, paymaster);

        Self {
            return_info: ValidationReturnInfo {
                pre_op_gas: returnInfo.preOpGas,
                prefund: returnInfo.prefund,
                account_sig_failed: merged.account_sig_failed,
                paymaster_sig_failed: merged.paymaster_sig_failed,
                valid_after: merged.time_range.valid_after,
                valid_until: merged.time_range.valid_until,
                paymaster_context: returnInfo.paymasterContext,
            },
            sender_info: StakeInfo::from_v0_7(entities.sender, &senderInfo),
            factory_info: entities
                .factory
                .map(|addr| StakeInfo::from_v0_7(addr, &factoryInfo)),
            paymaster_info: entities
                .paymaster
                .map(|addr| StakeInfo::from_v0_7(addr, &paymasterInfo)),
            aggregator_info: (aggregatorInfo.aggregator != Address::ZERO).then(|| {
                AggregatorInfo {
                    address: aggregatorInfo.aggregator,
                    stake_info: StakeInfo::from_v0_7(
                        aggregatorInfo.aggregator,
                        &aggregatorInfo.stakeInfo,
                    ),
                }
            }),
        }
    }
}

fn return_info_from_v0_6(info: v0_6::ReturnInfo) -> ValidationReturnInfo {
    let valid_until = info.validUntil.to::<u64>();
    ValidationReturnInfo {
        pre_op_gas: info.preOpGas,
        prefund: info.prefund,
        account_sig_failed: info.sigFailed,
        paymaster_sig_failed: false,
        valid_after: Timestamp::new(info.validAfter.to::<u64>()),
        valid_until: if valid_until == 0 {
            Timestamp::MAX_U48
        } else {
            Timestamp::new(valid_until)
        },
        paymaster_context: info.paymasterContext,
    }
}

/// A revert observed while driving an EntryPoint simulation.
#[derive(Clone, Debug, thiserror::Error)]
pub enum ValidationRevert {
    /// The EntryPoint rejected the operation with a `FailedOp` reason
    #[error("{0}")]
    EntryPoint(String),
    /// The operation itself reverted while validating
    #[error("UserOperation reverted during simulation with reason: {reason}")]
    Operation {
        /// Decoded revert reason
        reason: String,
        /// Raw inner revert payload
        inner: Bytes,
    },
    /// Revert data that matches no known schema
    #[error("unexpected revert data during simulation: {0}")]
    Unknown(Bytes),
}
