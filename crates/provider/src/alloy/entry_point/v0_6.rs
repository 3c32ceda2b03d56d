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

//! EntryPoint v0.6 simulation adapter.
//!
//! The v0.6 contract reports simulation outcomes through typed reverts:
//! `ValidationResult` and `ExecutionResult` carry success as error
//! arguments, `FailedOp` carries rejection. A call that returns without
//! reverting is itself an anomaly.

use alloy_primitives::{Address, Bytes};
use alloy_rpc_types_eth::{state::StateOverride, BlockId, TransactionInput, TransactionRequest};
use alloy_sol_types::{SolCall, SolError};
use warden_contracts::v0_6 as contracts;
use warden_types::{
    v0_6::UserOperation, EntityAddresses, Timestamp, UserOperation as UserOperationTrait,
    ValidationOutput, ValidationRevert,
};

use super::SimulationConfig;
use crate::{
    EvmProvider, ExecutionResult, ProviderError, ProviderResult, SimulationProvider,
};

/// Simulation adapter for an EntryPoint v0.6 deployment.
#[derive(Clone, Debug)]
pub struct EntryPointV0_6<P> {
    address: Address,
    provider: P,
    config: SimulationConfig,
}

impl<P> EntryPointV0_6<P> {
    /// Creates an adapter for the EntryPoint at `address`.
    pub fn new(address: Address, provider: P, config: SimulationConfig) -> Self {
        Self {
            address,
            provider,
            config,
        }
    }

    fn transaction(&self, data: Vec<u8>, gas: u64) -> TransactionRequest {
        TransactionRequest {
            from: Some(self.config.utility_wallet_address),
            to: Some(self.address.into()),
            gas: Some(gas),
            input: TransactionInput::new(data.into()),
            ..Default::default()
        }
    }
}

/// Decodes a `simulateValidation` revert payload.
///
/// Reverts that match no known schema are handed back raw for the caller
/// to report.
pub fn decode_simulate_validation_revert(
    revert_data: &Bytes,
    entities: EntityAddresses,
) -> Result<ValidationOutput, ValidationRevert> {
    if let Ok(result) = contracts::ValidationResult::abi_decode(revert_data, false) {
        Ok(ValidationOutput::from_v0_6(result, entities))
    } else if let Ok(result) =
        contracts::ValidationResultWithAggregation::abi_decode(revert_data, false)
    {
        Ok(ValidationOutput::from_v0_6_with_aggregation(result, entities))
    } else if let Ok(failed) = contracts::FailedOp::abi_decode(revert_data, false) {
        Err(ValidationRevert::EntryPoint(failed.reason))
    } else if let Ok(revert) = alloy_sol_types::Revert::abi_decode(revert_data, false) {
        Err(ValidationRevert::Operation {
            reason: revert.reason,
            inner: revert_data.clone(),
        })
    } else {
        Err(ValidationRevert::Unknown(revert_data.clone()))
    }
}

/// Decodes a `simulateHandleOp` revert payload.
pub fn decode_simulate_handle_op_revert(
    revert_data: &Bytes,
) -> Result<ExecutionResult, ValidationRevert> {
    if let Ok(result) = contracts::ExecutionResult::abi_decode(revert_data, false) {
        Ok(ExecutionResult {
            pre_op_gas: result.preOpGas,
            paid: result.paid,
            valid_after: Timestamp::new(result.validAfter.to::<u64>()),
            valid_until: Timestamp::new(result.validUntil.to::<u64>()),
            target_success: result.targetSuccess,
            target_result: result.targetResult,
        })
    } else if let Ok(failed) = contracts::FailedOp::abi_decode(revert_data, false) {
        Err(ValidationRevert::EntryPoint(failed.reason))
    } else if let Ok(revert) = alloy_sol_types::Revert::abi_decode(revert_data, false) {
        Err(ValidationRevert::Operation {
            reason: revert.reason,
            inner: revert_data.clone(),
        })
    } else {
        Err(ValidationRevert::Unknown(revert_data.clone()))
    }
}

#[async_trait::async_trait]
impl<P> SimulationProvider for EntryPointV0_6<P>
where
    P: EvmProvider,
{
    type UO = UserOperation;

    fn address(&self) -> &Address {
        &self.address
    }

    async fn simulate_validation(
        &self,
        user_op: UserOperation,
        max_validation_gas: u64,
        block_id: Option<BlockId>,
    ) -> ProviderResult<Result<ValidationOutput, ValidationRevert>> {
        let entities = EntityAddresses {
            sender: user_op.sender(),
            factory: user_op.factory(),
            paymaster: user_op.paymaster(),
        };
        let mut overrides = StateOverride::default();
        self.config
            .apply_balance_override(entities.sender, &mut overrides);

        let call = contracts::simulateValidationCall {
            userOp: user_op.into(),
        };
        let tx = self.transaction(call.abi_encode(), max_validation_gas);

        match self.provider.call(&tx, block_id, &overrides).await {
            // Success signals come revert-encoded; a plain return means the
            // contract at this address is not behaving like an EntryPoint.
            Ok(bytes) => {
                tracing::error!(
                    "simulateValidation returned instead of reverting, data: {bytes}"
                );
                Ok(Err(ValidationRevert::Unknown(bytes)))
            }
            Err(ProviderError::Revert(revert_data)) => {
                let decoded = decode_simulate_validation_revert(&revert_data, entities);
                if matches!(decoded, Err(ValidationRevert::Unknown(_))) {
                    tracing::error!(
                        "unexpected simulateValidation revert, data: {revert_data}"
                    );
                }
                Ok(decoded)
            }
            Err(e) => Err(e),
        }
    }

    async fn simulate_handle_op(
        &self,
        op: UserOperation,
        target: Address,
        target_call_data: Bytes,
        block_id: Option<BlockId>,
        mut state_override: StateOverride,
    ) -> ProviderResult<Result<ExecutionResult, ValidationRevert>> {
        self.config
            .apply_balance_override(op.sender(), &mut state_override);

        let call = contracts::simulateHandleOpCall {
            op: op.into(),
            target,
            targetCallData: target_call_data,
        };
        let tx = self.transaction(call.abi_encode(), u32::MAX as u64);

        match self.provider.call(&tx, block_id, &state_override).await {
            Ok(bytes) => {
                tracing::error!("simulateHandleOp returned instead of reverting, data: {bytes}");
                Ok(Err(ValidationRevert::Unknown(bytes)))
            }
            Err(ProviderError::Revert(revert_data)) => {
                Ok(decode_simulate_handle_op_revert(&revert_data))
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use alloy_primitives::{address, uint, U256};
    use alloy_sol_types::SolError;

    use super::*;

    fn entities() -> EntityAddresses {
        EntityAddresses {
            sender: address!("1306b01bc3e4ad202612d3843387e94737673f53"),
            factory: None,
            paymaster: Some(address!("0123456789abcdef0123456789abcdef01234567")),
        }
    }

    #[test]
    fn test_decode_validation_result() {
        let revert = contracts::ValidationResult {
            returnInfo: contracts::ReturnInfo {
                preOpGas: uint!(50_000_U256),
                prefund: U256::from(10).pow(U256::from(18)),
                sigFailed: false,
                validAfter: Default::default(),
                validUntil: Default::default(),
                paymasterContext: Bytes::default(),
            },
            senderInfo: contracts::StakeInfo::default(),
            factoryInfo: contracts::StakeInfo::default(),
            paymasterInfo: contracts::StakeInfo {
                stake: uint!(100_U256),
                unstakeDelaySec: uint!(86_400_U256),
            },
        };
        let data: Bytes = revert.abi_encode().into();

        let output = decode_simulate_validation_revert(&data, entities()).unwrap();
        assert_eq!(output.return_info.pre_op_gas, uint!(50_000_U256));
        assert!(!output.return_info.account_sig_failed);
        // A zero validUntil canonicalizes to the largest 48-bit value.
        assert_eq!(output.return_info.valid_until, Timestamp::MAX_U48);
        assert_eq!(
            output.paymaster_info.as_ref().unwrap().address,
            entities().paymaster.unwrap()
        );
        assert_eq!(
            output.paymaster_info.unwrap().unstake_delay_sec,
            uint!(86_400_U256)
        );
        // No factory on the operation, so no factory stake is attached.
        assert!(output.factory_info.is_none());
    }

    #[test]
    fn test_decode_failed_op() {
        let data: Bytes = contracts::FailedOp {
            opIndex: U256::ZERO,
            reason: "AA25 invalid account nonce".to_string(),
        }
        .abi_encode()
        .into();

        let err = decode_simulate_validation_revert(&data, entities()).unwrap_err();
        assert!(matches!(
            err,
            ValidationRevert::EntryPoint(reason) if reason == "AA25 invalid account nonce"
        ));
    }

    #[test]
    fn test_decode_plain_revert() {
        let data: Bytes = alloy_sol_types::Revert::from("account not deployed")
            .abi_encode()
            .into();

        let err = decode_simulate_validation_revert(&data, entities()).unwrap_err();
        let ValidationRevert::Operation { reason, .. } = &err else {
            panic!("expected operation revert, got {err:?}");
        };
        assert_eq!(reason, "account not deployed");
        assert!(err
            .to_string()
            .contains("UserOperation reverted during simulation with reason: account not deployed"));
    }

    #[test]
    fn test_decode_unknown_revert() {
        let data = Bytes::from(vec![0xde, 0xad, 0xbe, 0xef]);
        let err = decode_simulate_validation_revert(&data, entities()).unwrap_err();
        assert!(matches!(err, ValidationRevert::Unknown(d) if d == data));
    }

    #[test]
    fn test_decode_execution_result() {
        let revert = contracts::ExecutionResult {
            preOpGas: uint!(60_000_U256),
            paid: uint!(1_000_000_U256),
            validAfter: Default::default(),
            validUntil: Default::default(),
            targetSuccess: true,
            targetResult: Bytes::from(vec![0x01]),
        };
        let data: Bytes = revert.abi_encode().into();

        let result = decode_simulate_handle_op_revert(&data).unwrap();
        assert_eq!(result.pre_op_gas, uint!(60_000_U256));
        assert!(result.target_success);
    }
}
