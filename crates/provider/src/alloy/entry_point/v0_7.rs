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

//! EntryPoint v0.7 simulation adapter.
//!
//! Simulation moved to the companion EntryPointSimulations contract, which
//! returns structured results on success. The adapter needs that contract
//! pre-deployed and its address configured; the packed account/paymaster
//! `validationData` words in its returns are unpacked and merged here.

use alloy_primitives::{Address, Bytes};
use alloy_rpc_types_eth::{state::StateOverride, BlockId, TransactionInput, TransactionRequest};
use alloy_sol_types::{SolCall, SolError};
use warden_contracts::v0_7 as contracts;
use warden_types::{
    parse_validation_data, v0_7::UserOperation, EntityAddresses,
    UserOperation as UserOperationTrait, ValidationData, ValidationOutput, ValidationRevert,
};

use super::SimulationConfig;
use crate::{EvmProvider, ExecutionResult, ProviderError, ProviderResult, SimulationProvider};

/// Simulation adapter for an EntryPoint v0.7 deployment.
#[derive(Clone, Debug)]
pub struct EntryPointV0_7<P> {
    address: Address,
    simulations_address: Address,
    provider: P,
    config: SimulationConfig,
}

impl<P> EntryPointV0_7<P> {
    /// Creates an adapter for the EntryPoint at `address`, with its
    /// simulations companion at `simulations_address`.
    pub fn new(
        address: Address,
        simulations_address: Address,
        provider: P,
        config: SimulationConfig,
    ) -> Self {
        Self {
            address,
            simulations_address,
            provider,
            config,
        }
    }

    fn transaction(&self, data: Vec<u8>, gas: u64) -> TransactionRequest {
        TransactionRequest {
            from: Some(self.config.utility_wallet_address),
            to: Some(self.simulations_address.into()),
            gas: Some(gas),
            input: TransactionInput::new(data.into()),
            ..Default::default()
        }
    }
}

/// Decodes a failure revert from the simulations contract.
pub fn decode_simulations_revert(revert_data: &Bytes) -> ValidationRevert {
    if let Ok(failed) = contracts::FailedOp::abi_decode(revert_data, false) {
        ValidationRevert::EntryPoint(failed.reason)
    } else if let Ok(failed) = contracts::FailedOpWithRevert::abi_decode(revert_data, false) {
        let inner_reason = alloy_sol_types::Revert::abi_decode(&failed.inner, false)
            .map(|r| r.reason)
            .unwrap_or_else(|_| failed.inner.to_string());
        ValidationRevert::EntryPoint(format!("{} : {}", failed.reason, inner_reason))
    } else if let Ok(revert) = alloy_sol_types::Revert::abi_decode(revert_data, false) {
        ValidationRevert::Operation {
            reason: revert.reason,
            inner: revert_data.clone(),
        }
    } else {
        ValidationRevert::Unknown(revert_data.clone())
    }
}

fn execution_result_from_contract(result: contracts::ExecutionResult) -> ExecutionResult {
    let account = parse_validation_data(result.accountValidationData);
    let paymaster = parse_validation_data(result.paymasterValidationData);
    let merged = ValidationData::merge(account, paymaster);

    ExecutionResult {
        pre_op_gas: result.preOpGas,
        paid: result.paid,
        valid_after: merged.time_range.valid_after,
        valid_until: merged.time_range.valid_until,
        target_success: result.targetSuccess,
        target_result: result.targetResult,
    }
}

#[async_trait::async_trait]
impl<P> SimulationProvider for EntryPointV0_7<P>
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
            userOp: user_op.pack(),
        };
        let tx = self.transaction(call.abi_encode(), max_validation_gas);

        match self.provider.call(&tx, block_id, &overrides).await {
            Ok(bytes) => {
                let ret = contracts::simulateValidationCall::abi_decode_returns(&bytes, false)
                    .map_err(|e| {
                        ProviderError::Decode(format!("simulateValidation return: {e}"))
                    })?;
                Ok(Ok(ValidationOutput::from_v0_7(ret._0, entities)))
            }
            Err(ProviderError::Revert(revert_data)) => {
                let decoded = decode_simulations_revert(&revert_data);
                if matches!(decoded, ValidationRevert::Unknown(_)) {
                    tracing::error!(
                        "unexpected simulateValidation revert, data: {revert_data}"
                    );
                }
                Ok(Err(decoded))
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
            op: op.pack(),
            target,
            targetCallData: target_call_data,
        };
        let tx = self.transaction(call.abi_encode(), u32::MAX as u64);

        match self.provider.call(&tx, block_id, &state_override).await {
            Ok(bytes) => {
                let ret = contracts::simulateHandleOpCall::abi_decode_returns(&bytes, false)
                    .map_err(|e| ProviderError::Decode(format!("simulateHandleOp return: {e}")))?;
                Ok(Ok(execution_result_from_contract(ret._0)))
            }
            Err(ProviderError::Revert(revert_data)) => {
                Ok(Err(decode_simulations_revert(&revert_data)))
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use alloy_primitives::{uint, U256};
    use alloy_sol_types::SolError;
    use warden_types::{pack_validation_data, Timestamp};

    use super::*;

    #[test]
    fn test_decode_failed_op_with_revert() {
        let inner: Bytes = alloy_sol_types::Revert::from("paymaster deposit too low")
            .abi_encode()
            .into();
        let data: Bytes = contracts::FailedOpWithRevert {
            opIndex: U256::ZERO,
            reason: "AA33 reverted".to_string(),
            inner,
        }
        .abi_encode()
        .into();

        let revert = decode_simulations_revert(&data);
        let ValidationRevert::EntryPoint(reason) = revert else {
            panic!("expected entry point revert");
        };
        assert_eq!(reason, "AA33 reverted : paymaster deposit too low");
    }

    #[test]
    fn test_execution_result_merges_windows() {
        let account = pack_validation_data(ValidationData {
            aggregator: Address::ZERO,
            valid_after: Timestamp::new(100),
            valid_until: Timestamp::new(500),
        })
        .unwrap();
        let paymaster = pack_validation_data(ValidationData {
            aggregator: Address::ZERO,
            valid_after: Timestamp::new(200),
            valid_until: Timestamp::new(400),
        })
        .unwrap();

        let result = execution_result_from_contract(contracts::ExecutionResult {
            preOpGas: uint!(60_000_U256),
            paid: uint!(1_000_000_U256),
            accountValidationData: account,
            paymasterValidationData: paymaster,
            targetSuccess: true,
            targetResult: Bytes::default(),
        });

        assert_eq!(result.valid_after, Timestamp::new(200));
        assert_eq!(result.valid_until, Timestamp::new(400));
        assert!(result.target_success);
    }
}
