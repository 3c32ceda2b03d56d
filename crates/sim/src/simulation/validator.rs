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

use alloy_primitives::{Address, Bytes};
use anyhow::anyhow;
use metrics::Counter;
use metrics_derive::Metrics;
use warden_provider::{BlockId, ExecutionResult, SimulationProvider, StateOverride};
use warden_types::{
    chain::ChainSpec, v0_6, v0_7, EntryPointVersion, Timestamp, UserOperationVariant,
    ValidationOutput, ValidationRevert,
};

use super::{
    ApiVersion, ReferencedCodeHashes, SimulationError, SimulationResult, SimulationSettings,
    Simulator,
};
use crate::gas;

/// Seconds an operation's window must already have been open.
const VALID_AFTER_SLACK_SECONDS: u64 = 5;

/// Seconds of remaining validity an operation must still have.
const EXPIRATION_BUFFER_SECONDS: u64 = 30;

#[derive(Metrics)]
#[metrics(scope = "validator")]
struct ValidatorMetrics {
    #[metric(describe = "the number of user operations that passed validation")]
    validation_success: Counter,
    #[metric(describe = "the number of user operations that failed validation")]
    validation_failure: Counter,
}

/// The base admission validator.
///
/// Dispatches on the operation's encoding to the matching EntryPoint
/// adapter, then enforces signature, time-window, pre-verification gas and
/// prefund policy on the normalized result.
pub struct Validator<E06, E07> {
    chain_spec: ChainSpec,
    entry_point_v0_6: Option<E06>,
    entry_point_v0_7: Option<E07>,
    settings: SimulationSettings,
    metrics: ValidatorMetrics,
}

impl<E06, E07> Validator<E06, E07>
where
    E06: SimulationProvider<UO = v0_6::UserOperation>,
    E07: SimulationProvider<UO = v0_7::UserOperation>,
{
    /// Creates a validator over the enabled EntryPoint adapters.
    pub fn new(
        chain_spec: ChainSpec,
        entry_point_v0_6: Option<E06>,
        entry_point_v0_7: Option<E07>,
        settings: SimulationSettings,
    ) -> Self {
        Self {
            chain_spec,
            entry_point_v0_6,
            entry_point_v0_7,
            settings,
            metrics: ValidatorMetrics::default(),
        }
    }

    async fn simulate(
        &self,
        op: &UserOperationVariant,
        block_id: Option<BlockId>,
    ) -> Result<ValidationOutput, SimulationError> {
        let simulated = match op {
            UserOperationVariant::V0_6(op) => {
                let entry_point = self
                    .entry_point_v0_6
                    .as_ref()
                    .ok_or_else(|| anyhow!("entry point v0.6 is not enabled"))?;
                entry_point
                    .simulate_validation(op.clone(), self.settings.max_validation_gas, block_id)
                    .await?
            }
            UserOperationVariant::V0_7(op) => {
                let entry_point = self
                    .entry_point_v0_7
                    .as_ref()
                    .ok_or_else(|| anyhow!("entry point v0.7 is not enabled"))?;
                entry_point
                    .simulate_validation(op.clone(), self.settings.max_validation_gas, block_id)
                    .await?
            }
        };
        simulated.map_err(SimulationError::from)
    }

    fn check_signatures(
        &self,
        op: &UserOperationVariant,
        validation: &ValidationOutput,
    ) -> Result<(), SimulationError> {
        let info = &validation.return_info;
        if !info.account_sig_failed && !info.paymaster_sig_failed {
            return Ok(());
        }
        let message = match op.entry_point_version() {
            EntryPointVersion::V0_6 => "Invalid UserOp signature or paymaster signature",
            EntryPointVersion::V0_7 if info.account_sig_failed => "Invalid UserOp signature",
            EntryPointVersion::V0_7 => "Invalid UserOp paymaster signature",
        };
        Err(SimulationError::InvalidSignature(message.to_string()))
    }

    fn check_time_range(&self, validation: &ValidationOutput) -> Result<(), SimulationError> {
        if self.settings.disable_expiration_check {
            return Ok(());
        }
        let info = &validation.return_info;
        let now = Timestamp::now();
        if info.valid_after > now.saturating_sub(VALID_AFTER_SLACK_SECONDS)
            || info.valid_until < now + EXPIRATION_BUFFER_SECONDS
        {
            return Err(SimulationError::ExpiresShortly {
                valid_after: info.valid_after,
                valid_until: info.valid_until,
                now,
            });
        }
        Ok(())
    }

    fn check_pre_verification_gas(
        &self,
        op: &UserOperationVariant,
    ) -> Result<(), SimulationError> {
        if self.settings.api_version == ApiVersion::V1 {
            return Ok(());
        }
        let required = gas::calc_required_pre_verification_gas(&self.chain_spec, op, 0);
        if required > op.pre_verification_gas() {
            return Err(SimulationError::SimulateValidation(format!(
                "preVerificationGas is not enough, required: {}, got: {}",
                required,
                op.pre_verification_gas()
            )));
        }
        Ok(())
    }

    fn check_prefund(
        &self,
        op: &UserOperationVariant,
        validation: &ValidationOutput,
    ) -> Result<(u128, u128), SimulationError> {
        let info = &validation.return_info;
        let (verification_gas_limit, call_gas_limit) =
            gas::calc_verification_and_call_gas_limits(op, info.pre_op_gas, info.prefund);

        let multiplier: u128 = if op.paymaster().is_some() { 3 } else { 1 };
        let required_prefund = alloy_primitives::U256::from(
            call_gas_limit + multiplier * verification_gas_limit + op.pre_verification_gas(),
        );
        if required_prefund > info.prefund {
            return Err(SimulationError::SimulateValidation(format!(
                "prefund is not enough, required: {}, got: {}",
                required_prefund, info.prefund
            )));
        }
        Ok((verification_gas_limit, call_gas_limit))
    }

    /// Retrieves an operation's execution result via `simulateHandleOp`.
    ///
    /// A revert raised by the operation itself surfaces as
    /// [`SimulationError::UserOperationReverted`]; EntryPoint rejections
    /// keep their validation shape.
    pub async fn get_execution_result(
        &self,
        op: &UserOperationVariant,
        block_id: Option<BlockId>,
    ) -> Result<ExecutionResult, SimulationError> {
        let result = match op {
            UserOperationVariant::V0_6(op) => {
                let entry_point = self
                    .entry_point_v0_6
                    .as_ref()
                    .ok_or_else(|| anyhow!("entry point v0.6 is not enabled"))?;
                entry_point
                    .simulate_handle_op(
                        op.clone(),
                        Address::ZERO,
                        Bytes::default(),
                        block_id,
                        StateOverride::default(),
                    )
                    .await?
            }
            UserOperationVariant::V0_7(op) => {
                let entry_point = self
                    .entry_point_v0_7
                    .as_ref()
                    .ok_or_else(|| anyhow!("entry point v0.7 is not enabled"))?;
                entry_point
                    .simulate_handle_op(
                        op.clone(),
                        Address::ZERO,
                        Bytes::default(),
                        block_id,
                        StateOverride::default(),
                    )
                    .await?
            }
        };
        result.map_err(|revert| match revert {
            revert @ ValidationRevert::Operation { .. } => {
                SimulationError::UserOperationReverted(revert.to_string())
            }
            other => SimulationError::from(other),
        })
    }

    async fn validate(
        &self,
        op: UserOperationVariant,
        block_id: Option<BlockId>,
    ) -> Result<SimulationResult, SimulationError> {
        let validation = self.simulate(&op, block_id).await?;

        self.check_signatures(&op, &validation)?;
        self.check_time_range(&validation)?;
        self.check_pre_verification_gas(&op)?;
        let (verification_gas_limit, call_gas_limit) = self.check_prefund(&op, &validation)?;

        Ok(SimulationResult {
            validation,
            verification_gas_limit,
            call_gas_limit,
            storage_map: Default::default(),
            referenced_contracts: None,
        })
    }
}

#[async_trait::async_trait]
impl<E06, E07> Simulator for Validator<E06, E07>
where
    E06: SimulationProvider<UO = v0_6::UserOperation>,
    E07: SimulationProvider<UO = v0_7::UserOperation>,
{
    async fn simulate_validation(
        &self,
        op: UserOperationVariant,
        block_id: Option<BlockId>,
        _expected_code_hashes: Option<&ReferencedCodeHashes>,
    ) -> Result<SimulationResult, SimulationError> {
        let result = self.validate(op, block_id).await;
        match &result {
            Ok(_) => self.metrics.validation_success.increment(1),
            Err(_) => self.metrics.validation_failure.increment(1),
        }
        result
    }
}
