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

use alloy_primitives::{Address, Bytes, U256};
use alloy_rpc_types_eth::{state::StateOverride, BlockId};
use warden_types::{Timestamp, UserOperation, ValidationOutput, ValidationRevert};

use super::error::ProviderResult;

/// Result of an EntryPoint `simulateHandleOp` call.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ExecutionResult {
    /// Gas used before the operation's call phase
    pub pre_op_gas: U256,
    /// Wei paid by the operation
    pub paid: U256,
    /// Start of the validity window
    pub valid_after: Timestamp,
    /// End of the validity window
    pub valid_until: Timestamp,
    /// True if the follow-on target call succeeded
    pub target_success: bool,
    /// Return data of the follow-on target call
    pub target_result: Bytes,
}

/// Version-aware driver of an EntryPoint's simulation entrypoints.
///
/// Both contract versions sit behind this one interface; results come back
/// in the normalized [`ValidationOutput`] / [`ExecutionResult`] shapes. The
/// inner `Result` separates on-chain rejection from infrastructure failure.
#[async_trait::async_trait]
pub trait SimulationProvider: Send + Sync {
    /// The user operation encoding this EntryPoint accepts.
    type UO: UserOperation;

    /// Address of the EntryPoint contract.
    fn address(&self) -> &Address;

    /// Drives `simulateValidation` and normalizes its outcome.
    async fn simulate_validation(
        &self,
        user_op: Self::UO,
        max_validation_gas: u64,
        block_id: Option<BlockId>,
    ) -> ProviderResult<Result<ValidationOutput, ValidationRevert>>;

    /// Drives `simulateHandleOp` with an optional follow-on target call.
    async fn simulate_handle_op(
        &self,
        op: Self::UO,
        target: Address,
        target_call_data: Bytes,
        block_id: Option<BlockId>,
        state_override: StateOverride,
    ) -> ProviderResult<Result<ExecutionResult, ValidationRevert>>;
}
