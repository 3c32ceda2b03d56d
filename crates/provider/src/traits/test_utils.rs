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

//! Mock implementations of the provider traits.

use alloy_primitives::{Address, Bytes, U256};
use alloy_rpc_types_eth::{
    state::StateOverride, Block, BlockId, BlockNumberOrTag, FeeHistory, TransactionRequest,
};
use warden_types::{v0_6, v0_7, ValidationOutput, ValidationRevert};

use super::error::ProviderResult;
use crate::{
    EvmProvider as EvmProviderTrait, ExecutionResult, FeeEstimate, SimulationProvider,
};

mockall::mock! {
    pub EvmProvider {}

    #[async_trait::async_trait]
    impl EvmProviderTrait for EvmProvider {
        async fn call(
            &self,
            tx: &TransactionRequest,
            block: Option<BlockId>,
            state_overrides: &StateOverride,
        ) -> ProviderResult<Bytes>;

        async fn get_block(&self, block_id: BlockId) -> ProviderResult<Option<Block>>;

        async fn fee_history(
            &self,
            block_count: u64,
            block_number: BlockNumberOrTag,
            reward_percentiles: &[f64],
        ) -> ProviderResult<FeeHistory>;

        async fn gas_price(&self) -> ProviderResult<u128>;

        async fn estimate_fees(&self, legacy: bool) -> ProviderResult<FeeEstimate>;

        async fn get_balance(&self, address: Address, block: Option<BlockId>) -> ProviderResult<U256>;
    }
}

mockall::mock! {
    pub EntryPointV0_6 {}

    #[async_trait::async_trait]
    impl SimulationProvider for EntryPointV0_6 {
        type UO = v0_6::UserOperation;

        fn address(&self) -> &Address;

        async fn simulate_validation(
            &self,
            user_op: v0_6::UserOperation,
            max_validation_gas: u64,
            block_id: Option<BlockId>,
        ) -> ProviderResult<Result<ValidationOutput, ValidationRevert>>;

        async fn simulate_handle_op(
            &self,
            op: v0_6::UserOperation,
            target: Address,
            target_call_data: Bytes,
            block_id: Option<BlockId>,
            state_override: StateOverride,
        ) -> ProviderResult<Result<ExecutionResult, ValidationRevert>>;
    }
}

mockall::mock! {
    pub EntryPointV0_7 {}

    #[async_trait::async_trait]
    impl SimulationProvider for EntryPointV0_7 {
        type UO = v0_7::UserOperation;

        fn address(&self) -> &Address;

        async fn simulate_validation(
            &self,
            user_op: v0_7::UserOperation,
            max_validation_gas: u64,
            block_id: Option<BlockId>,
        ) -> ProviderResult<Result<ValidationOutput, ValidationRevert>>;

        async fn simulate_handle_op(
            &self,
            op: v0_7::UserOperation,
            target: Address,
            target_call_data: Bytes,
            block_id: Option<BlockId>,
            state_override: StateOverride,
        ) -> ProviderResult<Result<ExecutionResult, ValidationRevert>>;
    }
}
