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
use alloy_rpc_types_eth::{
    state::StateOverride, Block, BlockId, BlockNumberOrTag, FeeHistory, TransactionRequest,
};

use super::error::ProviderResult;

/// Fee fields reported by the node, any subset of which may be present.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct FeeEstimate {
    /// Legacy gas price, wei
    pub gas_price: Option<u128>,
    /// EIP-1559 max fee per gas, wei
    pub max_fee_per_gas: Option<u128>,
    /// EIP-1559 max priority fee per gas, wei
    pub max_priority_fee_per_gas: Option<u128>,
}

/// Narrow facade over an Ethereum JSON-RPC provider.
///
/// Transport and ABI (de)serialization only; no policy. A revert during
/// `call` surfaces as [`super::error::ProviderError::Revert`] with the raw
/// payload attached.
#[async_trait::async_trait]
#[auto_impl::auto_impl(&, Arc)]
pub trait EvmProvider: Send + Sync {
    /// Makes an `eth_call` with optional block and state overrides.
    async fn call(
        &self,
        tx: &TransactionRequest,
        block: Option<BlockId>,
        state_overrides: &StateOverride,
    ) -> ProviderResult<Bytes>;

    /// Gets a block by id.
    async fn get_block(&self, block_id: BlockId) -> ProviderResult<Option<Block>>;

    /// Gets the fee history over the given block range.
    async fn fee_history(
        &self,
        block_count: u64,
        block_number: BlockNumberOrTag,
        reward_percentiles: &[f64],
    ) -> ProviderResult<FeeHistory>;

    /// Gets the node's legacy gas price suggestion, wei.
    async fn gas_price(&self) -> ProviderResult<u128>;

    /// Asks the node for fee suggestions.
    ///
    /// With `legacy` set only `gas_price` is queried. Otherwise the node's
    /// EIP-1559 estimator runs; fields it cannot produce stay `None`.
    async fn estimate_fees(&self, legacy: bool) -> ProviderResult<FeeEstimate>;

    /// Gets an account balance.
    async fn get_balance(&self, address: Address, block: Option<BlockId>) -> ProviderResult<U256>;
}
