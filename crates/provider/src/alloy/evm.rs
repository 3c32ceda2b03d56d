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
use alloy_provider::{Provider as AlloyProvider, RootProvider};
use alloy_rpc_client::ClientBuilder;
use alloy_rpc_types_eth::{
    state::StateOverride, Block, BlockId, BlockNumberOrTag, BlockTransactionsKind, FeeHistory,
    TransactionRequest,
};
use alloy_transport::{BoxTransport, TransportError};
use anyhow::Context;
use url::Url;

use crate::{EvmProvider, FeeEstimate, ProviderError, ProviderResult};

/// The chain client facade backed by an alloy provider.
#[derive(Clone, Debug)]
pub struct AlloyEvmProvider<AP> {
    inner: AP,
}

impl<AP> AlloyEvmProvider<AP> {
    /// Creates a new facade over an alloy provider.
    pub fn new(inner: AP) -> Self {
        Self { inner }
    }
}

/// Creates a facade over an HTTP JSON-RPC endpoint.
pub fn new_alloy_provider(url: &str) -> anyhow::Result<AlloyEvmProvider<RootProvider<BoxTransport>>> {
    let url: Url = url.parse().context("invalid RPC url")?;
    let client = ClientBuilder::default().http(url).boxed();
    Ok(AlloyEvmProvider::new(RootProvider::new(client)))
}

/// A revert carries its payload out of the transport error so callers can
/// run typed decoders over it.
fn classify(err: TransportError) -> ProviderError {
    if let Some(revert_data) = err.as_error_resp().and_then(|payload| payload.as_revert_data()) {
        return ProviderError::Revert(revert_data);
    }
    ProviderError::Transport(err)
}

#[async_trait::async_trait]
impl<AP> EvmProvider for AlloyEvmProvider<AP>
where
    AP: AlloyProvider + Send + Sync,
{
    async fn call(
        &self,
        tx: &TransactionRequest,
        block: Option<BlockId>,
        state_overrides: &StateOverride,
    ) -> ProviderResult<Bytes> {
        let mut call = self.inner.call(tx).overrides(state_overrides);
        if let Some(block) = block {
            call = call.block(block);
        }
        call.await.map_err(classify)
    }

    async fn get_block(&self, block_id: BlockId) -> ProviderResult<Option<Block>> {
        Ok(self
            .inner
            .get_block(block_id, BlockTransactionsKind::Hashes)
            .await?)
    }

    async fn fee_history(
        &self,
        block_count: u64,
        block_number: BlockNumberOrTag,
        reward_percentiles: &[f64],
    ) -> ProviderResult<FeeHistory> {
        Ok(self
            .inner
            .get_fee_history(block_count, block_number, reward_percentiles)
            .await?)
    }

    async fn gas_price(&self) -> ProviderResult<u128> {
        Ok(self.inner.get_gas_price().await?)
    }

    async fn estimate_fees(&self, legacy: bool) -> ProviderResult<FeeEstimate> {
        if legacy {
            let gas_price = self.inner.get_gas_price().await?;
            return Ok(FeeEstimate {
                gas_price: Some(gas_price),
                ..Default::default()
            });
        }

        match self.inner.estimate_eip1559_fees(None).await {
            Ok(est) => Ok(FeeEstimate {
                gas_price: None,
                max_fee_per_gas: Some(est.max_fee_per_gas),
                max_priority_fee_per_gas: Some(est.max_priority_fee_per_gas),
            }),
            // Nodes without basefee support cannot run the 1559 estimator;
            // hand the caller an empty estimate to fall back from.
            Err(TransportError::UnsupportedFeature(_)) => Ok(FeeEstimate::default()),
            Err(e) => Err(e.into()),
        }
    }

    async fn get_balance(&self, address: Address, block: Option<BlockId>) -> ProviderResult<U256> {
        let mut call = self.inner.get_balance(address);
        if let Some(block) = block {
            call = call.block_id(block);
        }
        Ok(call.await?)
    }
}
