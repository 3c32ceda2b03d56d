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

use alloy_primitives::{Address, U256};
use alloy_rpc_types_eth::state::{AccountOverride, StateOverride};

pub(crate) mod v0_6;
pub(crate) mod v0_7;

/// Caller-side configuration for simulation `eth_call`s.
#[derive(Clone, Copy, Debug, Default)]
pub struct SimulationConfig {
    /// Neutral address the simulation calls are sent from
    pub utility_wallet_address: Address,
    /// When set, the sender is given a synthetic ETH balance during
    /// simulation so prefund transfers cannot fail spuriously
    pub balance_override_enabled: bool,
}

impl SimulationConfig {
    /// Adds the synthetic sender balance to `overrides` when enabled.
    pub(crate) fn apply_balance_override(&self, sender: Address, overrides: &mut StateOverride) {
        if !self.balance_override_enabled {
            return;
        }
        overrides.insert(
            sender,
            AccountOverride {
                balance: Some(U256::from(10).pow(U256::from(30))),
                ..Default::default()
            },
        );
    }
}
