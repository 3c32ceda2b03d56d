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

use serde::{Deserialize, Serialize};

/// An EIP-1559 fee pair, in wei.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GasFees {
    /// Maximum fee per gas
    pub max_fee_per_gas: u128,
    /// Maximum priority fee per gas
    pub max_priority_fee_per_gas: u128,
}

impl GasFees {
    /// Componentwise maximum of two fee pairs.
    pub fn max(self, other: Self) -> Self {
        Self {
            max_fee_per_gas: self.max_fee_per_gas.max(other.max_fee_per_gas),
            max_priority_fee_per_gas: self
                .max_priority_fee_per_gas
                .max(other.max_priority_fee_per_gas),
        }
    }

    /// True if both components are at least as large as `other`'s.
    pub fn covers(self, other: Self) -> bool {
        self.max_fee_per_gas >= other.max_fee_per_gas
            && self.max_priority_fee_per_gas >= other.max_priority_fee_per_gas
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max() {
        let a = GasFees {
            max_fee_per_gas: 10,
            max_priority_fee_per_gas: 1,
        };
        let b = GasFees {
            max_fee_per_gas: 5,
            max_priority_fee_per_gas: 3,
        };
        assert_eq!(
            a.max(b),
            GasFees {
                max_fee_per_gas: 10,
                max_priority_fee_per_gas: 3,
            }
        );
    }

    #[test]
    fn test_covers() {
        let a = GasFees {
            max_fee_per_gas: 10,
            max_priority_fee_per_gas: 2,
        };
        let b = GasFees {
            max_fee_per_gas: 10,
            max_priority_fee_per_gas: 1,
        };
        assert!(a.covers(b));
        assert!(!b.covers(a));
    }
}
