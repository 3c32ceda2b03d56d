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

//! Domain types shared across the Warden crates.

pub mod chain;

mod fees;
pub use fees::GasFees;

mod timestamp;
pub use timestamp::{Timestamp, ValidTimeRange};

mod validation;
pub use validation::{
    pack_validation_data, parse_validation_data, AggregatorInfo, EntityAddresses,
    MergedValidationData, StakeInfo, TimestampTooLarge, ValidationData, ValidationOutput,
    ValidationReturnInfo, ValidationRevert,
};

mod user_operation;
pub use user_operation::{v0_6, v0_7, UserOperation, UserOperationVariant};

use strum::{Display, EnumString};

/// The EntryPoint contract versions supported by this bundler.
#[derive(Copy, Clone, Debug, Display, EnumString, Eq, PartialEq, Hash)]
pub enum EntryPointVersion {
    /// EntryPoint v0.6
    #[strum(serialize = "v0.6")]
    V0_6,
    /// EntryPoint v0.7
    #[strum(serialize = "v0.7")]
    V0_7,
}
