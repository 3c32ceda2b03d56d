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

//! User operation admission: EntryPoint simulation policy, fee pricing,
//! and pre-verification gas accounting.

/// Gas pricing and accounting.
pub mod gas;
pub use gas::{FeeError, FeeEstimator, FeeEstimatorImpl, FeeSettings};

mod simulation;
pub use simulation::{
    ApiVersion, ReferencedCodeHashes, SimulationError, SimulationResult, SimulationSettings,
    Simulator, StorageMap, Validator,
};
