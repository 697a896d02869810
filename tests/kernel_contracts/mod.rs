//! Contract tests for the resolved kernels.

mod filter_contract;
mod projection_contract;
mod registry_contract;
