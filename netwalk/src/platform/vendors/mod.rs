//! Built-in device families.

pub mod alu_omniswitch;
pub mod alu_sar;
