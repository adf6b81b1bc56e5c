//! # dl-pricing
//!
//! Consumers of the lattice core and the curve toolkit.
//!
//! ## Modules
//!
//! - [`black`]: Black call/put prices, vega and implied volatility
//! - [`term_structure`]: yield, shape, FX forward and coupon-bond curves,
//!   yield to maturity
//! - [`curve_interp`]: discount and forward curves interpolated through quotes
//! - [`curve_fit`]: discount curves fitted in yield space (constant,
//!   Nelson–Siegel, Vasicek)
//! - [`asset_options`]: puts, barriers, averages and swing options on an
//!   [`AssetModel`](dl_methods::AssetModel)
//! - [`rate_options`]: swaps, swaptions, caps and rate futures on an
//!   [`InterestRateModel`](dl_methods::InterestRateModel)

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod asset_options;
pub mod black;
pub mod curve_fit;
pub mod curve_interp;
pub mod data;
pub mod rate_options;
pub mod term_structure;

pub use asset_options::{
    american_put, barrier_up_down_out, down_out_american_call, down_out_call,
    forward_on_average_spot, put, swing,
};
pub use black::{call_black, call_impl_vol_black, call_vega_black, calls_impl_vol, put_black};
pub use curve_fit::{
    discount_const_yield_fit, discount_nelson_siegel_fit, discount_vasicek_fit,
    discount_yield_fit, FittedDiscount,
};
pub use curve_interp::{
    discount_log_lin_interp, forward_carry_interp, forward_carry_steffen_interp,
};
pub use data::{CashFlow, OptionQuote, Swap};
pub use rate_options::{
    auto_cap, cap, down_out_cap, drop_lock_swap, futures_on_rate, swap, swap_value, swaption,
};
pub use term_structure::{
    coupon_bond, duration_coupon_bond, forward_coupon_bond, forward_fx, yield_curve,
    yield_shape1, yield_shape2, yield_to_maturity,
};
