//! Contract records shared by the valuation routines.

use dl_core::{Rate, Real, Time};

/// A stream of fixed payments: `notional · rate · period` every `period`
/// for `number_of_payments` periods.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CashFlow {
    /// Notional amount.
    pub notional: Real,
    /// Simple annual rate of the payments.
    pub rate: Rate,
    /// Time between payments.
    pub period: Time,
    /// Number of payments.
    pub number_of_payments: usize,
}

/// Interest-rate swap exchanging [`CashFlow`] fixed payments for float.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Swap {
    /// The fixed leg.
    pub cash_flow: CashFlow,
    /// `true` when the holder pays float and receives fixed.
    pub pay_float: bool,
}

/// A position in European call options.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OptionQuote {
    /// Strike.
    pub strike: Real,
    /// Maturity.
    pub maturity: Time,
    /// Number of options held.
    pub number: Real,
}
