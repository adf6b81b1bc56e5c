//! Black model of a single asset with deterministic interest rates.
//!
//! ```text
//! S(t) = F(t) / F(t0) · S0 · exp(σ W(t) − σ² t / 2)
//! ```
//!
//! The log-spot deviation `σ W` is discretised by a [`TrinomialLattice`];
//! the lattice convexity correction replaces `σ² t / 2` so that the
//! discounted spot is an exact lattice martingale.  Discount factors are
//! deterministic: `P(t_i, T) = P(T) / P(t_i)`.
//!
//! The initial state is the spot price.  The lattice carries a band of
//! `2m + 1` initial spots `S0·e^{k dx}`, `k = -m..=m`, so the price returned by
//! `interpolate` is a function of the initial spot on that band.

use std::rc::Rc;

use dl_core::{
    ensure,
    errors::{Error, Result},
    Real, Time, Volatility,
};
use dl_math::Function;
use dl_methods::{AssetModel, EventGrid, Model, Slice, StateLattice, TrinomialLattice, TrinomialParams};

/// Discretisation settings of a [`BlackModel`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlackConfig {
    /// Maximal lattice time step.
    pub step: Time,
    /// Half-width `m` of the band of initial spots.
    pub band: usize,
    /// Standard deviations of log-spot covered beyond the band.
    pub std_devs: Real,
}

impl Default for BlackConfig {
    fn default() -> Self {
        Self {
            step: 1.0 / 250.0,
            band: 20,
            std_devs: 6.0,
        }
    }
}

/// Black model on a trinomial log-spot lattice.
#[derive(Debug, Clone)]
pub struct BlackModel {
    spot: Real,
    discount: Function,
    forward: Function,
    sigma: Volatility,
    initial_time: Time,
    config: BlackConfig,
    lattice: Option<Rc<TrinomialLattice>>,
}

impl BlackModel {
    /// Create a Black model.
    ///
    /// `discount` is the discount curve `P(t)` and `forward` the forward
    /// price curve `F(t)` of the asset; both must be defined from
    /// `initial_time` on.
    ///
    /// # Errors
    /// Precondition failure on a non-positive spot or volatility, or curves
    /// not defined at `initial_time`.
    pub fn new(
        spot: Real,
        discount: Function,
        forward: Function,
        sigma: Volatility,
        initial_time: Time,
        config: BlackConfig,
    ) -> Result<Self> {
        ensure!(spot > 0.0, "spot must be positive, got {spot}");
        ensure!(sigma > 0.0, "volatility must be positive, got {sigma}");
        ensure!(
            discount.belongs(initial_time) && forward.belongs(initial_time),
            "curves must be defined at the initial time {initial_time}"
        );
        Ok(Self {
            spot,
            discount,
            forward,
            sigma,
            initial_time,
            config,
            lattice: None,
        })
    }

    /// Initial spot price.
    pub fn spot_price(&self) -> Real {
        self.spot
    }

    /// Volatility.
    pub fn sigma(&self) -> Volatility {
        self.sigma
    }

    fn session(&self) -> Result<&Rc<TrinomialLattice>> {
        self.lattice.as_ref().ok_or_else(|| {
            Error::Precondition("no event times assigned to the Black model".to_string())
        })
    }

    fn slice(&self, lattice: &Rc<TrinomialLattice>, i: usize, values: Vec<Real>) -> Result<Slice> {
        Slice::new(Rc::clone(lattice) as Rc<dyn StateLattice>, i, values)
    }

    fn checked_time(&self, lattice: &TrinomialLattice, i: usize, maturity: Time) -> Result<Time> {
        lattice.grid().check_index(i)?;
        let t = lattice.grid().time(i);
        ensure!(
            maturity >= t,
            "maturity {maturity} precedes the event time {t}"
        );
        Ok(t)
    }
}

impl Model for BlackModel {
    fn initial_time(&self) -> Time {
        self.initial_time
    }

    fn assign_event_times(&mut self, times: &[Time]) -> Result<()> {
        let grid = EventGrid::new(self.initial_time, times)?;
        let params = TrinomialParams {
            variance: self.sigma * self.sigma,
            max_step: self.config.step,
            band: self.config.band,
            std_devs: self.config.std_devs,
        };
        let spot = self.spot;
        let lattice = TrinomialLattice::new(grid, &params, &self.discount, |x| spot * x.exp())?;
        tracing::debug!(events = times.len(), sigma = self.sigma, "Black model event times assigned");
        self.lattice = Some(Rc::new(lattice));
        Ok(())
    }

    fn event_times(&self) -> Result<&[Time]> {
        Ok(self.session()?.grid().times())
    }

    fn cash(&self, i: usize, amount: Real) -> Result<Slice> {
        let lattice = self.session()?;
        Slice::constant(Rc::clone(lattice) as Rc<dyn StateLattice>, i, amount)
    }

    fn discount(&self, i: usize, maturity: Time) -> Result<Slice> {
        let lattice = self.session()?;
        let t = self.checked_time(lattice, i, maturity)?;
        let df = self.discount.value(maturity)? / self.discount.value(t)?;
        Slice::constant(Rc::clone(lattice) as Rc<dyn StateLattice>, i, df)
    }
}

impl AssetModel for BlackModel {
    fn spot(&self, i: usize) -> Result<Slice> {
        let lattice = self.session()?;
        lattice.grid().check_index(i)?;
        let t = lattice.grid().time(i);
        let scale = self.spot * self.forward.value(t)? / self.forward.value(self.initial_time)?;
        let c = lattice.log_growth(i);
        let values = (0..lattice.nodes())
            .map(|n| scale * (lattice.x(n) - c).exp())
            .collect();
        self.slice(lattice, i, values)
    }

    fn forward(&self, i: usize, maturity: Time) -> Result<Slice> {
        let lattice = self.session()?;
        let t = self.checked_time(lattice, i, maturity)?;
        let growth = self.forward.value(maturity)? / self.forward.value(t)?;
        Ok(self.spot(i)? * growth)
    }
}
