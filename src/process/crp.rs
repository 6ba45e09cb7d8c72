//! Pitman-Yor Chinese Restaurant Process
//!
//! The two-parameter [Chinese Restaurant
//! Process](https://en.wikipedia.org/wiki/Chinese_restaurant_process) with
//! discount, d ∈ [0, 1), and strength, s > -d. Customers are observations and
//! dishes are the values they were drawn with. The restaurant tracks how the
//! customers of each dish are split among tables, which is all that is needed
//! to seat and remove customers, compute predictive probabilities, and score
//! the seating arrangement.
use crate::dist::{Beta, Gamma};
use crate::misc::slice_sample;
use crate::process::TableHistogram;
use crate::traits::{ContinuousDistr, RandomSource};
use itertools::Itertools;
use special::Gamma as _;
use std::collections::hash_map::{self, RandomState};
use std::collections::HashMap;
use std::fmt;
use std::hash::{BuildHasher, Hash};
use tracing::{debug, trace};

/// Invalid restaurant configuration
#[derive(Debug, Clone, PartialEq)]
pub enum RestaurantError {
    /// The discount is not in [0, 1)
    DiscountOutOfRange { discount: f64 },
    /// The strength is infinite or NaN
    StrengthNotFinite { strength: f64 },
    /// The strength is less than or equal to the negative discount
    StrengthTooLow { strength: f64, discount: f64 },
    /// Hyperparameter resampling was requested with no hyperprior configured
    NoHyperprior,
}

/// Controls the amount of work done by
/// [`Restaurant::resample_hyperparameters_with`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResampleConfig {
    /// Number of rounds alternating between strength and discount
    pub n_loops: usize,
    /// Number of slice sampler iterations per parameter update
    pub n_iters: usize,
}

impl Default for ResampleConfig {
    fn default() -> Self {
        ResampleConfig {
            n_loops: 5,
            n_iters: 10,
        }
    }
}

fn validate(discount: f64, strength: f64) -> Result<(), RestaurantError> {
    if !(0.0..1.0).contains(&discount) {
        Err(RestaurantError::DiscountOutOfRange { discount })
    } else if !strength.is_finite() {
        Err(RestaurantError::StrengthNotFinite { strength })
    } else if strength <= -discount {
        Err(RestaurantError::StrengthTooLow { strength, discount })
    } else {
        Ok(())
    }
}

/// Pitman-Yor restaurant, PYP(d, s), over dishes of type `Dish`.
///
/// Optionally carries a Beta hyperprior on the discount and a Gamma
/// hyperprior on the shifted strength, s + d, in which case the
/// hyperparameters can be resampled from their posterior with
/// [`Restaurant::resample_hyperparameters`].
///
/// # Example
///
/// Seat and remove customers as in a Gibbs sweep
///
/// ```
/// use pyp::prelude::*;
///
/// let mut rng = rand::thread_rng();
/// let mut crp: Restaurant<u32> = Restaurant::new(0.8, 1.0).unwrap();
///
/// // uniform base distribution over ten dishes
/// let p0 = 0.1;
/// for x in [1, 2, 1, 1, 3] {
///     crp.increment(x, p0, &mut rng);
/// }
/// assert_eq!(crp.n_customers(), 5);
/// assert_eq!(crp.n_dishes(), 3);
///
/// // a dish's last customer always takes its table with them
/// assert_eq!(crp.decrement(&3, &mut rng), -1);
/// assert_eq!(crp.n_customers_of(&3), 0);
/// assert!(crp.log_likelihood().is_finite());
/// ```
///
/// Invalid hyperparameters are rejected
///
/// ```
/// # use pyp::prelude::*;
/// assert!(Restaurant::<u32>::new(1.0, 1.0).is_err());
/// assert!(Restaurant::<u32>::new(0.5, -0.5).is_err());
/// assert!(Restaurant::<u32>::new(0.5, -0.4).is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct Restaurant<Dish, S = RandomState> {
    discount: f64,
    strength: f64,
    /// Optional Beta prior on the discount
    discount_prior: Option<Beta>,
    /// Optional Gamma prior on strength + discount
    strength_prior: Option<Gamma>,
    n_tables: usize,
    n_customers: usize,
    dishes: HashMap<Dish, TableHistogram, S>,
}

impl<Dish: Eq + Hash> Restaurant<Dish> {
    /// Create an empty restaurant with fixed hyperparameters
    pub fn new(discount: f64, strength: f64) -> Result<Self, RestaurantError> {
        Self::with_hasher(discount, strength, RandomState::new())
    }

    /// Create an empty restaurant with hyperpriors.
    ///
    /// # Example
    ///
    /// ```
    /// use pyp::prelude::*;
    ///
    /// let crp: Restaurant<char> = Restaurant::with_priors(
    ///     Some(Beta::new(1.0, 1.0).unwrap()),
    ///     Some(Gamma::new(1.0, 1.0).unwrap()),
    ///     0.8,
    ///     1.0,
    /// )
    /// .unwrap();
    ///
    /// assert!(crp.has_discount_prior());
    /// assert!(crp.has_strength_prior());
    /// ```
    pub fn with_priors(
        discount_prior: Option<Beta>,
        strength_prior: Option<Gamma>,
        discount: f64,
        strength: f64,
    ) -> Result<Self, RestaurantError> {
        let mut crp = Self::new(discount, strength)?;
        crp.discount_prior = discount_prior;
        crp.strength_prior = strength_prior;
        Ok(crp)
    }
}

impl<Dish: Eq + Hash, S: BuildHasher> Restaurant<Dish, S> {
    /// Create an empty restaurant whose dish map uses `hasher`
    pub fn with_hasher(
        discount: f64,
        strength: f64,
        hasher: S,
    ) -> Result<Self, RestaurantError> {
        validate(discount, strength)?;
        Ok(Restaurant {
            discount,
            strength,
            discount_prior: None,
            strength_prior: None,
            n_tables: 0,
            n_customers: 0,
            dishes: HashMap::with_hasher(hasher),
        })
    }

    #[inline]
    pub fn discount(&self) -> f64 {
        self.discount
    }

    #[inline]
    pub fn strength(&self) -> f64 {
        self.strength
    }

    /// Set both hyperparameters. Nothing changes on error.
    pub fn set_hyperparameters(
        &mut self,
        discount: f64,
        strength: f64,
    ) -> Result<(), RestaurantError> {
        validate(discount, strength)?;
        self.discount = discount;
        self.strength = strength;
        Ok(())
    }

    /// Set the discount. Nothing changes on error.
    ///
    /// # Example
    ///
    /// ```
    /// # use pyp::prelude::*;
    /// let mut crp: Restaurant<u8> = Restaurant::new(0.5, 0.0).unwrap();
    /// assert!(crp.set_discount(0.9).is_ok());
    /// // the strength must stay above -discount
    /// assert!(crp.set_discount(0.0).is_err());
    /// assert_eq!(crp.discount(), 0.9);
    /// ```
    pub fn set_discount(
        &mut self,
        discount: f64,
    ) -> Result<(), RestaurantError> {
        self.set_hyperparameters(discount, self.strength)
    }

    /// Set the strength. Nothing changes on error.
    pub fn set_strength(
        &mut self,
        strength: f64,
    ) -> Result<(), RestaurantError> {
        self.set_hyperparameters(self.discount, strength)
    }

    pub fn discount_prior(&self) -> Option<&Beta> {
        self.discount_prior.as_ref()
    }

    pub fn strength_prior(&self) -> Option<&Gamma> {
        self.strength_prior.as_ref()
    }

    pub fn set_discount_prior(&mut self, prior: Option<Beta>) {
        self.discount_prior = prior;
    }

    pub fn set_strength_prior(&mut self, prior: Option<Gamma>) {
        self.strength_prior = prior;
    }

    #[inline]
    pub fn has_discount_prior(&self) -> bool {
        self.discount_prior.is_some()
    }

    #[inline]
    pub fn has_strength_prior(&self) -> bool {
        self.strength_prior.is_some()
    }

    /// Remove every customer. Hyperparameters and priors are kept.
    pub fn clear(&mut self) {
        self.n_tables = 0;
        self.n_customers = 0;
        self.dishes.clear();
    }

    /// Total number of occupied tables
    #[inline]
    pub fn n_tables(&self) -> usize {
        self.n_tables
    }

    /// Total number of seated customers
    #[inline]
    pub fn n_customers(&self) -> usize {
        self.n_customers
    }

    /// Number of dishes with at least one customer
    #[inline]
    pub fn n_dishes(&self) -> usize {
        self.dishes.len()
    }

    /// `true` if no customer is seated
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.n_customers == 0
    }

    /// Number of tables serving `dish`
    pub fn n_tables_of(&self, dish: &Dish) -> usize {
        self.dishes.get(dish).map_or(0, TableHistogram::n_tables)
    }

    /// Number of customers eating `dish`
    pub fn n_customers_of(&self, dish: &Dish) -> usize {
        self.dishes.get(dish).map_or(0, TableHistogram::n_customers)
    }

    /// The tables serving `dish`, if it has any customers
    pub fn histogram(&self, dish: &Dish) -> Option<&TableHistogram> {
        self.dishes.get(dish)
    }

    /// Iterate over the seated dishes and their tables
    pub fn iter(&self) -> hash_map::Iter<'_, Dish, TableHistogram> {
        self.dishes.iter()
    }

    /// Seat a customer eating `dish`.
    ///
    /// `p0` is the base distribution's probability of `dish`. Returns `1` if
    /// the customer opened a new table, which in a hierarchy means `dish`
    /// must also be seated in the parent restaurant, and `0` otherwise.
    ///
    /// # Panics
    /// If `p0` is negative or not finite.
    pub fn increment<R: RandomSource + ?Sized>(
        &mut self,
        dish: Dish,
        p0: f64,
        rng: &mut R,
    ) -> i32 {
        assert!(
            p0 >= 0.0 && p0.is_finite(),
            "base probability must be non-negative and finite, got {}",
            p0
        );
        let discount = self.discount;
        let new_table_weight =
            discount.mul_add(self.n_tables as f64, self.strength) * p0;

        let hist = self.dishes.entry(dish).or_default();
        let share = !hist.is_empty() && {
            let share_weight = (hist.n_tables() as f64)
                .mul_add(-discount, hist.n_customers() as f64);
            rng.weighted_choice(share_weight, new_table_weight)
        };

        self.n_customers += 1;
        if share {
            hist.share_table(discount, rng);
            0
        } else {
            hist.create_table();
            self.n_tables += 1;
            1
        }
    }

    /// Remove a customer eating `dish`.
    ///
    /// Returns `-1` if the customer's table closed, which in a hierarchy
    /// means `dish` must also be removed from the parent restaurant, and `0`
    /// otherwise.
    ///
    /// # Panics
    /// If `dish` has no customers.
    pub fn decrement<R: RandomSource + ?Sized>(
        &mut self,
        dish: &Dish,
        rng: &mut R,
    ) -> i32 {
        let hist = self.dishes.get_mut(dish).unwrap_or_else(|| {
            panic!("cannot remove a customer from a dish with no customers")
        });

        self.n_customers -= 1;
        if hist.n_customers() == 1 {
            self.dishes.remove(dish);
            self.n_tables -= 1;
            trace!(n_dishes = self.dishes.len(), "dish left the restaurant");
            -1
        } else if hist.remove_customer(rng) {
            self.n_tables -= 1;
            -1
        } else {
            0
        }
    }

    /// Predictive probability that the next customer eats `dish`, given the
    /// base distribution assigns it probability `p0`.
    ///
    /// # Example
    ///
    /// ```
    /// # use pyp::prelude::*;
    /// let mut rng = rand::thread_rng();
    /// let mut crp: Restaurant<&str> = Restaurant::new(0.0, 1.0).unwrap();
    /// crp.increment("a", 0.5, &mut rng);
    ///
    /// // one customer and strength 1: half of the mass stays with "a"
    /// assert!((crp.prob(&"a", 0.5) - 0.75).abs() < 1E-12);
    /// assert!((crp.prob(&"b", 0.5) - 0.25).abs() < 1E-12);
    /// ```
    pub fn prob(&self, dish: &Dish, p0: f64) -> f64 {
        if self.n_customers == 0 {
            return p0;
        }
        let r = self.discount.mul_add(self.n_tables as f64, self.strength);
        let denom = self.n_customers as f64 + self.strength;
        match self.dishes.get(dish) {
            None => r * p0 / denom,
            Some(hist) => {
                let n_k = (hist.n_tables() as f64)
                    .mul_add(-self.discount, hist.n_customers() as f64);
                r.mul_add(p0, n_k) / denom
            }
        }
    }

    /// Log probability of the current seating arrangement, plus the log
    /// hyperprior densities, at the current hyperparameters. Base
    /// distribution terms are not included.
    pub fn log_likelihood(&self) -> f64 {
        self.log_likelihood_at(self.discount, self.strength)
    }

    /// Log probability of the current seating arrangement, plus the log
    /// hyperprior densities, at the given hyperparameters.
    ///
    /// # Panics
    /// If `discount` is negative or the result is not finite.
    ///
    /// # Example
    ///
    /// ```
    /// # use pyp::prelude::*;
    /// let mut rng = rand::thread_rng();
    /// let mut crp: Restaurant<&str> = Restaurant::new(0.5, 1.0).unwrap();
    /// crp.increment("a", 1.0, &mut rng);
    /// crp.increment("b", 1.0, &mut rng);
    ///
    /// // The second customer opened a table: (s + d) / (1 + s)
    /// assert!((crp.log_likelihood() - 0.75_f64.ln()).abs() < 1E-12);
    /// ```
    pub fn log_likelihood_at(&self, discount: f64, strength: f64) -> f64 {
        let lp = self.ln_prior(discount, strength)
            + self.ln_seating(discount, strength);
        assert!(
            lp.is_finite(),
            "non-finite log likelihood at discount={}, strength={}",
            discount,
            strength
        );
        lp
    }

    fn ln_prior(&self, discount: f64, strength: f64) -> f64 {
        let ln_pd = self
            .discount_prior
            .as_ref()
            .map_or(0.0, |prior| prior.ln_pdf(&discount));
        let ln_ps = self
            .strength_prior
            .as_ref()
            .map_or(0.0, |prior| prior.ln_pdf(&(strength + discount)));
        ln_pd + ln_ps
    }

    fn ln_seating(&self, discount: f64, strength: f64) -> f64 {
        if self.n_customers == 0 {
            return 0.0;
        }

        let n = self.n_customers as f64;
        let t = self.n_tables as f64;

        if discount > 0.0 {
            let ln_gamma_1md = (1.0 - discount).ln_gamma().0;
            // ln Γ(s) - ln Γ(s/d) tends to -ln(d) as s -> 0
            let ln_gamma_s = if strength == 0.0 {
                -discount.ln()
            } else {
                strength.ln_gamma().0 - (strength / discount).ln_gamma().0
            };
            let ln_tables: f64 = self
                .dishes
                .values()
                .flat_map(TableHistogram::bins)
                .map(|(k, ct)| {
                    ct as f64
                        * ((k as f64 - discount).ln_gamma().0 - ln_gamma_1md)
                })
                .sum();

            ln_gamma_s - (strength + n).ln_gamma().0
                + t.mul_add(
                    discount.ln(),
                    (strength / discount + t).ln_gamma().0,
                )
                + ln_tables
        } else if discount == 0.0 {
            let ln_tables: f64 = self
                .dishes
                .values()
                .map(|hist| (hist.n_tables() as f64).ln_gamma().0)
                .sum();

            t.mul_add(strength.ln(), strength.ln_gamma().0)
                - (strength + t).ln_gamma().0
                + ln_tables
        } else {
            panic!("discount ({}) must not be negative", discount)
        }
    }

    /// Target for the slice sampler: `-∞` anywhere the hyperparameters or
    /// the priors rule out.
    fn ln_score(&self, discount: f64, strength: f64) -> f64 {
        if validate(discount, strength).is_err() {
            return f64::NEG_INFINITY;
        }
        let ln_prior = self.ln_prior(discount, strength);
        if ln_prior == f64::NEG_INFINITY {
            return f64::NEG_INFINITY;
        }
        let lp = ln_prior + self.ln_seating(discount, strength);
        if lp.is_finite() {
            lp
        } else {
            f64::NEG_INFINITY
        }
    }

    fn sample_strength<R: RandomSource + ?Sized>(
        &self,
        rng: &mut R,
        n_iters: usize,
    ) -> f64 {
        let discount = self.discount;
        let ln_f = |strength: f64| self.ln_score(discount, strength);
        slice_sample(
            ln_f,
            self.strength,
            rng,
            (-discount, f64::INFINITY),
            0.0,
            n_iters,
            100 * n_iters,
        )
    }

    fn sample_discount<R: RandomSource + ?Sized>(
        &self,
        rng: &mut R,
        n_iters: usize,
    ) -> f64 {
        let strength = self.strength;
        let ln_f = |discount: f64| self.ln_score(discount, strength);
        slice_sample(
            ln_f,
            self.discount,
            rng,
            (strength.min(0.0).abs(), 1.0),
            0.0,
            n_iters,
            100 * n_iters,
        )
    }

    /// Resample the discount and strength from their posterior using the
    /// default [`ResampleConfig`].
    ///
    /// # Example
    ///
    /// ```
    /// use pyp::prelude::*;
    ///
    /// let mut rng = rand::thread_rng();
    /// let mut crp: Restaurant<u32> = Restaurant::with_priors(
    ///     Some(Beta::new(1.0, 1.0).unwrap()),
    ///     Some(Gamma::new(1.0, 1.0).unwrap()),
    ///     0.5,
    ///     1.0,
    /// )
    /// .unwrap();
    ///
    /// for x in 0..50 {
    ///     crp.increment(x % 7, 0.01, &mut rng);
    /// }
    /// crp.resample_hyperparameters(&mut rng).unwrap();
    ///
    /// assert!((0.0..1.0).contains(&crp.discount()));
    /// assert!(crp.strength() > -crp.discount());
    /// ```
    pub fn resample_hyperparameters<R: RandomSource + ?Sized>(
        &mut self,
        rng: &mut R,
    ) -> Result<(), RestaurantError> {
        self.resample_hyperparameters_with(rng, ResampleConfig::default())
    }

    /// Resample the discount and strength from their posterior.
    ///
    /// Alternates slice sampling the strength and the discount (each only if
    /// it has a prior) for `config.n_loops` rounds, then updates the
    /// strength once more so it agrees with the final discount. Does nothing
    /// if the restaurant is empty.
    ///
    /// # Errors
    /// [`RestaurantError::NoHyperprior`] if neither hyperparameter has a
    /// prior. The restaurant is left untouched.
    pub fn resample_hyperparameters_with<R: RandomSource + ?Sized>(
        &mut self,
        rng: &mut R,
        config: ResampleConfig,
    ) -> Result<(), RestaurantError> {
        if !(self.has_discount_prior() || self.has_strength_prior()) {
            return Err(RestaurantError::NoHyperprior);
        }
        if self.is_empty() {
            return Ok(());
        }

        debug!(
            discount = self.discount,
            strength = self.strength,
            n_customers = self.n_customers,
            n_tables = self.n_tables,
            "resampling hyperparameters"
        );

        for round in 0..config.n_loops {
            if self.has_strength_prior() {
                self.strength = self.sample_strength(rng, config.n_iters);
            }
            if self.has_discount_prior() {
                self.discount = self.sample_discount(rng, config.n_iters);
            }
            trace!(
                round,
                discount = self.discount,
                strength = self.strength,
                "hyperparameter round"
            );
        }
        self.strength = self.sample_strength(rng, config.n_iters);

        debug!(
            discount = self.discount,
            strength = self.strength,
            "resampled hyperparameters"
        );
        Ok(())
    }
}

impl<'a, Dish, S> IntoIterator for &'a Restaurant<Dish, S> {
    type Item = (&'a Dish, &'a TableHistogram);
    type IntoIter = hash_map::Iter<'a, Dish, TableHistogram>;

    fn into_iter(self) -> Self::IntoIter {
        self.dishes.iter()
    }
}

/// One header line, then one `dish : [occupancy:n_tables, ...]` line per
/// dish, sorted by dish.
impl<Dish: fmt::Display, S> fmt::Display for Restaurant<Dish, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "PYP(d={}, s={}) customers={} tables={}",
            self.discount, self.strength, self.n_customers, self.n_tables
        )?;
        self.dishes
            .iter()
            .map(|(dish, hist)| (dish.to_string(), hist))
            .sorted_by(|a, b| a.0.cmp(&b.0))
            .try_for_each(|(dish, hist)| writeln!(f, "{} : {}", dish, hist))
    }
}

impl std::error::Error for RestaurantError {}

impl fmt::Display for RestaurantError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DiscountOutOfRange { discount } => {
                write!(f, "discount ({}) must be in [0, 1)", discount)
            }
            Self::StrengthNotFinite { strength } => {
                write!(f, "non-finite strength: {}", strength)
            }
            Self::StrengthTooLow { strength, discount } => write!(
                f,
                "strength ({}) must be greater than -discount ({})",
                strength, -discount
            ),
            Self::NoHyperprior => write!(
                f,
                "cannot resample hyperparameters without a discount \
                 or strength prior"
            ),
        }
    }
}
