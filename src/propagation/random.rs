//! Random variable sources for the shadowing term.
//!
//! A propagation model owns exactly one [`RandomVariableSource`]. Sources are
//! reproducible: the pair `(seed, stream)` fully determines the sequence of
//! samples, so independent model instances can be given disjoint stream
//! indices and replayed bit-for-bit across runs.
//!
//! Stream indices below 2^63 belong to the caller. A source that is never
//! seeded explicitly (or is given a negative index) draws its stream from a
//! process-wide counter that starts at 2^63, so automatic streams never
//! collide with caller-assigned ones.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};
use serde::Deserialize;

use super::config::ConfigError;

/// Seed shared by every source unless overridden with `with_seed`.
pub const DEFAULT_SEED: u64 = 1;

/// First stream index handed out by automatic assignment.
const AUTO_STREAM_BASE: u64 = 1 << 63;

/// Redraws allowed for a bounded normal before the sample is clamped.
const MAX_BOUND_REDRAWS: usize = 64;

static NEXT_AUTO_STREAM: AtomicU64 = AtomicU64::new(AUTO_STREAM_BASE);

fn next_auto_stream() -> u64 {
    NEXT_AUTO_STREAM.fetch_add(1, Ordering::Relaxed)
}

/// A stateful generator of real-valued samples.
pub trait RandomVariableSource: Send + fmt::Debug {
    /// Draw the next sample.
    fn sample(&mut self) -> f64;

    /// Reseed deterministically onto `stream`.
    ///
    /// Returns the number of streams consumed.
    fn set_stream(&mut self, stream: i64) -> i64;
}

/// Normally distributed samples, optionally truncated to `mean ± bound`.
pub struct NormalRandomVariable {
    mean: f64,
    variance: f64,
    bound: Option<f64>,
    distribution: Normal<f64>,
    seed: u64,
    stream: u64,
    rng: ChaCha8Rng,
}

impl NormalRandomVariable {
    /// Create a source on a freshly assigned automatic stream.
    pub fn new(mean: f64, variance: f64) -> Result<Self, ConfigError> {
        if !mean.is_finite() {
            return Err(ConfigError::InvalidParameter(format!("normal mean must be finite, got {}", mean)));
        }
        if !variance.is_finite() || variance < 0.0 {
            return Err(ConfigError::InvalidParameter(format!(
                "normal variance must be finite and non-negative, got {}",
                variance
            )));
        }
        let distribution =
            Normal::new(mean, variance.sqrt()).map_err(|e| ConfigError::InvalidParameter(format!("invalid normal distribution: {}", e)))?;
        let stream = next_auto_stream();
        Ok(Self {
            mean,
            variance,
            bound: None,
            distribution,
            seed: DEFAULT_SEED,
            stream,
            rng: Self::generator(DEFAULT_SEED, stream),
        })
    }

    /// Reject samples farther than `bound` from the mean.
    ///
    /// After `MAX_BOUND_REDRAWS` rejected draws the last sample is clamped to
    /// `mean ± bound`, so tight bounds (including zero) still return.
    pub fn with_bound(mut self, bound: f64) -> Result<Self, ConfigError> {
        if bound.is_nan() || bound < 0.0 {
            return Err(ConfigError::InvalidParameter(format!("normal bound must be non-negative, got {}", bound)));
        }
        self.bound = if bound.is_infinite() { None } else { Some(bound) };
        Ok(self)
    }

    /// Use a different base seed. The current stream is kept and the
    /// generator restarts from its beginning.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self.rng = Self::generator(seed, self.stream);
        self
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    pub fn variance(&self) -> f64 {
        self.variance
    }

    pub fn bound(&self) -> Option<f64> {
        self.bound
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn stream(&self) -> u64 {
        self.stream
    }

    fn generator(seed: u64, stream: u64) -> ChaCha8Rng {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        rng.set_stream(stream);
        rng
    }
}

impl fmt::Debug for NormalRandomVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NormalRandomVariable")
            .field("mean", &self.mean)
            .field("variance", &self.variance)
            .field("bound", &self.bound)
            .field("seed", &self.seed)
            .field("stream", &self.stream)
            .finish()
    }
}

impl RandomVariableSource for NormalRandomVariable {
    fn sample(&mut self) -> f64 {
        match self.bound {
            None => self.distribution.sample(&mut self.rng),
            Some(bound) => {
                let mut value = self.distribution.sample(&mut self.rng);
                for _ in 0..MAX_BOUND_REDRAWS {
                    if (value - self.mean).abs() <= bound {
                        return value;
                    }
                    value = self.distribution.sample(&mut self.rng);
                }
                value.clamp(self.mean - bound, self.mean + bound)
            }
        }
    }

    fn set_stream(&mut self, stream: i64) -> i64 {
        self.stream = if stream < 0 { next_auto_stream() } else { stream as u64 };
        self.rng = Self::generator(self.seed, self.stream);
        1
    }
}

/// Always returns the same value. Turns the shadowing model into the plain
/// log-distance model when the value is zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstantRandomVariable {
    value: f64,
}

impl ConstantRandomVariable {
    pub fn new(value: f64) -> Self {
        Self { value }
    }

    pub fn value(&self) -> f64 {
        self.value
    }
}

impl RandomVariableSource for ConstantRandomVariable {
    fn sample(&mut self) -> f64 {
        self.value
    }

    fn set_stream(&mut self, _stream: i64) -> i64 {
        1
    }
}

/// The closed set of distributions a model can be configured with.
///
/// Deserializes from a tagged table:
///
/// ```toml
/// [random_variable]
/// type = "normal"
/// mean = 0.0
/// variance = 2.0
/// ```
///
/// and parses from the attribute string form
/// `ns3::NormalRandomVariable[Mean=0.0|Variance=4.0]`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RandomVariableSpec {
    Normal {
        #[serde(default)]
        mean: f64,
        #[serde(default = "default_variance")]
        variance: f64,
        #[serde(default)]
        bound: Option<f64>,
    },
    Constant {
        #[serde(default)]
        value: f64,
    },
}

fn default_variance() -> f64 {
    4.0
}

impl Default for RandomVariableSpec {
    fn default() -> Self {
        RandomVariableSpec::Normal {
            mean: 0.0,
            variance: default_variance(),
            bound: None,
        }
    }
}

impl RandomVariableSpec {
    /// Instantiate the described source on an automatic stream.
    pub fn build(&self) -> Result<Box<dyn RandomVariableSource>, ConfigError> {
        match *self {
            RandomVariableSpec::Normal { mean, variance, bound } => {
                let mut source = NormalRandomVariable::new(mean, variance)?;
                if let Some(bound) = bound {
                    source = source.with_bound(bound)?;
                }
                Ok(Box::new(source))
            }
            RandomVariableSpec::Constant { value } => {
                if !value.is_finite() {
                    return Err(ConfigError::InvalidParameter(format!("constant value must be finite, got {}", value)));
                }
                Ok(Box::new(ConstantRandomVariable::new(value)))
            }
        }
    }
}

impl FromStr for RandomVariableSpec {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (name, attributes) = match s.find('[') {
            Some(open) => {
                let body = s[open + 1..]
                    .strip_suffix(']')
                    .ok_or_else(|| ConfigError::ParseError(format!("unterminated attribute list in '{}'", s)))?;
                (&s[..open], body)
            }
            None => (s, ""),
        };
        let name = name.trim();
        let name = name.strip_prefix("ns3::").unwrap_or(name);
        let name = name.strip_suffix("RandomVariable").unwrap_or(name);

        let mut pairs = Vec::new();
        for pair in attributes.split('|').map(str::trim).filter(|p| !p.is_empty()) {
            let (key, value) = pair
                .split_once('=')
                .ok_or_else(|| ConfigError::ParseError(format!("expected Key=Value, got '{}'", pair)))?;
            let value = value
                .trim()
                .parse::<f64>()
                .map_err(|e| ConfigError::ParseError(format!("attribute {}: {}", key.trim(), e)))?;
            pairs.push((key.trim(), value));
        }

        match name {
            "Normal" => {
                let mut mean = 0.0;
                let mut variance = default_variance();
                let mut bound = None;
                for (key, value) in pairs {
                    match key {
                        "Mean" => mean = value,
                        "Variance" => variance = value,
                        "Bound" => bound = Some(value),
                        other => return Err(ConfigError::ParseError(format!("unknown attribute '{}' for Normal", other))),
                    }
                }
                Ok(RandomVariableSpec::Normal { mean, variance, bound })
            }
            "Constant" => {
                let mut value = 0.0;
                for (key, v) in pairs {
                    match key {
                        "Constant" | "Value" => value = v,
                        other => return Err(ConfigError::ParseError(format!("unknown attribute '{}' for Constant", other))),
                    }
                }
                Ok(RandomVariableSpec::Constant { value })
            }
            other => Err(ConfigError::ParseError(format!("unsupported random variable '{}'", other))),
        }
    }
}
