use super::error::BuildError;
use rand::Rng;
use std::fmt;
use std::str::FromStr;

/// Strategy used to choose which surface binding sites receive a chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PatternType {
    /// Uniformly random sites, reproducible through the seed.
    #[default]
    Random,
    /// Sites evenly spaced over the port list.
    Grid,
}

impl PatternType {
    /// Chooses `n` distinct site indices out of `available`, sorted ascending.
    ///
    /// Only the random pattern consumes values from `rng`.
    pub fn select(
        &self,
        available: usize,
        n: usize,
        rng: &mut impl Rng,
    ) -> Result<Vec<usize>, BuildError> {
        if n > available {
            return Err(BuildError::TooManyChains {
                requested: n,
                available,
            });
        }
        let mut sites = match self {
            PatternType::Random => rand::seq::index::sample(rng, available, n).into_vec(),
            PatternType::Grid => (0..n).map(|k| k * available / n).collect(),
        };
        sites.sort_unstable();
        Ok(sites)
    }
}

impl FromStr for PatternType {
    type Err = BuildError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "random" => Ok(PatternType::Random),
            "grid" => Ok(PatternType::Grid),
            _ => Err(BuildError::UnknownPattern(s.to_string())),
        }
    }
}

impl fmt::Display for PatternType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                PatternType::Random => "random",
                PatternType::Grid => "grid",
            }
        )
    }
}
