use core::fmt;
use core::str::FromStr;

/// A countdown of retry attempts, either bounded or infinite.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Retries {
    remaining: Option<u64>,
    max: Option<u64>,
}

impl Retries {
    pub const fn new(max: u64) -> Self {
        Self {
            remaining: Some(max),
            max: Some(max),
        }
    }

    pub const fn infinite() -> Self {
        Self {
            remaining: None,
            max: None,
        }
    }

    pub fn is_infinite(&self) -> bool {
        self.max.is_none()
    }

    /// Consumes one attempt. Infinite budgets never run out.
    pub fn sub(&mut self) {
        if let Some(remaining) = self.remaining.as_mut() {
            *remaining = remaining.saturating_sub(1);
        }
    }

    pub fn is_zero(&self) -> bool {
        self.remaining == Some(0)
    }

    pub fn reset(&mut self) {
        self.remaining = self.max;
    }

    /// The full budget, regardless of how much has been consumed.
    pub fn max(&self) -> Retries {
        Self::from_max(self.max)
    }

    fn from_max(max: Option<u64>) -> Self {
        Self {
            remaining: max,
            max,
        }
    }
}

impl Default for Retries {
    fn default() -> Self {
        Self::infinite()
    }
}

impl fmt::Display for Retries {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.remaining {
            Some(remaining) => write!(f, "{remaining}"),
            None => write!(f, "infinite"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("invalid retries value {0:?}: expected a positive integer or \"infinite\"")]
pub struct ParseRetriesError(pub String);

impl FromStr for Retries {
    type Err = ParseRetriesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("infinite") {
            return Ok(Self::infinite());
        }

        match s.parse::<u64>() {
            Ok(max) if max > 0 => Ok(Self::new(max)),
            _ => Err(ParseRetriesError(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn countdown_and_reset() {
        let mut retries = Retries::new(2);
        assert!(!retries.is_zero());
        retries.sub();
        retries.sub();
        assert!(retries.is_zero());
        retries.sub();
        assert!(retries.is_zero());
        assert_eq!(retries.to_string(), "0");
        assert_eq!(retries.max().to_string(), "2");

        retries.reset();
        assert_eq!(retries, Retries::new(2));
    }

    #[test]
    fn infinite_never_runs_out() {
        let mut retries = Retries::infinite();
        for _ in 0..1000 {
            retries.sub();
        }
        assert!(!retries.is_zero());
        assert_eq!(retries.to_string(), "infinite");
    }

    #[test]
    fn parsing() {
        assert_eq!("infinite".parse::<Retries>().unwrap(), Retries::infinite());
        assert_eq!("5".parse::<Retries>().unwrap(), Retries::new(5));
        assert!("0".parse::<Retries>().is_err());
        assert!("-3".parse::<Retries>().is_err());
        assert!("forever".parse::<Retries>().is_err());
    }
}
