//! Bounded rejection sampling.

/// Outcome of [`sample_until`]: a drawn value that passed the predicate, or the fallback after
/// the attempt budget ran out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sampled<T> {
    Found(T),
    Fallback(T),
}

impl<T> Sampled<T> {
    pub fn into_inner(self) -> T {
        match self {
            Self::Found(v) | Self::Fallback(v) => v,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback(_))
    }
}

/// Draws up to `max_attempts` candidates and returns the first one `accept` likes.
pub fn sample_until<T>(
    max_attempts: usize,
    mut draw: impl FnMut() -> T,
    mut accept: impl FnMut(&T) -> bool,
    fallback: T,
) -> Sampled<T> {
    for _ in 0..max_attempts {
        let candidate = draw();
        if accept(&candidate) {
            return Sampled::Found(candidate);
        }
    }
    Sampled::Fallback(fallback)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn returns_first_accepted() {
        let mut n = 0;
        let out = sample_until(
            10,
            || {
                n += 1;
                n
            },
            |v| *v == 4,
            -1,
        );
        assert_eq!(out, Sampled::Found(4));
    }

    #[test]
    fn exhausts_budget_exactly() {
        let mut draws = 0;
        let out = sample_until(
            25,
            || {
                draws += 1;
                draws
            },
            |_| false,
            0,
        );
        assert_eq!(draws, 25);
        assert!(out.is_fallback());
        assert_eq!(out.into_inner(), 0);
    }

    #[test]
    fn zero_budget_is_fallback() {
        let out = sample_until(0, || 1, |_| true, 9);
        assert_eq!(out, Sampled::Fallback(9));
    }
}
