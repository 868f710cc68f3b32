use rand::Rng;

/// Source of the percentage draw used by the random security check
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait RandomCheckProvider: Send + Sync {
    /// Returns a value in `0..100`
    fn next_percentage(&self) -> u32;
}

/// Uniform draw from the thread-local generator
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRngRandomCheckProvider;

impl RandomCheckProvider for ThreadRngRandomCheckProvider {
    fn next_percentage(&self) -> u32 {
        rand::thread_rng().gen_range(0..100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentage_is_in_range() {
        let provider = ThreadRngRandomCheckProvider;
        for _ in 0..1000 {
            assert!(provider.next_percentage() < 100);
        }
    }
}
