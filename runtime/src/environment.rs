//! Production implementations of the environment traits.

use composable_mvi_core::environment::RandomSource;

/// Random source backed by the thread-local RNG
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRandom;

impl RandomSource for SystemRandom {
    fn next_bool(&self) -> bool {
        rand::random()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_random_produces_both_sides() {
        let random = SystemRandom;
        let heads = (0..256).filter(|_| random.next_bool()).count();

        // 256 fair flips landing all on one side is vanishingly unlikely
        assert!(heads > 0 && heads < 256);
    }
}
