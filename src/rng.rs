use crate::dtype::Element;

/// Source of random bits used to fill tensors.
pub trait RandomSource {
    /// Return 64 random bits.
    fn next_u64(&mut self) -> u64;

    /// Return a random element. Floats are uniform in `[0, 1)`, integers are
    /// uniform over their full range.
    fn next_element<T: Element>(&mut self) -> T
    where
        Self: Sized,
    {
        T::from_random_bits(self.next_u64())
    }
}

/// Simple, non-cryptographically secure random number generator.
///
/// See <https://en.wikipedia.org/wiki/Xorshift>.
#[derive(Clone, Debug)]
pub struct XorShiftRng {
    state: u64,
}

impl XorShiftRng {
    /// Create a generator from a seed. A zero seed, which would produce only
    /// zeros, is replaced by a fixed non-zero value.
    pub fn new(seed: u64) -> XorShiftRng {
        XorShiftRng {
            state: if seed == 0 { 0x9E37_79B9_7F4A_7C15 } else { seed },
        }
    }
}

impl RandomSource for XorShiftRng {
    fn next_u64(&mut self) -> u64 {
        let mut tmp = self.state;
        tmp ^= tmp << 13;
        tmp ^= tmp >> 7;
        tmp ^= tmp << 17;
        self.state = tmp;
        tmp
    }
}

impl RandomSource for fastrand::Rng {
    fn next_u64(&mut self) -> u64 {
        self.u64(..)
    }
}

#[cfg(test)]
mod tests {
    use super::{RandomSource, XorShiftRng};

    #[test]
    fn test_xorshift_is_deterministic() {
        let mut a = XorShiftRng::new(1234);
        let mut b = XorShiftRng::new(1234);
        for _ in 0..10 {
            assert_eq!(a.next_u64(), b.next_u64());
        }
    }

    #[test]
    fn test_zero_seed() {
        let mut rng = XorShiftRng::new(0);
        assert_ne!(rng.next_u64(), 0);
    }

    #[test]
    fn test_next_element() {
        let mut rng = XorShiftRng::new(42);
        for _ in 0..100 {
            let x: f32 = rng.next_element();
            assert!((0. ..1.).contains(&x));
        }

        let mut rng = fastrand::Rng::with_seed(7);
        let values: Vec<u8> = (0..64).map(|_| rng.next_element()).collect();
        assert!(values.iter().any(|&x| x != values[0]));
    }
}
