//! SIMD kernels used by the ptensor crate.
//!
//! Kernels are selected at runtime. [`Isa::detect`] picks the best
//! instruction set available on the current CPU, and every kernel also has a
//! scalar implementation so results are identical on all platforms. Kernels
//! take an explicit [`Isa`] so that callers and tests can force a particular
//! code path.
//!
//! Setting the `PTENSOR_DISABLE_SIMD` environment variable to a true value
//! (eg. `1`) makes [`Isa::detect`] return the scalar ISA.

use std::sync::OnceLock;

use log::debug;

mod arch;
mod env;
mod gather;
mod transpose;

pub use env::{env_flag, str_as_bool};
pub use gather::resize_row_nearest_u8;
pub use transpose::transpose_8x8_u32;

/// Environment variable which disables use of SIMD instructions.
pub const DISABLE_SIMD_ENV: &str = "PTENSOR_DISABLE_SIMD";

/// Instruction set families supported by the kernels.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum IsaKind {
    /// Portable code with no explicit vector instructions.
    Scalar,
    /// x86-64 AVX2.
    Avx2,
}

/// Token proving that an instruction set is available on the current CPU.
///
/// Tokens for vector ISAs can only be obtained after a runtime check, which
/// makes it safe for kernels to execute their instructions.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Isa {
    kind: IsaKind,
}

impl Isa {
    /// Return the scalar ISA, which is always available.
    pub fn scalar() -> Isa {
        Isa {
            kind: IsaKind::Scalar,
        }
    }

    /// Return the AVX2 ISA if the current CPU supports it.
    pub fn avx2() -> Option<Isa> {
        #[cfg(target_arch = "x86_64")]
        if std::is_x86_feature_detected!("avx2") {
            return Some(Isa {
                kind: IsaKind::Avx2,
            });
        }
        None
    }

    /// Return the preferred ISA for this process.
    ///
    /// Detection happens once. The result honors [`DISABLE_SIMD_ENV`].
    pub fn detect() -> Isa {
        static ISA: OnceLock<Isa> = OnceLock::new();
        *ISA.get_or_init(|| {
            let isa = if env_flag(DISABLE_SIMD_ENV, false) {
                Isa::scalar()
            } else {
                Isa::avx2().unwrap_or_else(Isa::scalar)
            };
            debug!("selected {} kernels", isa.name());
            isa
        })
    }

    /// Return the instruction set family.
    pub fn kind(self) -> IsaKind {
        self.kind
    }

    /// Return a short lowercase name for the ISA, eg. "avx2".
    pub fn name(self) -> &'static str {
        match self.kind {
            IsaKind::Scalar => "scalar",
            IsaKind::Avx2 => "avx2",
        }
    }

    /// Return true if this ISA uses vector instructions.
    pub fn is_vector(self) -> bool {
        self.kind != IsaKind::Scalar
    }
}

/// Return all ISAs usable on the current CPU, scalar first.
///
/// Used by tests and benchmarks to compare code paths.
pub fn available_isas() -> Vec<Isa> {
    let mut isas = vec![Isa::scalar()];
    isas.extend(Isa::avx2());
    isas
}

#[cfg(test)]
mod tests {
    use super::{available_isas, Isa, IsaKind};

    #[test]
    fn test_scalar_isa() {
        let isa = Isa::scalar();
        assert_eq!(isa.kind(), IsaKind::Scalar);
        assert_eq!(isa.name(), "scalar");
        assert!(!isa.is_vector());
    }

    #[test]
    fn test_detect_is_stable() {
        assert_eq!(Isa::detect(), Isa::detect());
    }

    #[test]
    fn test_available_isas() {
        let isas = available_isas();
        assert_eq!(isas[0], Isa::scalar());
        if let Some(avx2) = Isa::avx2() {
            assert_eq!(avx2.name(), "avx2");
            assert!(isas.contains(&avx2));
        }
    }
}
