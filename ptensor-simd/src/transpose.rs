use crate::{Isa, IsaKind};

/// Transpose an 8x8 block of 32-bit values.
///
/// Row `r` of the source block starts at `src[r * src_stride]` and row `r`
/// of the destination block at `dst[r * dst_stride]`. After the call
/// `dst[c * dst_stride + r] == src[r * src_stride + c]` for `r, c` in `0..8`.
///
/// Panics if either slice is too short to hold an 8x8 block with the given
/// stride.
pub fn transpose_8x8_u32(
    isa: Isa,
    src: &[u32],
    src_stride: usize,
    dst: &mut [u32],
    dst_stride: usize,
) {
    assert!(src_stride >= 8 && src.len() >= 7 * src_stride + 8);
    assert!(dst_stride >= 8 && dst.len() >= 7 * dst_stride + 8);

    match isa.kind() {
        #[cfg(target_arch = "x86_64")]
        IsaKind::Avx2 => {
            // Safety: `Isa` values with the AVX2 kind are only created after
            // a feature check, and the slice lengths were checked above.
            unsafe {
                crate::arch::x86_64::transpose_8x8_u32(
                    src.as_ptr(),
                    src_stride,
                    dst.as_mut_ptr(),
                    dst_stride,
                )
            }
        }
        _ => transpose_8x8_scalar(src, src_stride, dst, dst_stride),
    }
}

fn transpose_8x8_scalar(src: &[u32], src_stride: usize, dst: &mut [u32], dst_stride: usize) {
    for r in 0..8 {
        for c in 0..8 {
            dst[c * dst_stride + r] = src[r * src_stride + c];
        }
    }
}
