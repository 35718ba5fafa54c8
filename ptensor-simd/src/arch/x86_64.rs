use std::arch::x86_64::{
    __m128i, __m256i, _mm256_castsi256_si128, _mm256_i32gather_epi32, _mm256_loadu_si256,
    _mm256_permute2f128_si256, _mm256_permutevar8x32_epi32, _mm256_setr_epi32,
    _mm256_setr_epi8, _mm256_setzero_si256, _mm256_shuffle_epi8, _mm256_storeu_si256,
    _mm256_unpackhi_epi32, _mm256_unpackhi_epi64, _mm256_unpacklo_epi32, _mm256_unpacklo_epi64,
    _mm_storel_epi64,
};

/// Transpose an 8x8 block of 32-bit values from `src` into `dst`.
///
/// The transpose uses three shuffle stages: 32-bit interleave of row pairs,
/// 64-bit interleave of pair results, then a swap of 128-bit halves.
///
/// # Safety
///
/// The CPU must support AVX2. `src` must be valid for reads of rows
/// `src, src + src_stride, .. src + 7 * src_stride`, each 8 elements long, and
/// `dst` valid for writes with the same layout using `dst_stride`.
#[target_feature(enable = "avx2")]
pub unsafe fn transpose_8x8_u32(
    src: *const u32,
    src_stride: usize,
    dst: *mut u32,
    dst_stride: usize,
) {
    let mut rows = [_mm256_setzero_si256(); 8];
    for (row, r) in rows.iter_mut().enumerate() {
        *r = _mm256_loadu_si256(src.add(row * src_stride) as *const __m256i);
    }
    let [r0, r1, r2, r3, r4, r5, r6, r7] = rows;

    // a0 b0 a1 b1 | a4 b4 a5 b5
    let t0 = _mm256_unpacklo_epi32(r0, r1);
    // a2 b2 a3 b3 | a6 b6 a7 b7
    let t1 = _mm256_unpackhi_epi32(r0, r1);
    let t2 = _mm256_unpacklo_epi32(r2, r3);
    let t3 = _mm256_unpackhi_epi32(r2, r3);
    let t4 = _mm256_unpacklo_epi32(r4, r5);
    let t5 = _mm256_unpackhi_epi32(r4, r5);
    let t6 = _mm256_unpacklo_epi32(r6, r7);
    let t7 = _mm256_unpackhi_epi32(r6, r7);

    // a0 b0 c0 d0 | a4 b4 c4 d4
    let s0 = _mm256_unpacklo_epi64(t0, t2);
    // a1 b1 c1 d1 | a5 b5 c5 d5
    let s1 = _mm256_unpackhi_epi64(t0, t2);
    let s2 = _mm256_unpacklo_epi64(t1, t3);
    let s3 = _mm256_unpackhi_epi64(t1, t3);
    let s4 = _mm256_unpacklo_epi64(t4, t6);
    let s5 = _mm256_unpackhi_epi64(t4, t6);
    let s6 = _mm256_unpacklo_epi64(t5, t7);
    let s7 = _mm256_unpackhi_epi64(t5, t7);

    let out = [
        _mm256_permute2f128_si256(s0, s4, 0x20),
        _mm256_permute2f128_si256(s1, s5, 0x20),
        _mm256_permute2f128_si256(s2, s6, 0x20),
        _mm256_permute2f128_si256(s3, s7, 0x20),
        _mm256_permute2f128_si256(s0, s4, 0x31),
        _mm256_permute2f128_si256(s1, s5, 0x31),
        _mm256_permute2f128_si256(s2, s6, 0x31),
        _mm256_permute2f128_si256(s3, s7, 0x31),
    ];
    for (row, v) in out.into_iter().enumerate() {
        _mm256_storeu_si256(dst.add(row * dst_stride) as *mut __m256i, v);
    }
}

/// Gather `x_map.len()` bytes from `src` into `dst`, where `dst[i] =
/// src[x_map[i]]`, eight columns per step.
///
/// Each gather loads four bytes per lane starting at the source column, so
/// vector steps are only taken while the largest index in the step is at
/// least four bytes from the end of `src`. Remaining columns are copied one
/// at a time.
///
/// # Safety
///
/// The CPU must support AVX2. Every entry of `x_map` must be a valid index
/// into `src` and `dst.len()` must equal `x_map.len()`.
#[target_feature(enable = "avx2")]
pub unsafe fn gather_u8(src: &[u8], x_map: &[i32], dst: &mut [u8]) {
    // Moves the low byte of each 32-bit lane into the low dword of each
    // 128-bit half.
    let pack_bytes = _mm256_setr_epi8(
        0, 4, 8, 12, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, //
        0, 4, 8, 12, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1,
    );
    // Moves the low dword of the upper half next to the lower half's.
    let pack_halves = _mm256_setr_epi32(0, 4, 1, 1, 1, 1, 1, 1);

    let n = x_map.len();
    let mut col = 0;
    while col + 8 <= n {
        let max_index = x_map[col..col + 8].iter().copied().max().unwrap_or(0) as usize;
        if max_index + 4 > src.len() {
            break;
        }
        let offsets = _mm256_loadu_si256(x_map.as_ptr().add(col) as *const __m256i);
        let words = _mm256_i32gather_epi32::<1>(src.as_ptr() as *const i32, offsets);
        let bytes = _mm256_shuffle_epi8(words, pack_bytes);
        let packed = _mm256_permutevar8x32_epi32(bytes, pack_halves);
        _mm_storel_epi64(
            dst.as_mut_ptr().add(col) as *mut __m128i,
            _mm256_castsi256_si128(packed),
        );
        col += 8;
    }

    for i in col..n {
        *dst.get_unchecked_mut(i) = *src.get_unchecked(x_map[i] as usize);
    }
}
