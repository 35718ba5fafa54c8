use crate::{Isa, IsaKind};

/// Resample one row of bytes by nearest-neighbor lookup.
///
/// Sets `dst[i] = src[x_map[i]]` for each output column `i`. `x_map` holds
/// the source column for each output column, normally computed once per
/// resize and shared by all rows.
///
/// Panics if `dst` and `x_map` differ in length or if any entry of `x_map`
/// is not a valid index into `src`.
pub fn resize_row_nearest_u8(isa: Isa, src: &[u8], x_map: &[i32], dst: &mut [u8]) {
    assert_eq!(dst.len(), x_map.len(), "column map length mismatch");
    assert!(
        x_map.iter().all(|&x| x >= 0 && (x as usize) < src.len()),
        "column map index out of bounds"
    );

    match isa.kind() {
        #[cfg(target_arch = "x86_64")]
        IsaKind::Avx2 => {
            // Safety: AVX2 availability is guaranteed by the `Isa` token and
            // the indices were validated above.
            unsafe { crate::arch::x86_64::gather_u8(src, x_map, dst) }
        }
        _ => {
            for (out, &x) in dst.iter_mut().zip(x_map) {
                *out = src[x as usize];
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use ptensor_testing::TestCases;

    use super::resize_row_nearest_u8;
    use crate::{available_isas, Isa};

    #[test]
    fn test_resize_row_nearest_u8() {
        #[derive(Debug)]
        struct Case {
            src_len: usize,
            x_map: Vec<i32>,
        }

        let cases = [
            // Identity.
            Case {
                src_len: 20,
                x_map: (0..20).collect(),
            },
            // Upscale by 2, including indices near the end of the row which
            // must use the scalar tail.
            Case {
                src_len: 9,
                x_map: (0..18).map(|x| x / 2).collect(),
            },
            // Downscale.
            Case {
                src_len: 64,
                x_map: (0..16).map(|x| x * 4).collect(),
            },
            // Fewer columns than one vector step.
            Case {
                src_len: 3,
                x_map: vec![0, 2, 1],
            },
            Case {
                src_len: 5,
                x_map: vec![],
            },
        ];

        cases.test_each(|case| {
            let src: Vec<u8> = (0..case.src_len).map(|x| (x * 7 + 3) as u8).collect();
            let expected: Vec<u8> = case.x_map.iter().map(|&x| src[x as usize]).collect();
            for isa in available_isas() {
                let mut dst = vec![0u8; case.x_map.len()];
                resize_row_nearest_u8(isa, &src, &case.x_map, &mut dst);
                assert_eq!(dst, expected, "isa {}", isa.name());
            }
        })
    }

    #[test]
    #[should_panic(expected = "column map index out of bounds")]
    fn test_resize_row_nearest_u8_invalid_index() {
        let src = [1u8, 2, 3];
        let mut dst = [0u8; 2];
        resize_row_nearest_u8(Isa::scalar(), &src, &[0, 3], &mut dst);
    }
}
