use crate::dtype::DType;
use crate::tensor::Dim2;

pub trait DTypeOps: DType {
    /// `c = alpha * op(a) * op(b) + beta * c` on row-major buffers
    #[allow(clippy::too_many_arguments)]
    fn matrix_multiply(
        alpha: Self,
        a: &[Self],
        a_dims: Dim2,
        ta: bool,
        b: &[Self],
        b_dims: Dim2,
        tb: bool,
        beta: Self,
        c: &mut [Self],
        c_dims: Dim2,
    );
}

macro_rules! implement_dtype_ops {
    ($t: ident, $g: ident) => {
        impl DTypeOps for $t {
            fn matrix_multiply(
                alpha: Self,
                a: &[Self],
                a_dims: Dim2,
                ta: bool,
                b: &[Self],
                b_dims: Dim2,
                tb: bool,
                beta: Self,
                c: &mut [Self],
                c_dims: Dim2,
            ) {
                let Dim2(a_rows, a_cols) = a_dims;
                let Dim2(b_rows, b_cols) = b_dims;
                assert_eq!(a.len(), a_rows * a_cols);
                assert_eq!(b.len(), b_rows * b_cols);
                let (m, k, rsa, csa) = if ta {
                    (a_cols, a_rows, 1, a_cols as isize)
                } else {
                    (a_rows, a_cols, a_cols as isize, 1)
                };
                let (n, rsb, csb) = if tb {
                    assert_eq!(b_cols, k, "Inner dimensions do not match");
                    (b_rows, 1, b_cols as isize)
                } else {
                    assert_eq!(b_rows, k, "Inner dimensions do not match");
                    (b_cols, b_cols as isize, 1)
                };
                assert_eq!(c_dims, Dim2(m, n), "Invalid dimensions for output matrix");
                assert_eq!(c.len(), m * n);
                if m == 0 || n == 0 {
                    return;
                }
                // SAFETY: every buffer length was checked against the strides above
                unsafe {
                    matrixmultiply::$g(
                        m,
                        k,
                        n,
                        alpha,
                        a.as_ptr(),
                        rsa,
                        csa,
                        b.as_ptr(),
                        rsb,
                        csb,
                        beta,
                        c.as_mut_ptr(),
                        n as isize,
                        1,
                    );
                }
            }
        }
    };
}

implement_dtype_ops!(f32, sgemm);
implement_dtype_ops!(f64, dgemm);
