use crate::tensor::{Dim1, Dim2, Dims, ITensor, RowMajor, Tensor, TensorBase, TensorView};
use std::fmt::{Debug, Formatter, Write};

const DEBUG_LIMIT_ROWS: usize = 5;
const DEBUG_LIMIT_COLS: usize = 10;

fn fmt_run<T: Debug>(run: &[T], f: &mut Formatter<'_>, sep: &str) -> std::fmt::Result {
    for (i, el) in run.iter().enumerate() {
        if i > 0 {
            f.write_str(sep)?;
        }
        Debug::fmt(el, f)?;
    }
    Ok(())
}

fn fmt_limited<T: Debug>(items: &[T], limit: usize, f: &mut Formatter<'_>, sep: &str) -> std::fmt::Result {
    if items.len() > limit {
        let half = limit / 2;
        fmt_run(&items[..half], f, sep)?;
        write!(f, "{sep}...({} hidden){sep}", items.len() - half * 2)?;
        fmt_run(&items[items.len() - half..], f, sep)
    } else {
        fmt_run(items, f, sep)
    }
}

fn fmt_row<T: Debug>(row: &[T], f: &mut Formatter<'_>) -> std::fmt::Result {
    f.write_char('[')?;
    fmt_limited(row, DEBUG_LIMIT_COLS, f, ", ")?;
    f.write_char(']')
}

fn fmt_suffix<T, D: Dims>(dims: &D, len: usize, f: &mut Formatter<'_>) -> std::fmt::Result {
    write!(f, " dtype={} dims={dims} len={len}", std::any::type_name::<T>())
}

fn fmt_1d<T: Debug>(t: TensorView<'_, T, Dim1>, f: &mut Formatter<'_>) -> std::fmt::Result {
    fmt_row(t.as_ref(), f)?;
    fmt_suffix::<T, _>(t.dims(), t.len(), f)
}

fn fmt_rows<T: Debug>(rows: &[&[T]], f: &mut Formatter<'_>) -> std::fmt::Result {
    for row in rows {
        f.write_str("\n   ")?;
        fmt_row(row, f)?;
        f.write_char(',')?;
    }
    Ok(())
}

fn fmt_2d<T: Debug>(t: TensorView<'_, T, Dim2>, f: &mut Formatter<'_>) -> std::fmt::Result {
    f.write_char('[')?;
    if !t.is_empty() {
        let rows: Vec<&[T]> = t.iter_rows().collect();
        if rows.len() > DEBUG_LIMIT_ROWS {
            let half = DEBUG_LIMIT_ROWS / 2;
            fmt_rows(&rows[..half], f)?;
            write!(f, "\n   ...({} hidden),", rows.len() - half * 2)?;
            fmt_rows(&rows[rows.len() - half..], f)?;
        } else {
            fmt_rows(&rows, f)?;
        }
        f.write_char('\n')?;
    }
    f.write_char(']')?;
    fmt_suffix::<T, _>(t.dims(), t.len(), f)
}

impl<T: Debug> Debug for Tensor<T, Dim1> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        fmt_1d(self.view(), f)
    }
}

impl<T: Debug> Debug for Tensor<T, Dim2> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        fmt_2d(self.view(), f)
    }
}

impl<T: Debug> Debug for TensorView<'_, T, Dim1> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        fmt_1d(*self, f)
    }
}

impl<T: Debug> Debug for TensorView<'_, T, Dim2> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        fmt_2d(*self, f)
    }
}
