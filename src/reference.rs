//! Host kernels on validated operands.
//!
//! The host backend computes with these, and the runner uses them to check
//! what any backend wrote.

use std::collections::BTreeMap;

use itertools::Itertools;

use crate::scalar::{Scalar, SparseIndex};
use crate::sparse::{CsrMatrix, IndexBase};

/// Column-major dense matrix with leading dimension `ld >= rows`.
#[derive(Debug, Clone, Copy)]
pub struct DenseMatrix<'a, T> {
    pub rows: usize,
    pub cols: usize,
    pub ld: usize,
    pub data: &'a [T],
}

impl<T: Scalar> DenseMatrix<'_, T> {
    fn at(&self, row: usize, col: usize) -> T {
        debug_assert!(row < self.rows && col < self.cols);
        self.data[col * self.ld + row]
    }
}

/// Sparse vector of logical length `len`; `indices` carry the index base.
#[derive(Debug, Clone, Copy)]
pub struct SparseVector<'a, T> {
    pub len: usize,
    pub values: &'a [T],
    pub indices: &'a [i32],
    pub base: usize,
}

impl<'a, T: Scalar> SparseVector<'a, T> {
    pub fn entries(&self) -> impl Iterator<Item = (usize, T)> + 'a {
        let (indices, values) = (self.indices, self.values);
        let (base, len) = (self.base as i64, self.len);
        indices.iter().zip(values).map(move |(&i, &v)| {
            let i = (i as i64 - base) as usize;
            debug_assert!(i < len, "index {} outside vector of length {}", i, len);
            (i, v)
        })
    }
}

/// Well-formed CSR matrix: offsets monotone, columns in range.
#[derive(Debug, Clone, Copy)]
pub struct CsrView<'a, I, J, T> {
    pub rows: usize,
    pub cols: usize,
    pub row_ptr: &'a [I],
    pub col_ind: &'a [J],
    pub values: &'a [T],
    pub base: usize,
}

impl<'a, I: SparseIndex, J: SparseIndex, T: Scalar> CsrView<'a, I, J, T> {
    pub fn nnz(&self) -> usize {
        (self.row_ptr[self.rows].to_i64() - self.base as i64) as usize
    }

    pub fn row(&self, i: usize) -> impl Iterator<Item = (usize, T)> + 'a {
        let base = self.base as i64;
        let start = (self.row_ptr[i].to_i64() - base) as usize;
        let end = (self.row_ptr[i + 1].to_i64() - base) as usize;
        let (col_ind, values) = (self.col_ind, self.values);
        col_ind[start..end]
            .iter()
            .zip(&values[start..end])
            .map(move |(&j, &v)| ((j.to_i64() - base) as usize, v))
    }
}

impl<I: SparseIndex, J: SparseIndex, T: Scalar> CsrMatrix<I, J, T> {
    pub fn view(&self) -> CsrView<'_, I, J, T> {
        CsrView {
            rows: self.rows,
            cols: self.cols,
            row_ptr: &self.row_ptr,
            col_ind: &self.col_ind,
            values: &self.values,
            base: self.base.offset(),
        }
    }
}

/// `y = alpha * A * x + beta * y`
pub fn gemvi<T: Scalar>(
    alpha: T,
    a: &DenseMatrix<'_, T>,
    x: &SparseVector<'_, T>,
    beta: T,
    y: &mut [T],
) {
    for (row, y_r) in y.iter_mut().enumerate().take(a.rows) {
        let acc = x
            .entries()
            .fold(T::zero(), |acc, (col, v)| acc + a.at(row, col) * v);
        *y_r = alpha * acc + beta * *y_r;
    }
}

/// Structural nonzeros of `A * B`, counting cancellations as entries.
pub fn spgemm_nnz<I, J, T>(a: &CsrView<'_, I, J, T>, b: &CsrView<'_, I, J, T>) -> usize
where
    I: SparseIndex,
    J: SparseIndex,
    T: Scalar,
{
    (0..a.rows)
        .map(|i| {
            a.row(i)
                .flat_map(|(k, _)| b.row(k).map(|(j, _)| j))
                .unique()
                .count()
        })
        .sum()
}

/// Rows of `alpha * A * B` as sorted `(column, value)` lists.
pub fn spgemm_rows<I, J, T>(
    alpha: T,
    a: &CsrView<'_, I, J, T>,
    b: &CsrView<'_, I, J, T>,
) -> Vec<Vec<(usize, T)>>
where
    I: SparseIndex,
    J: SparseIndex,
    T: Scalar,
{
    (0..a.rows)
        .map(|i| {
            let mut acc: BTreeMap<usize, T> = BTreeMap::new();
            for (k, a_ik) in a.row(i) {
                for (j, b_kj) in b.row(k) {
                    let entry = acc.entry(j).or_insert_with(T::zero);
                    *entry = *entry + a_ik * b_kj;
                }
            }
            acc.into_iter().map(|(j, v)| (j, alpha * v)).collect()
        })
        .collect()
}

/// Owned `alpha * A * B`, or `None` if the result does not fit `I`/`J`.
pub fn spgemm_csr<I, J, T>(
    alpha: T,
    a: &CsrMatrix<I, J, T>,
    b: &CsrMatrix<I, J, T>,
    base: IndexBase,
) -> Option<CsrMatrix<I, J, T>>
where
    I: SparseIndex,
    J: SparseIndex,
    T: Scalar,
{
    let rows = spgemm_rows(alpha, &a.view(), &b.view());
    let nnz = rows.iter().map(Vec::len).sum();
    let mut c = CsrMatrix::zeroed(a.rows, b.cols, nnz, base);
    write_rows(&rows, base.offset(), &mut c.row_ptr, &mut c.col_ind, &mut c.values)?;
    Some(c)
}

/// Lays rows out in CSR arrays, `row_ptr` covering at least `rows`. Returns `None` when an offset or column
/// overflows its index type.
pub(crate) fn write_rows<I, J, T>(
    rows: &[Vec<(usize, T)>],
    base: usize,
    row_ptr: &mut [I],
    col_ind: &mut [J],
    values: &mut [T],
) -> Option<()>
where
    I: SparseIndex,
    J: SparseIndex,
    T: Scalar,
{
    let mut at = 0;
    row_ptr[0] = I::from_usize(base)?;
    for (i, row) in rows.iter().enumerate() {
        for &(j, v) in row {
            col_ind[at] = J::from_usize(j + base)?;
            values[at] = v;
            at += 1;
        }
        row_ptr[i + 1] = I::from_usize(at + base)?;
    }
    // Rows past the end of `rows` are empty.
    let end = I::from_usize(at + base)?;
    for offset in row_ptr.iter_mut().skip(rows.len() + 1) {
        *offset = end;
    }
    Some(())
}
