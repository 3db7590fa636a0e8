//! Sparse storage as seen from both sides of the boundary.
//!
//! `CsrDescr`/`CsrOutput` are the raw, unvalidated views handed to a backend:
//! every array is nullable and every dimension is signed, so a caller can
//! describe malformed input. `CsrMatrix` is the owned, well-formed storage the
//! harness builds its fixtures from.

use bytemuck::Zeroable;
use rand::seq::index;
use rand::Rng;

use crate::scalar::{Scalar, SparseIndex};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    NonTranspose,
    Transpose,
    ConjugateTranspose,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexBase {
    Zero,
    One,
}

impl IndexBase {
    pub fn offset(self) -> usize {
        match self {
            IndexBase::Zero => 0,
            IndexBase::One => 1,
        }
    }
}

/// Read-only CSR operand.
#[derive(Debug, Clone, Copy)]
pub struct CsrDescr<'a, I, J, T> {
    pub rows: i64,
    pub cols: i64,
    pub nnz: i64,
    pub row_ptr: Option<&'a [I]>,
    pub col_ind: Option<&'a [J]>,
    pub values: Option<&'a [T]>,
    pub base: IndexBase,
}

/// Writable CSR result, allocated by the caller after the nnz phase.
#[derive(Debug)]
pub struct CsrOutput<'a, I, J, T> {
    pub rows: i64,
    pub cols: i64,
    pub nnz: i64,
    pub row_ptr: Option<&'a mut [I]>,
    pub col_ind: Option<&'a mut [J]>,
    pub values: Option<&'a mut [T]>,
    pub base: IndexBase,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CsrMatrix<I, J, T> {
    pub rows: usize,
    pub cols: usize,
    pub row_ptr: Vec<I>,
    pub col_ind: Vec<J>,
    pub values: Vec<T>,
    pub base: IndexBase,
}

impl<I: SparseIndex, J: SparseIndex, T: Scalar> CsrMatrix<I, J, T> {
    /// Storage for a `rows x cols` result with `nnz` entries, all zeroed.
    pub fn zeroed(rows: usize, cols: usize, nnz: usize, base: IndexBase) -> Self {
        Self {
            rows,
            cols,
            row_ptr: vec![I::zeroed(); rows + 1],
            col_ind: vec![J::zeroed(); nnz],
            values: vec![T::zeroed(); nnz],
            base,
        }
    }

    /// Random pattern with between 1 and `max_per_row` sorted entries in each
    /// row (capped at `cols`), random values.
    ///
    /// Returns `None` when the sizes do not fit the index types.
    pub fn random<R: Rng + ?Sized>(
        rows: usize,
        cols: usize,
        max_per_row: usize,
        base: IndexBase,
        rng: &mut R,
    ) -> Option<Self> {
        let offset = base.offset();
        let mut row_ptr = Vec::with_capacity(rows + 1);
        let mut col_ind = Vec::new();
        let mut values = Vec::new();
        row_ptr.push(I::from_usize(offset)?);
        for _ in 0..rows {
            let count = rng.gen_range(1..=max_per_row.max(1)).min(cols);
            let mut picked = index::sample(rng, cols, count).into_vec();
            picked.sort_unstable();
            for col in picked {
                col_ind.push(J::from_usize(col + offset)?);
                values.push(T::sample(rng));
            }
            row_ptr.push(I::from_usize(col_ind.len() + offset)?);
        }
        Some(Self {
            rows,
            cols,
            row_ptr,
            col_ind,
            values,
            base,
        })
    }

    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    pub fn descr(&self) -> CsrDescr<'_, I, J, T> {
        CsrDescr {
            rows: self.rows as i64,
            cols: self.cols as i64,
            nnz: self.nnz() as i64,
            row_ptr: Some(self.row_ptr.as_slice()),
            col_ind: Some(self.col_ind.as_slice()),
            values: Some(self.values.as_slice()),
            base: self.base,
        }
    }

    pub fn output(&mut self) -> CsrOutput<'_, I, J, T> {
        CsrOutput {
            rows: self.rows as i64,
            cols: self.cols as i64,
            nnz: self.values.len() as i64,
            row_ptr: Some(self.row_ptr.as_mut_slice()),
            col_ind: Some(self.col_ind.as_mut_slice()),
            values: Some(self.values.as_mut_slice()),
            base: self.base,
        }
    }
}
