//! Argument checks shared by every backend.
//!
//! Order of checks: operation support, sizes, quick return, pointers, lengths,
//! contents. A perturbation of exactly one argument therefore always maps to
//! one status.

use std::mem::size_of;

use crate::backend::{GemviArgs, SpgemmOperands};
use crate::reference::{CsrView, DenseMatrix, SparseVector};
use crate::scalar::{Scalar, SparseIndex};
use crate::sparse::{CsrDescr, CsrOutput, Operation};
use crate::status::Status;

pub(crate) struct GemviPlan<'a, T> {
    pub alpha: T,
    pub a: DenseMatrix<'a, T>,
    pub x: SparseVector<'a, T>,
    pub beta: T,
    pub y: &'a mut [T],
}

pub(crate) struct SpgemmPlan<'a, I, J, T> {
    pub alpha: T,
    pub rows: usize,
    pub cols: usize,
    /// `None` when the product is empty and only row offsets are written.
    pub inputs: Option<(CsrView<'a, I, J, T>, CsrView<'a, I, J, T>)>,
}

pub(crate) struct CsrSink<'a, I, J, T> {
    pub row_ptr: &'a mut [I],
    pub col_ind: &'a mut [J],
    pub values: &'a mut [T],
    pub base: usize,
}

fn non_transpose(op: Operation) -> Result<(), Status> {
    match op {
        Operation::NonTranspose => Ok(()),
        Operation::Transpose | Operation::ConjugateTranspose => Err(Status::NotSupported),
    }
}

fn size(v: i64) -> Result<usize, Status> {
    usize::try_from(v).map_err(|_| Status::InvalidSize)
}

/// `m` elements of `T` in bytes; a request that overflows cannot be served.
fn workspace_bytes<T>(m: usize) -> Result<usize, Status> {
    m.checked_mul(size_of::<T>()).ok_or(Status::MemoryError)
}

fn present<T: ?Sized>(ptr: Option<&T>) -> Result<&T, Status> {
    ptr.ok_or(Status::InvalidValue)
}

pub(crate) fn gemvi_buffer_size<T: Scalar>(
    trans: Operation,
    m: i64,
    n: i64,
    nnz: i64,
) -> Result<usize, Status> {
    non_transpose(trans)?;
    let (m, n, nnz) = (size(m)?, size(n)?, size(nnz)?);
    if nnz > n {
        return Err(Status::InvalidSize);
    }
    workspace_bytes::<T>(m)
}

/// `Ok(None)` is a quick return: nothing to compute.
pub(crate) fn gemvi<T: Scalar>(args: GemviArgs<'_, T>) -> Result<Option<GemviPlan<'_, T>>, Status> {
    let GemviArgs {
        trans,
        m,
        n,
        alpha,
        a,
        lda,
        nnz,
        x_val,
        x_ind,
        beta,
        y,
        base,
        buffer,
    } = args;

    non_transpose(trans)?;
    let (m, n, nnz, lda) = (size(m)?, size(n)?, size(nnz)?, size(lda)?);
    if nnz > n || lda < m.max(1) {
        return Err(Status::InvalidSize);
    }
    if m == 0 {
        return Ok(None);
    }

    let alpha = *present(alpha)?;
    let a = present(a)?;
    let x_val = present(x_val)?;
    let x_ind = present(x_ind)?;
    let beta = *present(beta)?;
    let y = y.ok_or(Status::InvalidValue)?;
    let buffer = buffer.ok_or(Status::InvalidValue)?;

    let a_len = match n {
        0 => Some(0),
        n => lda.checked_mul(n - 1).and_then(|len| len.checked_add(m)),
    }
    .ok_or(Status::InvalidSize)?;
    let buffer_len = workspace_bytes::<T>(m).map_err(|_| Status::InvalidSize)?;
    if a.len() < a_len
        || x_val.len() < nnz
        || x_ind.len() < nnz
        || y.len() < m
        || buffer.len() < buffer_len
    {
        return Err(Status::InvalidSize);
    }

    let offset = base.offset() as i64;
    let x_ind = &x_ind[..nnz];
    if x_ind
        .iter()
        .any(|&i| i as i64 - offset < 0 || i as i64 - offset >= n as i64)
    {
        return Err(Status::InvalidValue);
    }

    Ok(Some(GemviPlan {
        alpha,
        a: DenseMatrix {
            rows: m,
            cols: n,
            ld: lda,
            data: a,
        },
        x: SparseVector {
            len: n,
            values: &x_val[..nnz],
            indices: x_ind,
            base: base.offset(),
        },
        beta,
        y: &mut y[..m],
    }))
}

fn csr_shape<I, J, T>(d: &CsrDescr<'_, I, J, T>) -> Result<(usize, usize, usize), Status> {
    let (rows, cols, nnz) = (size(d.rows)?, size(d.cols)?, size(d.nnz)?);
    if rows.checked_mul(cols).map_or(false, |dense| nnz > dense) {
        return Err(Status::InvalidSize);
    }
    Ok((rows, cols, nnz))
}

fn csr_view<'a, I, J, T>(
    d: &CsrDescr<'a, I, J, T>,
    (rows, cols, nnz): (usize, usize, usize),
) -> Result<CsrView<'a, I, J, T>, Status>
where
    I: SparseIndex,
    J: SparseIndex,
    T: Scalar,
{
    let row_ptr = d.row_ptr.ok_or(Status::InvalidValue)?;
    let (col_ind, values) = if nnz > 0 {
        (
            d.col_ind.ok_or(Status::InvalidValue)?,
            d.values.ok_or(Status::InvalidValue)?,
        )
    } else {
        (d.col_ind.unwrap_or_default(), d.values.unwrap_or_default())
    };
    if row_ptr.len() < rows + 1 || col_ind.len() < nnz || values.len() < nnz {
        return Err(Status::InvalidSize);
    }

    let base = d.base.offset() as i64;
    let offsets = &row_ptr[..=rows];
    if offsets[0].to_i64() != base
        || Some(offsets[rows].to_i64()) != (nnz as i64).checked_add(base)
        || offsets.windows(2).any(|w| w[0] > w[1])
    {
        return Err(Status::InvalidValue);
    }
    let col_ind = &col_ind[..nnz];
    if col_ind
        .iter()
        .any(|&j| j.to_i64() < base || j.to_i64() - base >= cols as i64)
    {
        return Err(Status::InvalidValue);
    }

    Ok(CsrView {
        rows,
        cols,
        row_ptr: offsets,
        col_ind,
        values: &values[..nnz],
        base: d.base.offset(),
    })
}

pub(crate) fn spgemm_inputs<'a, I, J, T>(
    operands: &SpgemmOperands<'a, I, J, T>,
) -> Result<SpgemmPlan<'a, I, J, T>, Status>
where
    I: SparseIndex,
    J: SparseIndex,
    T: Scalar,
{
    non_transpose(operands.op_a)?;
    non_transpose(operands.op_b)?;
    let alpha = *present(operands.alpha)?;
    let a = present(operands.a)?;
    let b = present(operands.b)?;
    let a_shape = csr_shape(a)?;
    let b_shape = csr_shape(b)?;
    if a_shape.1 != b_shape.0 {
        return Err(Status::InvalidSize);
    }

    let (rows, cols) = (a_shape.0, b_shape.1);
    if rows == 0 || cols == 0 || a_shape.1 == 0 {
        return Ok(SpgemmPlan {
            alpha,
            rows,
            cols,
            inputs: None,
        });
    }
    Ok(SpgemmPlan {
        alpha,
        rows,
        cols,
        inputs: Some((csr_view(a, a_shape)?, csr_view(b, b_shape)?)),
    })
}

pub(crate) fn spgemm_output<'a, I, J, T>(
    c: Option<CsrOutput<'a, I, J, T>>,
    rows: usize,
    cols: usize,
    nnz: usize,
) -> Result<CsrSink<'a, I, J, T>, Status> {
    let c = c.ok_or(Status::InvalidValue)?;
    if (size(c.rows)?, size(c.cols)?, size(c.nnz)?) != (rows, cols, nnz) {
        return Err(Status::InvalidSize);
    }
    let row_ptr = c.row_ptr.ok_or(Status::InvalidValue)?;
    let (col_ind, values) = if nnz > 0 {
        (
            c.col_ind.ok_or(Status::InvalidValue)?,
            c.values.ok_or(Status::InvalidValue)?,
        )
    } else {
        (c.col_ind.unwrap_or_default(), c.values.unwrap_or_default())
    };
    if row_ptr.len() < rows + 1 || col_ind.len() < nnz || values.len() < nnz {
        return Err(Status::InvalidSize);
    }
    Ok(CsrSink {
        row_ptr: &mut row_ptr[..=rows],
        col_ind: &mut col_ind[..nnz],
        values: &mut values[..nnz],
        base: c.base.offset(),
    })
}
