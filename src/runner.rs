//! Typed conformance runner.
//!
//! Each runner builds a small well-formed fixture, acquires a scoped handle,
//! sizes and allocates what the boundary asks for, invokes it, and hands back
//! the status verbatim. Outputs are checked against the host reference only
//! after a successful call.

use std::fmt::Debug;

use rand::rngs::StdRng;
use rand::seq::index;
use rand::{Rng, SeedableRng};

use crate::backend::{GemviArgs, HandleGuard, SparseBackend, SpgemmOperands};
use crate::config::HarnessConfig;
use crate::error::HarnessError;
use crate::reference::{self, DenseMatrix, SparseVector};
use crate::registry::OperationDescriptor;
use crate::scalar::{Complex32, Complex64, IndexType, Scalar, SparseIndex, ValueType};
use crate::sparse::{CsrMatrix, IndexBase, Operation};
use crate::status::Status;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOptions {
    pub seed: u64,
    pub verify: bool,
    pub base: IndexBase,
}

impl Default for RunOptions {
    fn default() -> Self {
        RunOptions::from(&HarnessConfig::default())
    }
}

impl From<&HarnessConfig> for RunOptions {
    fn from(config: &HarnessConfig) -> Self {
        Self {
            seed: config.seed,
            verify: config.verify,
            base: IndexBase::Zero,
        }
    }
}

/// Inputs for `y = alpha * A * x + beta * y`.
#[derive(Debug, Clone)]
pub struct GemviFixture<T> {
    pub m: usize,
    pub n: usize,
    pub lda: usize,
    pub alpha: T,
    pub beta: T,
    pub a: Vec<T>,
    pub x_val: Vec<T>,
    pub x_ind: Vec<i32>,
    pub y: Vec<T>,
    pub base: IndexBase,
}

impl<T: Scalar> GemviFixture<T> {
    pub const M: usize = 4;
    pub const N: usize = 6;
    /// Larger than `M` so padding between columns is exercised.
    pub const LDA: usize = 5;
    pub const NNZ: usize = 3;

    pub fn new<R: Rng + ?Sized>(rng: &mut R, base: IndexBase) -> Self {
        let (m, n, lda) = (Self::M, Self::N, Self::LDA);
        let mut picked = index::sample(rng, n, Self::NNZ).into_vec();
        picked.sort_unstable();
        Self {
            m,
            n,
            lda,
            alpha: T::sample(rng),
            beta: T::sample(rng),
            a: (0..lda * n).map(|_| T::sample(rng)).collect(),
            x_val: (0..Self::NNZ).map(|_| T::sample(rng)).collect(),
            x_ind: picked
                .into_iter()
                .map(|i| (i + base.offset()) as i32)
                .collect(),
            y: (0..m).map(|_| T::sample(rng)).collect(),
            base,
        }
    }

    /// Well-formed arguments writing into `y` with workspace `buffer`.
    pub fn args<'a>(&'a self, y: &'a mut [T], buffer: &'a mut [u8]) -> GemviArgs<'a, T> {
        GemviArgs {
            trans: Operation::NonTranspose,
            m: self.m as i64,
            n: self.n as i64,
            alpha: Some(&self.alpha),
            a: Some(self.a.as_slice()),
            lda: self.lda as i64,
            nnz: self.x_val.len() as i64,
            x_val: Some(self.x_val.as_slice()),
            x_ind: Some(self.x_ind.as_slice()),
            beta: Some(&self.beta),
            y: Some(y),
            base: self.base,
            buffer: Some(buffer),
        }
    }

    pub fn expected(&self) -> Vec<T> {
        let mut y = self.y.clone();
        let a = DenseMatrix {
            rows: self.m,
            cols: self.n,
            ld: self.lda,
            data: &self.a,
        };
        let x = SparseVector {
            len: self.n,
            values: &self.x_val,
            indices: &self.x_ind,
            base: self.base.offset(),
        };
        reference::gemvi(self.alpha, &a, &x, self.beta, &mut y);
        y
    }
}

/// Inputs for `C = alpha * A * B`.
#[derive(Debug, Clone)]
pub struct SpgemmFixture<I, J, T> {
    pub alpha: T,
    pub a: CsrMatrix<I, J, T>,
    pub b: CsrMatrix<I, J, T>,
}

impl<I: SparseIndex, J: SparseIndex, T: Scalar> SpgemmFixture<I, J, T> {
    pub const A_SHAPE: (usize, usize) = (4, 5);
    pub const B_SHAPE: (usize, usize) = (5, 3);

    pub fn new<R: Rng + ?Sized>(rng: &mut R, base: IndexBase) -> Result<Self, HarnessError> {
        let (ar, ac) = Self::A_SHAPE;
        let (br, bc) = Self::B_SHAPE;
        let alpha = T::sample(rng);
        let a = CsrMatrix::random(ar, ac, 3, base, rng).ok_or(HarnessError::Fixture)?;
        let b = CsrMatrix::random(br, bc, 2, base, rng).ok_or(HarnessError::Fixture)?;
        Ok(Self { alpha, a, b })
    }
}

pub fn run_gemvi<B: SparseBackend, T: Scalar>(
    backend: &B,
    opts: &RunOptions,
) -> Result<Status, HarnessError> {
    let mut rng = StdRng::seed_from_u64(opts.seed);
    let fixture = GemviFixture::<T>::new(&mut rng, opts.base);
    let handle = HandleGuard::acquire(backend).map_err(HarnessError::Acquire)?;

    let size = match backend.gemvi_buffer_size::<T>(
        Some(handle.id()),
        Operation::NonTranspose,
        fixture.m as i64,
        fixture.n as i64,
        fixture.x_val.len() as i64,
    ) {
        Ok(size) => size,
        Err(status) => return Ok(status),
    };
    let mut buffer = vec![0u8; size];
    let mut y = fixture.y.clone();
    let status = backend.gemvi(Some(handle.id()), fixture.args(&mut y, &mut buffer));
    log::debug!(
        "{}: gemvi<{}> with {} byte workspace: {}",
        backend.name(),
        T::VALUE_TYPE.name(),
        size,
        status
    );

    if status.is_success() && opts.verify {
        compare_values("y", &fixture.expected(), &y)?;
    }
    Ok(status)
}

pub fn run_spgemm_csr<B, I, J, T>(backend: &B, opts: &RunOptions) -> Result<Status, HarnessError>
where
    B: SparseBackend,
    I: SparseIndex,
    J: SparseIndex,
    T: Scalar,
{
    let mut rng = StdRng::seed_from_u64(opts.seed);
    let fixture = SpgemmFixture::<I, J, T>::new(&mut rng, opts.base)?;
    let handle = HandleGuard::acquire(backend).map_err(HarnessError::Acquire)?;

    let a = fixture.a.descr();
    let b = fixture.b.descr();
    let operands = SpgemmOperands {
        op_a: Operation::NonTranspose,
        op_b: Operation::NonTranspose,
        alpha: Some(&fixture.alpha),
        a: Some(&a),
        b: Some(&b),
    };
    let nnz = match backend.spgemm_csr_nnz(Some(handle.id()), &operands) {
        Ok(nnz) => nnz,
        Err(status) => return Ok(status),
    };
    let nnz = usize::try_from(nnz).map_err(|_| HarnessError::BadNnz(nnz))?;

    let mut c = CsrMatrix::<I, J, T>::zeroed(fixture.a.rows, fixture.b.cols, nnz, opts.base);
    let status = backend.spgemm_csr(Some(handle.id()), &operands, Some(c.output()));
    log::debug!(
        "{}: spgemm_csr<{}, {}, {}> with {} nonzeros: {}",
        backend.name(),
        I::INDEX_TYPE.name(),
        J::INDEX_TYPE.name(),
        T::VALUE_TYPE.name(),
        nnz,
        status
    );

    if status.is_success() && opts.verify {
        let expected = reference::spgemm_csr(fixture.alpha, &fixture.a, &fixture.b, opts.base)
            .ok_or(HarnessError::Fixture)?;
        compare_exact("row_ptr", &expected.row_ptr, &c.row_ptr)?;
        compare_exact("col_ind", &expected.col_ind, &c.col_ind)?;
        compare_values("values", &expected.values, &c.values)?;
    }
    Ok(status)
}

/// Runs the generic instantiation named by `desc`.
pub fn run_descriptor<B: SparseBackend>(
    backend: &B,
    desc: &OperationDescriptor,
    opts: &RunOptions,
) -> Result<Status, HarnessError> {
    match *desc {
        OperationDescriptor::Gemvi { value } => match value {
            ValueType::F32 => run_gemvi::<B, f32>(backend, opts),
            ValueType::F64 => run_gemvi::<B, f64>(backend, opts),
            ValueType::ComplexF32 => run_gemvi::<B, Complex32>(backend, opts),
            ValueType::ComplexF64 => run_gemvi::<B, Complex64>(backend, opts),
        },
        OperationDescriptor::SpgemmCsr { row, col, value } => match (row, col) {
            (IndexType::I32, IndexType::I32) => spgemm_value::<B, i32, i32>(backend, value, opts),
            (IndexType::I32, IndexType::I64) => spgemm_value::<B, i32, i64>(backend, value, opts),
            (IndexType::I64, IndexType::I32) => spgemm_value::<B, i64, i32>(backend, value, opts),
            (IndexType::I64, IndexType::I64) => spgemm_value::<B, i64, i64>(backend, value, opts),
        },
    }
}

fn spgemm_value<B, I, J>(
    backend: &B,
    value: ValueType,
    opts: &RunOptions,
) -> Result<Status, HarnessError>
where
    B: SparseBackend,
    I: SparseIndex,
    J: SparseIndex,
{
    match value {
        ValueType::F32 => run_spgemm_csr::<B, I, J, f32>(backend, opts),
        ValueType::F64 => run_spgemm_csr::<B, I, J, f64>(backend, opts),
        ValueType::ComplexF32 => run_spgemm_csr::<B, I, J, Complex32>(backend, opts),
        ValueType::ComplexF64 => run_spgemm_csr::<B, I, J, Complex64>(backend, opts),
    }
}

fn compare_len(what: &'static str, expected: usize, actual: usize) -> Result<(), HarnessError> {
    if expected != actual {
        return Err(HarnessError::LengthMismatch {
            what,
            expected,
            actual,
        });
    }
    Ok(())
}

fn compare_exact<X: PartialEq + Debug>(
    what: &'static str,
    expected: &[X],
    actual: &[X],
) -> Result<(), HarnessError> {
    compare_len(what, expected.len(), actual.len())?;
    match expected.iter().zip(actual).position(|(e, a)| e != a) {
        Some(index) => Err(HarnessError::Mismatch {
            what,
            index,
            expected: format!("{:?}", expected[index]),
            actual: format!("{:?}", actual[index]),
        }),
        None => Ok(()),
    }
}

/// Componentwise comparison with a tolerance relative to the expected value.
pub(crate) fn compare_values<T: Scalar>(
    what: &'static str,
    expected: &[T],
    actual: &[T],
) -> Result<(), HarnessError> {
    compare_len(what, expected.len(), actual.len())?;
    let off = expected
        .iter()
        .zip(actual)
        .position(|(&e, &a)| e.distance(a) > T::tolerance() * e.magnitude().max(1.0));
    match off {
        Some(index) => Err(HarnessError::Mismatch {
            what,
            index,
            expected: format!("{:?}", expected[index]),
            actual: format!("{:?}", actual[index]),
        }),
        None => Ok(()),
    }
}
