//! Bad-argument validation.
//!
//! Every case perturbs exactly one argument of an otherwise valid call and
//! names the status the boundary has to answer with. Anything else, success
//! included, fails the case.

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::backend::{HandleGuard, HandleId, SparseBackend, SpgemmOperands};
use crate::error::HarnessError;
use crate::registry::OperationKind;
use crate::runner::{GemviFixture, SpgemmFixture};
use crate::sparse::{CsrMatrix, IndexBase, Operation};
use crate::status::Status;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GemviFault {
    NullHandle,
    ReleasedHandle,
    NegativeM,
    NegativeN,
    NegativeNnz,
    NnzExceedsN,
    LdaBelowM,
    LdaOverflow,
    TruncatedBuffer,
    NullAlpha,
    NullA,
    NullXVal,
    NullXInd,
    NullBeta,
    NullY,
    NullBuffer,
    IndexOutOfRange,
    Transpose,
}

impl GemviFault {
    pub const ALL: [GemviFault; 18] = [
        GemviFault::NullHandle,
        GemviFault::ReleasedHandle,
        GemviFault::NegativeM,
        GemviFault::NegativeN,
        GemviFault::NegativeNnz,
        GemviFault::NnzExceedsN,
        GemviFault::LdaBelowM,
        GemviFault::LdaOverflow,
        GemviFault::TruncatedBuffer,
        GemviFault::NullAlpha,
        GemviFault::NullA,
        GemviFault::NullXVal,
        GemviFault::NullXInd,
        GemviFault::NullBeta,
        GemviFault::NullY,
        GemviFault::NullBuffer,
        GemviFault::IndexOutOfRange,
        GemviFault::Transpose,
    ];

    pub fn name(self) -> &'static str {
        match self {
            GemviFault::NullHandle => "null_handle",
            GemviFault::ReleasedHandle => "released_handle",
            GemviFault::NegativeM => "negative_m",
            GemviFault::NegativeN => "negative_n",
            GemviFault::NegativeNnz => "negative_nnz",
            GemviFault::NnzExceedsN => "nnz_exceeds_n",
            GemviFault::LdaBelowM => "lda_below_m",
            GemviFault::LdaOverflow => "lda_overflow",
            GemviFault::TruncatedBuffer => "truncated_buffer",
            GemviFault::NullAlpha => "null_alpha",
            GemviFault::NullA => "null_a",
            GemviFault::NullXVal => "null_x_val",
            GemviFault::NullXInd => "null_x_ind",
            GemviFault::NullBeta => "null_beta",
            GemviFault::NullY => "null_y",
            GemviFault::NullBuffer => "null_buffer",
            GemviFault::IndexOutOfRange => "index_out_of_range",
            GemviFault::Transpose => "transpose",
        }
    }

    pub fn expected(self) -> Status {
        match self {
            GemviFault::NullHandle | GemviFault::ReleasedHandle => Status::InvalidHandle,
            GemviFault::NegativeM
            | GemviFault::NegativeN
            | GemviFault::NegativeNnz
            | GemviFault::NnzExceedsN
            | GemviFault::LdaBelowM
            | GemviFault::LdaOverflow
            | GemviFault::TruncatedBuffer => Status::InvalidSize,
            GemviFault::NullAlpha
            | GemviFault::NullA
            | GemviFault::NullXVal
            | GemviFault::NullXInd
            | GemviFault::NullBeta
            | GemviFault::NullY
            | GemviFault::NullBuffer
            | GemviFault::IndexOutOfRange => Status::InvalidValue,
            GemviFault::Transpose => Status::NotSupported,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpgemmFault {
    NullHandle,
    ReleasedHandle,
    NullAlpha,
    NullA,
    NullB,
    NullC,
    NullARowPtr,
    NullBColInd,
    NullCRowPtr,
    NullCValues,
    ColumnOutOfRange,
    ARowPtrBaseMismatch,
    ARowPtrEndMismatch,
    DecreasingARowPtr,
    NegativeARows,
    NegativeBCols,
    NegativeANnz,
    ANnzExceedsDense,
    InnerDimensionMismatch,
    OutputShapeMismatch,
    OutputNnzMismatch,
    TransposeA,
}

impl SpgemmFault {
    pub const ALL: [SpgemmFault; 22] = [
        SpgemmFault::NullHandle,
        SpgemmFault::ReleasedHandle,
        SpgemmFault::NullAlpha,
        SpgemmFault::NullA,
        SpgemmFault::NullB,
        SpgemmFault::NullC,
        SpgemmFault::NullARowPtr,
        SpgemmFault::NullBColInd,
        SpgemmFault::NullCRowPtr,
        SpgemmFault::NullCValues,
        SpgemmFault::ColumnOutOfRange,
        SpgemmFault::ARowPtrBaseMismatch,
        SpgemmFault::ARowPtrEndMismatch,
        SpgemmFault::DecreasingARowPtr,
        SpgemmFault::NegativeARows,
        SpgemmFault::NegativeBCols,
        SpgemmFault::NegativeANnz,
        SpgemmFault::ANnzExceedsDense,
        SpgemmFault::InnerDimensionMismatch,
        SpgemmFault::OutputShapeMismatch,
        SpgemmFault::OutputNnzMismatch,
        SpgemmFault::TransposeA,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SpgemmFault::NullHandle => "null_handle",
            SpgemmFault::ReleasedHandle => "released_handle",
            SpgemmFault::NullAlpha => "null_alpha",
            SpgemmFault::NullA => "null_a",
            SpgemmFault::NullB => "null_b",
            SpgemmFault::NullC => "null_c",
            SpgemmFault::NullARowPtr => "null_a_row_ptr",
            SpgemmFault::NullBColInd => "null_b_col_ind",
            SpgemmFault::NullCRowPtr => "null_c_row_ptr",
            SpgemmFault::NullCValues => "null_c_values",
            SpgemmFault::ColumnOutOfRange => "column_out_of_range",
            SpgemmFault::ARowPtrBaseMismatch => "a_row_ptr_base_mismatch",
            SpgemmFault::ARowPtrEndMismatch => "a_row_ptr_end_mismatch",
            SpgemmFault::DecreasingARowPtr => "decreasing_a_row_ptr",
            SpgemmFault::NegativeARows => "negative_a_rows",
            SpgemmFault::NegativeBCols => "negative_b_cols",
            SpgemmFault::NegativeANnz => "negative_a_nnz",
            SpgemmFault::ANnzExceedsDense => "a_nnz_exceeds_dense",
            SpgemmFault::InnerDimensionMismatch => "inner_dimension_mismatch",
            SpgemmFault::OutputShapeMismatch => "output_shape_mismatch",
            SpgemmFault::OutputNnzMismatch => "output_nnz_mismatch",
            SpgemmFault::TransposeA => "transpose_a",
        }
    }

    pub fn expected(self) -> Status {
        match self {
            SpgemmFault::NullHandle | SpgemmFault::ReleasedHandle => Status::InvalidHandle,
            SpgemmFault::NullAlpha
            | SpgemmFault::NullA
            | SpgemmFault::NullB
            | SpgemmFault::NullC
            | SpgemmFault::NullARowPtr
            | SpgemmFault::NullBColInd
            | SpgemmFault::NullCRowPtr
            | SpgemmFault::NullCValues
            | SpgemmFault::ColumnOutOfRange
            | SpgemmFault::ARowPtrBaseMismatch
            | SpgemmFault::ARowPtrEndMismatch
            | SpgemmFault::DecreasingARowPtr => Status::InvalidValue,
            SpgemmFault::NegativeARows
            | SpgemmFault::NegativeBCols
            | SpgemmFault::NegativeANnz
            | SpgemmFault::ANnzExceedsDense
            | SpgemmFault::InnerDimensionMismatch
            | SpgemmFault::OutputShapeMismatch
            | SpgemmFault::OutputNnzMismatch => Status::InvalidSize,
            SpgemmFault::TransposeA => Status::NotSupported,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BadArgCase {
    Gemvi(GemviFault),
    SpgemmCsr(SpgemmFault),
}

impl BadArgCase {
    pub fn kind(self) -> OperationKind {
        match self {
            BadArgCase::Gemvi(_) => OperationKind::Gemvi,
            BadArgCase::SpgemmCsr(_) => OperationKind::SpgemmCsr,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            BadArgCase::Gemvi(fault) => fault.name(),
            BadArgCase::SpgemmCsr(fault) => fault.name(),
        }
    }

    pub fn expected(self) -> Status {
        match self {
            BadArgCase::Gemvi(fault) => fault.expected(),
            BadArgCase::SpgemmCsr(fault) => fault.expected(),
        }
    }
}

pub fn cases(op: OperationKind) -> Vec<BadArgCase> {
    match op {
        OperationKind::Gemvi => GemviFault::ALL.into_iter().map(BadArgCase::Gemvi).collect(),
        OperationKind::SpgemmCsr => SpgemmFault::ALL
            .into_iter()
            .map(BadArgCase::SpgemmCsr)
            .collect(),
    }
}

#[derive(Debug)]
pub struct BadArgOutcome {
    pub case: BadArgCase,
    pub result: Result<Status, HarnessError>,
}

impl BadArgOutcome {
    pub fn passed(&self) -> bool {
        matches!(self.result, Ok(status) if status == self.case.expected())
    }

    /// Why the case failed, `None` if it passed.
    pub fn diagnostic(&self) -> Option<String> {
        let expected = self.case.expected();
        match &self.result {
            Ok(status) if *status == expected => None,
            Ok(Status::Success) => Some(format!(
                "boundary accepted invalid input, expected {}",
                expected
            )),
            Ok(status) => Some(format!("expected {}, got {}", expected, status)),
            Err(err) => Some(err.to_string()),
        }
    }
}

/// Runs every case of `op` once.
pub fn validate<B: SparseBackend>(backend: &B, op: OperationKind, seed: u64) -> Vec<BadArgOutcome> {
    cases(op)
        .into_iter()
        .map(|case| {
            let result = run_case(backend, case, seed);
            log::debug!("{}: {} -> {:?}", op.name(), case.name(), result);
            BadArgOutcome { case, result }
        })
        .collect()
}

pub fn run_case<B: SparseBackend>(
    backend: &B,
    case: BadArgCase,
    seed: u64,
) -> Result<Status, HarnessError> {
    match case {
        BadArgCase::Gemvi(fault) => gemvi_case(backend, fault, seed),
        BadArgCase::SpgemmCsr(fault) => spgemm_case(backend, fault, seed),
    }
}

/// A handle id that was valid once and has been released since.
fn released_handle<B: SparseBackend>(backend: &B) -> Result<HandleId, HarnessError> {
    let guard = HandleGuard::acquire(backend).map_err(HarnessError::Acquire)?;
    Ok(guard.id())
}

fn gemvi_case<B: SparseBackend>(
    backend: &B,
    fault: GemviFault,
    seed: u64,
) -> Result<Status, HarnessError> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut fixture = GemviFixture::<f32>::new(&mut rng, IndexBase::Zero);
    if fault == GemviFault::IndexOutOfRange {
        fixture.x_ind[0] = fixture.n as i32;
    }

    let guard = HandleGuard::acquire(backend).map_err(HarnessError::Acquire)?;
    let handle = match fault {
        GemviFault::NullHandle => None,
        GemviFault::ReleasedHandle => Some(released_handle(backend)?),
        _ => Some(guard.id()),
    };

    let size = match backend.gemvi_buffer_size::<f32>(
        Some(guard.id()),
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
    let mut args = fixture.args(&mut y, &mut buffer);
    match fault {
        GemviFault::NegativeM => args.m = -1,
        GemviFault::NegativeN => args.n = -1,
        GemviFault::NegativeNnz => args.nnz = -1,
        GemviFault::NnzExceedsN => args.nnz = args.n + 1,
        GemviFault::LdaBelowM => args.lda = args.m - 1,
        GemviFault::LdaOverflow => args.lda = i64::MAX,
        GemviFault::TruncatedBuffer => {
            args.buffer = args.buffer.take().map(|b| {
                let len = b.len().saturating_sub(1);
                &mut b[..len]
            })
        }
        GemviFault::NullAlpha => args.alpha = None,
        GemviFault::NullA => args.a = None,
        GemviFault::NullXVal => args.x_val = None,
        GemviFault::NullXInd => args.x_ind = None,
        GemviFault::NullBeta => args.beta = None,
        GemviFault::NullY => args.y = None,
        GemviFault::NullBuffer => args.buffer = None,
        GemviFault::Transpose => args.trans = Operation::Transpose,
        GemviFault::NullHandle | GemviFault::ReleasedHandle | GemviFault::IndexOutOfRange => {}
    }
    Ok(backend.gemvi(handle, args))
}

fn spgemm_case<B: SparseBackend>(
    backend: &B,
    fault: SpgemmFault,
    seed: u64,
) -> Result<Status, HarnessError> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut fixture = SpgemmFixture::<i32, i32, f32>::new(&mut rng, IndexBase::Zero)?;
    let rows = fixture.a.rows;
    match fault {
        SpgemmFault::ColumnOutOfRange => fixture.a.col_ind[0] = fixture.a.cols as i32,
        SpgemmFault::ARowPtrBaseMismatch => fixture.a.row_ptr[0] += 1,
        SpgemmFault::ARowPtrEndMismatch => fixture.a.row_ptr[rows] += 1,
        // First and last offsets stay intact.
        SpgemmFault::DecreasingARowPtr => fixture.a.row_ptr[1] = fixture.a.row_ptr[2] + 1,
        _ => {}
    }

    let guard = HandleGuard::acquire(backend).map_err(HarnessError::Acquire)?;
    let handle = match fault {
        SpgemmFault::NullHandle => None,
        SpgemmFault::ReleasedHandle => Some(released_handle(backend)?),
        _ => Some(guard.id()),
    };

    let mut a = fixture.a.descr();
    let mut b = fixture.b.descr();
    match fault {
        SpgemmFault::NullARowPtr => a.row_ptr = None,
        SpgemmFault::NullBColInd => b.col_ind = None,
        SpgemmFault::NegativeARows => a.rows = -1,
        SpgemmFault::NegativeBCols => b.cols = -1,
        SpgemmFault::NegativeANnz => a.nnz = -1,
        SpgemmFault::ANnzExceedsDense => a.nnz = a.rows * a.cols + 1,
        SpgemmFault::InnerDimensionMismatch => b.rows += 1,
        _ => {}
    }
    let mut operands = SpgemmOperands {
        op_a: Operation::NonTranspose,
        op_b: Operation::NonTranspose,
        alpha: Some(&fixture.alpha),
        a: Some(&a),
        b: Some(&b),
    };
    match fault {
        SpgemmFault::NullAlpha => operands.alpha = None,
        SpgemmFault::NullA => operands.a = None,
        SpgemmFault::NullB => operands.b = None,
        SpgemmFault::TransposeA => operands.op_a = Operation::Transpose,
        _ => {}
    }

    let nnz = match backend.spgemm_csr_nnz(handle, &operands) {
        Ok(nnz) => nnz,
        Err(status) => return Ok(status),
    };
    let nnz = usize::try_from(nnz).map_err(|_| HarnessError::BadNnz(nnz))?;

    let mut c =
        CsrMatrix::<i32, i32, f32>::zeroed(fixture.a.rows, fixture.b.cols, nnz, IndexBase::Zero);
    let mut output = c.output();
    match fault {
        SpgemmFault::NullCRowPtr => output.row_ptr = None,
        SpgemmFault::NullCValues => output.values = None,
        SpgemmFault::OutputShapeMismatch => output.rows += 1,
        SpgemmFault::OutputNnzMismatch => output.nnz += 1,
        _ => {}
    }
    let output = (fault != SpgemmFault::NullC).then_some(output);
    Ok(backend.spgemm_csr(handle, &operands, output))
}
