use super::*;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::backend::{validate, GemviArgs, SpgemmOperands};
use crate::bad_arg::{BadArgCase, GemviFault, SpgemmFault};
use crate::reference::{CsrView, DenseMatrix, SparseVector};
use crate::runner::{GemviFixture, RunOptions, SpgemmFixture};
use crate::scalar::{Complex32, Complex64, IndexType, Scalar, ValueType};
use crate::sparse::{CsrDescr, CsrMatrix, CsrOutput, IndexBase, Operation};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn expect_gemvi<T: scalar::Scalar>() {
    init_logger();
    let backend = HostBackend::new();
    let status = runner::run_gemvi::<_, T>(&backend, &RunOptions::default()).unwrap();
    assert_eq!(status, Status::Success);
    assert_eq!(backend.live_handles(), 0);
}

fn expect_spgemm_csr<I, J, T>()
where
    I: scalar::SparseIndex,
    J: scalar::SparseIndex,
    T: scalar::Scalar,
{
    init_logger();
    let backend = HostBackend::new();
    let status =
        runner::run_spgemm_csr::<_, I, J, T>(&backend, &RunOptions::default()).unwrap();
    assert_eq!(status, Status::Success);
    assert_eq!(backend.live_handles(), 0);
}

#[test]
fn gemvi_float() {
    expect_gemvi::<f32>();
}

#[test]
fn gemvi_double() {
    expect_gemvi::<f64>();
}

#[test]
fn gemvi_float_complex() {
    expect_gemvi::<Complex32>();
}

#[test]
fn gemvi_double_complex() {
    expect_gemvi::<Complex64>();
}

#[test]
fn spgemm_csr_i32_i32_float() {
    expect_spgemm_csr::<i32, i32, f32>();
}

#[test]
fn spgemm_csr_i64_i32_double() {
    expect_spgemm_csr::<i64, i32, f64>();
}

#[test]
fn spgemm_csr_i64_i64_float_complex() {
    expect_spgemm_csr::<i64, i64, Complex32>();
}

#[test]
fn spgemm_csr_i64_i64_double_complex() {
    expect_spgemm_csr::<i64, i64, Complex64>();
}

#[test]
fn gemvi_bad_arg() {
    init_logger();
    let backend = HostBackend::new();
    let outcomes = bad_arg::validate(&backend, OperationKind::Gemvi, 7);
    assert_eq!(outcomes.len(), GemviFault::ALL.len());
    for outcome in &outcomes {
        assert!(outcome.passed(), "{}: {:?}", outcome.case.name(), outcome.diagnostic());
    }
    assert_eq!(backend.live_handles(), 0);
}

#[test]
fn spgemm_csr_bad_arg() {
    init_logger();
    let backend = HostBackend::new();
    let outcomes = bad_arg::validate(&backend, OperationKind::SpgemmCsr, 7);
    assert_eq!(outcomes.len(), SpgemmFault::ALL.len());
    for outcome in &outcomes {
        assert!(outcome.passed(), "{}: {:?}", outcome.case.name(), outcome.diagnostic());
    }
    assert_eq!(backend.live_handles(), 0);
}

#[test]
fn test_spgemm_null_input_matrix() {
    let backend = HostBackend::new();
    for fault in [SpgemmFault::NullA, SpgemmFault::NullB] {
        let status = bad_arg::run_case(&backend, BadArgCase::SpgemmCsr(fault), 1).unwrap();
        assert_eq!(status, Status::InvalidValue);
    }
}

#[test]
fn test_spgemm_bad_dimensions() {
    let backend = HostBackend::new();
    for fault in [
        SpgemmFault::NegativeARows,
        SpgemmFault::NegativeBCols,
        SpgemmFault::InnerDimensionMismatch,
        SpgemmFault::OutputShapeMismatch,
    ] {
        dbg!(fault);
        let status = bad_arg::run_case(&backend, BadArgCase::SpgemmCsr(fault), 1).unwrap();
        assert_eq!(status, Status::InvalidSize);
    }
}

#[test]
fn test_every_case_expects_failure() {
    for op in OperationKind::ALL {
        for case in bad_arg::cases(op) {
            assert_eq!(case.kind(), op);
            assert!(!case.expected().is_success(), "{}", case.name());
        }
    }
}

#[test]
fn test_registry() {
    let names: Vec<String> = registry::registered().iter().map(|d| d.name()).collect();
    assert_eq!(
        names,
        [
            "gemvi_float",
            "gemvi_double",
            "gemvi_float_complex",
            "gemvi_double_complex",
            "spgemm_csr_i32_i32_float",
            "spgemm_csr_i64_i32_double",
            "spgemm_csr_i64_i64_float_complex",
            "spgemm_csr_i64_i64_double_complex",
        ]
    );
    for op in OperationKind::ALL {
        assert!(registry::registered().contains(&op.bad_arg_target()));
    }
}

#[test]
fn test_every_registered_descriptor_dispatches() {
    let backend = HostBackend::new();
    for desc in registry::registered() {
        dbg!(desc.name());
        let status = runner::run_descriptor(&backend, desc, &RunOptions::default()).unwrap();
        assert_eq!(status, Status::Success);
    }
    // Not registered, but reachable through the dispatch table.
    let desc = OperationDescriptor::SpgemmCsr {
        row: IndexType::I32,
        col: IndexType::I64,
        value: ValueType::F64,
    };
    let status = runner::run_descriptor(&backend, &desc, &RunOptions::default()).unwrap();
    assert_eq!(status, Status::Success);
    assert_eq!(backend.live_handles(), 0);
}

#[test]
fn test_one_based_indices() {
    let backend = HostBackend::new();
    let opts = RunOptions {
        base: IndexBase::One,
        ..RunOptions::default()
    };
    for seed in [1, 2, 3] {
        let opts = RunOptions { seed, ..opts };
        assert_eq!(runner::run_gemvi::<_, f64>(&backend, &opts).unwrap(), Status::Success);
        assert_eq!(
            runner::run_spgemm_csr::<_, i64, i32, f64>(&backend, &opts).unwrap(),
            Status::Success
        );
    }
}

#[test]
fn test_repeated_call_is_idempotent() {
    let backend = HostBackend::new();
    let fixture = GemviFixture::<f64>::new(&mut StdRng::seed_from_u64(11), IndexBase::Zero);
    let guard = HandleGuard::acquire(&backend).unwrap();
    let size = backend
        .gemvi_buffer_size::<f64>(
            Some(guard.id()),
            Operation::NonTranspose,
            fixture.m as i64,
            fixture.n as i64,
            fixture.x_val.len() as i64,
        )
        .unwrap();

    let mut outputs = Vec::new();
    for _ in 0..3 {
        let mut buffer = vec![0u8; size];
        let mut y = fixture.y.clone();
        let status = backend.gemvi(Some(guard.id()), fixture.args(&mut y, &mut buffer));
        assert_eq!(status, Status::Success);
        outputs.push(y);
    }
    assert_eq!(outputs[0], outputs[1]);
    assert_eq!(outputs[1], outputs[2]);
    assert_eq!(outputs[0], fixture.expected());
}

#[test]
fn test_handle_guard_releases() {
    let backend = HostBackend::new();
    let id = {
        let guard = HandleGuard::acquire(&backend).unwrap();
        assert_eq!(backend.live_handles(), 1);
        guard.id()
    };
    assert_eq!(backend.live_handles(), 0);
    let status = backend
        .gemvi_buffer_size::<f32>(Some(id), Operation::NonTranspose, 4, 6, 3)
        .unwrap_err();
    assert_eq!(status, Status::InvalidHandle);
}

#[test]
fn test_foreign_handle_rejected() {
    let first = HostBackend::new();
    let second = HostBackend::new();
    let guard = HandleGuard::acquire(&first).unwrap();
    let status = second
        .gemvi_buffer_size::<f32>(Some(guard.id()), Operation::NonTranspose, 4, 6, 3)
        .unwrap_err();
    assert_eq!(status, Status::InvalidHandle);
}

#[test]
fn test_memory_limit() {
    let backend = HostBackend::with_memory_limit(8);
    let status = runner::run_gemvi::<_, f64>(&backend, &RunOptions::default()).unwrap();
    assert_eq!(status, Status::MemoryError);
    assert_eq!(backend.live_handles(), 0);

    // 4 rows of f32 fit exactly.
    let backend = HostBackend::with_memory_limit(16);
    let status = runner::run_gemvi::<_, f32>(&backend, &RunOptions::default()).unwrap();
    assert_eq!(status, Status::Success);
}

#[test]
fn test_gemvi_quick_return() {
    let backend = HostBackend::new();
    let guard = HandleGuard::acquire(&backend).unwrap();
    let args = GemviArgs::<f32> {
        trans: Operation::NonTranspose,
        m: 0,
        n: 3,
        alpha: None,
        a: None,
        lda: 1,
        nnz: 0,
        x_val: None,
        x_ind: None,
        beta: None,
        y: None,
        base: IndexBase::Zero,
        buffer: None,
    };
    assert_eq!(backend.gemvi(Some(guard.id()), args), Status::Success);
}

#[test]
fn test_spgemm_empty_product() {
    let backend = HostBackend::new();
    let guard = HandleGuard::acquire(&backend).unwrap();
    let a = CsrDescr::<i32, i32, f32> {
        rows: 2,
        cols: 0,
        nnz: 0,
        row_ptr: None,
        col_ind: None,
        values: None,
        base: IndexBase::One,
    };
    let b = CsrDescr::<i32, i32, f32> {
        rows: 0,
        cols: 3,
        ..a
    };
    let alpha = 1.0f32;
    let operands = SpgemmOperands {
        op_a: Operation::NonTranspose,
        op_b: Operation::NonTranspose,
        alpha: Some(&alpha),
        a: Some(&a),
        b: Some(&b),
    };
    assert_eq!(backend.spgemm_csr_nnz(Some(guard.id()), &operands), Ok(0));

    let mut row_ptr = [0i32; 3];
    let c = CsrOutput {
        rows: 2,
        cols: 3,
        nnz: 0,
        row_ptr: Some(&mut row_ptr[..]),
        col_ind: None,
        values: None,
        base: IndexBase::One,
    };
    assert_eq!(
        backend.spgemm_csr(Some(guard.id()), &operands, Some(c)),
        Status::Success
    );
    assert_eq!(row_ptr, [1, 1, 1]);
}

#[test]
fn test_empty_product_with_huge_row_count() {
    let backend = HostBackend::new();
    let guard = HandleGuard::acquire(&backend).unwrap();
    let a = CsrDescr::<i64, i64, f64> {
        rows: i64::MAX,
        cols: 0,
        nnz: 0,
        row_ptr: None,
        col_ind: None,
        values: None,
        base: IndexBase::Zero,
    };
    let b = CsrDescr::<i64, i64, f64> {
        rows: 0,
        cols: 3,
        ..a
    };
    let alpha = 1.0;
    let operands = SpgemmOperands {
        op_a: Operation::NonTranspose,
        op_b: Operation::NonTranspose,
        alpha: Some(&alpha),
        a: Some(&a),
        b: Some(&b),
    };
    assert_eq!(backend.spgemm_csr_nnz(Some(guard.id()), &operands), Ok(0));

    let mut row_ptr = [0i64; 3];
    let c = CsrOutput {
        rows: i64::MAX,
        cols: 3,
        nnz: 0,
        row_ptr: Some(&mut row_ptr[..]),
        col_ind: None,
        values: None,
        base: IndexBase::Zero,
    };
    assert_eq!(
        backend.spgemm_csr(Some(guard.id()), &operands, Some(c)),
        Status::InvalidSize
    );
}

#[test]
fn test_oversized_gemvi_dimensions() {
    let backend = HostBackend::new();
    let guard = HandleGuard::acquire(&backend).unwrap();
    let status = backend
        .gemvi_buffer_size::<Complex64>(Some(guard.id()), Operation::NonTranspose, i64::MAX, 1, 0)
        .unwrap_err();
    assert_eq!(status, Status::MemoryError);

    let (alpha, beta) = (1.0f32, 0.0f32);
    let a = [1.0f32; 4];
    let x_val = [1.0f32];
    let x_ind = [0i32];
    let mut y = [0.0f32];
    let mut buffer = [0u8; 4];
    for (m, lda) in [(1, i64::MAX), (i64::MAX, i64::MAX)] {
        dbg!(m, lda);
        let args = GemviArgs {
            trans: Operation::NonTranspose,
            m,
            n: 4,
            alpha: Some(&alpha),
            a: Some(&a[..]),
            lda,
            nnz: 1,
            x_val: Some(&x_val[..]),
            x_ind: Some(&x_ind[..]),
            beta: Some(&beta),
            y: Some(&mut y[..]),
            base: IndexBase::Zero,
            buffer: Some(&mut buffer[..]),
        };
        assert_eq!(backend.gemvi(Some(guard.id()), args), Status::InvalidSize);
    }
    assert_eq!(y, [0.0]);
}

#[test]
fn test_spgemm_malformed_csr_structure() {
    let backend = HostBackend::new();
    for (fault, expected) in [
        (SpgemmFault::ARowPtrBaseMismatch, Status::InvalidValue),
        (SpgemmFault::ARowPtrEndMismatch, Status::InvalidValue),
        (SpgemmFault::DecreasingARowPtr, Status::InvalidValue),
        (SpgemmFault::ANnzExceedsDense, Status::InvalidSize),
        (SpgemmFault::NullCRowPtr, Status::InvalidValue),
    ] {
        for seed in [1, 2, 3] {
            dbg!(fault, seed);
            let status = bad_arg::run_case(&backend, BadArgCase::SpgemmCsr(fault), seed).unwrap();
            assert_eq!(status, expected);
        }
    }
    assert_eq!(backend.live_handles(), 0);
}

#[test]
fn test_spgemm_phases_agree_on_alpha() {
    let backend = HostBackend::new();
    let guard = HandleGuard::acquire(&backend).unwrap();
    let fixture =
        SpgemmFixture::<i32, i32, f32>::new(&mut StdRng::seed_from_u64(5), IndexBase::Zero)
            .unwrap();
    let (a, b) = (fixture.a.descr(), fixture.b.descr());
    let operands = SpgemmOperands {
        op_a: Operation::NonTranspose,
        op_b: Operation::NonTranspose,
        alpha: None,
        a: Some(&a),
        b: Some(&b),
    };
    assert_eq!(
        backend.spgemm_csr_nnz(Some(guard.id()), &operands),
        Err(Status::InvalidValue)
    );
    let mut c = CsrMatrix::<i32, i32, f32>::zeroed(4, 3, 0, IndexBase::Zero);
    assert_eq!(
        backend.spgemm_csr(Some(guard.id()), &operands, Some(c.output())),
        Status::InvalidValue
    );
}

#[test]
fn test_reference_gemvi() {
    // A = [1 2 3; 4 5 6], x = e0 + 2 e2
    let data = [1.0, 4.0, 2.0, 5.0, 3.0, 6.0];
    let a = DenseMatrix {
        rows: 2,
        cols: 3,
        ld: 2,
        data: &data,
    };
    let x = SparseVector {
        len: 3,
        values: &[1.0, 2.0],
        indices: &[0, 2],
        base: 0,
    };
    let mut y = [1.0f64, 1.0];
    reference::gemvi(2.0, &a, &x, 1.0, &mut y);
    assert_eq!(y, [15.0, 33.0]);
}

#[test]
fn test_reference_gemvi_complex() {
    let data = [Complex32::new(0.0, 1.0)];
    let a = DenseMatrix {
        rows: 1,
        cols: 1,
        ld: 1,
        data: &data,
    };
    let x = SparseVector {
        len: 1,
        values: &[Complex32::new(0.0, 1.0)],
        indices: &[1],
        base: 1,
    };
    let mut y = [Complex32::new(5.0, 5.0)];
    reference::gemvi(Complex32::one(), &a, &x, Complex32::zero(), &mut y);
    assert_eq!(y, [Complex32::new(-1.0, 0.0)]);
}

#[test]
fn test_reference_spgemm() {
    // [1 0; 0 2] * [0 3; 4 0] = [0 3; 8 0]
    let a = CsrMatrix::<i32, i32, f64> {
        rows: 2,
        cols: 2,
        row_ptr: vec![0, 1, 2],
        col_ind: vec![0, 1],
        values: vec![1.0, 2.0],
        base: IndexBase::Zero,
    };
    let b = CsrMatrix::<i32, i32, f64> {
        rows: 2,
        cols: 2,
        row_ptr: vec![0, 1, 2],
        col_ind: vec![1, 0],
        values: vec![3.0, 4.0],
        base: IndexBase::Zero,
    };
    assert_eq!(reference::spgemm_nnz(&a.view(), &b.view()), 2);
    let c = reference::spgemm_csr(1.0, &a, &b, IndexBase::Zero).unwrap();
    assert_eq!(c.row_ptr, [0, 1, 2]);
    assert_eq!(c.col_ind, [1, 0]);
    assert_eq!(c.values, [3.0, 8.0]);

    let one_based = reference::spgemm_csr(0.5, &a, &b, IndexBase::One).unwrap();
    assert_eq!(one_based.row_ptr, [1, 2, 3]);
    assert_eq!(one_based.col_ind, [2, 1]);
    assert_eq!(one_based.values, [1.5, 4.0]);
}

#[test]
fn test_reference_spgemm_keeps_cancellation() {
    // [1 1] * [1; -1] = [0], still one structural entry
    let a = CsrMatrix::<i64, i64, f32> {
        rows: 1,
        cols: 2,
        row_ptr: vec![0, 2],
        col_ind: vec![0, 1],
        values: vec![1.0, 1.0],
        base: IndexBase::Zero,
    };
    let b = CsrMatrix::<i64, i64, f32> {
        rows: 2,
        cols: 1,
        row_ptr: vec![0, 1, 2],
        col_ind: vec![0, 0],
        values: vec![1.0, -1.0],
        base: IndexBase::Zero,
    };
    let view: CsrView<'_, i64, i64, f32> = a.view();
    assert_eq!(view.nnz(), 2);
    assert_eq!(reference::spgemm_nnz(&view, &b.view()), 1);
    let c = reference::spgemm_csr(1.0, &a, &b, IndexBase::Zero).unwrap();
    assert_eq!(c.values, [0.0]);
}

#[test]
fn test_random_fixtures_are_well_formed() {
    for seed in 0..20 {
        let mut rng = StdRng::seed_from_u64(seed);
        let fixture = SpgemmFixture::<i64, i32, f64>::new(&mut rng, IndexBase::One).unwrap();
        let (a, b) = (fixture.a.descr(), fixture.b.descr());
        let operands = SpgemmOperands {
            op_a: Operation::NonTranspose,
            op_b: Operation::NonTranspose,
            alpha: Some(&fixture.alpha),
            a: Some(&a),
            b: Some(&b),
        };
        let plan = match validate::spgemm_inputs(&operands) {
            Ok(plan) => plan,
            Err(status) => panic!("seed {}: {}", seed, status),
        };
        assert_eq!((plan.rows, plan.cols), (4, 3));
        assert!(plan.inputs.is_some());
        for row in fixture.a.row_ptr.windows(2) {
            assert!(row[1] > row[0], "every row has an entry");
        }
    }
}

/// Answers `Success` to everything without looking at its arguments.
struct AcceptsEverything {
    inner: HostBackend,
}

impl SparseBackend for AcceptsEverything {
    fn name(&self) -> &str {
        "accepts-everything"
    }

    fn supports(&self, _desc: &OperationDescriptor) -> bool {
        true
    }

    fn acquire(&self) -> Result<HandleId, Status> {
        self.inner.acquire()
    }

    fn release(&self, handle: HandleId) {
        self.inner.release(handle)
    }

    fn live_handles(&self) -> usize {
        self.inner.live_handles()
    }

    fn gemvi_buffer_size<T: scalar::Scalar>(
        &self,
        _handle: Option<HandleId>,
        _trans: Operation,
        _m: i64,
        _n: i64,
        _nnz: i64,
    ) -> Result<usize, Status> {
        Ok(64)
    }

    fn gemvi<T: scalar::Scalar>(
        &self,
        _handle: Option<HandleId>,
        _args: GemviArgs<'_, T>,
    ) -> Status {
        Status::Success
    }

    fn spgemm_csr_nnz<I: scalar::SparseIndex, J: scalar::SparseIndex, T: scalar::Scalar>(
        &self,
        _handle: Option<HandleId>,
        _operands: &SpgemmOperands<'_, I, J, T>,
    ) -> Result<i64, Status> {
        Ok(0)
    }

    fn spgemm_csr<I: scalar::SparseIndex, J: scalar::SparseIndex, T: scalar::Scalar>(
        &self,
        _handle: Option<HandleId>,
        _operands: &SpgemmOperands<'_, I, J, T>,
        _c: Option<CsrOutput<'_, I, J, T>>,
    ) -> Status {
        Status::Success
    }
}

#[test]
fn test_verification_catches_wrong_output() {
    let backend = AcceptsEverything {
        inner: HostBackend::new(),
    };
    let err = runner::run_gemvi::<_, f32>(&backend, &RunOptions::default()).unwrap_err();
    assert!(matches!(err, HarnessError::Mismatch { what: "y", .. }), "{}", err);

    let err = runner::run_spgemm_csr::<_, i32, i32, f32>(&backend, &RunOptions::default())
        .unwrap_err();
    assert!(matches!(err, HarnessError::Mismatch { what: "row_ptr", .. }), "{}", err);

    let unverified = RunOptions {
        verify: false,
        ..RunOptions::default()
    };
    assert_eq!(
        runner::run_gemvi::<_, f32>(&backend, &unverified).unwrap(),
        Status::Success
    );
    assert_eq!(backend.live_handles(), 0);
}

#[test]
fn test_validator_flags_accepted_input() {
    let backend = AcceptsEverything {
        inner: HostBackend::new(),
    };
    for op in OperationKind::ALL {
        for outcome in bad_arg::validate(&backend, op, 3) {
            assert!(!outcome.passed());
            let diagnostic = outcome.diagnostic().unwrap();
            assert!(diagnostic.contains("accepted invalid input"), "{}", diagnostic);
        }
    }
    assert_eq!(backend.live_handles(), 0);
}

#[test]
fn test_suite_host() {
    init_logger();
    let backend = HostBackend::new();
    let report = run_suite(&backend, &HarnessConfig::default());
    println!("{}", report);
    assert!(report.is_success());
    assert_eq!(
        report.count(Verdict::Passed),
        registry::registered().len() + GemviFault::ALL.len() + SpgemmFault::ALL.len()
    );
    assert_eq!(report.count(Verdict::Skipped), 0);
    assert!(report.outcome("gemvi/gemvi_float").is_some());
    assert!(report
        .outcome("spgemm_csr_bad_arg/spgemm_csr_i32_i32_float/null_a")
        .is_some());
    assert!(report.to_string().contains("[PASS] spgemm_csr/spgemm_csr_i64_i32_double"));
}

#[test]
fn test_suite_reports_failures() {
    let backend = AcceptsEverything {
        inner: HostBackend::new(),
    };
    let config = HarnessConfig {
        verify: false,
        ..HarnessConfig::default()
    };
    let report = run_suite(&backend, &config);
    assert!(!report.is_success());
    // Valid calls pass, every bad-argument case is accepted and fails.
    assert_eq!(report.count(Verdict::Passed), registry::registered().len());
    assert_eq!(
        report.failures().count(),
        GemviFault::ALL.len() + SpgemmFault::ALL.len()
    );
    let outcome = report
        .outcome("gemvi_bad_arg/gemvi_float/null_handle")
        .unwrap();
    assert_eq!(outcome.verdict, Verdict::Failed);
}

#[test]
fn test_config() {
    let defaults = HarnessConfig::from_lookup(|_| None).unwrap();
    assert_eq!(defaults, HarnessConfig::default());

    let parsed = HarnessConfig::from_lookup(|key| match key {
        config::BACKEND_VAR => Some("WGPU".to_string()),
        config::SEED_VAR => Some(" 42 ".to_string()),
        config::REPEAT_VAR => Some("5".to_string()),
        config::VERIFY_VAR => Some("off".to_string()),
        _ => None,
    })
    .unwrap();
    assert_eq!(parsed.backend, BackendKind::Wgpu);
    assert_eq!(parsed.seed, 42);
    assert_eq!(parsed.repeat, 5);
    assert!(!parsed.verify);

    for (key, value) in [
        (config::BACKEND_VAR, "cuda"),
        (config::SEED_VAR, "-1"),
        (config::REPEAT_VAR, "0"),
        (config::VERIFY_VAR, "maybe"),
    ] {
        let err = HarnessConfig::from_lookup(|k| (k == key).then(|| value.to_string()))
            .unwrap_err();
        assert!(matches!(err, HarnessError::Config { .. }), "{}", err);
    }
}

#[test]
fn test_status_codes() {
    for status in Status::ALL {
        assert_eq!(Status::from_code(status.code()), Some(status));
        assert_eq!(status.into_result().is_ok(), status.is_success());
        assert_eq!(Status::from_result(status.into_result()), status);
    }
    assert_eq!(Status::from_code(99), None);
    assert_eq!(Status::InvalidSize.to_string(), "invalid size (3)");
}

#[test]
fn test_gpu() {
    init_logger();
    let backend = match WgpuBackend::new() {
        Ok(backend) => backend,
        Err(err) => {
            eprintln!("skipping: {}", err);
            return;
        }
    };
    for seed in [10, 100, 1000] {
        dbg!(seed);
        let opts = RunOptions {
            seed,
            ..RunOptions::default()
        };
        let status = runner::run_gemvi::<_, f32>(&backend, &opts).unwrap();
        assert_eq!(status, Status::Success);
    }
    let opts = RunOptions::default();
    assert_eq!(
        runner::run_gemvi::<_, f64>(&backend, &opts).unwrap(),
        Status::NotSupported
    );
    assert_eq!(
        runner::run_spgemm_csr::<_, i32, i32, f32>(&backend, &opts).unwrap(),
        Status::NotSupported
    );

    let report = run_suite(&backend, &HarnessConfig::default());
    println!("{}", report);
    assert!(report.is_success());
    assert_eq!(report.count(Verdict::Passed), 1 + GemviFault::ALL.len());
    assert_eq!(backend.live_handles(), 0);
}
