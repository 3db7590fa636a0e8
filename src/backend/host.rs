use crate::backend::validate::{self, CsrSink};
use crate::backend::{GemviArgs, HandleId, HandleTable, SparseBackend, SpgemmOperands};
use crate::reference;
use crate::registry::OperationDescriptor;
use crate::scalar::{Scalar, SparseIndex};
use crate::sparse::{CsrOutput, Operation};
use crate::status::Status;

/// Validating CPU implementation of every registered operation.
#[derive(Debug)]
pub struct HostBackend {
    handles: HandleTable<()>,
    memory_limit: Option<usize>,
}

impl HostBackend {
    pub fn new() -> Self {
        Self {
            handles: HandleTable::new(),
            memory_limit: None,
        }
    }

    /// Workspace requests above `bytes` fail with `MemoryError`.
    pub fn with_memory_limit(bytes: usize) -> Self {
        Self {
            handles: HandleTable::new(),
            memory_limit: Some(bytes),
        }
    }

    fn check_handle(&self, handle: Option<HandleId>) -> Result<(), Status> {
        self.handles.get(handle)
    }

    fn reserve(&self, bytes: usize) -> Result<usize, Status> {
        match self.memory_limit {
            Some(limit) if bytes > limit => {
                log::debug!("workspace of {} bytes exceeds limit {}", bytes, limit);
                Err(Status::MemoryError)
            }
            _ => Ok(bytes),
        }
    }

    fn try_gemvi<T: Scalar>(
        &self,
        handle: Option<HandleId>,
        args: GemviArgs<'_, T>,
    ) -> Result<(), Status> {
        self.check_handle(handle)?;
        if let Some(plan) = validate::gemvi(args)? {
            reference::gemvi(plan.alpha, &plan.a, &plan.x, plan.beta, plan.y);
        }
        Ok(())
    }

    fn try_spgemm_csr<I: SparseIndex, J: SparseIndex, T: Scalar>(
        &self,
        handle: Option<HandleId>,
        operands: &SpgemmOperands<'_, I, J, T>,
        c: Option<CsrOutput<'_, I, J, T>>,
    ) -> Result<(), Status> {
        self.check_handle(handle)?;
        let plan = validate::spgemm_inputs(operands)?;
        let rows = match plan.inputs {
            Some((a, b)) => reference::spgemm_rows(plan.alpha, &a, &b),
            None => Vec::new(),
        };
        let nnz = rows.iter().map(Vec::len).sum();
        let CsrSink {
            row_ptr,
            col_ind,
            values,
            base,
        } = validate::spgemm_output(c, plan.rows, plan.cols, nnz)?;
        reference::write_rows(&rows, base, row_ptr, col_ind, values).ok_or(Status::InvalidSize)
    }
}

impl Default for HostBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl SparseBackend for HostBackend {
    fn name(&self) -> &str {
        "host"
    }

    fn supports(&self, _desc: &OperationDescriptor) -> bool {
        true
    }

    fn acquire(&self) -> Result<HandleId, Status> {
        Ok(self.handles.insert(()))
    }

    fn release(&self, handle: HandleId) {
        self.handles.remove(handle);
    }

    fn live_handles(&self) -> usize {
        self.handles.len()
    }

    fn gemvi_buffer_size<T: Scalar>(
        &self,
        handle: Option<HandleId>,
        trans: Operation,
        m: i64,
        n: i64,
        nnz: i64,
    ) -> Result<usize, Status> {
        self.check_handle(handle)?;
        let bytes = validate::gemvi_buffer_size::<T>(trans, m, n, nnz)?;
        self.reserve(bytes)
    }

    fn gemvi<T: Scalar>(&self, handle: Option<HandleId>, args: GemviArgs<'_, T>) -> Status {
        Status::from_result(self.try_gemvi(handle, args))
    }

    fn spgemm_csr_nnz<I: SparseIndex, J: SparseIndex, T: Scalar>(
        &self,
        handle: Option<HandleId>,
        operands: &SpgemmOperands<'_, I, J, T>,
    ) -> Result<i64, Status> {
        self.check_handle(handle)?;
        let plan = validate::spgemm_inputs(operands)?;
        let nnz = match plan.inputs {
            Some((a, b)) => reference::spgemm_nnz(&a, &b),
            None => 0,
        };
        log::debug!("spgemm_csr: {}x{} product with {} nonzeros", plan.rows, plan.cols, nnz);
        i64::try_from(nnz).map_err(|_| Status::InvalidSize)
    }

    fn spgemm_csr<I: SparseIndex, J: SparseIndex, T: Scalar>(
        &self,
        handle: Option<HandleId>,
        operands: &SpgemmOperands<'_, I, J, T>,
        c: Option<CsrOutput<'_, I, J, T>>,
    ) -> Status {
        Status::from_result(self.try_spgemm_csr(handle, operands, c))
    }
}
