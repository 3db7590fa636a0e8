//! The status-returning boundary the harness drives.

pub mod gpu;
pub mod host;
pub(crate) mod validate;

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::registry::OperationDescriptor;
use crate::scalar::{Scalar, SparseIndex};
use crate::sparse::{CsrDescr, CsrOutput, IndexBase, Operation};
use crate::status::Status;

/// Opaque handle identifier. Ids are unique for the whole process, so a handle
/// from one backend instance is never valid on another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandleId(u64);

/// Arguments of `y = alpha * op(A) * x + beta * y` with `x` sparse.
#[derive(Debug)]
pub struct GemviArgs<'a, T> {
    pub trans: Operation,
    pub m: i64,
    pub n: i64,
    pub alpha: Option<&'a T>,
    pub a: Option<&'a [T]>,
    pub lda: i64,
    pub nnz: i64,
    pub x_val: Option<&'a [T]>,
    pub x_ind: Option<&'a [i32]>,
    pub beta: Option<&'a T>,
    pub y: Option<&'a mut [T]>,
    pub base: IndexBase,
    pub buffer: Option<&'a mut [u8]>,
}

/// Inputs of `C = alpha * op(A) * op(B)`, shared by the nnz and compute phases.
#[derive(Debug, Clone, Copy)]
pub struct SpgemmOperands<'a, I, J, T> {
    pub op_a: Operation,
    pub op_b: Operation,
    pub alpha: Option<&'a T>,
    pub a: Option<&'a CsrDescr<'a, I, J, T>>,
    pub b: Option<&'a CsrDescr<'a, I, J, T>>,
}

pub trait SparseBackend: Sync {
    fn name(&self) -> &str;

    /// Whether the descriptor's type combination is implemented at all.
    fn supports(&self, desc: &OperationDescriptor) -> bool;

    fn acquire(&self) -> Result<HandleId, Status>;
    fn release(&self, handle: HandleId);
    fn live_handles(&self) -> usize;

    fn gemvi_buffer_size<T: Scalar>(
        &self,
        handle: Option<HandleId>,
        trans: Operation,
        m: i64,
        n: i64,
        nnz: i64,
    ) -> Result<usize, Status>;

    fn gemvi<T: Scalar>(&self, handle: Option<HandleId>, args: GemviArgs<'_, T>) -> Status;

    /// First phase: number of structural nonzeros of `C`. Every operand is
    /// validated here as in the second phase, `alpha` included.
    fn spgemm_csr_nnz<I: SparseIndex, J: SparseIndex, T: Scalar>(
        &self,
        handle: Option<HandleId>,
        operands: &SpgemmOperands<'_, I, J, T>,
    ) -> Result<i64, Status>;

    /// Second phase: fill `c`, which must be sized by the first phase.
    fn spgemm_csr<I: SparseIndex, J: SparseIndex, T: Scalar>(
        &self,
        handle: Option<HandleId>,
        operands: &SpgemmOperands<'_, I, J, T>,
        c: Option<CsrOutput<'_, I, J, T>>,
    ) -> Status;
}

/// Scoped handle: released when dropped, on every exit path.
pub struct HandleGuard<'b, B: SparseBackend> {
    backend: &'b B,
    id: HandleId,
}

impl<'b, B: SparseBackend> HandleGuard<'b, B> {
    pub fn acquire(backend: &'b B) -> Result<Self, Status> {
        let id = backend.acquire()?;
        log::debug!("{}: acquired handle {:?}", backend.name(), id);
        Ok(Self { backend, id })
    }

    pub fn id(&self) -> HandleId {
        self.id
    }
}

impl<B: SparseBackend> Drop for HandleGuard<'_, B> {
    fn drop(&mut self) {
        log::debug!("{}: releasing handle {:?}", self.backend.name(), self.id);
        self.backend.release(self.id);
    }
}

static NEXT_HANDLE: AtomicU64 = AtomicU64::new(1);

/// Live handles of one backend instance and whatever context each carries.
#[derive(Debug)]
pub(crate) struct HandleTable<C> {
    live: Mutex<HashMap<HandleId, C>>,
}

impl<C: Clone> HandleTable<C> {
    pub(crate) fn new() -> Self {
        Self {
            live: Mutex::new(HashMap::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<HandleId, C>> {
        self.live.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn insert(&self, context: C) -> HandleId {
        let id = HandleId(NEXT_HANDLE.fetch_add(1, Ordering::Relaxed));
        self.lock().insert(id, context);
        id
    }

    pub(crate) fn remove(&self, id: HandleId) {
        if self.lock().remove(&id).is_none() {
            log::warn!("release of unknown handle {:?}", id);
        }
    }

    /// Resolves a possibly-null handle to its context.
    pub(crate) fn get(&self, id: Option<HandleId>) -> Result<C, Status> {
        let id = id.ok_or(Status::InvalidHandle)?;
        self.lock().get(&id).cloned().ok_or(Status::InvalidHandle)
    }

    pub(crate) fn len(&self) -> usize {
        self.lock().len()
    }
}
