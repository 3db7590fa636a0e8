//! Static table of the operation/type combinations under test.

use std::fmt;

use crate::scalar::{IndexType, ValueType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Gemvi,
    SpgemmCsr,
}

impl OperationKind {
    pub const ALL: [OperationKind; 2] = [OperationKind::Gemvi, OperationKind::SpgemmCsr];

    pub fn name(self) -> &'static str {
        match self {
            OperationKind::Gemvi => "gemvi",
            OperationKind::SpgemmCsr => "spgemm_csr",
        }
    }

    /// The instantiation bad-argument cases run against.
    pub fn bad_arg_target(self) -> OperationDescriptor {
        match self {
            OperationKind::Gemvi => OperationDescriptor::Gemvi {
                value: ValueType::F32,
            },
            OperationKind::SpgemmCsr => OperationDescriptor::SpgemmCsr {
                row: IndexType::I32,
                col: IndexType::I32,
                value: ValueType::F32,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationDescriptor {
    Gemvi {
        value: ValueType,
    },
    SpgemmCsr {
        row: IndexType,
        col: IndexType,
        value: ValueType,
    },
}

impl OperationDescriptor {
    pub fn kind(&self) -> OperationKind {
        match self {
            OperationDescriptor::Gemvi { .. } => OperationKind::Gemvi,
            OperationDescriptor::SpgemmCsr { .. } => OperationKind::SpgemmCsr,
        }
    }

    pub fn value(&self) -> ValueType {
        match *self {
            OperationDescriptor::Gemvi { value } | OperationDescriptor::SpgemmCsr { value, .. } => {
                value
            }
        }
    }

    /// `gemvi_float`, `spgemm_csr_i64_i32_double`, ...
    pub fn name(&self) -> String {
        match *self {
            OperationDescriptor::Gemvi { value } => format!("gemvi_{}", value.name()),
            OperationDescriptor::SpgemmCsr { row, col, value } => format!(
                "spgemm_csr_{}_{}_{}",
                row.name(),
                col.name(),
                value.name()
            ),
        }
    }
}

impl fmt::Display for OperationDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

const REGISTERED: [OperationDescriptor; 8] = [
    OperationDescriptor::Gemvi {
        value: ValueType::F32,
    },
    OperationDescriptor::Gemvi {
        value: ValueType::F64,
    },
    OperationDescriptor::Gemvi {
        value: ValueType::ComplexF32,
    },
    OperationDescriptor::Gemvi {
        value: ValueType::ComplexF64,
    },
    OperationDescriptor::SpgemmCsr {
        row: IndexType::I32,
        col: IndexType::I32,
        value: ValueType::F32,
    },
    OperationDescriptor::SpgemmCsr {
        row: IndexType::I64,
        col: IndexType::I32,
        value: ValueType::F64,
    },
    OperationDescriptor::SpgemmCsr {
        row: IndexType::I64,
        col: IndexType::I64,
        value: ValueType::ComplexF32,
    },
    OperationDescriptor::SpgemmCsr {
        row: IndexType::I64,
        col: IndexType::I64,
        value: ValueType::ComplexF64,
    },
];

pub fn registered() -> &'static [OperationDescriptor] {
    &REGISTERED
}
