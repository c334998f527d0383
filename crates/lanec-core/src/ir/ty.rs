use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Ty {
    I1,
    I8,
    I16,
    I32,
    I64,
    F32,
    F64,
    Ptr(Box<Ty>),
    Vector(Box<Ty>, u32),
    Void,
}

impl Ty {
    /// A lane mask: one `i1` per program instance.
    pub fn mask(lanes: u32) -> Ty {
        Ty::Vector(Box::new(Ty::I1), lanes)
    }

    pub fn vector(element: Ty, lanes: u32) -> Ty {
        Ty::Vector(Box::new(element), lanes)
    }

    pub fn is_integer(&self) -> bool {
        matches!(self, Ty::I1 | Ty::I8 | Ty::I16 | Ty::I32 | Ty::I64)
    }

    pub fn is_float(&self) -> bool {
        matches!(self, Ty::F32 | Ty::F64)
    }

    pub fn is_pointer(&self) -> bool {
        matches!(self, Ty::Ptr(_))
    }

    pub fn is_vector(&self) -> bool {
        matches!(self, Ty::Vector(..))
    }

    pub fn lane_count(&self) -> Option<u32> {
        match self {
            Ty::Vector(_, lanes) => Some(*lanes),
            _ => None,
        }
    }

    pub fn element(&self) -> Option<&Ty> {
        match self {
            Ty::Vector(element, _) => Some(element),
            _ => None,
        }
    }

    pub fn size_in_bits(&self) -> Option<u32> {
        match self {
            Ty::I1 => Some(1),
            Ty::I8 => Some(8),
            Ty::I16 => Some(16),
            Ty::I32 => Some(32),
            Ty::I64 => Some(64),
            Ty::F32 => Some(32),
            Ty::F64 => Some(64),
            Ty::Ptr(_) => Some(64),
            Ty::Vector(element, lanes) => element.size_in_bits().map(|size| size * lanes),
            Ty::Void => None,
        }
    }
}
