use crate::datum::Datum;
use crate::execution::ExecutionError;
use crate::table::Tuple;
use std::cmp::Ordering;
use std::fmt;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CmpOp {
    Equals,
    NotEquals,
    GreaterThan,
    GreaterThanOrEq,
    LessThan,
    LessThanOrEq,
}

impl fmt::Display for CmpOp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::Equals => "=",
                Self::NotEquals => "<>",
                Self::GreaterThan => ">",
                Self::GreaterThanOrEq => ">=",
                Self::LessThan => "<",
                Self::LessThanOrEq => "<=",
            }
        )
    }
}

/// single-field boolean test against a literal operand, stateless
pub struct Predicate {
    field: usize,
    op: CmpOp,
    operand: Datum,
}

impl Predicate {
    pub fn new(field: usize, op: CmpOp, operand: Datum) -> Self {
        Self { field, op, operand }
    }
    pub fn field(&self) -> usize {
        self.field
    }
    pub fn op(&self) -> CmpOp {
        self.op
    }
    pub fn operand(&self) -> &Datum {
        &self.operand
    }
    pub fn eval(&self, tuple: &Tuple) -> Result<bool, ExecutionError> {
        let datum = tuple.datum_at(self.field)?;
        let ordering = datum
            .compare(&self.operand)
            .ok_or(ExecutionError::OperandTypeMismatch)?;
        Ok(match self.op {
            CmpOp::Equals => ordering == Ordering::Equal,
            CmpOp::NotEquals => ordering != Ordering::Equal,
            CmpOp::GreaterThan => ordering == Ordering::Greater,
            CmpOp::GreaterThanOrEq => ordering != Ordering::Less,
            CmpOp::LessThan => ordering == Ordering::Less,
            CmpOp::LessThanOrEq => ordering != Ordering::Greater,
        })
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "field[{}] {} {}", self.field, self.op, self.operand)
    }
}
