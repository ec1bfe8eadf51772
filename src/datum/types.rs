use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VarCharType {
    pub max_len: usize,
}

impl VarCharType {
    pub fn new(max_len: usize) -> Self {
        Self { max_len }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataType {
    Int,
    VarChar(VarCharType),
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::Int => "int".to_string(),
                Self::VarChar(_) => "varchar".to_string(),
            }
        )
    }
}

impl DataType {
    pub fn new_int() -> Self {
        Self::Int
    }
    pub fn new_varchar(max_len: usize) -> Self {
        Self::VarChar(VarCharType::new(max_len))
    }
    /// on-page width of one value, a varchar is stored as a 4-byte
    /// length prefix followed by max_len payload bytes
    pub fn width_of_value(&self) -> usize {
        match self {
            Self::Int => 4,
            Self::VarChar(varchar_type) => 4 + varchar_type.max_len,
        }
    }
}
