use serde::{Deserialize, Serialize};
use std::convert::TryInto;
use std::fmt;
use thiserror::Error;

pub use types::{DataType, VarCharType};

mod types;

#[derive(Debug, PartialEq, Eq, Hash, Clone, Serialize, Deserialize)]
pub enum Datum {
    Int(i32),
    VarChar(String),
}

impl From<i32> for Datum {
    fn from(i: i32) -> Datum {
        Datum::Int(i)
    }
}

impl From<&str> for Datum {
    fn from(s: &str) -> Datum {
        Datum::VarChar(s.to_owned())
    }
}

impl Datum {
    pub fn matches_type(&self, data_type: &DataType) -> bool {
        match (self, data_type) {
            (Self::Int(_), DataType::Int) => true,
            (Self::VarChar(s), DataType::VarChar(varchar_type)) => s.len() <= varchar_type.max_len,
            _ => false,
        }
    }
    /// ordering is only defined between values of the same type
    pub fn compare(&self, other: &Datum) -> Option<std::cmp::Ordering> {
        match (self, other) {
            (Self::Int(lhs), Self::Int(rhs)) => Some(lhs.cmp(rhs)),
            (Self::VarChar(lhs), Self::VarChar(rhs)) => Some(lhs.cmp(rhs)),
            _ => None,
        }
    }
    pub fn to_bytes(&self, data_type: &DataType) -> Vec<u8> {
        assert!(self.matches_type(data_type));
        match (self, data_type) {
            (Self::Int(v), DataType::Int) => v.to_le_bytes().to_vec(),
            (Self::VarChar(s), DataType::VarChar(varchar_type)) => {
                let mut bytes = vec![0u8; 4 + varchar_type.max_len];
                bytes[0..4].copy_from_slice(&(s.len() as u32).to_le_bytes());
                bytes[4..4 + s.len()].copy_from_slice(s.as_bytes());
                bytes
            }
            _ => unreachable!(),
        }
    }
    pub fn from_bytes(data_type: &DataType, bytes: &[u8]) -> Result<Self, DatumError> {
        match data_type {
            DataType::Int => Ok(Datum::Int(i32::from_le_bytes(
                bytes[0..4].try_into().unwrap(),
            ))),
            DataType::VarChar(varchar_type) => {
                let len = u32::from_le_bytes(bytes[0..4].try_into().unwrap()) as usize;
                if len > varchar_type.max_len {
                    return Err(DatumError::LengthOutOfBound {
                        len,
                        max_len: varchar_type.max_len,
                    });
                }
                let s = String::from_utf8(bytes[4..4 + len].to_vec())
                    .map_err(|_| DatumError::InvalidUtf8)?;
                Ok(Datum::VarChar(s))
            }
        }
    }
}

impl fmt::Display for Datum {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::Int(d) => d.to_string(),
                Self::VarChar(s) => s.to_string(),
            }
        )
    }
}

#[derive(Error, Debug)]
pub enum DatumError {
    #[error("varchar length prefix {len} exceeds field capacity {max_len}")]
    LengthOutOfBound { len: usize, max_len: usize },
    #[error("varchar payload is not valid utf-8")]
    InvalidUtf8,
}
