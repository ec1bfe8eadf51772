use crate::datum::DataType;
use itertools::Itertools;
use std::fmt;
use std::rc::Rc;
use std::slice::Iter;

#[derive(Debug)]
pub struct Column {
    pub offset: usize,
    pub data_type: DataType,
    pub desc: String,
}

impl Column {
    pub fn new(offset: usize, data_type: DataType, desc: String) -> Self {
        Column {
            offset,
            data_type,
            desc,
        }
    }
}

#[derive(Debug)]
pub struct Schema {
    columns: Vec<Column>,
}

pub type SchemaRef = Rc<Schema>;

impl Schema {
    pub fn new(columns: Vec<Column>) -> Self {
        Self { columns }
    }
    pub fn from_slice(type_and_names: &[(DataType, String)]) -> Self {
        let mut offset = 0;
        let mut columns = vec![];
        for (data_type, desc) in type_and_names {
            columns.push(Column::new(offset, *data_type, desc.clone()));
            offset += data_type.width_of_value();
        }
        Self { columns }
    }
    pub fn len(&self) -> usize {
        self.columns.len()
    }
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
    pub fn iter(&self) -> Iter<Column> {
        self.columns.iter()
    }
    pub fn column_at(&self, idx: usize) -> Option<&Column> {
        self.columns.get(idx)
    }
    pub fn type_at(&self, idx: usize) -> Option<DataType> {
        self.columns.get(idx).map(|column| column.data_type)
    }
    /// fixed width of one record under this schema
    pub fn byte_width(&self) -> usize {
        self.columns
            .iter()
            .map(|column| column.data_type.width_of_value())
            .sum()
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "({})",
            self.columns
                .iter()
                .map(|column| format!("{}: {}", column.desc, column.data_type))
                .join(", ")
        )
    }
}

/// two schemas are equal when their types agree positionally,
/// column descs are advisory
impl PartialEq for Schema {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .zip(other.iter())
                .all(|(lhs, rhs)| lhs.data_type == rhs.data_type)
    }
}
