use crate::datum::Datum;
use crate::table::{RecordId, SchemaRef, TableError};
use itertools::Itertools;
use std::fmt;

/// one record of typed field values, arity is fixed at construction,
/// field values stay mutable in place
#[derive(Clone, Debug)]
pub struct Tuple {
    schema: SchemaRef,
    datums: Vec<Datum>,
    rid: Option<RecordId>,
}

impl Tuple {
    pub fn new(schema: SchemaRef, datums: Vec<Datum>) -> Result<Self, TableError> {
        if datums.len() != schema.len() {
            return Err(TableError::DatumSchemaNotMatch);
        }
        if !schema
            .iter()
            .zip(datums.iter())
            .all(|(column, datum)| datum.matches_type(&column.data_type))
        {
            return Err(TableError::DatumSchemaNotMatch);
        }
        Ok(Self {
            schema,
            datums,
            rid: None,
        })
    }
    pub fn schema(&self) -> &SchemaRef {
        &self.schema
    }
    pub fn datum_at(&self, idx: usize) -> Result<&Datum, TableError> {
        self.datums.get(idx).ok_or(TableError::FieldOutOfBound(idx))
    }
    pub fn set_datum(&mut self, idx: usize, datum: Datum) -> Result<(), TableError> {
        let column = self
            .schema
            .column_at(idx)
            .ok_or(TableError::FieldOutOfBound(idx))?;
        if !datum.matches_type(&column.data_type) {
            return Err(TableError::DatumSchemaNotMatch);
        }
        self.datums[idx] = datum;
        Ok(())
    }
    pub fn datums(&self) -> &[Datum] {
        self.datums.as_slice()
    }
    pub fn rid(&self) -> Option<RecordId> {
        self.rid
    }
    pub fn set_rid(&mut self, rid: Option<RecordId>) {
        self.rid = rid;
    }
}

/// tuples compare by field values, the record id back-reference
/// is identity, not content
impl PartialEq for Tuple {
    fn eq(&self, other: &Self) -> bool {
        self.datums == other.datums
    }
}

impl fmt::Display for Tuple {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({})", self.datums.iter().join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datum::DataType;
    use crate::table::Schema;
    use std::rc::Rc;

    fn sample_schema() -> SchemaRef {
        Rc::new(Schema::from_slice(&[
            (DataType::new_int(), "id".to_string()),
            (DataType::new_varchar(8), "tag".to_string()),
        ]))
    }

    #[test]
    fn test_arity_and_types_checked() {
        let schema = sample_schema();
        assert!(Tuple::new(schema.clone(), vec![1.into()]).is_err());
        assert!(Tuple::new(schema.clone(), vec!["a".into(), 1.into()]).is_err());
        assert!(Tuple::new(schema, vec![1.into(), "a".into()]).is_ok());
    }

    #[test]
    fn test_overlong_varchar_rejected() {
        let schema = sample_schema();
        let datums = vec![1.into(), "way too long for eight".into()];
        assert!(Tuple::new(schema, datums).is_err());
    }

    #[test]
    fn test_set_datum_in_place() {
        let schema = sample_schema();
        let mut tuple = Tuple::new(schema, vec![1.into(), "a".into()]).unwrap();
        tuple.set_datum(0, 7.into()).unwrap();
        assert_eq!(tuple.datum_at(0).unwrap(), &Datum::Int(7));
        assert!(tuple.set_datum(0, "x".into()).is_err());
        assert!(tuple.set_datum(5, 1.into()).is_err());
    }
}
