use crate::datum::{DataType, Datum};
use crate::execution::executor::{Executor, ExecutorBase, ExecutorImpl};
use crate::execution::ExecutionError;
use crate::table::{Schema, SchemaRef, TableError, Tuple};
use log::debug;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AggregateOp {
    Count,
    Sum,
    Avg,
    Min,
    Max,
}

impl fmt::Display for AggregateOp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::Count => "count",
                Self::Sum => "sum",
                Self::Avg => "avg",
                Self::Min => "min",
                Self::Max => "max",
            }
        )
    }
}

/// without grouping the output is one aggregate column, with grouping the
/// group-by column keeps its type and desc and the aggregate column
/// follows, named "<op>(<field desc>)" either way
fn output_schema(
    child: &Schema,
    agg_field: usize,
    group_by: Option<usize>,
    op: AggregateOp,
) -> Result<Schema, ExecutionError> {
    let agg_column = child
        .column_at(agg_field)
        .ok_or(TableError::FieldOutOfBound(agg_field))?;
    let agg_desc = format!("{}({})", op, agg_column.desc);
    match group_by {
        None => Ok(Schema::from_slice(&[(DataType::new_int(), agg_desc)])),
        Some(idx) => {
            let group_column = child
                .column_at(idx)
                .ok_or(TableError::FieldOutOfBound(idx))?;
            Ok(Schema::from_slice(&[
                (group_column.data_type, group_column.desc.clone()),
                (DataType::new_int(), agg_desc),
            ]))
        }
    }
}

/// running state of one group, bounded regardless of how many rows merge
/// into it
struct GroupState {
    count: usize,
    sum: i32,
    min: i32,
    max: i32,
}

impl GroupState {
    /// min and max start from the first value the group observes
    fn new(value: i32) -> Self {
        Self {
            count: 1,
            sum: value,
            min: value,
            max: value,
        }
    }
    fn merge(&mut self, value: i32) {
        self.count += 1;
        self.sum += value;
        self.min = self.min.min(value);
        self.max = self.max.max(value);
    }
    /// avg is computed here at emission, not accumulated incrementally
    fn emit(&self, op: AggregateOp) -> i32 {
        match op {
            AggregateOp::Count => self.count as i32,
            AggregateOp::Sum => self.sum,
            AggregateOp::Avg => self.sum / self.count as i32,
            AggregateOp::Min => self.min,
            AggregateOp::Max => self.max,
        }
    }
}

/// per-group accumulator over an int field, supports the whole operator
/// set, the group key is `None` when grouping is off
pub struct IntAggregator {
    input: SchemaRef,
    output: SchemaRef,
    agg_field: usize,
    group_by: Option<usize>,
    op: AggregateOp,
    groups: HashMap<Option<Datum>, GroupState>,
}

impl IntAggregator {
    pub fn new(
        input: SchemaRef,
        agg_field: usize,
        group_by: Option<usize>,
        op: AggregateOp,
    ) -> Result<Self, ExecutionError> {
        match input.type_at(agg_field) {
            Some(DataType::Int) => {}
            Some(_) => return Err(TableError::DatumSchemaNotMatch.into()),
            None => return Err(TableError::FieldOutOfBound(agg_field).into()),
        }
        let output = Rc::new(output_schema(input.as_ref(), agg_field, group_by, op)?);
        Ok(Self {
            input,
            output,
            agg_field,
            group_by,
            op,
            groups: HashMap::new(),
        })
    }
    pub fn merge_tuple_into_group(&mut self, tuple: &Tuple) -> Result<(), ExecutionError> {
        if tuple.schema().as_ref() != self.input.as_ref() {
            return Err(TableError::DatumSchemaNotMatch.into());
        }
        let value = match tuple.datum_at(self.agg_field)? {
            Datum::Int(value) => *value,
            _ => return Err(TableError::DatumSchemaNotMatch.into()),
        };
        let key = group_key(tuple, self.group_by)?;
        self.groups
            .entry(key)
            .and_modify(|state| state.merge(value))
            .or_insert_with(|| GroupState::new(value));
        Ok(())
    }
    /// materialize the final (group key, aggregate value) rows, only
    /// meaningful once every intended row has been merged
    pub fn tuples(&self) -> Result<Vec<Tuple>, ExecutionError> {
        self.groups
            .iter()
            .map(|(key, state)| {
                let value = Datum::Int(state.emit(self.op));
                let datums = match key {
                    None => vec![value],
                    Some(datum) => vec![datum.clone(), value],
                };
                Tuple::new(self.output.clone(), datums).map_err(ExecutionError::from)
            })
            .collect()
    }
    pub fn output_schema(&self) -> SchemaRef {
        self.output.clone()
    }
}

/// per-group accumulator over a varchar field, strings have no natural
/// sum or ordering aggregate here so only count is supported
pub struct StringAggregator {
    input: SchemaRef,
    output: SchemaRef,
    agg_field: usize,
    group_by: Option<usize>,
    groups: HashMap<Option<Datum>, usize>,
}

impl StringAggregator {
    pub fn new(
        input: SchemaRef,
        agg_field: usize,
        group_by: Option<usize>,
        op: AggregateOp,
    ) -> Result<Self, ExecutionError> {
        if op != AggregateOp::Count {
            return Err(ExecutionError::UnsupportedAggregate { op });
        }
        match input.type_at(agg_field) {
            Some(DataType::VarChar(_)) => {}
            Some(_) => return Err(TableError::DatumSchemaNotMatch.into()),
            None => return Err(TableError::FieldOutOfBound(agg_field).into()),
        }
        let output = Rc::new(output_schema(
            input.as_ref(),
            agg_field,
            group_by,
            AggregateOp::Count,
        )?);
        Ok(Self {
            input,
            output,
            agg_field,
            group_by,
            groups: HashMap::new(),
        })
    }
    pub fn merge_tuple_into_group(&mut self, tuple: &Tuple) -> Result<(), ExecutionError> {
        if tuple.schema().as_ref() != self.input.as_ref() {
            return Err(TableError::DatumSchemaNotMatch.into());
        }
        match tuple.datum_at(self.agg_field)? {
            Datum::VarChar(_) => {}
            _ => return Err(TableError::DatumSchemaNotMatch.into()),
        }
        let key = group_key(tuple, self.group_by)?;
        *self.groups.entry(key).or_insert(0) += 1;
        Ok(())
    }
    pub fn tuples(&self) -> Result<Vec<Tuple>, ExecutionError> {
        self.groups
            .iter()
            .map(|(key, count)| {
                let value = Datum::Int(*count as i32);
                let datums = match key {
                    None => vec![value],
                    Some(datum) => vec![datum.clone(), value],
                };
                Tuple::new(self.output.clone(), datums).map_err(ExecutionError::from)
            })
            .collect()
    }
    pub fn output_schema(&self) -> SchemaRef {
        self.output.clone()
    }
}

fn group_key(tuple: &Tuple, group_by: Option<usize>) -> Result<Option<Datum>, ExecutionError> {
    match group_by {
        None => Ok(None),
        Some(idx) => Ok(Some(tuple.datum_at(idx)?.clone())),
    }
}

/// accumulator variant picked once from the declared type of the
/// aggregated field, never re-inspected per row
pub enum AggregatorImpl {
    Int(IntAggregator),
    Str(StringAggregator),
}

impl AggregatorImpl {
    pub fn new(
        input: SchemaRef,
        agg_field: usize,
        group_by: Option<usize>,
        op: AggregateOp,
    ) -> Result<Self, ExecutionError> {
        match input
            .type_at(agg_field)
            .ok_or(TableError::FieldOutOfBound(agg_field))?
        {
            DataType::Int => Ok(Self::Int(IntAggregator::new(input, agg_field, group_by, op)?)),
            DataType::VarChar(_) => Ok(Self::Str(StringAggregator::new(
                input, agg_field, group_by, op,
            )?)),
        }
    }
    pub fn merge_tuple_into_group(&mut self, tuple: &Tuple) -> Result<(), ExecutionError> {
        match self {
            Self::Int(aggregator) => aggregator.merge_tuple_into_group(tuple),
            Self::Str(aggregator) => aggregator.merge_tuple_into_group(tuple),
        }
    }
    pub fn tuples(&self) -> Result<Vec<Tuple>, ExecutionError> {
        match self {
            Self::Int(aggregator) => aggregator.tuples(),
            Self::Str(aggregator) => aggregator.tuples(),
        }
    }
}

/// grouping/aggregation operator, deliberately blocking: open drains the
/// whole child before the first row comes out, memory stays bounded by
/// the number of distinct groups rather than the number of rows
pub struct AggExecutor {
    pub(super) base: ExecutorBase,
    child: Box<ExecutorImpl>,
    agg_field: usize,
    group_by: Option<usize>,
    op: AggregateOp,
    schema: SchemaRef,
    results: Vec<Tuple>,
    cursor: usize,
}

impl AggExecutor {
    pub fn new(
        child: ExecutorImpl,
        agg_field: usize,
        group_by: Option<usize>,
        op: AggregateOp,
    ) -> Result<Self, ExecutionError> {
        let schema = Rc::new(output_schema(
            child.schema().as_ref(),
            agg_field,
            group_by,
            op,
        )?);
        Ok(Self {
            base: ExecutorBase::default(),
            child: Box::new(child),
            agg_field,
            group_by,
            op,
            schema,
            results: vec![],
            cursor: 0,
        })
    }
    /// open the child, merge every row, close the child, then switch to
    /// the materialized result sequence
    fn drain(&mut self) -> Result<(), ExecutionError> {
        self.child.open()?;
        let mut aggregator =
            AggregatorImpl::new(self.child.schema(), self.agg_field, self.group_by, self.op)?;
        while self.child.has_next()? {
            let tuple = self.child.next()?;
            aggregator.merge_tuple_into_group(&tuple)?;
        }
        self.child.close()?;
        self.results = aggregator.tuples()?;
        self.cursor = 0;
        debug!("materialized {} aggregate groups", self.results.len());
        Ok(())
    }
    pub(super) fn open_inner(&mut self) -> Result<(), ExecutionError> {
        self.drain()
    }
    pub(super) fn close_inner(&mut self) -> Result<(), ExecutionError> {
        self.results.clear();
        self.cursor = 0;
        Ok(())
    }
    /// a rewind is a full recompute: reopen the child and redo the whole
    /// drain-and-aggregate pass
    pub(super) fn rewind_inner(&mut self) -> Result<(), ExecutionError> {
        self.drain()
    }
    pub(super) fn fetch_next(&mut self) -> Result<Option<Tuple>, ExecutionError> {
        if self.cursor < self.results.len() {
            let tuple = self.results[self.cursor].clone();
            self.cursor += 1;
            Ok(Some(tuple))
        } else {
            Ok(None)
        }
    }
    pub fn schema(&self) -> SchemaRef {
        self.schema.clone()
    }
}
