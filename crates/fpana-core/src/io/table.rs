use std::fmt;

use fitsio::tables::{ColumnDataType, ColumnDescription, ConcreteColumnDescription};

use crate::error::{FpError, Result};

/// Binary-table element type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColumnKind {
    Int16,
    Int32,
    Int64,
    Float32,
    Float64,
}

impl ColumnKind {
    /// TFORM letter, as shown in a table header.
    pub fn code(self) -> char {
        match self {
            Self::Int16 => 'I',
            Self::Int32 => 'J',
            Self::Int64 => 'K',
            Self::Float32 => 'E',
            Self::Float64 => 'D',
        }
    }

    pub fn is_integer(self) -> bool {
        matches!(self, Self::Int16 | Self::Int32 | Self::Int64)
    }

    fn data_type(self) -> ColumnDataType {
        match self {
            Self::Int16 => ColumnDataType::Short,
            Self::Int32 => ColumnDataType::Int,
            Self::Int64 => ColumnDataType::Long,
            Self::Float32 => ColumnDataType::Float,
            Self::Float64 => ColumnDataType::Double,
        }
    }

    fn from_data_type(typ: &ColumnDataType) -> Option<Self> {
        match typ {
            ColumnDataType::Short => Some(Self::Int16),
            ColumnDataType::Int => Some(Self::Int32),
            ColumnDataType::Long => Some(Self::Int64),
            ColumnDataType::Float => Some(Self::Float32),
            ColumnDataType::Double => Some(Self::Float64),
            _ => None,
        }
    }
}

/// Declared layout of one column.
#[derive(Clone, Debug, PartialEq)]
pub struct ColumnSpec {
    pub name: String,
    pub kind: ColumnKind,
    pub repeat: usize,
}

impl ColumnSpec {
    pub fn new(name: &str, kind: ColumnKind, repeat: usize) -> Self {
        Self {
            name: name.to_string(),
            kind,
            repeat,
        }
    }

    pub fn scalar(name: &str, kind: ColumnKind) -> Self {
        Self::new(name, kind, 1)
    }

    /// TFORM value, e.g. `1K` or `2D`.
    pub fn tform(&self) -> String {
        format!("{}{}", self.repeat, self.kind.code())
    }

    pub(crate) fn description(&self) -> Result<ConcreteColumnDescription> {
        ColumnDescription::new(self.name.as_str())
            .with_type(self.kind.data_type())
            .that_repeats(self.repeat)
            .create()
            .map_err(|e| FpError::column(&self.name, e.to_string()))
    }

    /// `None` for element types no record decodes (strings, bits, ...).
    pub(crate) fn from_description(desc: &ConcreteColumnDescription) -> Option<Self> {
        ColumnKind::from_data_type(&desc.data_type.typ)
            .map(|kind| Self::new(&desc.name, kind, desc.data_type.repeat))
    }
}

impl fmt::Display for ColumnSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.tform())
    }
}

/// Ordered column list of a binary table.
#[derive(Clone, Debug, Default)]
pub struct TableSchema {
    columns: Vec<ColumnSpec>,
}

impl TableSchema {
    pub fn new(columns: Vec<ColumnSpec>) -> Self {
        Self { columns }
    }

    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    pub fn find(&self, name: &str) -> Result<&ColumnSpec> {
        self.index_of(name).map(|i| &self.columns[i])
    }

    fn index_of(&self, name: &str) -> Result<usize> {
        self.columns
            .iter()
            .position(|c| c.name == name)
            .ok_or_else(|| FpError::column(name, "no such column"))
    }
}

/// Values of one column over a run of rows, `repeat` elements per row.
/// Integer columns widen to `i64`, floating-point columns to `f64`.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum ColumnData {
    Int(Vec<i64>),
    Float(Vec<f64>),
}

impl ColumnData {
    pub(crate) fn empty(spec: &ColumnSpec) -> Self {
        if spec.kind.is_integer() {
            Self::Int(Vec::new())
        } else {
            Self::Float(Vec::new())
        }
    }

    fn zeroed(spec: &ColumnSpec) -> Self {
        if spec.kind.is_integer() {
            Self::Int(vec![0; spec.repeat])
        } else {
            Self::Float(vec![0.0; spec.repeat])
        }
    }

    /// Append `other`, which must hold the same element family.
    pub(crate) fn extend(&mut self, other: &ColumnData) {
        match (self, other) {
            (Self::Int(dst), Self::Int(src)) => dst.extend_from_slice(src),
            (Self::Float(dst), Self::Float(src)) => dst.extend_from_slice(src),
            _ => {}
        }
    }

    pub(crate) fn len(&self) -> usize {
        match self {
            Self::Int(v) => v.len(),
            Self::Float(v) => v.len(),
        }
    }
}

/// Rows `[first_row, first_row + len)` of a table, loaded column by column.
#[derive(Clone, Debug)]
pub struct TableChunk {
    schema: TableSchema,
    columns: Vec<ColumnData>,
    first_row: usize,
    len: usize,
}

impl TableChunk {
    pub(crate) fn new(
        schema: TableSchema,
        columns: Vec<ColumnData>,
        first_row: usize,
        len: usize,
    ) -> Self {
        Self {
            schema,
            columns,
            first_row,
            len,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Absolute index of the first row in the table.
    pub fn first_row(&self) -> usize {
        self.first_row
    }

    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> {
        (0..self.len).map(move |index| Row { chunk: self, index })
    }

    fn column(&self, name: &str) -> Result<(&ColumnSpec, &ColumnData)> {
        let i = self.schema.index_of(name)?;
        let data = self
            .columns
            .get(i)
            .ok_or_else(|| FpError::column(name, "column data not loaded"))?;
        Ok((&self.schema.columns[i], data))
    }
}

/// One row of a [`TableChunk`].
#[derive(Clone, Copy)]
pub struct Row<'a> {
    chunk: &'a TableChunk,
    index: usize,
}

impl<'a> Row<'a> {
    fn cell<T>(&self, spec: &ColumnSpec, values: &'a [T], len: usize) -> Result<&'a [T]> {
        if spec.repeat < len {
            return Err(FpError::column(
                &spec.name,
                format!("expected {len} element(s), found {}", spec.repeat),
            ));
        }
        let start = self.index * spec.repeat;
        values
            .get(start..start + len)
            .ok_or_else(|| FpError::column(&spec.name, "row outside loaded data"))
    }

    fn ints(&self, name: &str, len: usize) -> Result<&'a [i64]> {
        let (spec, data) = self.chunk.column(name)?;
        match data {
            ColumnData::Int(values) => self.cell(spec, values, len),
            ColumnData::Float(_) => Err(FpError::column(
                name,
                format!("expected integer data, found TFORM {}", spec.tform()),
            )),
        }
    }

    fn floats(&self, name: &str, len: usize) -> Result<&'a [f64]> {
        let (spec, data) = self.chunk.column(name)?;
        match data {
            ColumnData::Float(values) => self.cell(spec, values, len),
            ColumnData::Int(_) => Err(FpError::column(
                name,
                format!("expected floating-point data, found TFORM {}", spec.tform()),
            )),
        }
    }

    pub fn i64(&self, name: &str) -> Result<i64> {
        Ok(self.ints(name, 1)?[0])
    }

    pub fn i64_array<const N: usize>(&self, name: &str) -> Result<[i64; N]> {
        let mut out = [0i64; N];
        out.copy_from_slice(self.ints(name, N)?);
        Ok(out)
    }

    pub fn f64(&self, name: &str) -> Result<f64> {
        Ok(self.floats(name, 1)?[0])
    }

    pub fn f64_array<const N: usize>(&self, name: &str) -> Result<[f64; N]> {
        let mut out = [0f64; N];
        out.copy_from_slice(self.floats(name, N)?);
        Ok(out)
    }
}

/// Collects the cells of one row before it is appended to a table.
pub struct RowEncoder<'a> {
    schema: &'a TableSchema,
    cells: Vec<ColumnData>,
}

impl<'a> RowEncoder<'a> {
    pub(crate) fn new(schema: &'a TableSchema) -> Self {
        Self {
            schema,
            cells: schema.columns().iter().map(ColumnData::zeroed).collect(),
        }
    }

    fn slot(&mut self, name: &str, integer: bool, len: usize) -> Result<&mut ColumnData> {
        let i = self.schema.index_of(name)?;
        let spec = &self.schema.columns[i];
        if spec.kind.is_integer() != integer || spec.repeat != len {
            return Err(FpError::column(
                name,
                format!("cannot store {len} value(s) in TFORM {}", spec.tform()),
            ));
        }
        Ok(&mut self.cells[i])
    }

    pub fn put_i64(&mut self, name: &str, value: i64) -> Result<()> {
        self.put_i64s(name, &[value])
    }

    pub fn put_i64s(&mut self, name: &str, values: &[i64]) -> Result<()> {
        if let ColumnData::Int(cell) = self.slot(name, true, values.len())? {
            cell.copy_from_slice(values);
        }
        Ok(())
    }

    pub fn put_f64(&mut self, name: &str, value: f64) -> Result<()> {
        self.put_f64s(name, &[value])
    }

    pub fn put_f64s(&mut self, name: &str, values: &[f64]) -> Result<()> {
        if let ColumnData::Float(cell) = self.slot(name, false, values.len())? {
            cell.copy_from_slice(values);
        }
        Ok(())
    }

    pub(crate) fn into_cells(self) -> Vec<ColumnData> {
        self.cells
    }
}

/// Decodes a typed record from a row, addressing fields by column name.
pub trait FromRow: Sized {
    fn from_row(row: &Row<'_>) -> Result<Self>;
}

/// Encodes a typed record into a table with a fixed column layout.
pub trait ToRow {
    fn columns() -> Vec<ColumnSpec>;
    fn encode(&self, row: &mut RowEncoder<'_>) -> Result<()>;
}
