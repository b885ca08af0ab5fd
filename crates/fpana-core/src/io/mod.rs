pub mod fits;
pub mod fits_writer;
pub mod table;

pub use fits::FitsTableReader;
pub use fits_writer::FitsTableWriter;
pub use table::{ColumnKind, ColumnSpec, FromRow, Row, RowEncoder, TableChunk, TableSchema, ToRow};
