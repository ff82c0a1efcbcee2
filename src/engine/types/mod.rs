mod cell;
mod column_type;
mod result_set;
mod row;

pub use cell::Cell;
pub use column_type::ColumnType;
pub use result_set::{Column, ResultSet};
pub use row::Row;
