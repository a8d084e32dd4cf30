//! Row mapping traits

use crate::error::{ChainError, ChainResult};
use tokio_postgres::Row;
use tokio_postgres::types::FromSql;

/// Trait for converting a database row into a Rust value.
///
/// # Example
///
/// ```ignore
/// use chainql::{FromRow, RowExt};
///
/// struct Person {
///     id: i64,
///     name: String,
/// }
///
/// impl FromRow for Person {
///     fn from_row(row: &tokio_postgres::Row) -> chainql::ChainResult<Self> {
///         Ok(Self {
///             id: row.try_get_column("id")?,
///             name: row.try_get_column("name")?,
///         })
///     }
/// }
/// ```
pub trait FromRow: Sized {
    /// Convert a database row into Self
    fn from_row(row: &Row) -> ChainResult<Self>;
}

/// Extension trait for Row to provide typed access
pub trait RowExt {
    /// Try to get a column value, returning ChainError::Decode on failure
    fn try_get_column<T>(&self, column: &str) -> ChainResult<T>
    where
        T: for<'a> FromSql<'a>;
}

impl RowExt for Row {
    fn try_get_column<T>(&self, column: &str) -> ChainResult<T>
    where
        T: for<'a> FromSql<'a>,
    {
        self.try_get(column)
            .map_err(|e| ChainError::decode(column, e.to_string()))
    }
}

macro_rules! impl_from_row_tuple {
    ($($idx:tt => $t:ident),+) => {
        impl<$($t),+> FromRow for ($($t,)+)
        where
            $($t: for<'a> FromSql<'a>),+
        {
            fn from_row(row: &Row) -> ChainResult<Self> {
                Ok(($(
                    row.try_get::<_, $t>($idx)
                        .map_err(|e| ChainError::decode(stringify!($idx), e.to_string()))?,
                )+))
            }
        }
    };
}

impl_from_row_tuple!(0 => A);
impl_from_row_tuple!(0 => A, 1 => B);
impl_from_row_tuple!(0 => A, 1 => B, 2 => C);
impl_from_row_tuple!(0 => A, 1 => B, 2 => C, 3 => D);
