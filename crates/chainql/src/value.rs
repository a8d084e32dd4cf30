//! Scalar values bound to equality predicates.
//!
//! A [`Value`] is stored with each predicate and bound as a statement parameter
//! at execution time, for Postgres and SQLite alike. It also renders as an
//! escaped SQL literal for previews and logs.

use bytes::BytesMut;
use std::error::Error;
use std::fmt;
use tokio_postgres::types::{IsNull, ToSql, Type, to_sql_checked};

/// An opaque scalar compared with `=` in a `WHERE` clause.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Value {
    /// Render as a single-quoted SQL literal, doubling embedded quotes.
    ///
    /// Every variant is quoted (`25` becomes `'25'`), matching how the preview
    /// grammar spells predicates.
    pub fn to_literal(&self) -> String {
        format!("'{}'", self.to_string().replace('\'', "''"))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(v) => write!(f, "{v}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Text(v) => f.write_str(v),
        }
    }
}

macro_rules! impl_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(v: $t) -> Self {
                    Value::Int(i64::from(v))
                }
            }
        )*
    };
}

impl_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(f64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&String> for Value {
    fn from(v: &String) -> Self {
        Value::Text(v.clone())
    }
}

fn is_text_type(ty: &Type) -> bool {
    *ty == Type::TEXT || *ty == Type::VARCHAR || *ty == Type::BPCHAR || *ty == Type::NAME
}

/// Largest integer magnitudes `f32` and `f64` hold without rounding.
const F32_EXACT: i64 = 1 << 24;
const F64_EXACT: i64 = 1 << 53;

fn exact_float(v: i64, limit: i64) -> Result<i64, Box<dyn Error + Sync + Send>> {
    if v.unsigned_abs() > limit as u64 {
        return Err(format!("integer {v} is not exactly representable as a float").into());
    }
    Ok(v)
}

// Postgres rejects a parameter whose wire type differs from the column type, so
// integers and floats are narrowed (or stringified) to whatever the server asks for.
impl ToSql for Value {
    fn to_sql(
        &self,
        ty: &Type,
        out: &mut BytesMut,
    ) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
        if is_text_type(ty) {
            return self.to_string().to_sql_checked(ty, out);
        }

        match self {
            Value::Bool(v) => v.to_sql_checked(ty, out),
            Value::Int(v) => {
                if *ty == Type::INT2 {
                    i16::try_from(*v)?.to_sql_checked(ty, out)
                } else if *ty == Type::INT4 {
                    i32::try_from(*v)?.to_sql_checked(ty, out)
                } else if *ty == Type::FLOAT4 {
                    (exact_float(*v, F32_EXACT)? as f32).to_sql_checked(ty, out)
                } else if *ty == Type::FLOAT8 {
                    (exact_float(*v, F64_EXACT)? as f64).to_sql_checked(ty, out)
                } else {
                    v.to_sql_checked(ty, out)
                }
            }
            Value::Float(v) => {
                if *ty == Type::FLOAT4 {
                    (*v as f32).to_sql_checked(ty, out)
                } else {
                    v.to_sql_checked(ty, out)
                }
            }
            Value::Text(v) => v.to_sql_checked(ty, out),
        }
    }

    fn accepts(ty: &Type) -> bool {
        <bool as ToSql>::accepts(ty)
            || <i16 as ToSql>::accepts(ty)
            || <i32 as ToSql>::accepts(ty)
            || <i64 as ToSql>::accepts(ty)
            || <f32 as ToSql>::accepts(ty)
            || <f64 as ToSql>::accepts(ty)
            || <String as ToSql>::accepts(ty)
    }

    to_sql_checked!();
}

#[cfg(feature = "sqlite")]
impl rusqlite::ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<rusqlite::types::ToSqlOutput<'_>> {
        use rusqlite::types::ToSqlOutput;

        Ok(match self {
            Value::Bool(v) => ToSqlOutput::from(*v),
            Value::Int(v) => ToSqlOutput::from(*v),
            Value::Float(v) => ToSqlOutput::from(*v),
            Value::Text(v) => ToSqlOutput::from(v.as_str()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literals_are_quoted_and_escaped() {
        assert_eq!(Value::from(25).to_literal(), "'25'");
        assert_eq!(Value::from("alec").to_literal(), "'alec'");
        assert_eq!(Value::from("O'Brien").to_literal(), "'O''Brien'");
        assert_eq!(
            Value::from("x'; DROP TABLE users; --").to_literal(),
            "'x''; DROP TABLE users; --'"
        );
        assert_eq!(Value::from(true).to_literal(), "'true'");
    }

    #[test]
    fn conversions_pick_the_right_variant() {
        assert_eq!(Value::from(7u8), Value::Int(7));
        assert_eq!(Value::from(-3i16), Value::Int(-3));
        assert_eq!(Value::from(1.5f32), Value::Float(1.5));
        assert_eq!(Value::from(String::from("a")), Value::Text("a".into()));
    }

    #[test]
    fn postgres_binding_narrows_integers() {
        let mut out = BytesMut::new();
        Value::Int(42).to_sql_checked(&Type::INT4, &mut out).unwrap();
        assert_eq!(out.len(), 4);

        let mut out = BytesMut::new();
        Value::Int(42).to_sql_checked(&Type::INT8, &mut out).unwrap();
        assert_eq!(out.len(), 8);

        let mut out = BytesMut::new();
        assert!(Value::Int(i64::MAX).to_sql_checked(&Type::INT2, &mut out).is_err());
    }

    #[test]
    fn postgres_binding_rejects_inexact_floats() {
        let mut out = BytesMut::new();
        Value::Int(1 << 24).to_sql_checked(&Type::FLOAT4, &mut out).unwrap();
        assert_eq!(out.len(), 4);

        let mut out = BytesMut::new();
        assert!(Value::Int((1 << 24) + 1).to_sql_checked(&Type::FLOAT4, &mut out).is_err());

        let mut out = BytesMut::new();
        Value::Int(-(1 << 53)).to_sql_checked(&Type::FLOAT8, &mut out).unwrap();
        assert_eq!(out.len(), 8);

        let mut out = BytesMut::new();
        assert!(Value::Int(i64::MIN).to_sql_checked(&Type::FLOAT8, &mut out).is_err());
    }

    #[test]
    fn postgres_binding_stringifies_for_text_columns() {
        let mut out = BytesMut::new();
        Value::Int(25).to_sql_checked(&Type::TEXT, &mut out).unwrap();
        assert_eq!(&out[..], b"25");
    }

    #[test]
    fn postgres_binding_rejects_mismatched_types() {
        let mut out = BytesMut::new();
        assert!(Value::Text("abc".into()).to_sql_checked(&Type::INT4, &mut out).is_err());
        assert!(!<Value as ToSql>::accepts(&Type::UUID));
    }
}
