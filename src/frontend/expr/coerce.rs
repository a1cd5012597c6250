//! 类型收窄
//!
//! 按目标基本类型检查并转换已折叠的字面量。整数按有效位数检查溢出，
//! 与 C 常量的写法保持一致（`0xFF` 可以赋给有符号 8 位类型）。

use num_bigint::BigInt;
use num_traits::{Signed, ToPrimitive};

use super::{CoerceError, Expr, Value};
use crate::frontend::types::Kind;

fn checked_bits(
    v: &BigInt,
    bits: u64,
) -> Result<(), CoerceError> {
    if v.bits() > bits {
        return Err(CoerceError::Overflow {
            bits,
            value: v.to_string(),
        });
    }
    Ok(())
}

impl Expr {
    /// Validate and narrow the literal to `kind`.
    ///
    /// Negative values coerced to an unsigned kind wrap to two's complement.
    pub fn coerce(
        &self,
        kind: Kind,
    ) -> Result<Expr, CoerceError> {
        if !self.can_eval() {
            return Err(CoerceError::NotEvaluable);
        }

        let value = match kind {
            Kind::Int8 | Kind::Int16 | Kind::Int32 | Kind::Int64 | Kind::Int3264 => {
                let v = self.big_int().ok_or(CoerceError::Mismatch(kind))?;
                checked_bits(v, kind.bits().unwrap_or(64))?;
                Value::Int(v.clone())
            }
            Kind::Uint8 | Kind::Uint16 | Kind::Uint32 | Kind::Uint64 | Kind::Uint3264 => {
                let v = self.big_int().ok_or(CoerceError::Mismatch(kind))?;
                let bits = kind.bits().unwrap_or(64);
                checked_bits(v, bits)?;
                if v.is_negative() {
                    Value::Int((BigInt::from(1u8) << bits) + v)
                } else {
                    Value::Int(v.clone())
                }
            }
            Kind::Float32 | Kind::Float64 => match self.literal() {
                Value::Float(f) => Value::Float(*f),
                Value::Int(v) => Value::Float(v.to_f64().ok_or(CoerceError::Mismatch(kind))?),
                _ => return Err(CoerceError::Mismatch(kind)),
            },
            Kind::String => Value::Str(self.as_str().ok_or(CoerceError::Mismatch(kind))?.to_string()),
            Kind::Boolean => Value::Bool(self.as_bool()),
            Kind::Char => Value::Char(self.as_char().ok_or(CoerceError::Mismatch(kind))?),
            Kind::Void => {
                if !self.is_null() {
                    return Err(CoerceError::Mismatch(kind));
                }
                Value::Null
            }
            _ => return Err(CoerceError::Unsupported(kind)),
        };

        Ok(self.with_value(value))
    }
}
