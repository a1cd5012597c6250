//! 表达式引擎单元测试


use crate::frontend::expr::{is_bool_op, Args, BinaryOp, CoerceError, Expr, ExprError, Value};
use crate::frontend::types::Kind;
use indexmap::IndexMap;
use num_bigint::BigInt;

fn int(v: i64) -> Expr {
    Expr::value(v)
}

fn store(pairs: &[(&str, i64)]) -> IndexMap<String, Expr> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), Expr::value(*v)))
        .collect()
}

#[cfg(test)]
mod fold_tests {
    use super::*;

    #[test]
    fn test_literal_folding() {
        let e = int(2).add(&int(3)).unwrap().mul(&int(4)).unwrap();
        assert!(e.can_eval());
        assert_eq!(e.int64(), Some(20));
    }

    #[test]
    fn test_comparison_yields_bool() {
        let e = int(2).lt(&int(3)).unwrap();
        assert_eq!(e.literal(), &Value::Bool(true));
        assert!(is_bool_op(BinaryOp::Lt));
        assert!(!is_bool_op(BinaryOp::Add));
    }

    #[test]
    fn test_shifts() {
        assert_eq!(int(1).lsh(&int(10)).unwrap().int64(), Some(1024));
        assert_eq!(int(1024).rsh(&int(3)).unwrap().int64(), Some(128));
        assert!(matches!(
            int(1).lsh(&int(-1)),
            Err(ExprError::InvalidShift { .. })
        ));
    }

    #[test]
    fn test_unary() {
        assert_eq!(int(5).negative().unwrap().int64(), Some(-5));
        assert_eq!(int(5).positive().unwrap().int64(), Some(5));
        assert_eq!(int(0).neg().unwrap().int64(), Some(-1));
        assert_eq!(int(0).not().unwrap().literal(), &Value::Bool(true));
        assert_eq!(int(7).ptr().unwrap().int64(), Some(7));
    }

    #[test]
    fn test_ternary() {
        let e = Expr::value(true).ternary(&int(1), &int(2)).unwrap();
        assert_eq!(e.int64(), Some(1));
        let e = int(0).ternary(&int(1), &int(2)).unwrap();
        assert_eq!(e.int64(), Some(2));
    }

    #[test]
    fn test_division_by_zero() {
        assert_eq!(
            int(1).div(&int(0)),
            Err(ExprError::DivisionByZero { op: "/" })
        );
        assert_eq!(
            int(1).rem(&int(0)),
            Err(ExprError::DivisionByZero { op: "%" })
        );
    }

    #[test]
    fn test_division_truncates_toward_zero() {
        assert_eq!(int(-7).div(&int(2)).unwrap().int64(), Some(-3));
        assert_eq!(int(-7).rem(&int(2)).unwrap().int64(), Some(-1));
        assert_eq!(int(7).div(&int(-2)).unwrap().int64(), Some(-3));
        assert_eq!(int(7).rem(&int(-2)).unwrap().int64(), Some(1));
        // quotient and remainder recompose the dividend
        for (l, r) in [(-7, 2), (7, -2), (-7, -2), (-8, 3)] {
            let q = int(l).div(&int(r)).unwrap().int64().unwrap();
            let m = int(l).rem(&int(r)).unwrap().int64().unwrap();
            assert_eq!(q * r + m, l);
        }
    }

    #[test]
    fn test_equality_same_kind() {
        let e = Expr::value("a").eq(&Expr::value("a")).unwrap();
        assert!(e.as_bool());
        let e = Expr::value('x').ne(&Expr::value('y')).unwrap();
        assert!(e.as_bool());
        let e = Expr::value(Value::Null).eq(&Expr::value(Value::Null)).unwrap();
        assert!(e.as_bool());
        assert!(matches!(
            int(1).eq(&Expr::value("1")),
            Err(ExprError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_bool_equality_uses_truthiness() {
        let e = Expr::value(true).eq(&int(5)).unwrap();
        assert!(e.as_bool());
    }

    #[test]
    fn test_arithmetic_rejects_strings() {
        assert!(matches!(
            Expr::value("a").add(&int(1)),
            Err(ExprError::TypeMismatch { op: "+", .. })
        ));
    }

    #[test]
    fn test_big_values() {
        let big = Expr::value(BigInt::from(u64::MAX));
        let e = big.add(&int(1)).unwrap();
        assert_eq!(e.uint64(), None);
        assert_eq!(e.big_int(), Some(&(BigInt::from(u64::MAX) + 1u32)));
    }
}

#[cfg(test)]
mod eval_tests {
    use super::*;

    #[test]
    fn test_ident_is_lazy() {
        let e = Expr::ident("n").add(&int(1)).unwrap();
        assert!(!e.can_eval());
        assert!(e.literal() == &Value::Null);
        assert_eq!(e.to_string(), "(n + 1)");
    }

    #[test]
    fn test_eval_with_store() {
        let e = Expr::ident("n").mul(&int(2)).unwrap();
        let s = store(&[("n", 21)]);
        assert_eq!(e.eval(Some(&s)).unwrap().int64(), Some(42));
    }

    #[test]
    fn test_eval_without_store() {
        let e = Expr::ident("n");
        assert_eq!(e.eval(None), Err(ExprError::NoStore("n".into())));
    }

    #[test]
    fn test_eval_unresolved() {
        let e = Expr::ident("missing").add(&int(1)).unwrap();
        let s = store(&[("n", 1)]);
        assert_eq!(e.eval(Some(&s)), Err(ExprError::Unresolved("missing".into())));
    }

    #[test]
    fn test_eval_division_by_zero_at_runtime() {
        let e = int(10).div(&Expr::ident("d")).unwrap();
        let s = store(&[("d", 0)]);
        assert!(matches!(
            e.eval(Some(&s)),
            Err(ExprError::DivisionByZero { .. })
        ));
    }

    #[test]
    fn test_args_positional() {
        let e = Expr::ident("a").sub(&Expr::ident("b")).unwrap();
        let args = Args::new([10, 3]);
        assert_eq!(e.eval(Some(&args)).unwrap().int64(), Some(7));
        assert_eq!(args.remaining(), 0);
    }

    #[test]
    fn test_eval_ternary_and_ptr() {
        let e = Expr::ident("c")
            .ternary(&Expr::ident("p").ptr().unwrap(), &int(0))
            .unwrap();
        let s = store(&[("c", 1), ("p", 9)]);
        assert_eq!(e.eval(Some(&s)).unwrap().int64(), Some(9));
    }

    #[test]
    fn test_evaluated_expression_is_returned_as_is() {
        let e = int(3);
        assert_eq!(e.eval(None).unwrap(), e);
    }

    #[test]
    fn test_empty_expression() {
        let e = Expr::default();
        assert!(e.is_empty());
        assert!(e.can_eval());
        assert!(e.is_null());
        assert_eq!(e.to_string(), "");
    }

    #[test]
    fn test_serialize() {
        assert_eq!(serde_json::to_string(&int(5)).unwrap(), "5");
        let e = Expr::ident("n").add(&int(1)).unwrap();
        assert_eq!(serde_json::to_string(&e).unwrap(), "\"(n + 1)\"");
    }
}

#[cfg(test)]
mod solve_tests {
    use super::*;

    #[test]
    fn test_resolve_addition() {
        let e = Expr::ident("x").add(&int(2)).unwrap();
        let r = e.resolve(&Expr::ident("y")).unwrap();
        assert_eq!(r.ident, "x");
        assert_eq!(r.expr.to_string(), "(y - 2)");
        let s = store(&[("y", 10)]);
        assert_eq!(r.expr.eval(Some(&s)).unwrap().int64(), Some(8));
    }

    #[test]
    fn test_resolve_nested() {
        // (x * 4) + 1 = y  =>  x = (y - 1) / 4
        let e = Expr::ident("x").mul(&int(4)).unwrap().add(&int(1)).unwrap();
        let r = e.resolve(&Expr::ident("y")).unwrap();
        assert_eq!(r.ident, "x");
        assert_eq!(r.expr.to_string(), "((y - 1) / 4)");
    }

    #[test]
    fn test_resolve_ident_on_right() {
        let e = int(10).sub(&Expr::ident("x")).unwrap();
        let r = e.resolve(&Expr::ident("y")).unwrap();
        assert_eq!(r.expr.to_string(), "(10 - y)");

        let e = int(2).add(&Expr::ident("x")).unwrap();
        let r = e.resolve(&Expr::ident("y")).unwrap();
        assert_eq!(r.expr.to_string(), "(y - 2)");
    }

    #[test]
    fn test_resolve_negative() {
        let e = Expr::ident("x").negative().unwrap();
        let r = e.resolve(&Expr::ident("y")).unwrap();
        assert_eq!(r.expr.to_string(), "-y");
    }

    #[test]
    fn test_resolve_literal_target_folds() {
        let e = Expr::ident("x").mul(&int(2)).unwrap();
        let r = e.resolve(&int(8)).unwrap();
        assert!(r.expr.can_eval());
        assert_eq!(r.expr.int64(), Some(4));
    }

    #[test]
    fn test_resolve_rejects_uninvertible() {
        let e = Expr::ident("x").logical_and(&int(1)).unwrap();
        assert!(matches!(
            e.resolve(&Expr::ident("y")),
            Err(ExprError::NotInvertible(_))
        ));
        let e = Expr::ident("x").rem(&int(3)).unwrap();
        assert!(e.resolve(&Expr::ident("y")).is_err());
    }

    #[test]
    fn test_resolve_requires_ident() {
        assert!(int(1).resolve(&Expr::ident("y")).is_err());
    }

    #[test]
    fn test_is_ident() {
        assert!(Expr::ident("a").is_ident());
        assert!(Expr::ident("a").ptr().unwrap().is_ident());
        assert!(!Expr::ident("a").add(&int(1)).unwrap().is_ident());
        assert!(!int(1).is_ident());
    }

    #[test]
    fn test_ident_and_resolve_to() {
        let e = Expr::ident("count").sub(&int(1)).unwrap();
        assert_eq!(e.ident_name().as_deref(), Some("count"));
        let r = e.resolve_to("len").unwrap();
        assert_eq!(r.ident, "count");
        assert_eq!(r.expr, Expr::ident("len"));
        assert!(int(1).resolve_to("len").is_none());
    }
}

#[cfg(test)]
mod coerce_tests {
    use super::*;

    #[test]
    fn test_coerce_bounds() {
        assert!(int(255).coerce(Kind::Uint8).is_ok());
        assert!(int(255).coerce(Kind::Int8).is_ok());
        assert_eq!(
            int(256).coerce(Kind::Uint8),
            Err(CoerceError::Overflow {
                bits: 8,
                value: "256".into()
            })
        );
        assert!(int(256).coerce(Kind::Int8).is_err());
        assert!(int(65536).coerce(Kind::Uint16).is_err());
        assert!(int(65536).coerce(Kind::Uint32).is_ok());
    }

    #[test]
    fn test_coerce_unsigned_wraps_negative() {
        let e = int(-1).coerce(Kind::Uint32).unwrap();
        assert_eq!(e.uint64(), Some(0xFFFF_FFFF));
    }

    #[test]
    fn test_coerce_float() {
        let e = int(3).coerce(Kind::Float64).unwrap();
        assert_eq!(e.literal(), &Value::Float(3.0));
    }

    #[test]
    fn test_coerce_passthrough_kinds() {
        assert_eq!(
            Expr::value("s").coerce(Kind::String).unwrap().as_str(),
            Some("s")
        );
        assert_eq!(Expr::value('c').coerce(Kind::Char).unwrap().as_char(), Some('c'));
        assert_eq!(int(2).coerce(Kind::Boolean).unwrap().literal(), &Value::Bool(true));
        assert!(Expr::value(Value::Null).coerce(Kind::Void).is_ok());
    }

    #[test]
    fn test_coerce_mismatch() {
        assert_eq!(
            Expr::value("s").coerce(Kind::Int32),
            Err(CoerceError::Mismatch(Kind::Int32))
        );
        assert_eq!(int(0).coerce(Kind::Void), Err(CoerceError::Mismatch(Kind::Void)));
        assert_eq!(
            int(1).coerce(Kind::Struct),
            Err(CoerceError::Unsupported(Kind::Struct))
        );
    }

    #[test]
    fn test_coerce_requires_literal() {
        assert_eq!(
            Expr::ident("n").coerce(Kind::Int32),
            Err(CoerceError::NotEvaluable)
        );
    }
}
