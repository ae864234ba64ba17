//! Display tokens for node kinds
//!
//! Operators are written with their symbol (`+`, `<=`, `.`) and joins and
//! applies with short abbreviations. Every other kind is written with its
//! enumerant name. The table is built at compile time and indexed by the
//! kind's discriminant.

use plankey_ir::ExprKind;

/// Token for every kind, indexed by `kind as usize`
pub static KIND_TOKENS: [&str; ExprKind::COUNT] = build_tokens();

const fn build_tokens() -> [&'static str; ExprKind::COUNT] {
    let mut names = [""; ExprKind::COUNT];
    let mut i = 0;
    while i < ExprKind::COUNT {
        names[i] = ExprKind::ALL[i].name();
        i += 1;
    }

    // Arithmetic
    names[ExprKind::Divide as usize] = "/";
    names[ExprKind::Modulo as usize] = "%";
    names[ExprKind::Multiply as usize] = "*";
    names[ExprKind::Plus as usize] = "+";
    names[ExprKind::Minus as usize] = "-";
    names[ExprKind::UnaryMinus as usize] = "-";

    // Comparison
    names[ExprKind::Equals as usize] = "=";
    names[ExprKind::LessThan as usize] = "<";
    names[ExprKind::LessThanOrEquals as usize] = "<=";
    names[ExprKind::GreaterThan as usize] = ">";
    names[ExprKind::GreaterThanOrEquals as usize] = ">=";
    names[ExprKind::NotEquals as usize] = "<>";

    names[ExprKind::Property as usize] = ".";

    // Relational operators
    names[ExprKind::InnerJoin as usize] = "IJ";
    names[ExprKind::FullOuterJoin as usize] = "FOJ";
    names[ExprKind::LeftOuterJoin as usize] = "LOJ";
    names[ExprKind::CrossApply as usize] = "CA";
    names[ExprKind::OuterApply as usize] = "OA";

    names
}

/// Token written for `kind`
pub fn token(kind: ExprKind) -> &'static str {
    KIND_TOKENS[kind.index()]
}

/// Whether `kind` is written with a symbol rather than its name
pub fn has_symbol(kind: ExprKind) -> bool {
    token(kind) != kind.name()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_symbols() {
        let expected = [
            (ExprKind::Divide, "/"),
            (ExprKind::Modulo, "%"),
            (ExprKind::Multiply, "*"),
            (ExprKind::Plus, "+"),
            (ExprKind::Minus, "-"),
            (ExprKind::UnaryMinus, "-"),
            (ExprKind::Equals, "="),
            (ExprKind::LessThan, "<"),
            (ExprKind::LessThanOrEquals, "<="),
            (ExprKind::GreaterThan, ">"),
            (ExprKind::GreaterThanOrEquals, ">="),
            (ExprKind::NotEquals, "<>"),
            (ExprKind::Property, "."),
            (ExprKind::InnerJoin, "IJ"),
            (ExprKind::FullOuterJoin, "FOJ"),
            (ExprKind::LeftOuterJoin, "LOJ"),
            (ExprKind::CrossApply, "CA"),
            (ExprKind::OuterApply, "OA"),
        ];
        for (kind, symbol) in expected {
            assert_eq!(token(kind), symbol, "{}", kind);
        }
        let symbolic = ExprKind::ALL.iter().filter(|k| has_symbol(**k)).count();
        assert_eq!(symbolic, expected.len());
    }

    #[test]
    fn test_other_kinds_use_their_name() {
        assert_eq!(token(ExprKind::Filter), "Filter");
        assert_eq!(token(ExprKind::CrossJoin), "CrossJoin");
        assert_eq!(token(ExprKind::RelationshipNavigation), "RelationshipNavigation");
        assert_eq!(token(ExprKind::In), "In");
    }

    #[test]
    fn test_table_covers_every_kind() {
        assert_eq!(KIND_TOKENS.len(), ExprKind::COUNT);
        for (i, kind) in ExprKind::ALL.iter().enumerate() {
            assert_eq!(kind.index(), i);
            assert!(!KIND_TOKENS[i].is_empty(), "no token for {}", kind);
        }
    }
}
