//! Recursive-descent parser over the token stream.
//!
//! Tokens are first grouped into an S-expression tree, then interpreted
//! against the [`TermManager`]'s declaration environment. All user-input
//! errors (unknown statements, shadowing, arity, sort mismatches) surface
//! here, fatally.

use super::lexer::{Lexer, Token, TokenKind};
use crate::ast::{TermId, TermManager};
use crate::clause::Clause;
use crate::error::{CoreError, Result};

/// A parsed S-expression with its source position.
#[derive(Debug, Clone)]
enum SExpr {
    Atom { text: String, line: u32, col: u32 },
    List { items: Vec<SExpr>, line: u32, col: u32 },
}

impl SExpr {
    fn pos(&self) -> (u32, u32) {
        match self {
            SExpr::Atom { line, col, .. } | SExpr::List { line, col, .. } => (*line, *col),
        }
    }
}

struct Reader<'a> {
    lexer: Lexer<'a>,
}

impl<'a> Reader<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            lexer: Lexer::new(input),
        }
    }

    /// Read one S-expression; `None` at end of input.
    fn read(&mut self) -> Result<Option<SExpr>> {
        let tok = self.lexer.next_token()?;
        match tok.kind {
            TokenKind::Eof => Ok(None),
            _ => self.read_from(tok).map(Some),
        }
    }

    fn read_from(&mut self, tok: Token) -> Result<SExpr> {
        match tok.kind {
            TokenKind::Symbol(text) => Ok(SExpr::Atom {
                text,
                line: tok.line,
                col: tok.col,
            }),
            TokenKind::LParen => {
                let mut items = Vec::new();
                loop {
                    let next = self.lexer.next_token()?;
                    match next.kind {
                        TokenKind::RParen => {
                            return Ok(SExpr::List {
                                items,
                                line: tok.line,
                                col: tok.col,
                            });
                        }
                        TokenKind::Eof => {
                            return Err(CoreError::parse(
                                tok.line,
                                tok.col,
                                "unclosed parenthesis",
                            ));
                        }
                        _ => items.push(self.read_from(next)?),
                    }
                }
            }
            TokenKind::RParen => Err(CoreError::parse(tok.line, tok.col, "unexpected `)`")),
            TokenKind::Eof => Err(CoreError::parse(tok.line, tok.col, "unexpected end of input")),
        }
    }
}

/// Parse a whole problem: declarations plus asserted clauses.
pub fn parse_script(input: &str, tm: &mut TermManager) -> Result<Vec<Clause>> {
    let mut reader = Reader::new(input);
    let mut clauses = Vec::new();
    while let Some(sx) = reader.read()? {
        statement(&sx, tm, &mut clauses)?;
    }
    Ok(clauses)
}

/// Parse a single clause against an existing environment.
pub fn parse_clause_str(input: &str, tm: &mut TermManager) -> Result<Clause> {
    let mut reader = Reader::new(input);
    let sx = reader
        .read()?
        .ok_or_else(|| CoreError::parse(1, 1, "expected a clause"))?;
    clause(&sx, tm)
}

/// Parse a single term against an existing environment.
pub fn parse_term_str(input: &str, tm: &mut TermManager) -> Result<TermId> {
    let mut reader = Reader::new(input);
    let sx = reader
        .read()?
        .ok_or_else(|| CoreError::parse(1, 1, "expected a term"))?;
    term(&sx, tm)
}

fn statement(sx: &SExpr, tm: &mut TermManager, clauses: &mut Vec<Clause>) -> Result<()> {
    let (line, col) = sx.pos();
    let SExpr::List { items, .. } = sx else {
        return Err(CoreError::parse(line, col, "expected a statement list"));
    };
    let Some(SExpr::Atom { text: head, .. }) = items.first() else {
        return Err(CoreError::parse(line, col, "expected a statement keyword"));
    };
    match (head.as_str(), &items[1..]) {
        ("ty", [SExpr::Atom { text: name, .. }]) => {
            tm.declare_sort(name)?;
            Ok(())
        }
        ("fun", [SExpr::Atom { text: name, .. }, sort_sx]) => {
            let s = sort(sort_sx, tm)?;
            tm.declare_fun(name, s)?;
            Ok(())
        }
        ("assert", [clause_sx]) => {
            clauses.push(clause(clause_sx, tm)?);
            Ok(())
        }
        ("ty", _) => Err(CoreError::parse(line, col, "malformed `(ty NAME)`")),
        ("fun", _) => Err(CoreError::parse(line, col, "malformed `(fun NAME TYPE)`")),
        ("assert", _) => Err(CoreError::parse(line, col, "malformed `(assert CLAUSE)`")),
        (other, _) => Err(CoreError::parse(
            line,
            col,
            format!("unknown statement `{other}`"),
        )),
    }
}

fn sort(sx: &SExpr, tm: &mut TermManager) -> Result<crate::sort::SortId> {
    match sx {
        SExpr::Atom { text, .. } => match text.as_str() {
            "bool" => Ok(tm.sorts.bool_sort),
            "rat" => Ok(tm.sorts.rat_sort),
            name => tm
                .sort_named(name)
                .ok_or_else(|| CoreError::UndefinedSymbol(name.to_string())),
        },
        SExpr::List { items, line, col } => {
            let is_arrow = matches!(items.first(), Some(SExpr::Atom { text, .. }) if text == "->");
            if !is_arrow || items.len() < 3 {
                return Err(CoreError::parse(
                    *line,
                    *col,
                    "expected `(-> T₁ … Tₙ TRET)`",
                ));
            }
            let mut sorts = Vec::with_capacity(items.len() - 1);
            for item in &items[1..] {
                sorts.push(sort(item, tm)?);
            }
            let ret = sorts.pop().expect("at least two sorts");
            Ok(tm.sorts.mk_arrow_chain(&sorts, ret))
        }
    }
}

fn clause(sx: &SExpr, tm: &mut TermManager) -> Result<Clause> {
    let lits = match sx {
        SExpr::List { items, .. }
            if matches!(items.first(), Some(SExpr::Atom { text, .. }) if text == "or") =>
        {
            let mut lits = Vec::with_capacity(items.len() - 1);
            for item in &items[1..] {
                lits.push(term(item, tm)?);
            }
            lits
        }
        _ => vec![term(sx, tm)?],
    };
    for &lit in &lits {
        if !tm.is_bool_term(lit) {
            return Err(CoreError::SortMismatch {
                expected: "bool".to_string(),
                actual: tm.display_sort(tm.sort_of(lit)),
            });
        }
    }
    Ok(Clause::new(lits))
}

fn term(sx: &SExpr, tm: &mut TermManager) -> Result<TermId> {
    match sx {
        SExpr::Atom { text, .. } => match text.as_str() {
            "true" => Ok(tm.mk_true()),
            "false" => Ok(tm.mk_false()),
            name => tm.mk_const(name),
        },
        SExpr::List { items, line, col } => {
            let Some(SExpr::Atom { text: head, .. }) = items.first() else {
                return Err(CoreError::parse(*line, *col, "expected an operator"));
            };
            match (head.as_str(), &items[1..]) {
                ("=", [a, b]) => {
                    let a = term(a, tm)?;
                    let b = term(b, tm)?;
                    tm.mk_eq(a, b)
                }
                ("not", [t]) => {
                    let t = term(t, tm)?;
                    tm.mk_not(t)
                }
                ("ite", [c, t, e]) => {
                    let c = term(c, tm)?;
                    let t = term(t, tm)?;
                    let e = term(e, tm)?;
                    tm.mk_ite(c, t, e)
                }
                ("=" | "not" | "ite", _) => Err(CoreError::parse(
                    *line,
                    *col,
                    format!("wrong number of arguments for `{head}`"),
                )),
                ("or", _) => Err(CoreError::parse(
                    *line,
                    *col,
                    "`or` is only allowed at the top of an assert",
                )),
                (name, rest) => {
                    let mut args = Vec::with_capacity(rest.len());
                    for item in rest {
                        args.push(term(item, tm)?);
                    }
                    tm.mk_app(name, &args)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_declarations_and_asserts() {
        let mut tm = TermManager::new();
        let clauses = parse_script(
            "(ty U) (fun a U) (fun b U) (fun f (-> U U bool))\n\
             (assert (f a b)) (assert (or (= a b) (not (= a b))))",
            &mut tm,
        )
        .unwrap();
        assert_eq!(clauses.len(), 2);
        assert_eq!(clauses[0].len(), 1);
        assert_eq!(clauses[1].len(), 2);
    }

    #[test]
    fn test_shadowing_is_fatal() {
        let mut tm = TermManager::new();
        let err = parse_script("(ty U) (fun U bool)", &mut tm).unwrap_err();
        assert!(matches!(err, CoreError::DuplicateSymbol(_)));
    }

    #[test]
    fn test_arity_error() {
        let mut tm = TermManager::new();
        let err = parse_script("(ty U) (fun f (-> U U)) (fun a U) (assert (= (f) a))", &mut tm)
            .unwrap_err();
        assert!(matches!(err, CoreError::ArityMismatch { .. }));
    }

    #[test]
    fn test_non_bool_assert_rejected() {
        let mut tm = TermManager::new();
        let err = parse_script("(ty U) (fun a U) (assert a)", &mut tm).unwrap_err();
        assert!(matches!(err, CoreError::SortMismatch { .. }));
    }

    #[test]
    fn test_undefined_symbol() {
        let mut tm = TermManager::new();
        let err = parse_script("(assert p)", &mut tm).unwrap_err();
        assert!(matches!(err, CoreError::UndefinedSymbol(_)));
    }

    #[test]
    fn test_unclosed_paren() {
        let mut tm = TermManager::new();
        let err = parse_script("(ty U", &mut tm).unwrap_err();
        assert!(matches!(err, CoreError::Parse { .. }));
    }

    #[test]
    fn test_ite_term() {
        let mut tm = TermManager::new();
        let clauses = parse_script(
            "(ty U) (fun p bool) (fun a U) (fun b U) (assert (= (ite p a b) a))",
            &mut tm,
        )
        .unwrap();
        assert_eq!(clauses.len(), 1);
    }

    #[test]
    fn test_rat_sort_accepted() {
        let mut tm = TermManager::new();
        parse_script("(fun x rat) (fun y rat) (assert (= x y))", &mut tm).unwrap();
    }
}
