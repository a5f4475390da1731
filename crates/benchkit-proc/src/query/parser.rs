// Dweve Benchkit - Benchmark Result Processing
//
// Copyright (c) 2025 Dweve IP B.V. and individual contributors.
//
// SPDX-License-Identifier: Apache-2.0
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE file at the
// root of this repository or at: http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Recursive descent parsers for filter and projection queries.

use super::tokens::{Lexer, Mode, Tok, Token};
use super::{Expr, FieldSpec, OrderSpec, Pattern};
use crate::error::{QueryError, QueryResult};

/// Parse a filter query.
///
/// An empty (or all-whitespace) query matches everything.
pub fn parse_filter(query: &str) -> QueryResult<Expr> {
    let mut parser = Parser {
        lexer: Lexer::new(query),
    };
    if parser.lexer.peek(Mode::Key)?.tok == Tok::Eof {
        return Ok(Expr::All);
    }
    let expr = parser.expr()?;
    let next = parser.lexer.next(Mode::Key)?;
    match next.tok {
        Tok::Eof => Ok(expr),
        Tok::RParen => Err(QueryError::syntax(next.offset, "unbalanced ')'")),
        tok => Err(QueryError::syntax(next.offset, format!("unexpected {}", tok))),
    }
}

/// Parse a projection query into its fields.
pub fn parse_projection(query: &str) -> QueryResult<Vec<FieldSpec>> {
    let mut parser = Parser {
        lexer: Lexer::new(query),
    };
    let mut fields = Vec::new();
    loop {
        let t = parser.lexer.next(Mode::Key)?;
        match t.tok {
            Tok::Eof => return Ok(fields),
            Tok::Comma => continue,
            Tok::Word(key) | Tok::Quoted(key) => {
                let order = parser.order()?;
                fields.push(FieldSpec {
                    key,
                    offset: t.offset,
                    order,
                });
            }
            tok => {
                return Err(QueryError::syntax(
                    t.offset,
                    format!("expected key, got {}", tok),
                ))
            }
        }
    }
}

struct Parser<'a> {
    lexer: Lexer<'a>,
}

impl Parser<'_> {
    fn expect(&mut self, want: Tok, mode: Mode) -> QueryResult<Token> {
        let t = self.lexer.next(mode)?;
        if t.tok == want {
            Ok(t)
        } else {
            Err(QueryError::syntax(
                t.offset,
                format!("expected {}, got {}", want, t.tok),
            ))
        }
    }

    // ==================== Filters ====================

    fn expr(&mut self) -> QueryResult<Expr> {
        let mut terms = vec![self.and()?];
        while self.lexer.peek(Mode::Key)?.tok == Tok::Or {
            self.lexer.next(Mode::Key)?;
            terms.push(self.and()?);
        }
        Ok(collapse(terms, Expr::Or))
    }

    fn and(&mut self) -> QueryResult<Expr> {
        let mut terms = vec![self.term()?];
        loop {
            match self.lexer.peek(Mode::Key)?.tok {
                Tok::And => {
                    self.lexer.next(Mode::Key)?;
                    terms.push(self.term()?);
                }
                Tok::Minus | Tok::LParen | Tok::Star | Tok::Word(_) | Tok::Quoted(_) => {
                    terms.push(self.term()?);
                }
                _ => break,
            }
        }
        Ok(collapse(terms, Expr::And))
    }

    fn term(&mut self) -> QueryResult<Expr> {
        let t = self.lexer.next(Mode::Key)?;
        match t.tok {
            Tok::Minus => Ok(Expr::Not(Box::new(self.term()?))),
            Tok::LParen => {
                let expr = self.expr()?;
                self.expect(Tok::RParen, Mode::Key)?;
                Ok(expr)
            }
            Tok::Star => Ok(Expr::All),
            Tok::Word(key) | Tok::Quoted(key) => {
                self.expect(Tok::Colon, Mode::Key)?;
                let patterns = self.patterns()?;
                Ok(Expr::Match {
                    key,
                    offset: t.offset,
                    patterns,
                })
            }
            Tok::Eof => Err(QueryError::syntax(t.offset, "missing expression")),
            tok => Err(QueryError::syntax(
                t.offset,
                format!("unexpected {}", tok),
            )),
        }
    }

    fn patterns(&mut self) -> QueryResult<Vec<Pattern>> {
        let t = self.lexer.next(Mode::Value)?;
        if t.tok != Tok::LParen {
            return Ok(vec![pattern(t)?]);
        }

        let mut patterns = Vec::new();
        loop {
            patterns.push(pattern(self.lexer.next(Mode::Value)?)?);
            let sep = self.lexer.next(Mode::Value)?;
            match sep.tok {
                Tok::Or => continue,
                Tok::RParen => return Ok(patterns),
                tok => {
                    return Err(QueryError::syntax(
                        sep.offset,
                        format!("expected OR or ')', got {}", tok),
                    ))
                }
            }
        }
    }

    // ==================== Projections ====================

    fn order(&mut self) -> QueryResult<Option<OrderSpec>> {
        if self.lexer.peek(Mode::Key)?.tok != Tok::At {
            return Ok(None);
        }
        self.lexer.next(Mode::Key)?;

        let t = self.lexer.next(Mode::Key)?;
        match t.tok {
            Tok::Word(name) => Ok(Some(OrderSpec::Named {
                name,
                offset: t.offset,
            })),
            Tok::LParen => {
                let mut values = Vec::new();
                loop {
                    let v = self.lexer.next(Mode::List)?;
                    match v.tok {
                        Tok::Word(s) | Tok::Quoted(s) => values.push(s),
                        Tok::Comma => {}
                        Tok::RParen if !values.is_empty() => break,
                        Tok::RParen => {
                            return Err(QueryError::syntax(v.offset, "empty fixed order"))
                        }
                        tok => {
                            return Err(QueryError::syntax(
                                v.offset,
                                format!("expected value or ')', got {}", tok),
                            ))
                        }
                    }
                }
                Ok(Some(OrderSpec::Fixed {
                    values,
                    offset: t.offset,
                }))
            }
            tok => Err(QueryError::syntax(
                t.offset,
                format!("expected order, got {}", tok),
            )),
        }
    }
}

fn pattern(t: Token) -> QueryResult<Pattern> {
    match t.tok {
        Tok::Word(s) | Tok::Quoted(s) => Ok(Pattern::Exact(s)),
        Tok::Regexp(source) => Ok(Pattern::Regexp {
            source,
            offset: t.offset,
        }),
        tok => Err(QueryError::syntax(
            t.offset,
            format!("expected value, got {}", tok),
        )),
    }
}

fn collapse(mut terms: Vec<Expr>, op: fn(Vec<Expr>) -> Expr) -> Expr {
    if terms.len() == 1 {
        if let Some(only) = terms.pop() {
            return only;
        }
    }
    op(terms)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn m(key: &str, offset: usize, values: &[&str]) -> Expr {
        Expr::Match {
            key: key.to_string(),
            offset,
            patterns: values.iter().map(|v| Pattern::Exact(v.to_string())).collect(),
        }
    }

    // ==================== Filter tests ====================

    #[test]
    fn test_single_match() {
        assert_eq!(parse_filter("goos:linux").unwrap(), m("goos", 0, &["linux"]));
    }

    #[test]
    fn test_implicit_and() {
        assert_eq!(
            parse_filter("a:1 b:2 AND c:3").unwrap(),
            Expr::And(vec![m("a", 0, &["1"]), m("b", 4, &["2"]), m("c", 12, &["3"])])
        );
    }

    #[test]
    fn test_or_binds_looser_than_and() {
        let expr = parse_filter("a:1 b:2 OR c:3").unwrap();
        assert_eq!(
            expr,
            Expr::Or(vec![
                Expr::And(vec![m("a", 0, &["1"]), m("b", 4, &["2"])]),
                m("c", 11, &["3"]),
            ])
        );
    }

    #[test]
    fn test_negation_and_grouping() {
        let expr = parse_filter("--(a:1 OR b:2)").unwrap();
        assert_eq!(
            expr,
            Expr::Not(Box::new(Expr::Not(Box::new(Expr::Or(vec![
                m("a", 3, &["1"]),
                m("b", 10, &["2"]),
            ])))))
        );
    }

    #[test]
    fn test_value_alternatives() {
        let expr = parse_filter(".unit:(u0 OR u99 OR /^x/)").unwrap();
        let Expr::Match { key, patterns, .. } = expr else {
            panic!("expected match");
        };
        assert_eq!(key, ".unit");
        assert_eq!(
            patterns,
            vec![
                Pattern::Exact("u0".to_string()),
                Pattern::Exact("u99".to_string()),
                Pattern::Regexp {
                    source: "^x".to_string(),
                    offset: 20
                },
            ]
        );
    }

    #[test]
    fn test_star_and_empty() {
        assert_eq!(parse_filter("*").unwrap(), Expr::All);
        assert_eq!(parse_filter("   ").unwrap(), Expr::All);
        assert_eq!(parse_filter("-*").unwrap(), Expr::Not(Box::new(Expr::All)));
    }

    #[test]
    fn test_filter_syntax_errors() {
        let cases = [
            ("goos", 4),           // missing ':'
            ("goos:", 5),          // missing value
            ("(a:b", 4),           // missing ')'
            ("a:b)", 3),           // unbalanced ')'
            ("a:(x y)", 5),        // missing OR
            ("a:b OR", 6),         // dangling OR
            ("AND a:b", 0),        // leading AND
            ("a:\"open", 2),       // unterminated quote
            ("a:()", 3),           // empty alternatives
        ];
        for (query, offset) in cases {
            let err = parse_filter(query).unwrap_err();
            assert!(matches!(err, QueryError::Syntax { .. }), "query {:?}", query);
            assert_eq!(err.offset(), offset, "query {:?}: {}", query, err);
        }
    }

    // ==================== Projection tests ====================

    #[test]
    fn test_projection_fields() {
        let fields = parse_projection(".name, /size@num goos,.config").unwrap();
        let keys: Vec<&str> = fields.iter().map(|f| f.key.as_str()).collect();
        assert_eq!(keys, vec![".name", "/size", "goos", ".config"]);
        assert_eq!(
            fields[1].order,
            Some(OrderSpec::Named {
                name: "num".to_string(),
                offset: 13
            })
        );
        assert_eq!(fields[2].offset, 17);
    }

    #[test]
    fn test_projection_fixed_order() {
        let fields = parse_projection("goarch@(amd64 arm64, \"386\")").unwrap();
        assert_eq!(
            fields[0].order,
            Some(OrderSpec::Fixed {
                values: vec!["amd64".to_string(), "arm64".to_string(), "386".to_string()],
                offset: 7
            })
        );
    }

    #[test]
    fn test_projection_fixed_order_takes_plain_values() {
        let fields = parse_projection("/delta@(-1 0 1) commit@(v1.2:rc,v1.3 *)").unwrap();
        assert_eq!(
            fields[0].order,
            Some(OrderSpec::Fixed {
                values: vec!["-1".to_string(), "0".to_string(), "1".to_string()],
                offset: 7
            })
        );
        assert_eq!(
            fields[1].order,
            Some(OrderSpec::Fixed {
                values: vec!["v1.2:rc".to_string(), "v1.3".to_string(), "*".to_string()],
                offset: 23
            })
        );
    }

    #[test]
    fn test_projection_empty() {
        assert!(parse_projection("").unwrap().is_empty());
        assert!(parse_projection(" , ").unwrap().is_empty());
    }

    #[test]
    fn test_projection_syntax_errors() {
        for (query, offset) in [("a@", 2), ("a@()", 3), ("(a)", 0), ("a:b", 1), ("a@(x", 4)] {
            let err = parse_projection(query).unwrap_err();
            assert_eq!(err.offset(), offset, "query {:?}: {}", query, err);
        }
    }
}
