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

//! Query tokenizer.
//!
//! Tokenization depends on context. Keys stop at any of `():@,` so that
//! `key:value` and `key@order` split naturally, while values extend up to
//! whitespace or a parenthesis, so that `commit:v1.2:rc` and
//! `.name:Encode-8` are single values. Regular expressions (`/.../`) are only
//! recognized in value position, leaving `/size` free to name a sub-benchmark
//! key.

use crate::error::{QueryError, QueryResult};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Tok {
    LParen,
    RParen,
    Colon,
    At,
    Comma,
    Minus,
    Star,
    And,
    Or,
    Word(String),
    Quoted(String),
    Regexp(String),
    Eof,
}

impl fmt::Display for Tok {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tok::LParen => f.write_str("'('"),
            Tok::RParen => f.write_str("')'"),
            Tok::Colon => f.write_str("':'"),
            Tok::At => f.write_str("'@'"),
            Tok::Comma => f.write_str("','"),
            Tok::Minus => f.write_str("'-'"),
            Tok::Star => f.write_str("'*'"),
            Tok::And => f.write_str("AND"),
            Tok::Or => f.write_str("OR"),
            Tok::Word(w) => write!(f, "{:?}", w),
            Tok::Quoted(q) => write!(f, "{:?}", q),
            Tok::Regexp(r) => write!(f, "/{}/", r),
            Tok::Eof => f.write_str("end of query"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Token {
    pub(crate) tok: Tok,
    pub(crate) offset: usize,
}

/// Which syntactic position the next token is read in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Mode {
    Key,
    Value,
    /// Inside a fixed order list: values separated by whitespace or commas.
    List,
}

#[derive(Debug, Clone)]
pub(crate) struct Lexer<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    pub(crate) fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    /// Look at the next token without consuming it.
    pub(crate) fn peek(&self, mode: Mode) -> QueryResult<Token> {
        self.clone().next(mode)
    }

    /// Consume and return the next token.
    pub(crate) fn next(&mut self, mode: Mode) -> QueryResult<Token> {
        self.skip_whitespace();
        let offset = self.pos;
        let Some(ch) = self.src[self.pos..].chars().next() else {
            return Ok(Token {
                tok: Tok::Eof,
                offset,
            });
        };

        let single = match (ch, mode) {
            ('(', _) => Some(Tok::LParen),
            (')', _) => Some(Tok::RParen),
            (':', Mode::Key) => Some(Tok::Colon),
            ('@', Mode::Key) => Some(Tok::At),
            (',', Mode::Key | Mode::List) => Some(Tok::Comma),
            ('-', Mode::Key) => Some(Tok::Minus),
            ('*', Mode::Key) => Some(Tok::Star),
            _ => None,
        };
        if let Some(tok) = single {
            self.pos += 1;
            return Ok(Token { tok, offset });
        }

        let tok = match (ch, mode) {
            ('"', _) => Tok::Quoted(self.quoted()?),
            ('/', Mode::Value) => Tok::Regexp(self.regexp()?),
            _ => {
                let word = self.word(mode);
                match word {
                    "AND" if mode == Mode::Key => Tok::And,
                    "OR" if mode != Mode::List => Tok::Or,
                    _ => Tok::Word(word.to_string()),
                }
            }
        };
        Ok(Token { tok, offset })
    }

    fn skip_whitespace(&mut self) {
        let rest = &self.src[self.pos..];
        self.pos += rest.len() - rest.trim_start().len();
    }

    fn word(&mut self, mode: Mode) -> &'a str {
        let src: &'a str = self.src;
        let rest = &src[self.pos..];
        let end = rest
            .char_indices()
            .find(|&(_, c)| c.is_whitespace() || is_delimiter(c, mode))
            .map_or(rest.len(), |(i, _)| i);
        self.pos += end;
        &rest[..end]
    }

    /// Read a `"..."` string, resolving backslash escapes.
    fn quoted(&mut self) -> QueryResult<String> {
        let start = self.pos;
        let mut out = String::new();
        let mut chars = self.src[start + 1..].char_indices();
        while let Some((i, c)) = chars.next() {
            match c {
                '"' => {
                    self.pos = start + 1 + i + 1;
                    return Ok(out);
                }
                '\\' => match chars.next() {
                    Some((_, 'n')) => out.push('\n'),
                    Some((_, 't')) => out.push('\t'),
                    Some((_, other)) => out.push(other),
                    None => break,
                },
                _ => out.push(c),
            }
        }
        Err(QueryError::syntax(start, "unterminated quoted string"))
    }

    /// Read a `/.../` regular expression. `\/` stands for a literal slash;
    /// other escapes are kept for the regex engine.
    fn regexp(&mut self) -> QueryResult<String> {
        let start = self.pos;
        let mut out = String::new();
        let mut chars = self.src[start + 1..].char_indices();
        while let Some((i, c)) = chars.next() {
            match c {
                '/' => {
                    self.pos = start + 1 + i + 1;
                    return Ok(out);
                }
                '\\' => match chars.next() {
                    Some((_, '/')) => out.push('/'),
                    Some((_, other)) => {
                        out.push('\\');
                        out.push(other);
                    }
                    None => break,
                },
                _ => out.push(c),
            }
        }
        Err(QueryError::syntax(start, "unterminated regexp"))
    }
}

fn is_delimiter(c: char, mode: Mode) -> bool {
    match mode {
        Mode::Key => matches!(c, '(' | ')' | ':' | '@' | ',' | '"'),
        Mode::Value => matches!(c, '(' | ')' | '"'),
        Mode::List => matches!(c, '(' | ')' | ',' | '"'),
    }
}

/// Whether `s` can be written in a query without quoting.
pub(crate) fn is_plain_word(s: &str) -> bool {
    !s.is_empty()
        && s != "AND"
        && s != "OR"
        && !s.starts_with(['-', '*', '/'])
        && !s
            .chars()
            .any(|c| c.is_whitespace() || is_delimiter(c, Mode::Key) || c == '\\')
}
