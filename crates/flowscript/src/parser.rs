// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Recursive-descent expression parser.
//!
//! Grammar, lowest priority first:
//!
//! ```text
//! exp     := factor0 (';' exp)?
//! factor0 := factor1 ('=' factor1)?
//! factor1 := factor2 (('+'|'-') factor1)?
//! factor2 := factor3 (('*'|'/') factor2)?
//! factor3 := '(' exp ')' | array_or_index | call | string | number | variable
//! ```
//!
//! `+`/`-` and `*`/`/` are right-recursive; integer math does not care,
//! but string concatenation keeps its right bias on purpose. Every
//! production either matches, reports [`ParseError::Unmatched`] so the
//! caller can try an alternative, or fails with a committed syntax error
//! (a consumed `(` demands `)`, a consumed `[` demands `]`).

use crate::ast::{ArithOp, Expr};
use crate::error::ParseError;
use crate::scanner::LookAheadScanner;
use crate::value::Value;

type ParseFn = fn(&mut LookAheadScanner) -> Result<Expr, ParseError>;
type MakeBinary = fn(Expr, Expr) -> Expr;

/// Parse `text` into an expression tree.
///
/// Tokens left over after the first complete expression are ignored.
pub fn parse_script(text: &str) -> Result<Expr, ParseError> {
    let mut scanner = LookAheadScanner::new(text);
    scanner.scan();
    parse_exp(&mut scanner)
}

fn is_variable_token(token: &str) -> bool {
    let mut chars = token.chars();
    match chars.next() {
        Some(ch) if ch.is_ascii_alphabetic() || ch == '_' => {}
        _ => return false,
    }
    chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
}

fn is_number_token(token: &str) -> bool {
    !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit())
}

/// Shared binary-operator production.
///
/// Parses `left`; if the current token is one of `ops` and another token
/// follows, consumes it and parses `right`. A failed right-hand side is a
/// committed syntax error, not a fallback.
fn parse_binary(
    scanner: &mut LookAheadScanner,
    left: ParseFn,
    right: ParseFn,
    ops: &[(&str, MakeBinary)],
) -> Result<Expr, ParseError> {
    let lhs = left(scanner)?;

    let op_text = scanner.text();
    if let Some((op, make)) = ops.iter().find(|(name, _)| *name == op_text) {
        if !scanner.look_ahead(1).is_empty() {
            scanner.scan();
            return match right(scanner) {
                Ok(rhs) => Ok(make(lhs, rhs)),
                Err(_) => Err(ParseError::Syntax(format!(
                    "parse error: {} {} {}",
                    lhs,
                    op,
                    scanner.text()
                ))),
            };
        }
    }
    Ok(lhs)
}

pub fn parse_exp(scanner: &mut LookAheadScanner) -> Result<Expr, ParseError> {
    parse_binary(
        scanner,
        parse_factor0,
        parse_exp,
        &[(";", |first, second| Expr::Seq {
            first: Box::new(first),
            second: Box::new(second),
        })],
    )
}

fn parse_factor0(scanner: &mut LookAheadScanner) -> Result<Expr, ParseError> {
    parse_binary(
        scanner,
        parse_factor1,
        parse_factor1,
        &[("=", |target, value| Expr::Assign {
            target: Box::new(target),
            value: Box::new(value),
        })],
    )
}

fn parse_factor1(scanner: &mut LookAheadScanner) -> Result<Expr, ParseError> {
    parse_binary(
        scanner,
        parse_factor2,
        parse_factor1,
        &[
            ("+", |lhs, rhs| Expr::Plus {
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            }),
            ("-", |lhs, rhs| Expr::Arith {
                op: ArithOp::Sub,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            }),
        ],
    )
}

fn parse_factor2(scanner: &mut LookAheadScanner) -> Result<Expr, ParseError> {
    parse_binary(
        scanner,
        parse_factor3,
        parse_factor2,
        &[
            ("*", |lhs, rhs| Expr::Arith {
                op: ArithOp::Mul,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            }),
            ("/", |lhs, rhs| Expr::Arith {
                op: ArithOp::Div,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            }),
        ],
    )
}

fn parse_factor3(scanner: &mut LookAheadScanner) -> Result<Expr, ParseError> {
    if scanner.text() == "(" {
        scanner.scan();
        let inner = parse_exp(scanner)?;
        if scanner.text() != ")" {
            return Err(ParseError::Syntax(format!(
                "\")\" is not found: ( {} {}",
                inner,
                scanner.text()
            )));
        }
        scanner.scan();
        return Ok(inner);
    }

    for production in [
        parse_array_access_or_array as ParseFn,
        parse_function_call,
        parse_string,
        parse_number,
        parse_variable,
    ] {
        match production(scanner) {
            Err(ParseError::Unmatched) => continue,
            other => return other,
        }
    }
    Err(ParseError::Unmatched)
}

fn parse_number(scanner: &mut LookAheadScanner) -> Result<Expr, ParseError> {
    let token = scanner.text();
    if !is_number_token(token) {
        return Err(ParseError::Unmatched);
    }
    // source numbers are 32-bit; the value type widens to i64
    let n = token
        .parse::<i32>()
        .map_err(|_| ParseError::Syntax(format!("number out of range: {}", token)))?;
    scanner.scan();
    Ok(Expr::Literal(Value::Int(i64::from(n))))
}

fn parse_string(scanner: &mut LookAheadScanner) -> Result<Expr, ParseError> {
    let token = scanner.text();
    if token.len() < 2 || !token.starts_with('"') || !token.ends_with('"') {
        return Err(ParseError::Unmatched);
    }
    let unquoted = unquote(token)?;
    scanner.scan();
    Ok(Expr::Literal(Value::Str(unquoted)))
}

fn parse_variable(scanner: &mut LookAheadScanner) -> Result<Expr, ParseError> {
    let token = scanner.text();
    if !is_variable_token(token) {
        return Err(ParseError::Unmatched);
    }
    let name = token.to_string();
    scanner.scan();
    Ok(Expr::Variable(name))
}

fn parse_array(scanner: &mut LookAheadScanner) -> Result<Expr, ParseError> {
    if scanner.text() != "[" {
        return Err(ParseError::Unmatched);
    }
    scanner.scan();

    let mut items = Vec::new();
    loop {
        if scanner.text() == "]" {
            break;
        }
        let item = match parse_exp(scanner) {
            Err(ParseError::Unmatched) => {
                return Err(ParseError::Syntax(format!(
                    "no expression is found: {}",
                    scanner.text()
                )));
            }
            other => other?,
        };
        items.push(item);
        if scanner.text() != "," {
            break;
        }
        scanner.scan();
    }

    if scanner.text() != "]" {
        return Err(ParseError::Syntax(format!(
            "\"]\" is not found: {}",
            scanner.text()
        )));
    }
    scanner.scan();
    Ok(Expr::Array(items))
}

fn parse_array_access_or_array(scanner: &mut LookAheadScanner) -> Result<Expr, ParseError> {
    let mut current = if scanner.text() == "[" {
        parse_array(scanner)?
    } else if is_variable_token(scanner.text()) && scanner.look_ahead(1) == "[" {
        parse_variable(scanner)?
    } else {
        return Err(ParseError::Unmatched);
    };

    while scanner.text() == "[" {
        scanner.scan();
        let index = match parse_exp(scanner) {
            Err(ParseError::Unmatched) => {
                return Err(ParseError::Syntax(format!(
                    "no expression is found in a bracket: {}[{}",
                    current,
                    scanner.text()
                )));
            }
            other => other?,
        };
        if scanner.text() != "]" {
            return Err(ParseError::Syntax(format!(
                "\"]\" is not found: {}[{}{}",
                current,
                index,
                scanner.text()
            )));
        }
        scanner.scan();
        current = Expr::Index {
            target: Box::new(current),
            index: Box::new(index),
        };
    }

    Ok(current)
}

fn parse_function_call(scanner: &mut LookAheadScanner) -> Result<Expr, ParseError> {
    if !is_variable_token(scanner.text()) || scanner.look_ahead(1) != "(" {
        return Err(ParseError::Unmatched);
    }

    let callee = parse_variable(scanner)?;
    scanner.scan(); // skip "("

    let mut args = Vec::new();
    loop {
        if scanner.text() == ")" {
            break;
        }
        let arg = match parse_exp(scanner) {
            Err(ParseError::Unmatched) => {
                return Err(ParseError::Syntax(format!(
                    "no expression is found: {}",
                    scanner.text()
                )));
            }
            other => other?,
        };
        args.push(arg);
        if scanner.text() != "," {
            break;
        }
        scanner.scan();
    }

    if scanner.text() != ")" {
        return Err(ParseError::Syntax(format!(
            "\")\" is not found: {}({}",
            callee,
            scanner.text()
        )));
    }
    scanner.scan();

    Ok(Expr::Call {
        callee: Box::new(callee),
        args,
    })
}

/// Decode a quoted string token (quotes included) into its value.
fn unquote(token: &str) -> Result<String, ParseError> {
    let inner = &token[1..token.len() - 1];
    let mut result = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            result.push(ch);
            continue;
        }
        match chars.next() {
            Some('\\') => result.push('\\'),
            Some('"') => result.push('"'),
            Some('\'') => result.push('\''),
            Some('n') => result.push('\n'),
            Some('t') => result.push('\t'),
            Some('r') => result.push('\r'),
            Some('a') => result.push('\u{0007}'),
            Some('b') => result.push('\u{0008}'),
            Some('f') => result.push('\u{000c}'),
            Some('v') => result.push('\u{000b}'),
            other => {
                return Err(ParseError::Syntax(format!(
                    "invalid escape in string literal: \\{}",
                    other.map(String::from).unwrap_or_default()
                )));
            }
        }
    }
    Ok(result)
}

#[cfg(test)]
#[path = "parser_tests.rs"]
mod tests;
