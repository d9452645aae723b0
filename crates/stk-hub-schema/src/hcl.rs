// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Parser for the HCL subset used in schema documents.
//!
//! ```hcl
//! schema "main" {}
//!
//! table "users" {
//!   schema = schema.main
//!   column "id" { type = integer }
//!   column "email" {
//!     type    = varchar(255)
//!     null    = true
//!     default = sql("NULL")
//!   }
//!   primary_key { columns = [column.id] }
//!   index "users_email" {
//!     columns = [column.email]
//!     unique  = true
//!   }
//! }
//! ```
//!
//! Labels may be quoted or bare. `#`, `//` and `/* */` comments are skipped.
//! `schema` blocks carry no structure here and are ignored.

use crate::error::{Result, SchemaError};
use crate::model::{normalize_type, Column, Index, Realm, Table};

#[derive(Debug, Clone, PartialEq)]
enum Token {
	Ident(String),
	Str(String),
	Number(String),
	LBrace,
	RBrace,
	LBracket,
	RBracket,
	LParen,
	RParen,
	Equals,
	Comma,
}

#[derive(Debug, Clone, PartialEq)]
enum Value {
	Str(String),
	Number(String),
	Bool(bool),
	Ident(String),
	Call { name: String, args: Vec<Value> },
	List(Vec<Value>),
}

#[derive(Debug, Default)]
struct Body {
	attributes: Vec<Attribute>,
	blocks: Vec<Block>,
}

#[derive(Debug)]
struct Attribute {
	name: String,
	value: Value,
	line: usize,
}

#[derive(Debug)]
struct Block {
	kind: String,
	labels: Vec<String>,
	body: Body,
	line: usize,
}

fn parse_error(line: usize, message: impl Into<String>) -> SchemaError {
	SchemaError::Parse {
		line,
		message: message.into(),
	}
}

/// Parse a schema document (or several concatenated) into a [`Realm`].
pub fn parse_realm(input: &str) -> Result<Realm> {
	let tokens = lex(input)?;
	let mut parser = Parser { tokens, pos: 0 };
	let body = parser.parse_body(false)?;

	if let Some(attr) = body.attributes.first() {
		return Err(parse_error(
			attr.line,
			format!("unexpected top-level attribute '{}'", attr.name),
		));
	}

	let mut realm = Realm::default();
	for block in body.blocks {
		match block.kind.as_str() {
			"schema" => {}
			"table" => {
				let line = block.line;
				let table = table_from_block(block)?;
				if realm.tables.contains_key(&table.name) {
					return Err(parse_error(line, format!("duplicate table '{}'", table.name)));
				}
				realm.tables.insert(table.name.clone(), table);
			}
			other => {
				return Err(parse_error(block.line, format!("unsupported block '{other}'")));
			}
		}
	}

	Ok(realm)
}

fn lex(input: &str) -> Result<Vec<(Token, usize)>> {
	let chars: Vec<char> = input.chars().collect();
	let mut tokens = Vec::new();
	let mut line = 1;
	let mut i = 0;

	while i < chars.len() {
		let c = chars[i];
		match c {
			'\n' => {
				line += 1;
				i += 1;
			}
			c if c.is_whitespace() => i += 1,
			'#' => {
				while i < chars.len() && chars[i] != '\n' {
					i += 1;
				}
			}
			'/' if chars.get(i + 1) == Some(&'/') => {
				while i < chars.len() && chars[i] != '\n' {
					i += 1;
				}
			}
			'/' if chars.get(i + 1) == Some(&'*') => {
				let start = line;
				i += 2;
				loop {
					match chars.get(i) {
						None => return Err(parse_error(start, "unterminated block comment")),
						Some('*') if chars.get(i + 1) == Some(&'/') => {
							i += 2;
							break;
						}
						Some('\n') => {
							line += 1;
							i += 1;
						}
						Some(_) => i += 1,
					}
				}
			}
			'{' | '}' | '[' | ']' | '(' | ')' | '=' | ',' => {
				let token = match c {
					'{' => Token::LBrace,
					'}' => Token::RBrace,
					'[' => Token::LBracket,
					']' => Token::RBracket,
					'(' => Token::LParen,
					')' => Token::RParen,
					'=' => Token::Equals,
					_ => Token::Comma,
				};
				tokens.push((token, line));
				i += 1;
			}
			'"' => {
				let mut value = String::new();
				i += 1;
				loop {
					match chars.get(i) {
						None | Some('\n') => return Err(parse_error(line, "unterminated string")),
						Some('"') => {
							i += 1;
							break;
						}
						Some('\\') => {
							let escaped = match chars.get(i + 1) {
								Some('n') => '\n',
								Some('t') => '\t',
								Some('"') => '"',
								Some('\\') => '\\',
								Some(other) => {
									return Err(parse_error(
										line,
										format!("unknown escape sequence '\\{other}'"),
									))
								}
								None => return Err(parse_error(line, "unterminated string")),
							};
							value.push(escaped);
							i += 2;
						}
						Some(ch) => {
							value.push(*ch);
							i += 1;
						}
					}
				}
				tokens.push((Token::Str(value), line));
			}
			c if c.is_ascii_digit()
				|| (c == '-' && chars.get(i + 1).is_some_and(|n| n.is_ascii_digit())) =>
			{
				let start = i;
				i += 1;
				while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
					i += 1;
				}
				tokens.push((Token::Number(chars[start..i].iter().collect()), line));
			}
			c if c.is_alphabetic() || c == '_' => {
				let start = i;
				while i < chars.len()
					&& (chars[i].is_alphanumeric() || matches!(chars[i], '_' | '-' | '.'))
				{
					i += 1;
				}
				tokens.push((Token::Ident(chars[start..i].iter().collect()), line));
			}
			other => {
				return Err(parse_error(line, format!("unexpected character '{other}'")));
			}
		}
	}

	Ok(tokens)
}

struct Parser {
	tokens: Vec<(Token, usize)>,
	pos: usize,
}

impl Parser {
	fn peek(&self) -> Option<&Token> {
		self.tokens.get(self.pos).map(|(t, _)| t)
	}

	fn line(&self) -> usize {
		self.tokens
			.get(self.pos)
			.or_else(|| self.tokens.last())
			.map(|(_, l)| *l)
			.unwrap_or(1)
	}

	fn advance(&mut self) -> Option<Token> {
		let token = self.tokens.get(self.pos).map(|(t, _)| t.clone());
		if token.is_some() {
			self.pos += 1;
		}
		token
	}

	fn parse_body(&mut self, nested: bool) -> Result<Body> {
		let mut body = Body::default();
		loop {
			let line = self.line();
			match self.peek().cloned() {
				None if nested => return Err(parse_error(line, "unexpected end of input, expected '}'")),
				None => return Ok(body),
				Some(Token::RBrace) if nested => {
					self.advance();
					return Ok(body);
				}
				Some(Token::Ident(name)) => {
					self.advance();
					if self.peek() == Some(&Token::Equals) {
						self.advance();
						let value = self.parse_value()?;
						body.attributes.push(Attribute { name, value, line });
						continue;
					}

					let mut labels = Vec::new();
					while let Some(Token::Ident(label) | Token::Str(label)) = self.peek().cloned() {
						labels.push(label);
						self.advance();
					}
					if self.advance() != Some(Token::LBrace) {
						return Err(parse_error(
							line,
							format!("expected '=' or '{{' after '{name}'"),
						));
					}
					let inner = self.parse_body(true)?;
					body.blocks.push(Block {
						kind: name,
						labels,
						body: inner,
						line,
					});
				}
				Some(other) => return Err(parse_error(line, format!("unexpected token {other:?}"))),
			}
		}
	}

	fn parse_value(&mut self) -> Result<Value> {
		let line = self.line();
		match self.advance() {
			Some(Token::Str(s)) => Ok(Value::Str(s)),
			Some(Token::Number(n)) => Ok(Value::Number(n)),
			Some(Token::Ident(ident)) if ident == "true" => Ok(Value::Bool(true)),
			Some(Token::Ident(ident)) if ident == "false" => Ok(Value::Bool(false)),
			Some(Token::Ident(name)) => {
				if self.peek() != Some(&Token::LParen) {
					return Ok(Value::Ident(name));
				}
				self.advance();
				let args = self.parse_sequence(Token::RParen)?;
				Ok(Value::Call { name, args })
			}
			Some(Token::LBracket) => Ok(Value::List(self.parse_sequence(Token::RBracket)?)),
			Some(other) => Err(parse_error(line, format!("expected a value, found {other:?}"))),
			None => Err(parse_error(line, "expected a value, found end of input")),
		}
	}

	/// Comma-separated values up to `close`; a trailing comma is allowed.
	fn parse_sequence(&mut self, close: Token) -> Result<Vec<Value>> {
		let mut values = Vec::new();
		loop {
			if self.peek() == Some(&close) {
				self.advance();
				return Ok(values);
			}
			values.push(self.parse_value()?);
			match self.peek() {
				Some(Token::Comma) => {
					self.advance();
				}
				Some(t) if *t == close => {}
				_ => {
					return Err(parse_error(
						self.line(),
						format!("expected ',' or {close:?}"),
					))
				}
			}
		}
	}
}

fn single_label(block: &Block) -> Result<String> {
	match block.labels.as_slice() {
		[label] => Ok(label.clone()),
		_ => Err(parse_error(
			block.line,
			format!("'{}' block requires exactly one label", block.kind),
		)),
	}
}

fn table_from_block(block: Block) -> Result<Table> {
	let mut table = Table::new(single_label(&block)?);

	for attr in &block.body.attributes {
		match attr.name.as_str() {
			"schema" | "comment" => {}
			other => {
				return Err(parse_error(
					attr.line,
					format!("unknown table attribute '{other}'"),
				))
			}
		}
	}

	for inner in block.body.blocks {
		match inner.kind.as_str() {
			"column" => {
				let line = inner.line;
				let column = column_from_block(inner)?;
				if table.column(&column.name).is_some() {
					return Err(parse_error(
						line,
						format!("duplicate column '{}' in table '{}'", column.name, table.name),
					));
				}
				table.columns.push(column);
			}
			"primary_key" => {
				table.primary_key = columns_attribute(&inner)?;
			}
			"index" => {
				let name = single_label(&inner)?;
				let mut unique = false;
				for attr in &inner.body.attributes {
					match (attr.name.as_str(), &attr.value) {
						("unique", Value::Bool(b)) => unique = *b,
						("columns", _) | ("comment", _) => {}
						(other, _) => {
							return Err(parse_error(
								attr.line,
								format!("invalid index attribute '{other}'"),
							))
						}
					}
				}
				let columns = columns_attribute(&inner)?;
				if table.indexes.contains_key(&name) {
					return Err(parse_error(inner.line, format!("duplicate index '{name}'")));
				}
				table.indexes.insert(name.clone(), Index { name, columns, unique });
			}
			other => {
				return Err(parse_error(
					inner.line,
					format!("unsupported block '{other}' in table '{}'", table.name),
				))
			}
		}
	}

	if table.columns.is_empty() {
		return Err(parse_error(
			block.line,
			format!("table '{}' has no columns", table.name),
		));
	}
	let referenced = table
		.primary_key
		.iter()
		.chain(table.indexes.values().flat_map(|i| i.columns.iter()));
	for column in referenced {
		if table.column(column).is_none() {
			return Err(parse_error(
				block.line,
				format!("table '{}' references unknown column '{column}'", table.name),
			));
		}
	}

	Ok(table)
}

fn column_from_block(block: Block) -> Result<Column> {
	let name = single_label(&block)?;
	if let Some(inner) = block.body.blocks.first() {
		return Err(parse_error(
			inner.line,
			format!("unexpected block '{}' in column '{name}'", inner.kind),
		));
	}

	let mut sql_type = None;
	let mut nullable = false;
	let mut default = None;

	for attr in block.body.attributes {
		match attr.name.as_str() {
			"type" => sql_type = Some(render_type(&attr.value, attr.line)?),
			"null" => match attr.value {
				Value::Bool(b) => nullable = b,
				_ => return Err(parse_error(attr.line, "'null' must be true or false")),
			},
			"default" => default = Some(render_default(&attr.value, attr.line)?),
			"comment" | "auto_increment" => {}
			other => {
				return Err(parse_error(
					attr.line,
					format!("unknown column attribute '{other}'"),
				))
			}
		}
	}

	let sql_type =
		sql_type.ok_or_else(|| parse_error(block.line, format!("column '{name}' has no type")))?;

	Ok(Column {
		name,
		sql_type,
		nullable,
		default,
	})
}

fn columns_attribute(block: &Block) -> Result<Vec<String>> {
	let attr = block
		.body
		.attributes
		.iter()
		.find(|a| a.name == "columns")
		.ok_or_else(|| parse_error(block.line, format!("'{}' requires 'columns'", block.kind)))?;

	let Value::List(items) = &attr.value else {
		return Err(parse_error(attr.line, "'columns' must be a list"));
	};
	if items.is_empty() {
		return Err(parse_error(attr.line, "'columns' must not be empty"));
	}

	items
		.iter()
		.map(|item| match item {
			Value::Ident(reference) => Ok(reference
				.strip_prefix("column.")
				.unwrap_or(reference)
				.to_string()),
			Value::Str(name) => Ok(name.clone()),
			_ => Err(parse_error(attr.line, "column references must be identifiers")),
		})
		.collect()
}

fn render_type(value: &Value, line: usize) -> Result<String> {
	let raw = match value {
		Value::Ident(name) | Value::Str(name) => name.clone(),
		Value::Call { name, args } => {
			let args = args
				.iter()
				.map(|arg| match arg {
					Value::Number(s) | Value::Ident(s) => Ok(s.clone()),
					_ => Err(parse_error(line, "type arguments must be numbers")),
				})
				.collect::<Result<Vec<_>>>()?;
			format!("{name}({})", args.join(","))
		}
		_ => return Err(parse_error(line, "'type' must be a type name")),
	};
	Ok(normalize_type(&raw))
}

fn render_default(value: &Value, line: usize) -> Result<String> {
	match value {
		Value::Str(s) => Ok(format!("'{}'", s.replace('\'', "''"))),
		Value::Number(n) => Ok(n.clone()),
		Value::Bool(true) => Ok("TRUE".to_string()),
		Value::Bool(false) => Ok("FALSE".to_string()),
		Value::Ident(ident) => Ok(ident.clone()),
		Value::Call { name, args } if name == "sql" => match args.as_slice() {
			[Value::Str(expr)] => Ok(expr.clone()),
			_ => Err(parse_error(line, "sql() takes one string argument")),
		},
		_ => Err(parse_error(line, "unsupported default value")),
	}
}
