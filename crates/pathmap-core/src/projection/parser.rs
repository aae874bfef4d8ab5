//! Projection expression parser
//!
//! Recursive descent over the expression text. Positions in errors are
//! character offsets into the input.
//!
//! Copyright (c) 2025 Pathmap Team
//! Licensed under the Apache-2.0 license

use super::ast::*;
use super::error::ProjectionError;
use crate::Result;
use std::iter::Peekable;
use std::str::Chars;

/// Key given to a keyless member whose value names no plain key
const ANONYMOUS_KEY: &str = "_";

/// Projection expression parser
pub struct Parser<'a> {
    input: &'a str,
    chars: Peekable<Chars<'a>>,
    position: usize,
}

impl<'a> Parser<'a> {
    pub fn new(input: &'a str) -> Result<Self> {
        if input.trim().is_empty() {
            return Err(ProjectionError::parse("Empty projection expression", 0, input).into());
        }

        Ok(Self {
            input,
            chars: input.chars().peekable(),
            position: 0,
        })
    }

    /// Parse the whole input as one expression
    pub fn parse(mut self) -> Result<Expression> {
        let expression = self.parse_expression()?;
        self.skip_whitespace();
        if let Some(ch) = self.current_char() {
            return Err(ProjectionError::syntax(
                "Unexpected character after expression",
                self.position,
                self.input,
                vec!["'|'".to_string(), "end of input".to_string()],
                ch.to_string(),
            )
            .into());
        }
        Ok(expression)
    }

    fn parse_expression(&mut self) -> Result<Expression> {
        let mut stages = vec![self.parse_stage()?];
        loop {
            self.skip_whitespace();
            if self.current_char() != Some('|') {
                break;
            }
            self.advance();
            stages.push(self.parse_stage()?);
        }
        Ok(Expression::new(stages))
    }

    fn parse_stage(&mut self) -> Result<Stage> {
        self.skip_whitespace();

        match self.current_char() {
            Some('{') => self.parse_object(),
            Some('[') => self.parse_array(),
            Some(ch) if !is_delimiter(ch) => self.parse_path().map(Stage::Path),
            Some(ch) => Err(ProjectionError::syntax(
                "Expected a path or a literal",
                self.position,
                self.input,
                vec!["path".to_string(), "'{'".to_string(), "'['".to_string()],
                ch.to_string(),
            )
            .into()),
            None => Err(self.unexpected_end()),
        }
    }

    fn parse_object(&mut self) -> Result<Stage> {
        let start = self.position;
        self.advance(); // consume '{'

        let mut members = Vec::new();
        loop {
            self.skip_whitespace();
            match self.current_char() {
                Some('}') => {
                    self.advance();
                    break;
                }
                None => {
                    return Err(ProjectionError::parse("Unclosed object literal", start, self.input).into())
                }
                _ => {}
            }

            members.push(self.parse_member()?);

            self.skip_whitespace();
            match self.current_char() {
                Some(',') => self.advance(),
                Some('}') => {
                    self.advance();
                    break;
                }
                Some(ch) => {
                    return Err(ProjectionError::syntax(
                        "Unexpected character in object literal",
                        self.position,
                        self.input,
                        vec!["','".to_string(), "'}'".to_string()],
                        ch.to_string(),
                    )
                    .into())
                }
                None => {
                    return Err(ProjectionError::parse("Unclosed object literal", start, self.input).into())
                }
            }
        }

        Ok(Stage::Object(members))
    }

    fn parse_member(&mut self) -> Result<Member> {
        match self.parse_key()? {
            Some(key) => {
                let value = self.parse_expression()?;
                Ok(Member { key, value })
            }
            None => {
                let value = self.parse_expression()?;
                Ok(Member {
                    key: implicit_key(&value),
                    value,
                })
            }
        }
    }

    /// Consume `key:` when the member has an explicit key
    fn parse_key(&mut self) -> Result<Option<String>> {
        if self.current_char() == Some('"') {
            let key = self.parse_quoted()?;
            self.skip_whitespace();
            self.expect(':')?;
            return Ok(Some(key));
        }

        let mut lookahead = self.chars.clone();
        let mut raw = String::new();
        loop {
            match lookahead.next() {
                Some(':') => break,
                Some(',' | '}' | '|' | '{' | '[' | ']' | '.') | None => return Ok(None),
                Some(ch) => raw.push(ch),
            }
        }

        let key = raw.trim();
        if key.is_empty() || key.starts_with('@') {
            return Ok(None);
        }
        let key = key.to_string();
        for _ in 0..=raw.chars().count() {
            self.advance();
        }
        Ok(Some(key))
    }

    fn parse_quoted(&mut self) -> Result<String> {
        let start = self.position;
        self.advance(); // consume '"'

        let mut text = String::new();
        loop {
            match self.current_char() {
                Some('"') => {
                    self.advance();
                    return Ok(text);
                }
                Some('\\') => {
                    self.advance();
                    match self.current_char() {
                        Some(ch) => {
                            text.push(ch);
                            self.advance();
                        }
                        None => break,
                    }
                }
                Some(ch) => {
                    text.push(ch);
                    self.advance();
                }
                None => break,
            }
        }
        Err(ProjectionError::parse("Unterminated quoted key", start, self.input).into())
    }

    fn parse_array(&mut self) -> Result<Stage> {
        let start = self.position;
        self.advance(); // consume '['

        let mut items = Vec::new();
        loop {
            self.skip_whitespace();
            match self.current_char() {
                Some(']') => {
                    self.advance();
                    break;
                }
                None => {
                    return Err(ProjectionError::parse("Unclosed array literal", start, self.input).into())
                }
                _ => {}
            }

            items.push(self.parse_expression()?);

            self.skip_whitespace();
            match self.current_char() {
                Some(',') => self.advance(),
                Some(']') => {
                    self.advance();
                    break;
                }
                Some(ch) => {
                    return Err(ProjectionError::syntax(
                        "Unexpected character in array literal",
                        self.position,
                        self.input,
                        vec!["','".to_string(), "']'".to_string()],
                        ch.to_string(),
                    )
                    .into())
                }
                None => {
                    return Err(ProjectionError::parse("Unclosed array literal", start, self.input).into())
                }
            }
        }

        Ok(Stage::Array(items))
    }

    fn parse_path(&mut self) -> Result<Vec<Segment>> {
        let mut segments = vec![self.parse_segment()?];
        while self.current_char() == Some('.') {
            self.advance();
            segments.push(self.parse_segment()?);
        }
        Ok(segments)
    }

    fn parse_segment(&mut self) -> Result<Segment> {
        let start = self.position;

        if self.current_char() == Some('@') {
            self.advance();
            let name = self.read_while(|ch| ch.is_ascii_alphanumeric() || ch == '_');
            let argument = if self.current_char() == Some(':') {
                self.advance();
                let digits = self.read_while(|ch| ch.is_ascii_digit());
                let levels = digits.parse::<usize>().map_err(|_| {
                    ProjectionError::parse(
                        format!("Modifier @{} expects a numeric argument", name),
                        self.position,
                        self.input,
                    )
                })?;
                Some(levels)
            } else {
                None
            };
            return Modifier::from_name(&name, argument)
                .map(Segment::Modifier)
                .ok_or_else(|| ProjectionError::unknown_modifier(name, start).into());
        }

        let key = self.read_key();
        match key.as_str() {
            "" => Err(ProjectionError::syntax(
                "Empty path segment",
                self.position,
                self.input,
                vec!["key".to_string(), "'#'".to_string(), "modifier".to_string()],
                self.current_char()
                    .map(|c| c.to_string())
                    .unwrap_or_else(|| "EOF".to_string()),
            )
            .into()),
            "#" => Ok(Segment::Each),
            _ => Ok(Segment::Key(key)),
        }
    }

    /// Read a path key; `\` escapes the following character
    fn read_key(&mut self) -> String {
        let mut key = String::new();
        while let Some(ch) = self.current_char() {
            if ch == '\\' {
                self.advance();
                if let Some(escaped) = self.current_char() {
                    key.push(escaped);
                    self.advance();
                }
                continue;
            }
            if ch == '.' || ch == ':' || ch == '"' || ch.is_whitespace() || is_delimiter(ch) {
                break;
            }
            key.push(ch);
            self.advance();
        }
        key
    }

    fn read_while(&mut self, accept: impl Fn(char) -> bool) -> String {
        let mut text = String::new();
        while let Some(ch) = self.current_char() {
            if !accept(ch) {
                break;
            }
            text.push(ch);
            self.advance();
        }
        text
    }

    fn expect(&mut self, expected: char) -> Result<()> {
        match self.current_char() {
            Some(ch) if ch == expected => {
                self.advance();
                Ok(())
            }
            found => Err(ProjectionError::syntax(
                format!("Expected '{}'", expected),
                self.position,
                self.input,
                vec![format!("'{}'", expected)],
                found.map(|c| c.to_string()).unwrap_or_else(|| "EOF".to_string()),
            )
            .into()),
        }
    }

    fn unexpected_end(&self) -> crate::Error {
        ProjectionError::parse("Unexpected end of input", self.position, self.input).into()
    }

    fn current_char(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn advance(&mut self) {
        if self.chars.next().is_some() {
            self.position += 1;
        }
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.current_char(), Some(ch) if ch.is_whitespace()) {
            self.advance();
        }
    }
}

fn is_delimiter(ch: char) -> bool {
    matches!(ch, '|' | ',' | '{' | '}' | '[' | ']')
}

/// Key of a keyless member: the last plain key of its leading path
fn implicit_key(value: &Expression) -> String {
    match value.stages.first() {
        Some(Stage::Path(segments)) => segments
            .iter()
            .rev()
            .find_map(|segment| match segment {
                Segment::Key(key) => Some(key.clone()),
                _ => None,
            })
            .unwrap_or_else(|| ANONYMOUS_KEY.to_string()),
        _ => ANONYMOUS_KEY.to_string(),
    }
}
