//! Lenient object-literal decoding for interpreter output.
//!
//! Accepts the JSON shape with relaxed quoting: bare or single-quoted keys,
//! single-quoted strings, bare scalar values (`>10000`, `fashion`), Python
//! spellings of the literals (`True`, `False`, `None`) and trailing commas.
//! It is a grammar, never an evaluator: anything outside it is rejected.

use serde_json::{Map, Number, Value};
use thiserror::Error;

const MAX_DEPTH: usize = 128;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message} at offset {offset}")]
pub struct PermissiveError {
    pub offset: usize,
    pub message: String,
}


pub fn parse_permissive(input: &str) -> Result<Value, PermissiveError> {
    let mut parser = Parser {
        chars: input.chars().collect(),
        pos: 0,
        depth: 0,
    };
    parser.skip_ws();
    let value = parser.value()?;
    parser.skip_ws();
    if parser.pos < parser.chars.len() {
        return Err(parser.error("unexpected trailing input"));
    }
    Ok(value)
}


struct Parser {
    chars: Vec<char>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn error(&self, message: &str) -> PermissiveError {
        PermissiveError {
            offset: self.pos,
            message: message.to_string(),
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn expect(&mut self, c: char) -> Result<(), PermissiveError> {
        if self.peek() == Some(c) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.error(&format!("expected '{c}'")))
        }
    }

    fn value(&mut self) -> Result<Value, PermissiveError> {
        match self.peek() {
            Some('{') => self.nested(Self::object),
            Some('[') => self.nested(Self::array),
            Some(q @ ('"' | '\'')) => self.quoted(q).map(Value::String),
            Some(_) => self.bare_value(),
            None => Err(self.error("unexpected end of input")),
        }
    }

    fn nested(
        &mut self,
        parse: fn(&mut Self) -> Result<Value, PermissiveError>,
    ) -> Result<Value, PermissiveError> {
        if self.depth >= MAX_DEPTH {
            return Err(self.error("nesting too deep"));
        }
        self.depth += 1;
        let value = parse(self);
        self.depth -= 1;
        value
    }

    fn object(&mut self) -> Result<Value, PermissiveError> {
        self.expect('{')?;
        let mut map = Map::new();
        loop {
            self.skip_ws();
            if self.peek() == Some('}') {
                self.pos += 1;
                return Ok(Value::Object(map));
            }

            let key = match self.peek() {
                Some(q @ ('"' | '\'')) => self.quoted(q)?,
                _ => self.bare_key()?,
            };
            self.skip_ws();
            self.expect(':')?;
            self.skip_ws();
            let value = self.value()?;
            map.insert(key, value);

            self.skip_ws();
            match self.peek() {
                Some(',') => self.pos += 1,
                Some('}') => {}
                _ => return Err(self.error("expected ',' or '}'")),
            }
        }
    }

    fn array(&mut self) -> Result<Value, PermissiveError> {
        self.expect('[')?;
        let mut items = Vec::new();
        loop {
            self.skip_ws();
            if self.peek() == Some(']') {
                self.pos += 1;
                return Ok(Value::Array(items));
            }

            items.push(self.value()?);

            self.skip_ws();
            match self.peek() {
                Some(',') => self.pos += 1,
                Some(']') => {}
                _ => return Err(self.error("expected ',' or ']'")),
            }
        }
    }

    fn quoted(&mut self, quote: char) -> Result<String, PermissiveError> {
        self.expect(quote)?;
        let mut out = String::new();
        loop {
            let c = self.peek().ok_or_else(|| self.error("unterminated string"))?;
            self.pos += 1;
            match c {
                c if c == quote => return Ok(out),
                '\\' => {
                    let escaped = self.peek().ok_or_else(|| self.error("unterminated escape"))?;
                    self.pos += 1;
                    match escaped {
                        'n' => out.push('\n'),
                        't' => out.push('\t'),
                        'r' => out.push('\r'),
                        'b' => out.push('\u{8}'),
                        'f' => out.push('\u{c}'),
                        'u' => out.push(self.unicode_escape()?),
                        other => out.push(other),
                    }
                }
                c => out.push(c),
            }
        }
    }

    fn unicode_escape(&mut self) -> Result<char, PermissiveError> {
        let end = self.pos + 4;
        if end > self.chars.len() {
            return Err(self.error("short unicode escape"));
        }
        let hex: String = self.chars[self.pos..end].iter().collect();
        let code = u32::from_str_radix(&hex, 16).map_err(|_| self.error("bad unicode escape"))?;
        self.pos = end;
        char::from_u32(code).ok_or_else(|| self.error("invalid code point"))
    }

    fn bare_key(&mut self) -> Result<String, PermissiveError> {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_alphanumeric() || c == '_' || c == '-')
        {
            self.pos += 1;
        }
        if self.pos == start {
            return Err(self.error("expected key"));
        }
        Ok(self.chars[start..self.pos].iter().collect())
    }

    /// A bare scalar runs until the next structural delimiter on its line.
    fn bare_value(&mut self) -> Result<Value, PermissiveError> {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| !matches!(c, ',' | '}' | ']' | '{' | '[' | ':' | '"' | '\'' | '\n'))
        {
            self.pos += 1;
        }
        let raw: String = self.chars[start..self.pos].iter().collect();
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(self.error("expected value"));
        }
        Ok(classify_bare(raw))
    }
}

fn classify_bare(raw: &str) -> Value {
    match raw {
        "true" | "True" => return Value::Bool(true),
        "false" | "False" => return Value::Bool(false),
        "null" | "None" => return Value::Null,
        _ => {}
    }

    if let Ok(int) = raw.parse::<i64>() {
        return Value::Number(int.into());
    }
    if raw.chars().all(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E')) {
        if let Some(number) = raw.parse::<f64>().ok().and_then(Number::from_f64) {
            return Value::Number(number);
        }
    }

    Value::String(raw.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unquoted_keys_and_single_quotes() {
        let value = parse_permissive("{category: 'fashion', 'follower_filter': \">10000\"}").unwrap();
        assert_eq!(value, json!({"category": "fashion", "follower_filter": ">10000"}));
    }

    #[test]
    fn test_apostrophe_inside_double_quotes_survives() {
        let value = parse_permissive(r#"{"category": "women's fashion"}"#).unwrap();
        assert_eq!(value["category"], "women's fashion");
    }

    #[test]
    fn test_bare_values() {
        let value = parse_permissive("{category: fashion, follower_filter: >10000, sort_by: None}").unwrap();
        assert_eq!(
            value,
            json!({"category": "fashion", "follower_filter": ">10000", "sort_by": null})
        );
    }

    #[test]
    fn test_literals_numbers_and_trailing_comma() {
        let value = parse_permissive("{a: True, b: false, c: 12, d: 1.5, e: [1, 'x',],}").unwrap();
        assert_eq!(value, json!({"a": true, "b": false, "c": 12, "d": 1.5, "e": [1, "x"]}));
    }

    #[test]
    fn test_escapes() {
        let value = parse_permissive(r#"{'k': 'it\'s A'}"#).unwrap();
        assert_eq!(value["k"], "it's A");
    }

    #[test]
    fn test_expressions_are_not_evaluated() {
        let value = parse_permissive("{category: __import__('os').getcwd()}");
        assert!(value.is_err());

        let value = parse_permissive("{category: len(x)}").unwrap();
        assert_eq!(value["category"], "len(x)");
    }

    #[test]
    fn test_rejects_unterminated_input() {
        assert!(parse_permissive("{category: 'fashion'").is_err());
        assert!(parse_permissive("{'category: fashion}").is_err());
        assert!(parse_permissive("{category fashion}").is_err());
    }

    #[test]
    fn test_deep_nesting_is_rejected() {
        let input = format!("{{a: {}}}", "[".repeat(10_000));
        let err = parse_permissive(&input).unwrap_err();
        assert_eq!(err.message, "nesting too deep");

        let shallow = format!("{{a: {}{}}}", "[".repeat(100), "]".repeat(100));
        assert!(parse_permissive(&shallow).is_ok());
    }
}
