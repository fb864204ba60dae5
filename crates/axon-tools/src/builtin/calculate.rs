//! Arithmetic expression tool

use async_trait::async_trait;
use serde_json::Value;

use crate::registry::{ToolError, ToolHandler};

/// Evaluates an arithmetic expression from the `expression` argument
///
/// Supports `+ - * / %`, parentheses, unary minus, and decimal numbers.
pub struct Calculate;

#[async_trait]
impl ToolHandler for Calculate {
    async fn invoke(&self, arguments: Value) -> Result<Value, ToolError> {
        let expression = arguments
            .get("expression")
            .and_then(Value::as_str)
            .ok_or_else(|| ToolError::new("missing 'expression' argument"))?;

        let result = eval(expression).map_err(ToolError::new)?;

        // Integral results render without a trailing ".0"
        #[allow(clippy::cast_possible_truncation)]
        if result.fract() == 0.0 && result.abs() < 9_007_199_254_740_992.0 {
            Ok(Value::from(result as i64))
        } else {
            serde_json::Number::from_f64(result)
                .map(Value::Number)
                .ok_or_else(|| ToolError::new("expression result is not a finite number"))
        }
    }
}

/// Evaluate an arithmetic expression
pub fn eval(expression: &str) -> Result<f64, String> {
    let mut parser = Parser {
        chars: expression.chars().collect(),
        pos: 0,
    };
    let value = parser.expr()?;
    parser.skip_whitespace();
    if parser.pos < parser.chars.len() {
        return Err(format!("unexpected character '{}'", parser.chars[parser.pos]));
    }
    Ok(value)
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
}

impl Parser {
    fn expr(&mut self) -> Result<f64, String> {
        let mut value = self.term()?;
        loop {
            match self.peek_operator() {
                Some('+') => {
                    self.pos += 1;
                    value += self.term()?;
                }
                Some('-') => {
                    self.pos += 1;
                    value -= self.term()?;
                }
                _ => return Ok(value),
            }
        }
    }

    fn term(&mut self) -> Result<f64, String> {
        let mut value = self.unary()?;
        loop {
            match self.peek_operator() {
                Some('*') => {
                    self.pos += 1;
                    value *= self.unary()?;
                }
                Some('/') => {
                    self.pos += 1;
                    let divisor = self.unary()?;
                    if divisor == 0.0 {
                        return Err("division by zero".to_string());
                    }
                    value /= divisor;
                }
                Some('%') => {
                    self.pos += 1;
                    let divisor = self.unary()?;
                    if divisor == 0.0 {
                        return Err("division by zero".to_string());
                    }
                    value %= divisor;
                }
                _ => return Ok(value),
            }
        }
    }

    fn unary(&mut self) -> Result<f64, String> {
        self.skip_whitespace();
        if self.peek() == Some('-') {
            self.pos += 1;
            return Ok(-self.unary()?);
        }
        self.primary()
    }

    fn primary(&mut self) -> Result<f64, String> {
        self.skip_whitespace();
        match self.peek() {
            Some('(') => {
                self.pos += 1;
                let value = self.expr()?;
                self.skip_whitespace();
                if self.peek() == Some(')') {
                    self.pos += 1;
                    Ok(value)
                } else {
                    Err("missing closing parenthesis".to_string())
                }
            }
            Some(c) if c.is_ascii_digit() || c == '.' => self.number(),
            Some(c) => Err(format!("unexpected character '{c}'")),
            None => Err("unexpected end of expression".to_string()),
        }
    }

    fn number(&mut self) -> Result<f64, String> {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_digit() || c == '.') {
            self.pos += 1;
        }
        let text: String = self.chars[start..self.pos].iter().collect();
        text.parse::<f64>().map_err(|_| format!("invalid number '{text}'"))
    }

    fn peek_operator(&mut self) -> Option<char> {
        self.skip_whitespace();
        self.peek().filter(|c| matches!(c, '+' | '-' | '*' | '/' | '%'))
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.pos += 1;
        }
    }
}
