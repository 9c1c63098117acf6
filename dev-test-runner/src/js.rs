//! Evaluator for the JavaScript subset the guard emitter produces.
//!
//! Grammar (lowest precedence first):
//! ```text
//! or      := and ("||" and)*
//! and     := eq ("&&" eq)*
//! eq      := unary ("===" unary)?
//! unary   := "typeof" unary | "-" unary | postfix
//! postfix := primary ("." ident | "[" or "]" | "(" args ")")*
//! primary := number | string | ident | "(" or ")"
//! args    := (ident "=>" or | or) ("," ...)*
//! ```
//! Values come from `serde_json`. Property access on `null` / `undefined`
//! is a `TypeError`, so an expression that reads a property before checking
//! the container fails loudly instead of evaluating to `false`.
use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum JsError {
    #[error("unexpected input at byte {offset}: `{rest}`")]
    Lex { offset: usize, rest: String },
    #[error("parse error: {0}")]
    Parse(String),
    #[error("TypeError: {0}")]
    Type(String),
    #[error("ReferenceError: {0} is not defined")]
    Reference(String),
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Str(String),
    Ident(String),
    Punct(&'static str),
}

#[derive(Debug, Clone)]
pub enum Expr {
    Number(f64),
    Str(String),
    Bool(bool),
    Null,
    Undefined,
    Var(String),
    Member(Box<Expr>, String),
    Index(Box<Expr>, Box<Expr>),
    Call(Box<Expr>, Vec<Expr>),
    Arrow(String, Box<Expr>),
    Typeof(Box<Expr>),
    Negate(Box<Expr>),
    StrictEq(Box<Expr>, Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
}

/// Runtime values. `Object` holds JSON objects and arrays.
#[derive(Debug, Clone)]
pub enum JsValue {
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    Str(String),
    Object(Value),
    /// `Object(primitive)`: a fresh wrapper, never strictly equal to anything.
    Wrapper,
    Closure(String, Box<Expr>),
}

struct Parser {
    tokens: Vec<Token>,
    at: usize,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

static TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"^\s*(?:(?P<num>\d+(?:\.\d+)?(?:[eE][+-]?\d+)?)|(?P<ident>[A-Za-z_$][A-Za-z0-9_$]*)|(?P<dq>"(?:[^"\\]|\\.)*")|(?P<sq>'(?:[^'\\]|\\.)*')|(?P<punct>===|=>|&&|\|\||[()\[\].,\-]))"#,
    )
    .expect("token regex")
});

fn tokenize(src: &str) -> Result<Vec<Token>, JsError> {
    let mut tokens = Vec::new();
    let mut offset = 0;
    while !src[offset..].trim_start().is_empty() {
        let rest = &src[offset..];
        let Some(caps) = TOKEN.captures(rest) else {
            return Err(JsError::Lex { offset, rest: rest.chars().take(20).collect() });
        };
        let token = if let Some(m) = caps.name("num") {
            let n = m.as_str().parse::<f64>().map_err(|e| JsError::Parse(e.to_string()))?;
            Token::Number(n)
        } else if let Some(m) = caps.name("ident") {
            Token::Ident(m.as_str().to_owned())
        } else if let Some(m) = caps.name("dq") {
            let s = serde_json::from_str::<String>(m.as_str()).map_err(|e| JsError::Parse(e.to_string()))?;
            Token::Str(s)
        } else if let Some(m) = caps.name("sq") {
            let inner = &m.as_str()[1..m.as_str().len() - 1];
            Token::Str(inner.replace("\\'", "'").replace("\\\\", "\\"))
        } else {
            let punct = caps.name("punct").map(|m| m.as_str()).unwrap_or_default();
            Token::Punct(match punct {
                "===" => "===",
                "=>" => "=>",
                "&&" => "&&",
                "||" => "||",
                "(" => "(",
                ")" => ")",
                "[" => "[",
                "]" => "]",
                "." => ".",
                "," => ",",
                _ => "-",
            })
        };
        tokens.push(token);
        offset += caps[0].len();
    }
    Ok(tokens)
}

pub fn parse(src: &str) -> Result<Expr, JsError> {
    let mut parser = Parser { tokens: tokenize(src)?, at: 0 };
    let expr = parser.or()?;
    match parser.peek() {
        None => Ok(expr),
        Some(token) => Err(JsError::Parse(format!("trailing token {token:?}"))),
    }
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.at)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.at).cloned();
        self.at += 1;
        token
    }

    fn eat(&mut self, punct: &str) -> bool {
        if matches!(self.peek(), Some(Token::Punct(p)) if *p == punct) {
            self.at += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, punct: &str) -> Result<(), JsError> {
        if self.eat(punct) {
            Ok(())
        } else {
            Err(JsError::Parse(format!("expected `{punct}`, found {:?}", self.peek())))
        }
    }

    fn or(&mut self) -> Result<Expr, JsError> {
        let mut lhs = self.and()?;
        while self.eat("||") {
            lhs = Expr::Or(Box::new(lhs), Box::new(self.and()?));
        }
        Ok(lhs)
    }

    fn and(&mut self) -> Result<Expr, JsError> {
        let mut lhs = self.eq()?;
        while self.eat("&&") {
            lhs = Expr::And(Box::new(lhs), Box::new(self.eq()?));
        }
        Ok(lhs)
    }

    fn eq(&mut self) -> Result<Expr, JsError> {
        let lhs = self.unary()?;
        if self.eat("===") {
            return Ok(Expr::StrictEq(Box::new(lhs), Box::new(self.unary()?)));
        }
        Ok(lhs)
    }

    fn unary(&mut self) -> Result<Expr, JsError> {
        if matches!(self.peek(), Some(Token::Ident(id)) if id == "typeof") {
            self.at += 1;
            return Ok(Expr::Typeof(Box::new(self.unary()?)));
        }
        if self.eat("-") {
            return Ok(Expr::Negate(Box::new(self.unary()?)));
        }
        self.postfix()
    }

    fn postfix(&mut self) -> Result<Expr, JsError> {
        let mut expr = self.primary()?;
        loop {
            if self.eat(".") {
                match self.next() {
                    Some(Token::Ident(name)) => expr = Expr::Member(Box::new(expr), name),
                    other => return Err(JsError::Parse(format!("expected property name, found {other:?}"))),
                }
            } else if self.eat("[") {
                let index = self.or()?;
                self.expect("]")?;
                expr = Expr::Index(Box::new(expr), Box::new(index));
            } else if self.eat("(") {
                let mut args = Vec::new();
                if !self.eat(")") {
                    loop {
                        args.push(self.argument()?);
                        if self.eat(")") {
                            break;
                        }
                        self.expect(",")?;
                    }
                }
                expr = Expr::Call(Box::new(expr), args);
            } else {
                return Ok(expr);
            }
        }
    }

    fn argument(&mut self) -> Result<Expr, JsError> {
        let is_arrow = matches!(
            (self.tokens.get(self.at), self.tokens.get(self.at + 1)),
            (Some(Token::Ident(_)), Some(Token::Punct("=>")))
        );
        if !is_arrow {
            return self.or();
        }
        let Some(Token::Ident(param)) = self.next() else {
            return Err(JsError::Parse("expected arrow parameter".into()));
        };
        self.expect("=>")?;
        Ok(Expr::Arrow(param, Box::new(self.or()?)))
    }

    fn primary(&mut self) -> Result<Expr, JsError> {
        match self.next() {
            Some(Token::Number(n)) => Ok(Expr::Number(n)),
            Some(Token::Str(s)) => Ok(Expr::Str(s)),
            Some(Token::Ident(id)) => Ok(match id.as_str() {
                "true" => Expr::Bool(true),
                "false" => Expr::Bool(false),
                "null" => Expr::Null,
                "undefined" => Expr::Undefined,
                "NaN" => Expr::Number(f64::NAN),
                "Infinity" => Expr::Number(f64::INFINITY),
                _ => Expr::Var(id),
            }),
            Some(Token::Punct("(")) => {
                let inner = self.or()?;
                self.expect(")")?;
                Ok(inner)
            }
            other => Err(JsError::Parse(format!("unexpected {other:?}"))),
        }
    }
}

impl JsValue {
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => JsValue::Null,
            Value::Bool(b) => JsValue::Bool(*b),
            Value::Number(n) => JsValue::Number(n.as_f64().unwrap_or(f64::NAN)),
            Value::String(s) => JsValue::Str(s.clone()),
            Value::Array(_) | Value::Object(_) => JsValue::Object(value.clone()),
        }
    }

    fn type_of(&self) -> &'static str {
        match self {
            JsValue::Undefined => "undefined",
            JsValue::Bool(_) => "boolean",
            JsValue::Number(_) => "number",
            JsValue::Str(_) => "string",
            JsValue::Closure(..) => "function",
            JsValue::Null | JsValue::Object(_) | JsValue::Wrapper => "object",
        }
    }

    fn truthy(&self) -> bool {
        match self {
            JsValue::Undefined | JsValue::Null => false,
            JsValue::Bool(b) => *b,
            JsValue::Number(n) => *n != 0.0 && !n.is_nan(),
            JsValue::Str(s) => !s.is_empty(),
            JsValue::Object(_) | JsValue::Wrapper | JsValue::Closure(..) => true,
        }
    }

    fn strict_eq(&self, other: &JsValue) -> bool {
        match (self, other) {
            (JsValue::Undefined, JsValue::Undefined) | (JsValue::Null, JsValue::Null) => true,
            (JsValue::Bool(a), JsValue::Bool(b)) => a == b,
            (JsValue::Number(a), JsValue::Number(b)) => a == b,
            (JsValue::Str(a), JsValue::Str(b)) => a == b,
            // identity is approximated by structural equality
            (JsValue::Object(a), JsValue::Object(b)) => a == b,
            _ => false,
        }
    }
}

/// Evaluate `expression` with `variable` bound to `value`; returns JS truthiness.
pub fn evaluate(expression: &str, variable: &str, value: &Value) -> Result<bool, JsError> {
    let expr = parse(expression)?;
    let mut scope = HashMap::new();
    scope.insert(variable.to_owned(), JsValue::from_json(value));
    Ok(eval(&expr, &scope)?.truthy())
}

fn eval(expr: &Expr, scope: &HashMap<String, JsValue>) -> Result<JsValue, JsError> {
    Ok(match expr {
        Expr::Number(n) => JsValue::Number(*n),
        Expr::Str(s) => JsValue::Str(s.clone()),
        Expr::Bool(b) => JsValue::Bool(*b),
        Expr::Null => JsValue::Null,
        Expr::Undefined => JsValue::Undefined,
        Expr::Var(name) => scope
            .get(name)
            .cloned()
            .ok_or_else(|| JsError::Reference(name.clone()))?,
        Expr::Member(object, name) => get(&eval(object, scope)?, &JsValue::Str(name.clone()))?,
        Expr::Index(object, index) => get(&eval(object, scope)?, &eval(index, scope)?)?,
        Expr::Call(callee, args) => call(callee, args, scope)?,
        Expr::Arrow(param, body) => JsValue::Closure(param.clone(), body.clone()),
        Expr::Typeof(inner) => {
            // `typeof` of an unbound name is not an error in JS
            let value = match eval(inner, scope) {
                Err(JsError::Reference(_)) => JsValue::Undefined,
                other => other?,
            };
            JsValue::Str(value.type_of().to_owned())
        }
        Expr::Negate(inner) => match eval(inner, scope)? {
            JsValue::Number(n) => JsValue::Number(-n),
            other => return Err(JsError::Type(format!("cannot negate {}", other.type_of()))),
        },
        Expr::StrictEq(lhs, rhs) => JsValue::Bool(eval(lhs, scope)?.strict_eq(&eval(rhs, scope)?)),
        Expr::And(lhs, rhs) => {
            let lhs = eval(lhs, scope)?;
            if lhs.truthy() { eval(rhs, scope)? } else { lhs }
        }
        Expr::Or(lhs, rhs) => {
            let lhs = eval(lhs, scope)?;
            if lhs.truthy() { lhs } else { eval(rhs, scope)? }
        }
    })
}

fn get(object: &JsValue, key: &JsValue) -> Result<JsValue, JsError> {
    let key_text = match key {
        JsValue::Str(s) => s.clone(),
        JsValue::Number(n) if n.fract() == 0.0 && *n >= 0.0 => format!("{}", *n as u64),
        other => return Err(JsError::Type(format!("unsupported key of type {}", other.type_of()))),
    };
    match object {
        JsValue::Undefined | JsValue::Null => Err(JsError::Type(format!(
            "cannot read properties of {} (reading '{key_text}')",
            if matches!(object, JsValue::Null) { "null" } else { "undefined" }
        ))),
        JsValue::Object(Value::Array(items)) => {
            if key_text == "length" {
                return Ok(JsValue::Number(items.len() as f64));
            }
            Ok(key_text
                .parse::<usize>()
                .ok()
                .and_then(|i| items.get(i))
                .map_or(JsValue::Undefined, JsValue::from_json))
        }
        JsValue::Object(Value::Object(map)) => Ok(map.get(&key_text).map_or(JsValue::Undefined, JsValue::from_json)),
        JsValue::Str(s) if key_text == "length" => Ok(JsValue::Number(s.chars().count() as f64)),
        _ => Ok(JsValue::Undefined),
    }
}

fn call(callee: &Expr, args: &[Expr], scope: &HashMap<String, JsValue>) -> Result<JsValue, JsError> {
    let evaluated = args.iter().map(|a| eval(a, scope)).collect::<Result<Vec<_>, _>>()?;
    let first = evaluated.first().cloned().unwrap_or(JsValue::Undefined);
    match callee {
        Expr::Var(name) if name == "Object" => Ok(match first {
            JsValue::Object(v) => JsValue::Object(v),
            JsValue::Undefined | JsValue::Null => JsValue::Object(Value::Object(Default::default())),
            _ => JsValue::Wrapper,
        }),
        Expr::Member(target, method) if matches!(target.as_ref(), Expr::Var(v) if v == "Array") && method == "isArray" => {
            Ok(JsValue::Bool(matches!(first, JsValue::Object(Value::Array(_)))))
        }
        Expr::Member(target, method) if method == "every" => {
            let receiver = eval(target, scope)?;
            let JsValue::Object(Value::Array(items)) = receiver else {
                return Err(JsError::Type(format!("{}.every is not a function", receiver.type_of())));
            };
            let JsValue::Closure(param, body) = first else {
                return Err(JsError::Type("every expects a callback".into()));
            };
            for item in &items {
                let mut inner = scope.clone();
                inner.insert(param.clone(), JsValue::from_json(item));
                if !eval(&body, &inner)?.truthy() {
                    return Ok(JsValue::Bool(false));
                }
            }
            Ok(JsValue::Bool(true))
        }
        other => Err(JsError::Type(format!("unsupported call {other:?}"))),
    }
}

// ------------------------------- Tests ------------------------------------ //
