//! Shorthand transition rules.
//!
//! Grammar:
//!
//! ```text
//! rule     := name [":" | "="] state (op state)+
//! op       := ">" | "<" | "-"
//! ```
//!
//! All operators of one rule must be the same. `a > b` leads from `a` to
//! `b`, `a < b` from `b` to `a`, and `a - b` both ways. A chain such as
//! `a > b > c` applies the operator to each adjacent pair.

use super::error::BuildError;

/// Direction operator of a shorthand rule.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operator {
    /// `>`
    Forward,
    /// `<`
    Backward,
    /// `-`
    Both,
}

impl Operator {
    fn from_char(c: char) -> Option<Self> {
        match c {
            '>' => Some(Self::Forward),
            '<' => Some(Self::Backward),
            '-' => Some(Self::Both),
            _ => None,
        }
    }

    fn as_char(&self) -> char {
        match self {
            Self::Forward => '>',
            Self::Backward => '<',
            Self::Both => '-',
        }
    }

    /// Directed `(from, to)` pairs for the operands `left op right`.
    fn edges(&self, left: &str, right: &str) -> Vec<(String, String)> {
        match self {
            Self::Forward => vec![(left.to_string(), right.to_string())],
            Self::Backward => vec![(right.to_string(), left.to_string())],
            Self::Both => vec![
                (left.to_string(), right.to_string()),
                (right.to_string(), left.to_string()),
            ],
        }
    }
}

/// Parsed shorthand rule.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Shorthand {
    /// `name: a > b` or `name: b < a`, normalised to `from -> to`.
    Directed {
        name: String,
        from: String,
        to: String,
    },
    /// `name: a - b`
    Bidirectional { name: String, a: String, b: String },
    /// Three or more states joined by the same operator.
    Chained {
        name: String,
        operator: Operator,
        states: Vec<String>,
    },
}

impl Shorthand {
    /// Parse a shorthand rule.
    ///
    /// # Example
    ///
    /// ```rust
    /// use statewise::builder::Shorthand;
    ///
    /// let rule = Shorthand::parse("next: intro > form > done").unwrap();
    /// assert_eq!(
    ///     rule.edges(),
    ///     vec![
    ///         ("intro".to_string(), "form".to_string()),
    ///         ("form".to_string(), "done".to_string()),
    ///     ]
    /// );
    /// ```
    pub fn parse(rule: &str) -> Result<Self, BuildError> {
        let tokens = tokenize(rule)?;
        let mut tokens = tokens.into_iter().peekable();

        let name = match tokens.next() {
            Some(Token::Name(name)) => name,
            _ => return Err(malformed(rule, "expected an action name")),
        };
        if matches!(tokens.peek(), Some(Token::Separator)) {
            tokens.next();
        }

        let mut states = Vec::new();
        let mut operator: Option<Operator> = None;
        match tokens.next() {
            Some(Token::Name(state)) => states.push(state),
            _ => return Err(malformed(rule, "expected a source state")),
        }

        while let Some(token) = tokens.next() {
            let op = match token {
                Token::Operator(op) => op,
                _ => return Err(malformed(rule, "expected '>', '<' or '-'")),
            };
            if let Some(previous) = operator {
                if previous != op {
                    return Err(malformed(
                        rule,
                        &format!(
                            "cannot mix '{}' and '{}' in one rule",
                            previous.as_char(),
                            op.as_char()
                        ),
                    ));
                }
            }
            operator = Some(op);

            match tokens.next() {
                Some(Token::Name(state)) => states.push(state),
                _ => return Err(malformed(rule, "expected a state after operator")),
            }
        }

        let Some(operator) = operator else {
            return Err(malformed(rule, "expected at least two states"));
        };

        let shorthand = match (operator, states.as_slice()) {
            (Operator::Forward, [from, to]) => Self::Directed {
                name,
                from: from.clone(),
                to: to.clone(),
            },
            (Operator::Backward, [to, from]) => Self::Directed {
                name,
                from: from.clone(),
                to: to.clone(),
            },
            (Operator::Both, [a, b]) => Self::Bidirectional {
                name,
                a: a.clone(),
                b: b.clone(),
            },
            _ => Self::Chained {
                name,
                operator,
                states,
            },
        };
        Ok(shorthand)
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Directed { name, .. }
            | Self::Bidirectional { name, .. }
            | Self::Chained { name, .. } => name,
        }
    }

    /// Expand into directed `(from, to)` pairs, in declaration order.
    pub fn edges(&self) -> Vec<(String, String)> {
        match self {
            Self::Directed { from, to, .. } => vec![(from.clone(), to.clone())],
            Self::Bidirectional { a, b, .. } => Operator::Both.edges(a, b),
            Self::Chained {
                operator, states, ..
            } => states
                .windows(2)
                .flat_map(|pair| operator.edges(&pair[0], &pair[1]))
                .collect(),
        }
    }
}

#[derive(Debug, PartialEq)]
enum Token {
    Name(String),
    Separator,
    Operator(Operator),
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn tokenize(rule: &str) -> Result<Vec<Token>, BuildError> {
    let mut tokens = Vec::new();
    let mut chars = rule.chars().peekable();

    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
        } else if c == ':' || c == '=' {
            chars.next();
            tokens.push(Token::Separator);
        } else if let Some(op) = Operator::from_char(c) {
            chars.next();
            tokens.push(Token::Operator(op));
        } else if is_name_char(c) {
            let mut name = String::new();
            while let Some(&c) = chars.peek() {
                if !is_name_char(c) {
                    break;
                }
                name.push(c);
                chars.next();
            }
            tokens.push(Token::Name(name));
        } else {
            return Err(malformed(rule, &format!("unexpected character '{c}'")));
        }
    }

    Ok(tokens)
}

fn malformed(rule: &str, reason: &str) -> BuildError {
    BuildError::MalformedRule {
        rule: rule.to_string(),
        reason: reason.to_string(),
    }
}
