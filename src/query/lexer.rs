//! Path expression tokenizer

/// Path expression tokens
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Operators
    Slash,       // /
    DoubleSlash, // //
    Dot,         // .
    DoubleDot,   // ..
    At,          // @
    Pipe,        // |
    Plus,        // +
    Minus,       // -
    Star,        // * as a name test
    Multiply,    // * as an operator
    Eq,          // =
    NotEq,       // !=
    Lt,          // <
    LtEq,        // <=
    Gt,          // >
    GtEq,        // >=
    And,
    Or,
    Mod,
    Div,

    // Brackets
    LeftParen,
    RightParen,
    LeftBracket,
    RightBracket,

    Comma,
    DoubleColon,
    Dollar,

    Number(f64),
    Literal(String),

    /// Element or attribute name, possibly prefixed
    Name(String),
    /// `node`, `text`, `comment`, `processing-instruction` before `(`
    NodeType(String),
    /// Any other name before `(`
    FunctionName(String),
    /// Name before `::`
    AxisName(String),
}

impl Token {
    /// Whether a following `*` or `and`/`or`/`div`/`mod` is an operator.
    ///
    /// A token that ends an operand (name, literal, `)`, `]`, `.`, ...) puts
    /// the lexer in operator position.
    fn ends_operand(&self) -> bool {
        matches!(
            self,
            Token::Name(_)
                | Token::Star
                | Token::Number(_)
                | Token::Literal(_)
                | Token::RightParen
                | Token::RightBracket
                | Token::Dot
                | Token::DoubleDot
        )
    }
}

/// Tokenizer over one expression
pub struct Lexer<'a> {
    input: &'a str,
    pos: usize,
    previous: Option<Token>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Lexer {
            input,
            pos: 0,
            previous: None,
        }
    }

    fn remaining(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.remaining().chars().next()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.remaining().chars().nth(offset)
    }

    fn advance(&mut self, n: usize) {
        self.pos = (self.pos + n).min(self.input.len());
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.advance(c.len_utf8());
            } else {
                break;
            }
        }
    }

    fn operator_position(&self) -> bool {
        self.previous.as_ref().is_some_and(Token::ends_operand)
    }

    /// Next token, `None` at end of input
    pub fn next_token(&mut self) -> Result<Option<Token>, String> {
        let token = self.scan()?;
        if let Some(token) = &token {
            self.previous = Some(token.clone());
        }
        Ok(token)
    }

    fn scan(&mut self) -> Result<Option<Token>, String> {
        self.skip_whitespace();

        let Some(c) = self.peek() else {
            return Ok(None);
        };

        let token = match c {
            '/' => {
                self.advance(1);
                if self.peek() == Some('/') {
                    self.advance(1);
                    Token::DoubleSlash
                } else {
                    Token::Slash
                }
            }
            '.' => {
                if self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) {
                    return Ok(Some(self.read_number()));
                }
                self.advance(1);
                if self.peek() == Some('.') {
                    self.advance(1);
                    Token::DoubleDot
                } else {
                    Token::Dot
                }
            }
            '@' => self.single(Token::At),
            '|' => self.single(Token::Pipe),
            '+' => self.single(Token::Plus),
            '-' => self.single(Token::Minus),
            '*' => {
                if self.operator_position() {
                    self.single(Token::Multiply)
                } else {
                    self.single(Token::Star)
                }
            }
            '=' => self.single(Token::Eq),
            '!' => {
                if self.peek_at(1) == Some('=') {
                    self.advance(2);
                    Token::NotEq
                } else {
                    return Err(format!("unexpected character '!' at position {}", self.pos));
                }
            }
            '<' => {
                self.advance(1);
                if self.peek() == Some('=') {
                    self.advance(1);
                    Token::LtEq
                } else {
                    Token::Lt
                }
            }
            '>' => {
                self.advance(1);
                if self.peek() == Some('=') {
                    self.advance(1);
                    Token::GtEq
                } else {
                    Token::Gt
                }
            }
            '(' => self.single(Token::LeftParen),
            ')' => self.single(Token::RightParen),
            '[' => self.single(Token::LeftBracket),
            ']' => self.single(Token::RightBracket),
            ',' => self.single(Token::Comma),
            '$' => self.single(Token::Dollar),
            ':' => {
                if self.peek_at(1) == Some(':') {
                    self.advance(2);
                    Token::DoubleColon
                } else {
                    return Err(format!("unexpected character ':' at position {}", self.pos));
                }
            }
            '"' | '\'' => self.read_literal(c)?,
            '0'..='9' => self.read_number(),
            _ if is_name_start_char(c) => self.read_name(),
            _ => {
                return Err(format!(
                    "unexpected character '{}' at position {}",
                    c, self.pos
                ))
            }
        };

        Ok(Some(token))
    }

    fn single(&mut self, token: Token) -> Token {
        self.advance(1);
        token
    }

    fn read_number(&mut self) -> Token {
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.advance(1);
        }
        if self.peek() == Some('.') {
            self.advance(1);
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.advance(1);
            }
        }
        let value = self.input[start..self.pos].parse().unwrap_or(f64::NAN);
        Token::Number(value)
    }

    fn read_literal(&mut self, quote: char) -> Result<Token, String> {
        let open = self.pos;
        self.advance(1);
        let start = self.pos;
        match self.remaining().find(quote) {
            Some(length) => {
                let value = self.input[start..start + length].to_string();
                self.advance(length + 1);
                Ok(Token::Literal(value))
            }
            None => Err(format!("unterminated string literal at position {}", open)),
        }
    }

    fn read_name(&mut self) -> Token {
        let start = self.pos;
        self.consume_name_chars();

        // Prefixed name `p:local` or `p:*`, but not an axis `name::`
        if self.peek() == Some(':') && self.peek_at(1) != Some(':') {
            match self.peek_at(1) {
                Some('*') => self.advance(2),
                Some(c) if is_name_start_char(c) => {
                    self.advance(1);
                    self.consume_name_chars();
                }
                _ => {}
            }
        }

        let name = &self.input[start..self.pos];

        if self.operator_position() {
            match name {
                "and" => return Token::And,
                "or" => return Token::Or,
                "mod" => return Token::Mod,
                "div" => return Token::Div,
                _ => {}
            }
        }

        let mark = self.pos;
        self.skip_whitespace();
        if self.remaining().starts_with("::") {
            return Token::AxisName(name.to_string());
        }
        if self.peek() == Some('(') {
            return match name {
                "node" | "text" | "comment" | "processing-instruction" => {
                    Token::NodeType(name.to_string())
                }
                _ => Token::FunctionName(name.to_string()),
            };
        }
        self.pos = mark;
        Token::Name(name.to_string())
    }

    fn consume_name_chars(&mut self) {
        while let Some(c) = self.peek() {
            if is_name_char(c) {
                self.advance(c.len_utf8());
            } else {
                break;
            }
        }
    }
}

fn is_name_start_char(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | '\u{B7}')
}

/// Tokenize a whole expression
pub fn tokenize(input: &str) -> Result<Vec<Token>, String> {
    let mut lexer = Lexer::new(input);
    let mut tokens = Vec::new();
    while let Some(token) = lexer.next_token()? {
        tokens.push(token);
    }
    Ok(tokens)
}
