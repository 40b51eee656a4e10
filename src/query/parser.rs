//! Recursive descent parser for the supported path-expression subset
//!
//! ```text
//! Expr       := OrExpr
//! OrExpr     := AndExpr ('or' AndExpr)*
//! AndExpr    := EqExpr ('and' EqExpr)*
//! EqExpr     := RelExpr (('=' | '!=') RelExpr)*
//! RelExpr    := AddExpr (('<' | '<=' | '>' | '>=') AddExpr)*
//! AddExpr    := MulExpr (('+' | '-') MulExpr)*
//! MulExpr    := UnaryExpr (('*' | 'div' | 'mod') UnaryExpr)*
//! UnaryExpr  := '-' UnaryExpr | UnionExpr
//! UnionExpr  := PathExpr ('|' PathExpr)*
//! PathExpr   := LocationPath | FilterExpr (('/' | '//') RelativePath)?
//! FilterExpr := Primary Predicate*
//! ```

use crate::query::functions;
use crate::query::lexer::Token;

/// Expression tree
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    Literal(String),
    Path(LocationPath),
    /// Primary expression with predicates, optionally continued by steps
    Filter {
        primary: Box<Expr>,
        predicates: Vec<Expr>,
        steps: Vec<Step>,
    },
    Binary(Box<Expr>, BinaryOp, Box<Expr>),
    Negate(Box<Expr>),
    Union(Box<Expr>, Box<Expr>),
    Function(String, Vec<Expr>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Or,
    And,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

/// Sequence of steps, from the document root when `absolute`
#[derive(Debug, Clone, PartialEq)]
pub struct LocationPath {
    pub absolute: bool,
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub axis: Axis,
    pub test: NodeTest,
    pub predicates: Vec<Expr>,
}

impl Step {
    fn new(axis: Axis, test: NodeTest) -> Self {
        Self {
            axis,
            test,
            predicates: Vec::new(),
        }
    }

    /// The step `//` abbreviates
    fn descendant_or_self() -> Self {
        Self::new(Axis::DescendantOrSelf, NodeTest::Node)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Child,
    Descendant,
    DescendantOrSelf,
    SelfAxis,
    Parent,
    Attribute,
}

impl Axis {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "child" => Some(Axis::Child),
            "descendant" => Some(Axis::Descendant),
            "descendant-or-self" => Some(Axis::DescendantOrSelf),
            "self" => Some(Axis::SelfAxis),
            "parent" => Some(Axis::Parent),
            "attribute" => Some(Axis::Attribute),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeTest {
    /// `*`: any node of the axis' principal type
    Wildcard,
    Name(String),
    /// `text()`
    Text,
    /// `node()`
    Node,
}

/// Parser over a token stream
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, expected: &Token) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: Token) -> Result<(), String> {
        match self.next() {
            Some(token) if token == expected => Ok(()),
            Some(token) => Err(format!("expected {:?}, found {:?}", expected, token)),
            None => Err(format!("expected {:?}, found end of expression", expected)),
        }
    }

    /// Parse a complete expression; leftover tokens are an error
    pub fn parse(mut self) -> Result<Expr, String> {
        if self.tokens.is_empty() {
            return Err("empty expression".to_string());
        }
        let expr = self.parse_or()?;
        match self.peek() {
            None => Ok(expr),
            Some(token) => Err(format!("unexpected trailing token {:?}", token)),
        }
    }

    fn parse_or(&mut self) -> Result<Expr, String> {
        let mut left = self.parse_and()?;
        while self.eat(&Token::Or) {
            let right = self.parse_and()?;
            left = Expr::Binary(Box::new(left), BinaryOp::Or, Box::new(right));
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expr, String> {
        let mut left = self.parse_equality()?;
        while self.eat(&Token::And) {
            let right = self.parse_equality()?;
            left = Expr::Binary(Box::new(left), BinaryOp::And, Box::new(right));
        }
        Ok(left)
    }

    fn parse_equality(&mut self) -> Result<Expr, String> {
        let mut left = self.parse_relational()?;
        loop {
            let op = match self.peek() {
                Some(Token::Eq) => BinaryOp::Eq,
                Some(Token::NotEq) => BinaryOp::NotEq,
                _ => return Ok(left),
            };
            self.pos += 1;
            let right = self.parse_relational()?;
            left = Expr::Binary(Box::new(left), op, Box::new(right));
        }
    }

    fn parse_relational(&mut self) -> Result<Expr, String> {
        let mut left = self.parse_additive()?;
        loop {
            let op = match self.peek() {
                Some(Token::Lt) => BinaryOp::Lt,
                Some(Token::LtEq) => BinaryOp::LtEq,
                Some(Token::Gt) => BinaryOp::Gt,
                Some(Token::GtEq) => BinaryOp::GtEq,
                _ => return Ok(left),
            };
            self.pos += 1;
            let right = self.parse_additive()?;
            left = Expr::Binary(Box::new(left), op, Box::new(right));
        }
    }

    fn parse_additive(&mut self) -> Result<Expr, String> {
        let mut left = self.parse_multiplicative()?;
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => BinaryOp::Add,
                Some(Token::Minus) => BinaryOp::Sub,
                _ => return Ok(left),
            };
            self.pos += 1;
            let right = self.parse_multiplicative()?;
            left = Expr::Binary(Box::new(left), op, Box::new(right));
        }
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, String> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.peek() {
                Some(Token::Multiply) => BinaryOp::Mul,
                Some(Token::Div) => BinaryOp::Div,
                Some(Token::Mod) => BinaryOp::Mod,
                _ => return Ok(left),
            };
            self.pos += 1;
            let right = self.parse_unary()?;
            left = Expr::Binary(Box::new(left), op, Box::new(right));
        }
    }

    fn parse_unary(&mut self) -> Result<Expr, String> {
        if self.eat(&Token::Minus) {
            let operand = self.parse_unary()?;
            return Ok(Expr::Negate(Box::new(operand)));
        }
        self.parse_union()
    }

    fn parse_union(&mut self) -> Result<Expr, String> {
        let mut left = self.parse_path()?;
        while self.eat(&Token::Pipe) {
            let right = self.parse_path()?;
            left = Expr::Union(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_path(&mut self) -> Result<Expr, String> {
        match self.peek() {
            Some(Token::Slash) => {
                self.pos += 1;
                let steps = if self.starts_step() {
                    self.parse_relative_path()?
                } else {
                    Vec::new()
                };
                Ok(Expr::Path(LocationPath {
                    absolute: true,
                    steps,
                }))
            }
            Some(Token::DoubleSlash) => {
                self.pos += 1;
                let mut steps = vec![Step::descendant_or_self()];
                steps.extend(self.parse_relative_path()?);
                Ok(Expr::Path(LocationPath {
                    absolute: true,
                    steps,
                }))
            }
            _ if self.starts_step() => Ok(Expr::Path(LocationPath {
                absolute: false,
                steps: self.parse_relative_path()?,
            })),
            _ => self.parse_filter(),
        }
    }

    fn starts_step(&self) -> bool {
        matches!(
            self.peek(),
            Some(
                Token::Dot
                    | Token::DoubleDot
                    | Token::At
                    | Token::Star
                    | Token::Name(_)
                    | Token::NodeType(_)
                    | Token::AxisName(_)
            )
        )
    }

    fn parse_relative_path(&mut self) -> Result<Vec<Step>, String> {
        let mut steps = vec![self.parse_step()?];
        self.parse_continuation(&mut steps)?;
        Ok(steps)
    }

    /// `('/' Step | '//' Step)*`
    fn parse_continuation(&mut self, steps: &mut Vec<Step>) -> Result<(), String> {
        loop {
            if self.eat(&Token::Slash) {
                steps.push(self.parse_step()?);
            } else if self.eat(&Token::DoubleSlash) {
                steps.push(Step::descendant_or_self());
                steps.push(self.parse_step()?);
            } else {
                return Ok(());
            }
        }
    }

    fn parse_step(&mut self) -> Result<Step, String> {
        if self.eat(&Token::Dot) {
            return Ok(Step::new(Axis::SelfAxis, NodeTest::Node));
        }
        if self.eat(&Token::DoubleDot) {
            return Ok(Step::new(Axis::Parent, NodeTest::Node));
        }

        let axis = if self.eat(&Token::At) {
            Axis::Attribute
        } else if let Some(Token::AxisName(name)) = self.peek() {
            let axis = Axis::from_name(name).ok_or_else(|| format!("unsupported axis '{}'", name))?;
            self.pos += 1;
            self.expect(Token::DoubleColon)?;
            axis
        } else {
            Axis::Child
        };

        let test = match self.next() {
            Some(Token::Star) => NodeTest::Wildcard,
            Some(Token::Name(name)) => NodeTest::Name(name),
            Some(Token::NodeType(kind)) => {
                self.expect(Token::LeftParen)?;
                self.expect(Token::RightParen)?;
                match kind.as_str() {
                    "text" => NodeTest::Text,
                    "node" => NodeTest::Node,
                    other => return Err(format!("unsupported node test '{}()'", other)),
                }
            }
            Some(token) => return Err(format!("expected a node test, found {:?}", token)),
            None => return Err("expected a node test, found end of expression".to_string()),
        };

        let mut step = Step::new(axis, test);
        step.predicates = self.parse_predicates()?;
        Ok(step)
    }

    fn parse_predicates(&mut self) -> Result<Vec<Expr>, String> {
        let mut predicates = Vec::new();
        while self.eat(&Token::LeftBracket) {
            predicates.push(self.parse_or()?);
            self.expect(Token::RightBracket)?;
        }
        Ok(predicates)
    }

    fn parse_filter(&mut self) -> Result<Expr, String> {
        let primary = self.parse_primary()?;
        let predicates = self.parse_predicates()?;
        let mut steps = Vec::new();
        if matches!(self.peek(), Some(Token::Slash | Token::DoubleSlash)) {
            self.parse_continuation(&mut steps)?;
        }

        if predicates.is_empty() && steps.is_empty() {
            Ok(primary)
        } else {
            Ok(Expr::Filter {
                primary: Box::new(primary),
                predicates,
                steps,
            })
        }
    }

    fn parse_primary(&mut self) -> Result<Expr, String> {
        match self.next() {
            Some(Token::Number(n)) => Ok(Expr::Number(n)),
            Some(Token::Literal(s)) => Ok(Expr::Literal(s)),
            Some(Token::LeftParen) => {
                let inner = self.parse_or()?;
                self.expect(Token::RightParen)?;
                Ok(inner)
            }
            Some(Token::FunctionName(name)) => self.parse_call(name),
            Some(Token::Dollar) => Err("variable references are not supported".to_string()),
            Some(token) => Err(format!("unexpected token {:?}", token)),
            None => Err("unexpected end of expression".to_string()),
        }
    }

    fn parse_call(&mut self, name: String) -> Result<Expr, String> {
        let (min, max) =
            functions::arity(&name).ok_or_else(|| format!("unknown function '{}'", name))?;

        self.expect(Token::LeftParen)?;
        let mut args = Vec::new();
        if !self.eat(&Token::RightParen) {
            loop {
                args.push(self.parse_or()?);
                if self.eat(&Token::Comma) {
                    continue;
                }
                self.expect(Token::RightParen)?;
                break;
            }
        }

        if args.len() < min || max.is_some_and(|max| args.len() > max) {
            let expected = match max {
                Some(max) if max == min => format!("{}", min),
                Some(max) => format!("{} to {}", min, max),
                None => format!("at least {}", min),
            };
            return Err(format!(
                "function '{}' takes {} argument(s), got {}",
                name,
                expected,
                args.len()
            ));
        }

        Ok(Expr::Function(name, args))
    }
}

/// Parse a token stream into an expression tree
pub fn parse(tokens: Vec<Token>) -> Result<Expr, String> {
    Parser::new(tokens).parse()
}
