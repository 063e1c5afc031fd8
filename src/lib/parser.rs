use crate::lib::ast::{
    BlockStatement, Expression, Identifier, InfixOperator, PrefixOperator, Program, Statement,
};
use crate::lib::scanner::{Lexer, Token, TokenType};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("expected next token to be {expected}, got {got} instead")]
    UnexpectedToken {
        expected: TokenType,
        got: TokenType,
    },

    #[error("no prefix parse function for {0} found")]
    NoPrefixParseFn(TokenType),

    #[error("could not parse '{0}' as integer")]
    InvalidIntegerLiteral(String),
}

/// Binding power for Pratt parsing, weakest first. The derived `Ord` gives
/// the total order the expression loop compares against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Precedence {
    Lowest,
    Equals,
    LessGreater,
    Sum,
    Product,
    Prefix,
    Call,
    Index,
}

fn precedence_of(token_type: TokenType) -> Precedence {
    match token_type {
        TokenType::EqualEqual | TokenType::BangEqual => Precedence::Equals,
        TokenType::Less | TokenType::Greater => Precedence::LessGreater,
        TokenType::Plus | TokenType::Minus => Precedence::Sum,
        TokenType::Star | TokenType::Slash => Precedence::Product,
        TokenType::LeftParen => Precedence::Call,
        TokenType::LeftBracket => Precedence::Index,
        _ => Precedence::Lowest,
    }
}

fn infix_operator(token_type: TokenType) -> Option<InfixOperator> {
    let operator = match token_type {
        TokenType::Plus => InfixOperator::Plus,
        TokenType::Minus => InfixOperator::Minus,
        TokenType::Star => InfixOperator::Star,
        TokenType::Slash => InfixOperator::Slash,
        TokenType::Less => InfixOperator::Less,
        TokenType::Greater => InfixOperator::Greater,
        TokenType::EqualEqual => InfixOperator::Equal,
        TokenType::BangEqual => InfixOperator::NotEqual,
        _ => return None,
    };
    Some(operator)
}

pub struct Parser<'a> {
    lexer: Lexer<'a>,
    cur_token: Token,
    peek_token: Token,
    errors: Vec<ParseError>,
}

impl<'a> Parser<'a> {
    pub fn new(mut lexer: Lexer<'a>) -> Self {
        let cur_token = lexer.next_token();
        let peek_token = lexer.next_token();
        Parser {
            lexer,
            cur_token,
            peek_token,
            errors: Vec::new(),
        }
    }

    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    /// Parses the whole token stream into a `Program`. Never fails: malformed
    /// constructs are recorded in the error list and parsing resumes at the
    /// next statement.
    pub fn parse_program(&mut self) -> Program {
        let mut statements = Vec::new();
        while !self.cur_is(TokenType::Eof) {
            if let Some(stmt) = self.parse_statement() {
                statements.push(stmt);
            }
            self.next_token();
        }
        debug!(
            statements = statements.len(),
            errors = self.errors.len(),
            "parsed program"
        );
        Program { statements }
    }

    fn next_token(&mut self) {
        self.cur_token = std::mem::replace(&mut self.peek_token, self.lexer.next_token());
    }

    fn cur_is(&self, token_type: TokenType) -> bool {
        self.cur_token.token_type == token_type
    }

    fn peek_is(&self, token_type: TokenType) -> bool {
        self.peek_token.token_type == token_type
    }

    fn expect_peek(&mut self, expected: TokenType) -> bool {
        if self.peek_is(expected) {
            self.next_token();
            true
        } else {
            self.errors.push(ParseError::UnexpectedToken {
                expected,
                got: self.peek_token.token_type,
            });
            false
        }
    }

    fn parse_statement(&mut self) -> Option<Statement> {
        match self.cur_token.token_type {
            TokenType::Let => self.parse_let_statement(),
            TokenType::Return => self.parse_return_statement(),
            _ => self.parse_expression_statement(),
        }
    }

    fn parse_let_statement(&mut self) -> Option<Statement> {
        if !self.expect_peek(TokenType::Identifier) {
            return None;
        }
        let name = Identifier::new(self.cur_token.literal.clone());
        if !self.expect_peek(TokenType::Assign) {
            return None;
        }
        self.next_token();
        let value = self.parse_expression(Precedence::Lowest)?;
        if self.peek_is(TokenType::Semicolon) {
            self.next_token();
        }
        Some(Statement::Let { name, value })
    }

    fn parse_return_statement(&mut self) -> Option<Statement> {
        self.next_token();
        let value = self.parse_expression(Precedence::Lowest)?;
        if self.peek_is(TokenType::Semicolon) {
            self.next_token();
        }
        Some(Statement::Return { value })
    }

    fn parse_expression_statement(&mut self) -> Option<Statement> {
        let expression = self.parse_expression(Precedence::Lowest)?;
        if self.peek_is(TokenType::Semicolon) {
            self.next_token();
        }
        Some(Statement::Expression { expression })
    }

    /// The Pratt loop: parse a prefix for the current token, then fold in
    /// infix constructs for as long as the lookahead binds tighter than
    /// `min_precedence`.
    fn parse_expression(&mut self, min_precedence: Precedence) -> Option<Expression> {
        let mut left = self.parse_prefix()?;

        while !self.peek_is(TokenType::Semicolon)
            && min_precedence < precedence_of(self.peek_token.token_type)
        {
            left = match self.peek_token.token_type {
                TokenType::Plus
                | TokenType::Minus
                | TokenType::Star
                | TokenType::Slash
                | TokenType::Less
                | TokenType::Greater
                | TokenType::EqualEqual
                | TokenType::BangEqual => {
                    self.next_token();
                    self.parse_infix_expression(left)?
                }
                TokenType::LeftParen => {
                    self.next_token();
                    self.parse_call_expression(left)?
                }
                TokenType::LeftBracket => {
                    self.next_token();
                    self.parse_index_expression(left)?
                }
                _ => break,
            };
        }
        Some(left)
    }

    // Prefix dispatch: one arm per token type that may start an expression.
    fn parse_prefix(&mut self) -> Option<Expression> {
        match self.cur_token.token_type {
            TokenType::Identifier => Some(Expression::Identifier(Identifier::new(
                self.cur_token.literal.clone(),
            ))),
            TokenType::Int => self.parse_integer_literal(),
            TokenType::Str => Some(Expression::StringLiteral(self.cur_token.literal.clone())),
            TokenType::True => Some(Expression::BooleanLiteral(true)),
            TokenType::False => Some(Expression::BooleanLiteral(false)),
            TokenType::Bang => self.parse_prefix_expression(PrefixOperator::Bang),
            TokenType::Minus => self.parse_prefix_expression(PrefixOperator::Minus),
            TokenType::LeftParen => self.parse_grouped_expression(),
            TokenType::If => self.parse_if_expression(),
            TokenType::Function => self.parse_function_literal(),
            TokenType::LeftBracket => {
                let elements = self.parse_expression_list(TokenType::RightBracket)?;
                Some(Expression::ArrayLiteral(elements))
            }
            TokenType::LeftBrace => self.parse_hash_literal(),
            other => {
                self.errors.push(ParseError::NoPrefixParseFn(other));
                None
            }
        }
    }

    fn parse_integer_literal(&mut self) -> Option<Expression> {
        match self.cur_token.literal.parse::<i64>() {
            Ok(value) => Some(Expression::IntegerLiteral(value)),
            Err(_) => {
                self.errors
                    .push(ParseError::InvalidIntegerLiteral(self.cur_token.literal.clone()));
                None
            }
        }
    }

    fn parse_prefix_expression(&mut self, operator: PrefixOperator) -> Option<Expression> {
        self.next_token();
        let right = self.parse_expression(Precedence::Prefix)?;
        Some(Expression::Prefix {
            operator,
            right: Box::new(right),
        })
    }

    fn parse_infix_expression(&mut self, left: Expression) -> Option<Expression> {
        let operator = infix_operator(self.cur_token.token_type)?;
        let precedence = precedence_of(self.cur_token.token_type);
        self.next_token();
        let right = self.parse_expression(precedence)?;
        Some(Expression::Infix {
            operator,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    fn parse_grouped_expression(&mut self) -> Option<Expression> {
        self.next_token();
        let expression = self.parse_expression(Precedence::Lowest)?;
        if !self.expect_peek(TokenType::RightParen) {
            return None;
        }
        Some(expression)
    }

    fn parse_if_expression(&mut self) -> Option<Expression> {
        if !self.expect_peek(TokenType::LeftParen) {
            return None;
        }
        self.next_token();
        let condition = self.parse_expression(Precedence::Lowest)?;
        if !self.expect_peek(TokenType::RightParen) {
            return None;
        }
        if !self.expect_peek(TokenType::LeftBrace) {
            return None;
        }
        let consequence = self.parse_block_statement();

        let alternative = if self.peek_is(TokenType::Else) {
            self.next_token();
            if self.peek_is(TokenType::If) {
                // `else if` chains recurse into the if-parser; the nested if
                // becomes the sole statement of the alternative block.
                self.next_token();
                let nested = self.parse_if_expression()?;
                Some(BlockStatement {
                    statements: vec![Statement::Expression { expression: nested }],
                })
            } else {
                if !self.expect_peek(TokenType::LeftBrace) {
                    return None;
                }
                Some(self.parse_block_statement())
            }
        } else {
            None
        };

        Some(Expression::If {
            condition: Box::new(condition),
            consequence,
            alternative,
        })
    }

    // Current token is the opening brace on entry, the closing brace (or EOF)
    // on exit.
    fn parse_block_statement(&mut self) -> BlockStatement {
        let mut statements = Vec::new();
        self.next_token();
        while !self.cur_is(TokenType::RightBrace) && !self.cur_is(TokenType::Eof) {
            if let Some(stmt) = self.parse_statement() {
                statements.push(stmt);
            }
            self.next_token();
        }
        BlockStatement { statements }
    }

    fn parse_function_literal(&mut self) -> Option<Expression> {
        if !self.expect_peek(TokenType::LeftParen) {
            return None;
        }
        let parameters = self.parse_function_parameters()?;
        if !self.expect_peek(TokenType::LeftBrace) {
            return None;
        }
        let body = self.parse_block_statement();
        Some(Expression::FunctionLiteral { parameters, body })
    }

    fn parse_function_parameters(&mut self) -> Option<Vec<Identifier>> {
        let mut parameters = Vec::new();
        if self.peek_is(TokenType::RightParen) {
            self.next_token();
            return Some(parameters);
        }
        if !self.expect_peek(TokenType::Identifier) {
            return None;
        }
        parameters.push(Identifier::new(self.cur_token.literal.clone()));
        while self.peek_is(TokenType::Comma) {
            self.next_token();
            if !self.expect_peek(TokenType::Identifier) {
                return None;
            }
            parameters.push(Identifier::new(self.cur_token.literal.clone()));
        }
        if !self.expect_peek(TokenType::RightParen) {
            return None;
        }
        Some(parameters)
    }

    // Shared by call arguments and array literals: a comma-separated list of
    // expressions up to the closing delimiter. Current token is the opening
    // delimiter on entry.
    fn parse_expression_list(&mut self, end: TokenType) -> Option<Vec<Expression>> {
        let mut items = Vec::new();
        if self.peek_is(end) {
            self.next_token();
            return Some(items);
        }
        self.next_token();
        items.push(self.parse_expression(Precedence::Lowest)?);
        while self.peek_is(TokenType::Comma) {
            self.next_token();
            self.next_token();
            items.push(self.parse_expression(Precedence::Lowest)?);
        }
        if !self.expect_peek(end) {
            return None;
        }
        Some(items)
    }

    fn parse_call_expression(&mut self, callee: Expression) -> Option<Expression> {
        let arguments = self.parse_expression_list(TokenType::RightParen)?;
        Some(Expression::Call {
            callee: Box::new(callee),
            arguments,
        })
    }

    fn parse_index_expression(&mut self, left: Expression) -> Option<Expression> {
        self.next_token();
        let index = self.parse_expression(Precedence::Lowest)?;
        if !self.expect_peek(TokenType::RightBracket) {
            return None;
        }
        Some(Expression::Index {
            left: Box::new(left),
            index: Box::new(index),
        })
    }

    fn parse_hash_literal(&mut self) -> Option<Expression> {
        let mut pairs = Vec::new();
        while !self.peek_is(TokenType::RightBrace) {
            self.next_token();
            let key = self.parse_expression(Precedence::Lowest)?;
            if !self.expect_peek(TokenType::Colon) {
                return None;
            }
            self.next_token();
            let value = self.parse_expression(Precedence::Lowest)?;
            pairs.push((key, value));
            if !self.peek_is(TokenType::RightBrace) && !self.expect_peek(TokenType::Comma) {
                return None;
            }
        }
        if !self.expect_peek(TokenType::RightBrace) {
            return None;
        }
        Some(Expression::HashLiteral(pairs))
    }
}

/// The front end's entry point: parse a full source text, returning the
/// program together with whatever errors were accumulated.
pub fn parse_program(source: &str) -> (Program, Vec<ParseError>) {
    let mut parser = Parser::new(Lexer::new(source));
    let program = parser.parse_program();
    (program, parser.errors)
}
