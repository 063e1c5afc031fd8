use phf::phf_map;
use std::fmt;
use std::iter::Peekable;
use std::str::Chars;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenType {
    Illegal,
    Eof,

    // Identifiers and literals
    Identifier,
    Int,
    Str,

    // Operators
    Assign,
    Plus,
    Minus,
    Bang,
    Star,
    Slash,
    Less,
    Greater,
    EqualEqual,
    BangEqual,

    // Delimiters
    Comma,
    Semicolon,
    Colon,
    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,
    LeftBracket,
    RightBracket,

    // Keywords
    Function,
    Let,
    True,
    False,
    If,
    Else,
    Return,
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            TokenType::Illegal => "ILLEGAL",
            TokenType::Eof => "EOF",
            TokenType::Identifier => "IDENT",
            TokenType::Int => "INT",
            TokenType::Str => "STRING",
            TokenType::Assign => "=",
            TokenType::Plus => "+",
            TokenType::Minus => "-",
            TokenType::Bang => "!",
            TokenType::Star => "*",
            TokenType::Slash => "/",
            TokenType::Less => "<",
            TokenType::Greater => ">",
            TokenType::EqualEqual => "==",
            TokenType::BangEqual => "!=",
            TokenType::Comma => ",",
            TokenType::Semicolon => ";",
            TokenType::Colon => ":",
            TokenType::LeftParen => "(",
            TokenType::RightParen => ")",
            TokenType::LeftBrace => "{",
            TokenType::RightBrace => "}",
            TokenType::LeftBracket => "[",
            TokenType::RightBracket => "]",
            TokenType::Function => "fn",
            TokenType::Let => "let",
            TokenType::True => "true",
            TokenType::False => "false",
            TokenType::If => "if",
            TokenType::Else => "else",
            TokenType::Return => "return",
        };
        write!(f, "{}", tag)
    }
}

static KEYWORDS: phf::Map<&'static str, TokenType> = phf_map! {
    "fn" => TokenType::Function,
    "let" => TokenType::Let,
    "true" => TokenType::True,
    "false" => TokenType::False,
    "if" => TokenType::If,
    "else" => TokenType::Else,
    "return" => TokenType::Return,
};

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub token_type: TokenType,
    pub literal: String,
}

impl Token {
    pub fn new(token_type: TokenType, literal: impl Into<String>) -> Self {
        Token {
            token_type,
            literal: literal.into(),
        }
    }

    pub fn eof() -> Self {
        Token::new(TokenType::Eof, "")
    }
}

#[derive(Debug)]
pub struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Lexer {
            chars: source.chars().peekable(),
        }
    }

    /// Produces the next token from the source, or an EOF token forever once
    /// the input is exhausted. Unknown characters become ILLEGAL tokens; the
    /// lexer itself never fails.
    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace();
        let c = match self.chars.next() {
            Some(v) => v,
            None => return Token::eof(),
        };
        let token = match c {
            '=' => {
                if self.peek_match('=') {
                    // Unwrap is guarded by the peek above.
                    let second = self.chars.next().unwrap();
                    Token::new(TokenType::EqualEqual, String::from_iter([c, second]))
                } else {
                    Token::new(TokenType::Assign, c)
                }
            }
            '!' => {
                if self.peek_match('=') {
                    let second = self.chars.next().unwrap();
                    Token::new(TokenType::BangEqual, String::from_iter([c, second]))
                } else {
                    Token::new(TokenType::Bang, c)
                }
            }
            '+' => Token::new(TokenType::Plus, c),
            '-' => Token::new(TokenType::Minus, c),
            '*' => Token::new(TokenType::Star, c),
            '/' => Token::new(TokenType::Slash, c),
            '<' => Token::new(TokenType::Less, c),
            '>' => Token::new(TokenType::Greater, c),
            ',' => Token::new(TokenType::Comma, c),
            ';' => Token::new(TokenType::Semicolon, c),
            ':' => Token::new(TokenType::Colon, c),
            '(' => Token::new(TokenType::LeftParen, c),
            ')' => Token::new(TokenType::RightParen, c),
            '{' => Token::new(TokenType::LeftBrace, c),
            '}' => Token::new(TokenType::RightBrace, c),
            '[' => Token::new(TokenType::LeftBracket, c),
            ']' => Token::new(TokenType::RightBracket, c),
            '"' => Token::new(TokenType::Str, self.consume_string()),
            default => {
                if is_digit(default) {
                    Token::new(TokenType::Int, self.consume_number(default))
                } else if is_letter(default) {
                    let literal = self.consume_identifier(default);
                    let token_type = KEYWORDS
                        .get(&literal)
                        .copied()
                        .unwrap_or(TokenType::Identifier);
                    Token::new(token_type, literal)
                } else {
                    Token::new(TokenType::Illegal, c)
                }
            }
        };
        debug!(?token.token_type, token.literal = token.literal.as_str());
        token
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.chars.peek() {
            if matches!(c, ' ' | '\t' | '\n' | '\r') {
                let _ = self.chars.next();
            } else {
                break;
            }
        }
    }

    fn peek_match(&mut self, val: char) -> bool {
        matches!(self.chars.peek(), Some(v) if *v == val)
    }

    // No escape sequences; an unterminated string consumes to end of input.
    fn consume_string(&mut self) -> String {
        let mut content: Vec<char> = Vec::new();
        while let Some(v) = self.chars.peek() {
            if *v == '"' {
                break;
            }
            // Guarded by the peek above.
            content.push(self.chars.next().unwrap());
        }
        // Also consume the closing double-quote, if any.
        let _ = self.chars.next();
        String::from_iter(content)
    }

    fn consume_number(&mut self, first_char: char) -> String {
        let mut content: Vec<char> = vec![first_char];
        while let Some(v) = self.chars.peek() {
            if is_digit(*v) {
                content.push(self.chars.next().unwrap());
            } else {
                break;
            }
        }
        String::from_iter(content)
    }

    fn consume_identifier(&mut self, first_char: char) -> String {
        let mut content: Vec<char> = vec![first_char];
        while let Some(v) = self.chars.peek() {
            if is_letter(*v) || is_digit(*v) {
                content.push(self.chars.next().unwrap());
            } else {
                break;
            }
        }
        String::from_iter(content)
    }
}

fn is_digit(c: char) -> bool {
    c.is_ascii_digit()
}

fn is_letter(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

/// Scans the whole source into tokens, stopping after the EOF token.
pub fn scan(source: &str) -> Vec<Token> {
    let mut lexer = Lexer::new(source);
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token();
        let done = token.token_type == TokenType::Eof;
        tokens.push(token);
        if done {
            break;
        }
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    #[test]
    fn test_whitespace_only_yields_eof() -> Result<()> {
        let tokens = scan("\r\t \n");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].token_type, TokenType::Eof);
        Ok(())
    }

    #[test]
    fn test_eof_is_sticky() -> Result<()> {
        let mut lexer = Lexer::new("x");
        assert_eq!(lexer.next_token().token_type, TokenType::Identifier);
        for _ in 0..3 {
            assert_eq!(lexer.next_token().token_type, TokenType::Eof);
        }
        Ok(())
    }

    #[test]
    fn test_keywords_are_identified() -> Result<()> {
        let keyword_soup = KEYWORDS.keys().map(|k| &**k).collect::<Vec<&str>>().join(" ");
        let tokens = scan(&keyword_soup);
        // One token per keyword plus EOF.
        assert_eq!(tokens.len(), KEYWORDS.len() + 1);
        for t in tokens.iter().take(KEYWORDS.len()) {
            let expected = KEYWORDS.get(&t.literal).copied();
            assert_eq!(Some(t.token_type), expected);
        }
        Ok(())
    }

    #[test]
    fn test_single_and_double_char_tokens() -> Result<()> {
        let token_types = [
            ("=", TokenType::Assign),
            ("+", TokenType::Plus),
            ("-", TokenType::Minus),
            ("!", TokenType::Bang),
            ("*", TokenType::Star),
            ("/", TokenType::Slash),
            ("<", TokenType::Less),
            (">", TokenType::Greater),
            ("==", TokenType::EqualEqual),
            ("!=", TokenType::BangEqual),
            (",", TokenType::Comma),
            (";", TokenType::Semicolon),
            (":", TokenType::Colon),
            ("(", TokenType::LeftParen),
            (")", TokenType::RightParen),
            ("{", TokenType::LeftBrace),
            ("}", TokenType::RightBrace),
            ("[", TokenType::LeftBracket),
            ("]", TokenType::RightBracket),
        ];
        let token_soup = token_types
            .iter()
            .map(|(l, _t)| *l)
            .collect::<Vec<&str>>()
            .join(" ");
        let tokens = scan(&token_soup);

        for (i, (literal, token_type)) in token_types.iter().enumerate() {
            assert_eq!(*literal, tokens[i].literal);
            assert_eq!(*token_type, tokens[i].token_type);
        }
        Ok(())
    }

    #[test]
    fn test_full_statement() -> Result<()> {
        let src = r#"let add = fn(x, y) { x + y; }; add(5, 10) == 15;"#;
        let expected = [
            (TokenType::Let, "let"),
            (TokenType::Identifier, "add"),
            (TokenType::Assign, "="),
            (TokenType::Function, "fn"),
            (TokenType::LeftParen, "("),
            (TokenType::Identifier, "x"),
            (TokenType::Comma, ","),
            (TokenType::Identifier, "y"),
            (TokenType::RightParen, ")"),
            (TokenType::LeftBrace, "{"),
            (TokenType::Identifier, "x"),
            (TokenType::Plus, "+"),
            (TokenType::Identifier, "y"),
            (TokenType::Semicolon, ";"),
            (TokenType::RightBrace, "}"),
            (TokenType::Semicolon, ";"),
            (TokenType::Identifier, "add"),
            (TokenType::LeftParen, "("),
            (TokenType::Int, "5"),
            (TokenType::Comma, ","),
            (TokenType::Int, "10"),
            (TokenType::RightParen, ")"),
            (TokenType::EqualEqual, "=="),
            (TokenType::Int, "15"),
            (TokenType::Semicolon, ";"),
            (TokenType::Eof, ""),
        ];
        let tokens = scan(src);
        assert_eq!(tokens.len(), expected.len());
        for (token, (token_type, literal)) in std::iter::zip(&tokens, &expected) {
            assert_eq!(token.token_type, *token_type);
            assert_eq!(token.literal, *literal);
        }
        Ok(())
    }

    #[test]
    fn test_str() -> Result<()> {
        let tokens = scan("\"This is a string.\"");
        let t = &tokens[0];
        assert_eq!(t.token_type, TokenType::Str);
        assert_eq!(t.literal, "This is a string.");
        Ok(())
    }

    #[test]
    fn test_unterminated_str_consumes_to_end() -> Result<()> {
        let tokens = scan("\"no closing quote");
        assert_eq!(tokens[0].token_type, TokenType::Str);
        assert_eq!(tokens[0].literal, "no closing quote");
        assert_eq!(tokens[1].token_type, TokenType::Eof);
        Ok(())
    }

    #[test]
    fn test_illegal_characters() -> Result<()> {
        let tokens = scan("1 @ 2");
        assert_eq!(tokens[1].token_type, TokenType::Illegal);
        assert_eq!(tokens[1].literal, "@");
        assert_eq!(tokens[2].token_type, TokenType::Int);
        Ok(())
    }
}
