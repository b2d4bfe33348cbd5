// ABOUTME: Source text -> token stream
// Scans greedily at each position per the ordered rule set: line comments,
// import sigil, single- and two-character sigils, the comparison/equality
// run, bitwise/logic operators, numeric literals, the unary-or-binary
// +/-/*// disambiguation, identifiers (with keyword recognition), string
// literals, and whitespace.
//
// Negative numeric literals are never pre-signed into a single Number
// token here -- a leading `-` in unary position becomes its own
// UnaryOperator token and the parser builds a real Unary AST node. This
// departs from the original C lexer's behavior deliberately.

use crate::error::ZoxError;
use crate::token::{Token, TokenKind};

pub struct Lexer<'a> {
    source: &'a [u8],
    pos: usize,
    line: usize,
    column: usize,
    tokens: Vec<Token>,
}

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b >= 0x80 || b == b'_'
}

fn is_ident_continue(b: u8) -> bool {
    is_ident_start(b) || b.is_ascii_digit() || b == b'.'
}

/// True when the previous token means a following `+ - * /` must be unary,
/// per the scanning rule: absent, a binary operator, an open-paren, or a
/// comma.
fn prev_implies_unary(prev: Option<&Token>) -> bool {
    match prev {
        None => true,
        Some(t) => matches!(t.kind, TokenKind::BinaryOperator | TokenKind::OpenParen | TokenKind::Comma),
    }
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Lexer {
            source: source.as_bytes(),
            pos: 0,
            line: 1,
            column: 1,
            tokens: Vec::new(),
        }
    }

    pub fn tokenize(source: &'a str) -> Result<Vec<Token>, ZoxError> {
        let mut lexer = Lexer::new(source);
        lexer.run()?;
        Ok(lexer.tokens)
    }

    fn peek(&self) -> Option<u8> {
        self.source.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.source.get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.pos += 1;
        if b == b'\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(b)
    }

    fn push(&mut self, lexeme: impl Into<String>, kind: TokenKind, line: usize, column: usize) {
        self.tokens.push(Token::new(lexeme, kind, line, column));
    }

    fn run(&mut self) -> Result<(), ZoxError> {
        loop {
            self.skip_whitespace();
            let Some(b) = self.peek() else { break };
            let line = self.line;
            let column = self.column;

            match b {
                b'-' if self.peek_at(1) == Some(b'#') => {
                    self.skip_line_comment();
                }
                b'~' if self.peek_at(1) == Some(b'>') => {
                    self.advance();
                    self.advance();
                    self.push("~>", TokenKind::Import, line, column);
                    self.skip_whitespace();
                    self.scan_import_identifier()?;
                }
                b'.' | b'#' | b',' | b'$' | b'@' | b'?' | b':' | b'(' | b')' | b'{' | b'}'
                | b'[' | b']' | b';' => {
                    self.advance();
                    let kind = match b {
                        b'.' => TokenKind::Dot,
                        b'#' => TokenKind::While,
                        b',' => TokenKind::Comma,
                        b'$' => TokenKind::Function,
                        b'@' => TokenKind::For,
                        b'?' => TokenKind::If,
                        b':' => TokenKind::Else,
                        b'(' => TokenKind::OpenParen,
                        b')' => TokenKind::CloseParen,
                        b'{' => TokenKind::OpenBrace,
                        b'}' => TokenKind::CloseBrace,
                        b'[' => TokenKind::OpenBracket,
                        b']' => TokenKind::CloseBracket,
                        b';' => TokenKind::SemiColon,
                        _ => unreachable!(),
                    };
                    self.push((b as char).to_string(), kind, line, column);
                }
                b'|' if self.peek_at(1) == Some(b'>') => {
                    self.advance();
                    self.advance();
                    self.push("|>", TokenKind::OpenTable, line, column);
                }
                b'<' if self.peek_at(1) == Some(b'|') => {
                    self.advance();
                    self.advance();
                    self.push("<|", TokenKind::CloseTable, line, column);
                }
                b'-' if self.peek_at(1) == Some(b'>') => {
                    self.advance();
                    self.advance();
                    self.push("->", TokenKind::Arrow, line, column);
                }
                b'<' | b'>' | b'=' | b'!' => {
                    self.scan_comparison_run(line, column);
                }
                b'&' => {
                    self.advance();
                    if self.peek() == Some(b'&') {
                        self.advance();
                        self.push("&&", TokenKind::BinaryOperator, line, column);
                    } else {
                        self.push("&", TokenKind::BinaryOperator, line, column);
                    }
                }
                b'|' => {
                    self.advance();
                    if self.peek() == Some(b'|') {
                        self.advance();
                        self.push("||", TokenKind::BinaryOperator, line, column);
                    } else {
                        self.push("|", TokenKind::BinaryOperator, line, column);
                    }
                }
                b'^' => {
                    self.advance();
                    self.push("^", TokenKind::BinaryOperator, line, column);
                }
                b'%' => {
                    self.advance();
                    self.push("%", TokenKind::BinaryOperator, line, column);
                }
                b'*' if self.peek_at(1) == Some(b'*') => {
                    self.advance();
                    self.advance();
                    self.push("**", TokenKind::BinaryOperator, line, column);
                }
                b'0'..=b'9' => {
                    self.scan_number(line, column)?;
                }
                b'+' | b'-' | b'*' | b'/' => {
                    self.advance();
                    let kind = if prev_implies_unary(self.tokens.last()) {
                        TokenKind::UnaryOperator
                    } else {
                        TokenKind::BinaryOperator
                    };
                    self.push((b as char).to_string(), kind, line, column);
                }
                b'\'' | b'"' => {
                    self.scan_string(b, line, column)?;
                }
                _ if is_ident_start(b) => {
                    self.scan_identifier(line, column);
                }
                _ => {
                    return Err(ZoxError::lexical(
                        format!("unrecognized byte 0x{:02x}", b),
                        line,
                        column,
                    ));
                }
            }
        }

        self.push("", TokenKind::Eof, self.line, self.column);
        Ok(())
    }

    fn skip_whitespace(&mut self) {
        while let Some(b) = self.peek() {
            match b {
                b' ' | b'\t' | b'\r' | b'\n' => {
                    self.advance();
                }
                _ => break,
            }
        }
    }

    fn skip_line_comment(&mut self) {
        while let Some(b) = self.peek() {
            if b == b'\n' {
                break;
            }
            self.advance();
        }
    }

    fn scan_comparison_run(&mut self, line: usize, column: usize) {
        let start = self.pos;
        while matches!(self.peek(), Some(b'<') | Some(b'>') | Some(b'=') | Some(b'!')) {
            self.advance();
        }
        let lexeme = String::from_utf8_lossy(&self.source[start..self.pos]).into_owned();
        let kind = if lexeme == "=" {
            TokenKind::Equals
        } else {
            TokenKind::BinaryOperator
        };
        self.push(lexeme, kind, line, column);
    }

    fn scan_number(&mut self, line: usize, column: usize) -> Result<(), ZoxError> {
        let start = self.pos;
        let mut seen_dot = false;
        while let Some(b) = self.peek() {
            if b.is_ascii_digit() {
                self.advance();
            } else if b == b'.' {
                if seen_dot {
                    return Err(ZoxError::lexical("too many decimal points in number", line, column));
                }
                seen_dot = true;
                self.advance();
            } else {
                break;
            }
        }
        let lexeme = String::from_utf8_lossy(&self.source[start..self.pos]).into_owned();
        self.push(lexeme, TokenKind::Number, line, column);
        Ok(())
    }

    fn scan_identifier(&mut self, line: usize, column: usize) {
        let start = self.pos;
        while let Some(b) = self.peek() {
            if is_ident_continue(b) {
                self.advance();
            } else {
                break;
            }
        }
        let lexeme = String::from_utf8_lossy(&self.source[start..self.pos]).into_owned();
        let kind = match lexeme.as_str() {
            "let" => TokenKind::Let,
            "true" | "false" => TokenKind::BooleanLiteral,
            "nil" => TokenKind::Nil,
            "as" => TokenKind::As,
            _ if lexeme.contains('.') => TokenKind::IdentifierImport,
            _ => TokenKind::Identifier,
        };
        self.push(lexeme, kind, line, column);
    }

    fn scan_import_identifier(&mut self) -> Result<(), ZoxError> {
        let line = self.line;
        let column = self.column;
        let start = self.pos;
        while let Some(b) = self.peek() {
            if is_ident_continue(b) {
                self.advance();
            } else {
                break;
            }
        }
        if self.pos == start {
            return Err(ZoxError::lexical("expected a module name after '~>'", line, column));
        }
        let lexeme = String::from_utf8_lossy(&self.source[start..self.pos]).into_owned();
        self.push(lexeme, TokenKind::IdentifierImport, line, column);
        Ok(())
    }

    fn scan_string(&mut self, quote: u8, line: usize, column: usize) -> Result<(), ZoxError> {
        self.advance(); // consume opening quote
        let start = self.pos;
        loop {
            match self.peek() {
                None => {
                    return Err(ZoxError::lexical("unterminated string literal", line, column));
                }
                Some(b) if b == quote => break,
                Some(b'\\') => {
                    self.advance();
                    if self.peek().is_some() {
                        self.advance();
                    }
                }
                Some(_) => {
                    self.advance();
                }
            }
        }
        let lexeme = String::from_utf8_lossy(&self.source[start..self.pos]).into_owned();
        self.advance(); // consume closing quote
        self.push(lexeme, TokenKind::String, line, column);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Lexer::tokenize(source).unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn empty_source_is_just_eof() {
        assert_eq!(kinds(""), vec![TokenKind::Eof]);
    }

    #[test]
    fn let_declaration() {
        let toks = Lexer::tokenize("let x = 3;").unwrap();
        let kinds: Vec<_> = toks.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Let,
                TokenKind::Identifier,
                TokenKind::Equals,
                TokenKind::Number,
                TokenKind::SemiColon,
                TokenKind::Eof,
            ]
        );
        assert_eq!(toks[3].lexeme, "3");
    }

    #[test]
    fn line_comment_is_skipped() {
        assert_eq!(kinds("-# a comment\nlet"), vec![TokenKind::Let, TokenKind::Eof]);
    }

    #[test]
    fn leading_minus_is_unary() {
        let toks = Lexer::tokenize("-5").unwrap();
        assert_eq!(toks[0].kind, TokenKind::UnaryOperator);
        assert_eq!(toks[0].lexeme, "-");
        assert_eq!(toks[1].kind, TokenKind::Number);
        assert_eq!(toks[1].lexeme, "5");
    }

    #[test]
    fn minus_after_number_is_binary() {
        let toks = Lexer::tokenize("3 - 5").unwrap();
        assert_eq!(toks[1].kind, TokenKind::BinaryOperator);
    }

    #[test]
    fn shift_and_power_operators_are_distinct_tokens() {
        let toks = Lexer::tokenize("1 << 2 >> 3 ** 4").unwrap();
        let ops: Vec<&str> = toks
            .iter()
            .filter(|t| t.kind == TokenKind::BinaryOperator)
            .map(|t| t.lexeme.as_str())
            .collect();
        assert_eq!(ops, vec!["<<", ">>", "**"]);
    }

    #[test]
    fn comparison_operators() {
        let toks = Lexer::tokenize("a <= b >= c < d > e").unwrap();
        let ops: Vec<&str> = toks
            .iter()
            .filter(|t| t.kind == TokenKind::BinaryOperator)
            .map(|t| t.lexeme.as_str())
            .collect();
        assert_eq!(ops, vec!["<=", ">=", "<", ">"]);
    }

    #[test]
    fn import_with_dotted_name() {
        let toks = Lexer::tokenize("~> math.utils;").unwrap();
        assert_eq!(toks[0].kind, TokenKind::Import);
        assert_eq!(toks[1].kind, TokenKind::IdentifierImport);
        assert_eq!(toks[1].lexeme, "math.utils");
    }

    #[test]
    fn string_literal_with_escape() {
        let toks = Lexer::tokenize(r#""hello\nworld""#).unwrap();
        assert_eq!(toks[0].kind, TokenKind::String);
        assert_eq!(toks[0].lexeme, r"hello\nworld");
    }

    #[test]
    fn unterminated_string_is_error() {
        assert!(Lexer::tokenize("\"oops").is_err());
    }

    #[test]
    fn two_decimal_points_is_error() {
        assert!(Lexer::tokenize("1.2.3").is_err());
    }

    #[test]
    fn table_sigils() {
        assert_eq!(
            kinds("|> a ; b <|"),
            vec![
                TokenKind::OpenTable,
                TokenKind::Identifier,
                TokenKind::SemiColon,
                TokenKind::Identifier,
                TokenKind::CloseTable,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn as_keyword_is_whole_word() {
        let toks = Lexer::tokenize("as asleep").unwrap();
        assert_eq!(toks[0].kind, TokenKind::As);
        assert_eq!(toks[1].kind, TokenKind::Identifier);
        assert_eq!(toks[1].lexeme, "asleep");
    }

    #[test]
    fn keywords() {
        assert_eq!(kinds("true false nil"), vec![TokenKind::BooleanLiteral, TokenKind::BooleanLiteral, TokenKind::Nil, TokenKind::Eof]);
    }

    #[test]
    fn utf8_identifier_passthrough() {
        let toks = Lexer::tokenize("let café = 1;").unwrap();
        assert_eq!(toks[1].kind, TokenKind::Identifier);
        assert_eq!(toks[1].lexeme, "café");
    }
}
