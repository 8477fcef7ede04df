use crate::error::Diagnostics;
use crate::token::TokenType::*;
use crate::token::{Literal, Token, TokenType};

/// The first step of the pipeline. Takes in raw source text and groups it
/// into a flat stream of tokens — the scanner is peripheral plumbing per
/// spec §1/§6: only its token vocabulary is load-bearing for the rest of
/// the interpreter.
pub struct Scanner {
    source: Vec<char>,
    tokens: Vec<Token>,

    /// `start` points to the first character of the lexeme being scanned,
    /// `current` to the character currently being considered, `line` to
    /// the source line `current` is on.
    start: usize,
    current: usize,
    line: usize,
}

impl Scanner {
    pub fn new(source: &str) -> Self {
        Scanner {
            source: source.chars().collect(),
            tokens: vec![],
            current: 0,
            start: 0,
            line: 1,
        }
    }

    pub fn scan_tokens(mut self, diagnostics: &mut Diagnostics) -> Vec<Token> {
        while !self.is_at_end() {
            self.start = self.current;
            self.scan_token(diagnostics);
        }
        self.tokens.push(Token::eof(self.line));
        self.tokens
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.source.len()
    }

    /// Scans a single token. No regex: each lexeme shape is recognized by
    /// hand, which is the point of writing a scanner at all.
    fn scan_token(&mut self, diagnostics: &mut Diagnostics) {
        let line = self.line;
        let c = self.advance();
        match c {
            '(' => self.add_token(LEFT_PAREN),
            ')' => self.add_token(RIGHT_PAREN),
            '{' => self.add_token(LEFT_BRACE),
            '}' => self.add_token(RIGHT_BRACE),
            ',' => self.add_token(COMMA),
            '.' => self.add_token(DOT),
            '-' => self.add_token(MINUS),
            '+' => self.add_token(PLUS),
            ';' => self.add_token(SEMICOLON),
            '*' => self.add_token(STAR),

            '!' => {
                let t = if self.match_next('=') { BANG_EQUAL } else { BANG };
                self.add_token(t);
            }
            '=' => {
                let t = if self.match_next('=') { EQUAL_EQUAL } else { EQUAL };
                self.add_token(t);
            }
            '<' => {
                let t = if self.match_next('=') { LESS_EQUAL } else { LESS };
                self.add_token(t);
            }
            '>' => {
                let t = if self.match_next('=') { GREATER_EQUAL } else { GREATER };
                self.add_token(t);
            }

            ' ' | '\r' | '\t' => {}
            '\n' => self.line += 1,

            '/' => self.comment(),
            '"' => self.string(diagnostics),
            d if is_digit(d) => self.number(),
            a if is_alpha(a) => self.identifier(),

            _ => diagnostics.error(line, &format!("Unexpected character: {c}")),
        }
    }

    fn comment(&mut self) {
        if self.match_next('/') {
            while self.peek() != '\n' && !self.is_at_end() {
                self.advance();
            }
        } else {
            self.add_token(SLASH);
        }
    }

    fn string(&mut self, diagnostics: &mut Diagnostics) {
        while self.peek() != '"' && !self.is_at_end() {
            // Lox supports multi-line strings.
            if self.peek() == '\n' {
                self.line += 1;
            }
            self.advance();
        }

        if self.is_at_end() {
            diagnostics.error(self.line, "Unterminated string.");
            return;
        }

        // The closing ".
        self.advance();

        let value: String = self.source[self.start + 1..self.current - 1].iter().collect();
        self.add_token_with_literal(STRING, Some(Literal::Str(value)));
    }

    fn number(&mut self) {
        while is_digit(self.peek()) {
            self.advance();
        }

        if self.peek() == '.' && is_digit(self.peek_next()) {
            self.advance(); // Consume the "."
            while is_digit(self.peek()) {
                self.advance();
            }
        }

        let text: String = self.source[self.start..self.current].iter().collect();
        let value: f64 = text.parse().expect("scanned number lexeme must parse as f64");
        self.add_token_with_literal(NUMBER, Some(Literal::Number(value)));
    }

    fn identifier(&mut self) {
        while is_alpha_numeric(self.peek()) {
            self.advance();
        }

        let text: String = self.source[self.start..self.current].iter().collect();
        self.add_token(keyword(&text).unwrap_or(IDENTIFIER));
    }

    /// Consumes the next character in the source and returns it.
    fn advance(&mut self) -> char {
        let c = self.source[self.current];
        self.current += 1;
        c
    }

    fn add_token(&mut self, token_type: TokenType) {
        self.add_token_with_literal(token_type, None);
    }

    fn add_token_with_literal(&mut self, token_type: TokenType, literal: Option<Literal>) {
        let text: String = self.source[self.start..self.current].iter().collect();
        self.tokens.push(Token::new(token_type, text, literal, self.line));
    }

    /// A conditional `advance()`: only consumes the current character if
    /// it's what we're looking for. One character of lookahead.
    fn match_next(&mut self, expected: char) -> bool {
        if self.is_at_end() || self.source[self.current] != expected {
            return false;
        }
        self.current += 1;
        true
    }

    fn peek(&self) -> char {
        if self.is_at_end() {
            return '\0';
        }
        self.source[self.current]
    }

    fn peek_next(&self) -> char {
        if self.current + 1 >= self.source.len() {
            return '\0';
        }
        self.source[self.current + 1]
    }
}

fn is_alpha(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_alpha_numeric(c: char) -> bool {
    is_alpha(c) || is_digit(c)
}

fn is_digit(c: char) -> bool {
    c.is_ascii_digit()
}

fn keyword(text: &str) -> Option<TokenType> {
    Some(match text {
        "and" => AND,
        "class" => CLASS,
        "else" => ELSE,
        "false" => FALSE,
        "for" => FOR,
        "fun" => FUN,
        "if" => IF,
        "nil" => NIL,
        "or" => OR,
        "print" => PRINT,
        "return" => RETURN,
        "super" => SUPER,
        "this" => THIS,
        "true" => TRUE,
        "var" => VAR,
        "while" => WHILE,
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(src: &str) -> (Vec<Token>, bool) {
        let mut diagnostics = Diagnostics::new();
        let tokens = Scanner::new(src).scan_tokens(&mut diagnostics);
        (tokens, diagnostics.had_error())
    }

    #[test]
    fn scans_punctuation_and_eof() {
        let (tokens, had_error) = scan("(){}");
        let kinds: Vec<_> = tokens.iter().map(|t| t.token_type).collect();
        assert_eq!(kinds, vec![LEFT_PAREN, RIGHT_PAREN, LEFT_BRACE, RIGHT_BRACE, EOF]);
        assert!(!had_error);
    }

    #[test]
    fn recognizes_keywords_and_identifiers() {
        let (tokens, _) = scan("var orchard = clock;");
        let kinds: Vec<_> = tokens.iter().map(|t| t.token_type).collect();
        assert_eq!(
            kinds,
            vec![VAR, IDENTIFIER, EQUAL, IDENTIFIER, SEMICOLON, EOF]
        );
    }

    #[test]
    fn tracks_line_numbers_across_newlines_and_strings() {
        let (tokens, had_error) = scan("\"a\nb\"\nvar");
        assert!(!had_error);
        let string_tok = &tokens[0];
        assert_eq!(string_tok.literal, Some(Literal::Str("a\nb".to_string())));
        let var_tok = &tokens[1];
        assert_eq!(var_tok.line, 3);
    }

    #[test]
    fn unterminated_string_sets_error_flag() {
        let (_, had_error) = scan("\"unterminated");
        assert!(had_error);
    }

    #[test]
    fn number_literal_parses_as_f64() {
        let (tokens, _) = scan("123.5");
        assert_eq!(tokens[0].literal, Some(Literal::Number(123.5)));
    }
}
