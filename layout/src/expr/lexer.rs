//! The Lexer implementation for the force expression format.

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    EOF,
    Number(f64),
    Identifier(String),
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Caret,
    OpenParen,
    CloseParen,
    BadNumber(usize),
    Error(usize),
}

#[derive(Debug, Clone)]
pub struct Lexer {
    input: Vec<char>,
    pub pos: usize,
    pub ch: char,
    // Where the last token started.
    start: usize,
}

impl Lexer {
    pub fn from_string(input: &str) -> Self {
        let chars = input.chars().collect();
        Lexer::new(chars)
    }

    pub fn new(input: Vec<char>) -> Self {
        let mut l = Self {
            input,
            pos: 0,
            ch: '\0',
            start: 0,
        };
        l.read_char();
        l
    }

    /// \returns the position of the first character of the last token.
    pub fn token_start(&self) -> usize {
        self.start
    }

    /// Print the source with a '^' marker under the last token.
    pub fn print_error(&self) {
        let text: String = self.input.iter().collect();
        println!("{}", text);
        println!("{}^", " ".repeat(self.start));
    }

    pub fn has_next(&self) -> bool {
        self.pos < self.input.len()
    }

    // The position of the current character.
    fn current_pos(&self) -> usize {
        if self.ch == '\0' {
            return self.input.len();
        }
        self.pos - 1
    }

    pub fn read_char(&mut self) {
        if !self.has_next() {
            self.ch = '\0';
            // Step past the last char so that current_pos() stays accurate.
            self.pos = self.input.len() + 1;
        } else {
            self.ch = self.input[self.pos];
            self.pos += 1;
        }
    }

    pub fn skip_whitespace(&mut self) -> bool {
        let mut changed = false;
        while self.ch.is_ascii_whitespace() {
            self.read_char();
            changed = true;
        }
        changed
    }

    /// Function names and the variable start with a letter, and may contain
    /// digits after that (as in log10).
    pub fn read_identifier(&mut self) -> String {
        let mut result = String::new();
        while self.ch.is_ascii_alphanumeric() || self.ch == '_' {
            result.push(self.ch);
            self.read_char();
        }
        result
    }

    pub fn read_number(&mut self) -> String {
        let mut result = String::new();
        let mut period = false;
        while self.ch.is_ascii_digit() || self.ch == '.' {
            // Only allow one period in each number.
            if self.ch == '.' {
                if !period {
                    period = true;
                } else {
                    break;
                }
            }
            result.push(self.ch);
            self.read_char();
        }
        result
    }

    pub fn next_token(&mut self) -> Token {
        let tok: Token;
        self.skip_whitespace();
        self.start = self.current_pos();
        match self.ch {
            '+' => {
                tok = Token::Plus;
            }
            '-' => {
                tok = Token::Minus;
            }
            '*' => {
                tok = Token::Star;
            }
            '/' => {
                tok = Token::Slash;
            }
            '%' => {
                tok = Token::Percent;
            }
            '^' => {
                tok = Token::Caret;
            }
            '(' => {
                tok = Token::OpenParen;
            }
            ')' => {
                tok = Token::CloseParen;
            }
            '\0' => {
                return Token::EOF;
            }
            _ => {
                if self.ch.is_ascii_alphabetic() {
                    return Token::Identifier(self.read_identifier());
                }
                if self.ch.is_ascii_digit() || self.ch == '.' {
                    let num = self.read_number();
                    return match num.parse::<f64>() {
                        Ok(value) => Token::Number(value),
                        Err(_) => Token::BadNumber(self.start),
                    };
                }
                return Token::Error(self.start);
            }
        }
        self.read_char();
        tok
    }
}

#[cfg(test)]
fn lex_all(input: &str) -> Vec<Token> {
    let mut lexer = Lexer::from_string(input);
    let mut tokens = Vec::new();
    loop {
        let tok = lexer.next_token();
        if tok == Token::EOF {
            return tokens;
        }
        tokens.push(tok);
    }
}

#[test]
fn test_lex_expression() {
    let tokens = lex_all(" 2.5*x ^ (log10(x) - 1)");
    assert_eq!(
        tokens,
        vec![
            Token::Number(2.5),
            Token::Star,
            Token::Identifier("x".to_string()),
            Token::Caret,
            Token::OpenParen,
            Token::Identifier("log10".to_string()),
            Token::OpenParen,
            Token::Identifier("x".to_string()),
            Token::CloseParen,
            Token::Minus,
            Token::Number(1.),
            Token::CloseParen,
        ]
    );
}

#[test]
fn test_lex_positions() {
    let mut lexer = Lexer::from_string("12 +  $");
    assert_eq!(lexer.next_token(), Token::Number(12.));
    assert_eq!(lexer.token_start(), 0);
    assert_eq!(lexer.next_token(), Token::Plus);
    assert_eq!(lexer.token_start(), 3);
    assert_eq!(lexer.next_token(), Token::Error(6));
}

#[test]
fn test_lex_numbers() {
    // The second period starts a new number.
    assert_eq!(lex_all("1.2.5"), vec![Token::Number(1.2), Token::Number(0.5)]);
    assert_eq!(lex_all("."), vec![Token::BadNumber(0)]);
    let mut lexer = Lexer::from_string("7");
    assert_eq!(lexer.next_token(), Token::Number(7.));
    assert_eq!(lexer.next_token(), Token::EOF);
    assert_eq!(lexer.token_start(), 1);
}
