use crate::word_index::MAX_LENGTH;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pos(pub u32, pub u32);

impl Pos {
    pub fn start() -> Pos {
        Pos(0, 0)
    }

    pub fn line(&self) -> u32 {
        self.0
    }

    pub fn column(&self) -> u32 {
        self.1
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub start: Pos,
    pub end: Pos,
    pub lexeme: String,
}

/// Splits prose into candidate words.
///
/// A word is a run of ASCII letters and apostrophes that starts with a letter.
/// Runs holding a digit, or longer than [`MAX_LENGTH`], are skipped whole.
#[derive(Debug)]
pub struct Lexer {
    text: Vec<char>,
    col: u32,
    line: u32,
    offset: usize,
}

impl Iterator for Lexer {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token()
    }
}

impl Lexer {
    pub fn new<T: AsRef<str>>(text: T) -> Lexer {
        Lexer {
            text: text.as_ref().chars().collect(),
            col: 0,
            line: 0,
            offset: 0,
        }
    }

    fn pos(&self) -> Pos {
        Pos(self.line, self.col)
    }

    fn next_token(&mut self) -> Option<Token> {
        loop {
            match self.peek()? {
                'a'..='z' | 'A'..='Z' => {
                    if let Some(token) = self.word() {
                        return Some(token);
                    }
                }
                '0'..='9' => self.skip_alphanumeric(),
                _ => {
                    self.next();
                }
            }
        }
    }

    fn next(&mut self) -> Option<char> {
        let char = self.peek()?;

        if char == '\n' {
            self.col = 0;
            self.line += 1;
        } else {
            self.col += 1;
        }
        self.offset += 1;

        Some(char)
    }

    fn peek(&self) -> Option<char> {
        self.text.get(self.offset).copied()
    }

    fn skip_alphanumeric(&mut self) {
        while self.peek().is_some_and(|c| c.is_ascii_alphanumeric()) {
            self.next();
        }
    }

    fn word(&mut self) -> Option<Token> {
        let start = self.pos();
        let mut lexeme = String::new();

        while let Some(char) = self.peek() {
            match char {
                'a'..='z' | 'A'..='Z' | '\'' => {
                    lexeme.push(char);
                    self.next();
                }
                '0'..='9' => {
                    self.skip_alphanumeric();
                    return None;
                }
                _ => break,
            }
        }

        if lexeme.len() > MAX_LENGTH {
            return None;
        }

        Some(Token {
            start,
            end: self.pos(),
            lexeme,
        })
    }
}
