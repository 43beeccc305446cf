use crate::error::Result;
use crate::lexer::{Lexer, Token};
use crate::word_index::WordIndex;

#[derive(Debug, Default)]
pub struct Report {
    pub misspelled: Vec<Token>,
    /// Every word the lexer produced, spelled right or not.
    pub words: usize,
}

pub struct Pipeline<'a> {
    index: &'a WordIndex,
}

impl<'a> Pipeline<'a> {
    pub fn new(index: &'a WordIndex) -> Pipeline<'a> {
        Pipeline { index }
    }

    pub fn run(&self, lexer: Lexer) -> Result<Report> {
        let mut report = Report::default();
        for token in lexer {
            report.words += 1;
            if !self.index.check(&token.lexeme)? {
                report.misspelled.push(token);
            }
        }
        Ok(report)
    }
}
