//! Recursive-descent parser for dice formulas.

use super::{DieTerm, Formula, FormulaError, Operator, RollData, Term};

pub(super) fn parse(source: &str, data: &RollData) -> Result<Formula, FormulaError> {
    let mut parser = Parser {
        source,
        chars: source.char_indices().collect(),
        cursor: 0,
        data,
    };
    let formula = parser.formula(0)?;
    parser.skip_whitespace();
    match parser.peek() {
        None => Ok(formula),
        Some(')') => Err(FormulaError::UnbalancedParenthesis(source.to_string())),
        Some(found) => Err(parser.unexpected(found)),
    }
}

struct Parser<'a> {
    source: &'a str,
    chars: Vec<(usize, char)>,
    cursor: usize,
    data: &'a RollData,
}

impl Parser<'_> {
    fn formula(&mut self, depth: usize) -> Result<Formula, FormulaError> {
        let mut terms = Vec::new();

        self.skip_whitespace();
        match self.peek() {
            None if depth == 0 => return Err(FormulaError::Empty),
            None => return Err(FormulaError::UnbalancedParenthesis(self.source.to_string())),
            // A leading minus on a non-literal operand is kept as an operator.
            Some('-') if !self.minus_precedes_number() => {
                self.bump();
                terms.push(Term::Operator(Operator::Subtract));
            }
            _ => {}
        }

        terms.push(self.operand(depth)?);
        loop {
            self.skip_whitespace();
            let op = match self.peek() {
                Some('+') => Operator::Add,
                Some('-') => Operator::Subtract,
                Some('*') => Operator::Multiply,
                Some('/') => Operator::Divide,
                _ => break,
            };
            self.bump();
            terms.push(Term::Operator(op));
            terms.push(self.operand(depth)?);
        }

        Ok(Formula { terms })
    }

    fn operand(&mut self, depth: usize) -> Result<Term, FormulaError> {
        self.skip_whitespace();
        let Some(ch) = self.peek() else {
            return Err(FormulaError::UnexpectedEnd(self.source.to_string()));
        };

        match ch {
            '+' => {
                self.bump();
                self.operand(depth)
            }
            '-' if self.minus_precedes_number() => {
                self.bump();
                match self.operand(depth)? {
                    Term::Number(n) => Ok(Term::Number(-n)),
                    _ => Err(self.unexpected('-')),
                }
            }
            '(' => {
                self.bump();
                let inner = self.formula(depth + 1)?;
                self.skip_whitespace();
                if self.peek() != Some(')') {
                    return Err(FormulaError::UnbalancedParenthesis(self.source.to_string()));
                }
                self.bump();
                Ok(Term::Group(inner))
            }
            '@' => {
                self.bump();
                let path = self.take_while(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.');
                let path = path.trim_end_matches('.');
                self.data
                    .get(path)
                    .map(Term::Number)
                    .ok_or_else(|| FormulaError::UnknownReference(path.to_string()))
            }
            'd' | 'D' => self.dice(1),
            c if c.is_ascii_digit() => {
                let digits = self.take_while(|c| c.is_ascii_digit());
                match self.peek() {
                    Some('d') | Some('D') => {
                        let number = digits
                            .parse::<u32>()
                            .map_err(|_| FormulaError::InvalidDie(digits.clone()))?;
                        self.dice(number)
                    }
                    _ => digits
                        .parse::<i64>()
                        .map(Term::Number)
                        .map_err(|_| FormulaError::Overflow),
                }
            }
            other => Err(self.unexpected(other)),
        }
    }

    /// Parse the `dF` tail of a dice term; the cursor sits on the `d`.
    fn dice(&mut self, number: u32) -> Result<Term, FormulaError> {
        self.bump();
        let faces = self.take_while(|c| c.is_ascii_digit());
        let faces: u32 = faces
            .parse()
            .map_err(|_| FormulaError::InvalidDie(format!("{number}d{faces}")))?;
        if faces == 0 {
            return Err(FormulaError::InvalidDie(format!("{number}d0")));
        }
        if let Some(c) = self.peek().filter(|c| c.is_ascii_alphabetic()) {
            // Dice modifiers (keep-highest, rerolls, ...) are not supported.
            return Err(self.unexpected(c));
        }
        Ok(Term::Dice(DieTerm::new(number, faces)))
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.cursor).map(|&(_, c)| c)
    }

    /// True if the `-` under the cursor is followed by a plain number (not dice).
    fn minus_precedes_number(&self) -> bool {
        let mut rest = self.chars[self.cursor + 1..]
            .iter()
            .map(|&(_, c)| c)
            .skip_while(|c| c.is_whitespace())
            .peekable();
        if !rest.peek().is_some_and(char::is_ascii_digit) {
            return false;
        }
        !rest
            .skip_while(char::is_ascii_digit)
            .next()
            .is_some_and(|c| c == 'd' || c == 'D')
    }

    fn bump(&mut self) {
        self.cursor += 1;
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    fn take_while(&mut self, predicate: impl Fn(char) -> bool) -> String {
        let mut taken = String::new();
        while let Some(c) = self.peek().filter(|&c| predicate(c)) {
            taken.push(c);
            self.bump();
        }
        taken
    }

    fn unexpected(&self, found: char) -> FormulaError {
        let position = self
            .chars
            .get(self.cursor)
            .map_or(self.source.len(), |&(offset, _)| offset);
        FormulaError::UnexpectedCharacter {
            formula: self.source.to_string(),
            found,
            position,
        }
    }
}
