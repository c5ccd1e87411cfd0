//! Canonical text rendering of ids, events and stamps, and the matching parsers.
//!
//! - Id: `0`, `1`, or `(left,right)`
//! - Event: a leaf is its decimal value, an interior node is `value,(left,right)`
//! - Stamp: `(id, event)`
//!
//! Parsing accepts exactly what `Display` produces. It does not normalize, and it rejects trees
//! nested deeper than [`MAX_PARSE_DEPTH`] interior nodes.

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::event::Event;
use crate::id::Id;
use crate::stamp::Stamp;

/// Deepest nesting of interior nodes the parsers accept.
pub const MAX_PARSE_DEPTH: usize = 1024;

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Id::Leaf(false) => f.write_str("0"),
            Id::Leaf(true) => f.write_str("1"),
            Id::Node(left, right) => write!(f, "({left},{right})"),
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::Leaf(value) => write!(f, "{value}"),
            Event::Node { value, left, right } => write!(f, "{value},({left},{right})"),
        }
    }
}

impl fmt::Display for Stamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.id(), self.event())
    }
}

impl FromStr for Id {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut parser = Parser::new(s);
        let id = parser.id()?;
        parser.finish()?;
        Ok(id)
    }
}

impl FromStr for Event {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut parser = Parser::new(s);
        let event = parser.event()?;
        parser.finish()?;
        Ok(event)
    }
}

impl FromStr for Stamp {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut parser = Parser::new(s);
        parser.expect(b'(')?;
        let id = parser.id()?;
        parser.expect(b',')?;
        parser.skip(b' ');
        let event = parser.event()?;
        parser.expect(b')')?;
        parser.finish()?;
        Ok(Stamp::new(id, event))
    }
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            depth: 0,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.input.as_bytes().get(self.pos).copied()
    }

    fn error(&self, expected: &str) -> Error {
        Error::Parse(format!(
            "expected {expected} at byte {} of {:?}",
            self.pos, self.input
        ))
    }

    fn expect(&mut self, byte: u8) -> Result<()> {
        if self.peek() != Some(byte) {
            return Err(self.error(&format!("{:?}", byte as char)));
        }
        self.pos += 1;
        Ok(())
    }

    fn skip(&mut self, byte: u8) {
        while self.peek() == Some(byte) {
            self.pos += 1;
        }
    }

    fn descend(&mut self) -> Result<()> {
        if self.depth == MAX_PARSE_DEPTH {
            return Err(Error::Parse(format!(
                "nesting deeper than {MAX_PARSE_DEPTH} at byte {}",
                self.pos
            )));
        }
        self.depth += 1;
        Ok(())
    }

    fn finish(&self) -> Result<()> {
        if self.pos != self.input.len() {
            return Err(self.error("end of input"));
        }
        Ok(())
    }

    fn number(&mut self) -> Result<u64> {
        let start = self.pos;
        while self.peek().is_some_and(|b| b.is_ascii_digit()) {
            self.pos += 1;
        }
        if start == self.pos {
            return Err(self.error("a decimal value"));
        }
        self.input[start..self.pos].parse().map_err(|_| {
            Error::Overflow(format!(
                "value {} in {:?} does not fit in 64 bits",
                &self.input[start..self.pos],
                self.input
            ))
        })
    }

    fn id(&mut self) -> Result<Id> {
        match self.peek() {
            Some(b'0') => {
                self.pos += 1;
                Ok(Id::ZERO)
            }
            Some(b'1') => {
                self.pos += 1;
                Ok(Id::ONE)
            }
            Some(b'(') => {
                self.pos += 1;
                self.descend()?;
                let left = self.id()?;
                self.expect(b',')?;
                let right = self.id()?;
                self.expect(b')')?;
                self.depth -= 1;
                Ok(Id::node(left, right))
            }
            _ => Err(self.error("an id")),
        }
    }

    // A child never starts with '(', so ",(" after a value always opens that value's children.
    fn event(&mut self) -> Result<Event> {
        let value = self.number()?;
        if !self.input[self.pos..].starts_with(",(") {
            return Ok(Event::leaf(value));
        }
        self.pos += 2;
        self.descend()?;
        let left = self.event()?;
        self.expect(b',')?;
        let right = self.event()?;
        self.expect(b')')?;
        self.depth -= 1;
        Ok(Event::node(value, left, right))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_ids() {
        assert_eq!(Id::ZERO.to_string(), "0");
        assert_eq!(Id::ONE.to_string(), "1");
        assert_eq!(
            Id::node(Id::ONE, Id::node(Id::ZERO, Id::ONE)).to_string(),
            "(1,(0,1))"
        );
    }

    #[test]
    fn renders_events() {
        assert_eq!(Event::leaf(12).to_string(), "12");
        let e = Event::node(
            1,
            Event::leaf(0),
            Event::node(2, Event::leaf(1), Event::leaf(0)),
        );
        assert_eq!(e.to_string(), "1,(0,2,(1,0))");
    }

    #[test]
    fn renders_stamps() {
        assert_eq!(Stamp::seed().to_string(), "(1, 0)");
        let (left, _) = Stamp::seed().fork();
        assert_eq!(left.to_string(), "((1,0), 0)");
    }

    #[test]
    fn parses_what_it_renders() {
        for text in ["0", "1", "(1,0)", "((0,1),(1,0))"] {
            assert_eq!(text.parse::<Id>().unwrap().to_string(), text);
        }
        for text in ["0", "42", "1,(0,2)", "0,(1,(0,2),0)", "1,(0,2,(1,0))"] {
            assert_eq!(text.parse::<Event>().unwrap().to_string(), text);
        }
        for text in ["(1, 0)", "((0,1), 3,(0,1))"] {
            assert_eq!(text.parse::<Stamp>().unwrap().to_string(), text);
        }
    }

    #[test]
    fn parser_does_not_normalize() {
        let e: Event = "2,(3,3)".parse().unwrap();
        assert_eq!(e, Event::node(2, Event::leaf(3), Event::leaf(3)));
        assert!(!e.is_canonical());
    }

    #[test]
    fn rejects_malformed_input() {
        for text in ["", "2", "(1,0", "(1,0))", "(1;0)"] {
            assert!(matches!(text.parse::<Id>(), Err(Error::Parse(_))), "{text}");
        }
        for text in ["", "1,", "1,(2)", "1,(2,3", "-1", "1,(2,3))"] {
            assert!(
                matches!(text.parse::<Event>(), Err(Error::Parse(_))),
                "{text}"
            );
        }
        assert!(matches!(
            "18446744073709551616".parse::<Event>(),
            Err(Error::Overflow(_))
        ));
    }

    fn nested_id(depth: usize) -> String {
        format!("{}1{}", "(".repeat(depth), ",0)".repeat(depth))
    }

    fn nested_event(depth: usize) -> String {
        format!("{}1{}", "0,(".repeat(depth), ",0)".repeat(depth))
    }

    #[test]
    fn nesting_is_bounded() {
        assert!(nested_id(MAX_PARSE_DEPTH).parse::<Id>().is_ok());
        assert!(nested_event(MAX_PARSE_DEPTH).parse::<Event>().is_ok());
        for depth in [MAX_PARSE_DEPTH + 1, 50_000] {
            assert!(matches!(
                nested_id(depth).parse::<Id>(),
                Err(Error::Parse(_))
            ));
            assert!(matches!(
                nested_event(depth).parse::<Event>(),
                Err(Error::Parse(_))
            ));
        }
        let stamp = format!("({}, {})", nested_id(MAX_PARSE_DEPTH + 1), 0);
        assert!(matches!(stamp.parse::<Stamp>(), Err(Error::Parse(_))));
    }
}
