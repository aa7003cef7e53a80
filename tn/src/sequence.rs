//! Symbol sequences a worker emits

use std::borrow::Cow;
use std::str::FromStr;

use crate::error::SequenceError;

/// Ordered, finite run of symbols owned by one worker
///
/// Literal symbols are stored; counters are produced one value at a time, so
/// a counter up to `u64::MAX` costs nothing until it is iterated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sequence {
    source: Source,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Source {
    Symbols(Vec<String>),
    Counter { first: u64, step: u64, last: u64 },
}

impl Default for Sequence {
    fn default() -> Self {
        Self {
            source: Source::Symbols(Vec::new()),
        }
    }
}

impl Sequence {
    /// Inclusive character range, e.g. `'A'..='Z'`
    pub fn range(start: char, end: char) -> Result<Self, SequenceError> {
        if start > end {
            return Err(SequenceError::ReversedRange { start, end });
        }
        Ok(Self::from_symbols((start..=end).map(String::from)))
    }

    /// One symbol per character of `chars`
    pub fn from_chars(chars: &str) -> Self {
        Self::from_symbols(chars.chars().map(String::from))
    }

    pub fn from_symbols<I, S>(symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            source: Source::Symbols(symbols.into_iter().map(Into::into).collect()),
        }
    }

    /// Decimal counter `first, first + step, ...` up to and including `last`
    ///
    /// A zero step counts by one.
    pub fn counter(first: u64, step: u64, last: u64) -> Self {
        Self {
            source: Source::Counter {
                first,
                step: step.max(1),
                last,
            },
        }
    }

    /// Uppercase alphabet
    pub fn uppercase() -> Self {
        Self::from_symbols(('A'..='Z').map(String::from))
    }

    /// Lowercase alphabet
    pub fn lowercase() -> Self {
        Self::from_symbols(('a'..='z').map(String::from))
    }

    pub fn len(&self) -> u64 {
        match &self.source {
            Source::Symbols(symbols) => symbols.len() as u64,
            Source::Counter { first, step, last } => {
                if first > last {
                    0
                } else {
                    ((last - first) / step).saturating_add(1)
                }
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> Box<dyn Iterator<Item = Cow<'_, str>> + '_> {
        match &self.source {
            Source::Symbols(symbols) => Box::new(symbols.iter().map(|s| Cow::Borrowed(s.as_str()))),
            Source::Counter { first, step, last } => {
                let (step, last) = (*step, *last);
                let values = std::iter::successors(Some(*first).filter(|n| *n <= last), move |n| {
                    n.checked_add(step).filter(|next| *next <= last)
                });
                Box::new(values.map(|n| Cow::Owned(n.to_string())))
            }
        }
    }
}

/// `X-Y` is an inclusive range, anything else is taken literally
impl FromStr for Sequence {
    type Err = SequenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let chars: Vec<char> = s.chars().collect();
        if let &[start, '-', end] = chars.as_slice() {
            return Sequence::range(start, end);
        }
        Ok(Sequence::from_chars(s))
    }
}
