// Input buffer and word stream
//
// A line of input is kept as raw text (so it can be edited by oops,
// disambiguation answers and "then" splitting) and as a parse table of
// words. Word numbers are 1-based.

use crate::dictionary::{DictWord, Dictionary};

/// Characters that always form a word on their own.
pub const SEPARATORS: [char; 3] = [',', '.', '"'];

/// One word of the parse table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Word {
    pub text: String,
    /// Dictionary entry, `None` if the word is not recognised
    pub dict: Option<DictWord>,
    /// Byte offset of the word in the buffer
    pub start: usize,
    /// Length of the word in bytes
    pub len: usize,
}

/// Raw text of one input line, bounded to `capacity` characters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputBuffer {
    text: String,
    capacity: usize,
}

impl InputBuffer {
    pub fn new(capacity: usize) -> Self {
        InputBuffer {
            text: String::new(),
            capacity,
        }
    }

    /// Replace the contents with a freshly typed line.
    pub fn set(&mut self, line: &str) {
        self.text = line.trim_end_matches(['\n', '\r']).to_lowercase();
        self.clip();
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Overwrite bytes `start..end` with `with`.
    pub fn replace_range(&mut self, start: usize, end: usize, with: &str) {
        let end = end.min(self.text.len());
        let start = start.min(end);
        self.text.replace_range(start..end, with);
        self.clip();
    }

    /// Insert `with` at byte offset `at`, dropping whatever overflows.
    pub fn insert(&mut self, at: usize, with: &str) {
        let at = at.min(self.text.len());
        self.text.insert_str(at, with);
        self.clip();
    }

    /// Blank out bytes `start..end` with spaces.
    pub fn blank(&mut self, start: usize, end: usize) {
        let end = end.min(self.text.len());
        let start = start.min(end);
        let spaces = " ".repeat(self.text[start..end].chars().count());
        self.text.replace_range(start..end, &spaces);
    }

    pub fn push_str(&mut self, s: &str) {
        self.text.push_str(s);
        self.clip();
    }

    fn clip(&mut self) {
        if let Some((cut, _)) = self.text.char_indices().nth(self.capacity) {
            self.text.truncate(cut);
        }
    }
}

/// Split `text` into at most `max_words` words and look each up.
pub fn tokenise(text: &str, dictionary: &Dictionary, max_words: usize) -> Vec<Word> {
    let mut words = Vec::new();
    let mut start: Option<usize> = None;

    let push = |words: &mut Vec<Word>, from: usize, to: usize| {
        let piece = &text[from..to];
        words.push(Word {
            text: piece.to_string(),
            dict: dictionary.lookup(piece),
            start: from,
            len: to - from,
        });
    };

    for (i, c) in text.char_indices() {
        if c.is_whitespace() || SEPARATORS.contains(&c) {
            if let Some(s) = start.take() {
                push(&mut words, s, i);
            }
            if SEPARATORS.contains(&c) {
                push(&mut words, i, i + c.len_utf8());
            }
        } else if start.is_none() {
            start = Some(i);
        }
    }
    if let Some(s) = start {
        push(&mut words, s, text.len());
    }

    words.truncate(max_words);
    words
}

/// Read a string of decimal digits. Numbers of five or more digits read as 10000.
pub fn parse_digits(text: &str) -> Option<i32> {
    if text.is_empty() || !text.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    if text.len() > 4 {
        return Some(10000);
    }
    text.parse().ok()
}

/// Result of reading a word when running off the end must be visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Next {
    Word(Option<DictWord>),
    End,
}

impl Next {
    pub fn word(self) -> Option<DictWord> {
        match self {
            Next::Word(w) => w,
            Next::End => None,
        }
    }
}

/// The parse table of the current line plus the word marker.
#[derive(Debug, Clone, Default)]
pub struct WordStream {
    words: Vec<Word>,
    /// Word marker, 1-based; may run past the end
    pub wn: usize,
}

impl WordStream {
    pub fn new(words: Vec<Word>) -> Self {
        WordStream { words, wn: 1 }
    }

    pub fn num_words(&self) -> usize {
        self.words.len()
    }

    pub fn words(&self) -> &[Word] {
        &self.words
    }

    pub fn word(&self, n: usize) -> Option<&Word> {
        if n == 0 {
            return None;
        }
        self.words.get(n - 1)
    }

    pub fn dict_at(&self, n: usize) -> Option<DictWord> {
        self.word(n).and_then(|w| w.dict)
    }

    pub fn text_at(&self, n: usize) -> &str {
        self.word(n).map(|w| w.text.as_str()).unwrap_or("")
    }

    /// Word at the marker, advancing it. Past the end (or for an
    /// unrecognised word) this is `None`, and the marker still advances.
    pub fn next_word(&mut self) -> Option<DictWord> {
        let w = self.dict_at(self.wn);
        self.wn += 1;
        w
    }

    pub fn next_word_stopped(&mut self) -> Next {
        if self.wn > self.words.len() {
            self.wn += 1;
            return Next::End;
        }
        Next::Word(self.next_word())
    }

    /// Byte offset of word `n`, or the end of the text for words past the end.
    pub fn word_address(&self, n: usize, text_len: usize) -> usize {
        self.word(n).map(|w| w.start).unwrap_or(text_len)
    }

    pub fn view_from(&self, n: usize) -> WordView<'_> {
        WordView {
            words: &self.words,
            pos: n.saturating_sub(1),
            start: n.saturating_sub(1),
        }
    }
}

/// Read-only cursor over the words, handed to custom name parsers.
#[derive(Debug, Clone)]
pub struct WordView<'a> {
    words: &'a [Word],
    pos: usize,
    start: usize,
}

impl<'a> WordView<'a> {
    pub fn over(words: &'a [Word]) -> Self {
        WordView {
            words,
            pos: 0,
            start: 0,
        }
    }

    pub fn peek(&self) -> Option<&'a str> {
        self.words.get(self.pos).map(|w| w.text.as_str())
    }

    pub fn next_word(&mut self) -> Option<&'a str> {
        let w = self.peek();
        if w.is_some() {
            self.pos += 1;
        }
        w
    }

    /// How many words have been read so far
    pub fn consumed(&self) -> usize {
        self.pos - self.start
    }
}

impl<'a> Iterator for WordView<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        self.next_word()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::NOUN;

    fn dict() -> Dictionary {
        let mut d = Dictionary::new(9);
        d.add("take", 0);
        d.add("ball", NOUN);
        d.add(",", 0);
        d.add(".", 0);
        d
    }

    #[test]
    fn test_tokenise_splits_separators() {
        let d = dict();
        let words = tokenise("dwarf, take ball.then", &d, 15);
        let texts: Vec<&str> = words.iter().map(|w| w.text.as_str()).collect();
        assert_eq!(texts, vec!["dwarf", ",", "take", "ball", ".", "then"]);
        assert_eq!(words[0].dict, None);
        assert_eq!(words[2].dict, d.lookup("take"));
        assert_eq!(words[3].start, 12);
        assert_eq!(words[3].len, 4);
    }

    #[test]
    fn test_tokenise_word_limit() {
        let d = dict();
        let words = tokenise("a b c d e f", &d, 4);
        assert_eq!(words.len(), 4);
    }

    #[test]
    fn test_next_word_runs_past_end() {
        let d = dict();
        let mut stream = WordStream::new(tokenise("take ball", &d, 15));
        assert_eq!(stream.next_word(), d.lookup("take"));
        assert_eq!(stream.next_word(), d.lookup("ball"));
        assert_eq!(stream.next_word(), None);
        assert_eq!(stream.wn, 4);
        assert_eq!(stream.next_word_stopped(), Next::End);
        assert_eq!(stream.wn, 5);
    }

    #[test]
    fn test_buffer_edits_respect_capacity() {
        let mut buf = InputBuffer::new(12);
        buf.set("TAKE BAL");
        assert_eq!(buf.as_str(), "take bal");
        buf.replace_range(5, 8, "ball");
        assert_eq!(buf.as_str(), "take ball");
        buf.insert(5, "red ");
        assert_eq!(buf.as_str(), "take red bal");
        buf.blank(0, 5);
        assert_eq!(buf.as_str(), "     red bal");
    }

    #[test]
    fn test_parse_digits() {
        assert_eq!(parse_digits("42"), Some(42));
        assert_eq!(parse_digits("0007"), Some(7));
        assert_eq!(parse_digits("123456"), Some(10000));
        assert_eq!(parse_digits("4x"), None);
        assert_eq!(parse_digits(""), None);
    }

    #[test]
    fn test_word_view() {
        let d = dict();
        let stream = WordStream::new(tokenise("take red ball", &d, 15));
        let mut view = stream.view_from(2);
        assert_eq!(view.next_word(), Some("red"));
        assert_eq!(view.peek(), Some("ball"));
        assert_eq!(view.consumed(), 1);
    }
}
