//! Indentation transformation for the stub lexer
//!
//! Turns the raw logos stream into the token stream the grammar consumes: layout tokens
//! disappear and every change of indentation at the start of a logical line becomes
//! `Indent`/`Dedent` markers.
//!
//! # Algorithm
//!
//! 1. Keep a stack of indentation columns, starting at `[0]`
//! 2. Skip blank lines, comment-only lines and lines holding only a type comment
//! 3. Ignore newlines while inside `()`, `[]` or `{}`
//! 4. At the first token of a logical line, compare its column with the top of the stack:
//!    - deeper: push and emit one `Indent`
//!    - shallower: pop and emit one `Dedent` per level; the column must match a level
//!      that was pushed before, otherwise emit `LexError`
//! 5. At end of input, emit a `Dedent` for every open level and then `Eof`
//!
//! The first lexing failure ends the stream with `LexError` followed by `Eof`.

use std::collections::VecDeque;
use std::ops::Range;

use log::trace;
use logos::Logos;

use super::lexer_impl::describe_error;
use super::tokens::Token;

/// A token with its byte range in the source
pub type Spanned = (Token, Range<usize>);

/// Tabs advance to the next multiple of this width
const TAB_SIZE: usize = 8;

const BAD_DEDENT: &str = "unindent does not match any outer indentation level";

/// Pull-based lexer producing the grammar token stream
pub struct Lexer<'src> {
    raw: logos::Lexer<'src, Token>,
    pending: VecDeque<Spanned>,
    indent_stack: Vec<usize>,
    bracket_depth: usize,
    at_line_start: bool,
    line_indent: usize,
    source_len: usize,
    finished: bool,
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            raw: Token::lexer(source),
            pending: VecDeque::new(),
            indent_stack: vec![0],
            bracket_depth: 0,
            at_line_start: true,
            line_indent: 0,
            source_len: source.len(),
            finished: false,
        }
    }

    fn eof_span(&self) -> Range<usize> {
        self.source_len..self.source_len
    }

    /// Queue `LexError` + `Eof` and stop reading raw tokens
    fn fail(&mut self, message: String, span: Range<usize>) {
        trace!("lexer error at {:?}: {}", span, message);
        self.pending.push_back((Token::LexError(message), span));
        self.pending.push_back((Token::Eof, self.eof_span()));
        self.finished = true;
    }

    /// Close every open indentation level and queue `Eof`
    fn finish(&mut self) {
        let span = self.eof_span();
        while self.indent_stack.len() > 1 {
            self.indent_stack.pop();
            self.pending.push_back((Token::Dedent, span.clone()));
        }
        self.pending.push_back((Token::Eof, span));
        self.finished = true;
    }

    /// Drop the remainder of the current line (used for whole-line type comments)
    fn skip_line(&mut self) {
        while let Some(result) = self.raw.next() {
            if matches!(result, Ok(Token::Newline)) {
                break;
            }
        }
    }

    /// Emit indentation markers for the first token of a logical line.
    /// Returns false when the indentation is inconsistent.
    fn open_line(&mut self, start: usize) -> bool {
        let column = self.line_indent;
        let current = self.indent_stack.last().copied().unwrap_or(0);
        let marker_span = start..start;

        if column > current {
            self.indent_stack.push(column);
            self.pending.push_back((Token::Indent, marker_span));
        } else if column < current {
            if !self.indent_stack.contains(&column) {
                self.fail(BAD_DEDENT.to_string(), marker_span);
                return false;
            }
            while self.indent_stack.last().is_some_and(|level| *level > column) {
                self.indent_stack.pop();
                self.pending.push_back((Token::Dedent, marker_span.clone()));
            }
        }
        true
    }

    /// Process one raw token, queueing whatever grammar tokens it produces
    fn pull(&mut self) {
        let Some(result) = self.raw.next() else {
            self.finish();
            return;
        };
        let span = self.raw.span();
        let token = match result {
            Ok(token) => token,
            Err(kind) => {
                let message = describe_error(&kind, self.raw.slice());
                self.fail(message, span);
                return;
            }
        };

        match token {
            Token::Whitespace => {
                if self.at_line_start {
                    self.line_indent = indent_width(self.line_indent, self.raw.slice());
                }
            }
            Token::Newline => {
                if self.bracket_depth == 0 {
                    self.at_line_start = true;
                    self.line_indent = 0;
                }
            }
            Token::TypeComment(_) if self.at_line_start => {
                self.skip_line();
                self.line_indent = 0;
            }
            token => {
                if self.at_line_start {
                    self.at_line_start = false;
                    if !self.open_line(span.start) {
                        return;
                    }
                }
                if token.is_open_bracket() {
                    self.bracket_depth += 1;
                } else if token.is_close_bracket() {
                    self.bracket_depth = self.bracket_depth.saturating_sub(1);
                }
                self.pending.push_back((token, span));
            }
        }
    }

    /// Make sure at least `count` tokens are queued (fewer only once the stream ended)
    fn fill_to(&mut self, count: usize) {
        while self.pending.len() < count && !self.finished {
            self.pull();
        }
    }

    /// Merge `.` `.` `.` with adjacent spans into a single `Ellipsis`
    fn merge_ellipsis(&mut self, first: Spanned) -> Spanned {
        if first.0 != Token::Dot {
            return first;
        }
        self.fill_to(2);
        let adjacent = match (self.pending.front(), self.pending.get(1)) {
            (Some((Token::Dot, second)), Some((Token::Dot, third))) => {
                second.start == first.1.end && third.start == second.end
            }
            _ => false,
        };
        if !adjacent {
            return first;
        }
        self.pending.pop_front();
        let end = self
            .pending
            .pop_front()
            .map_or(first.1.end, |(_, span)| span.end);
        (Token::Ellipsis, first.1.start..end)
    }
}

impl Iterator for Lexer<'_> {
    type Item = Spanned;

    fn next(&mut self) -> Option<Spanned> {
        self.fill_to(1);
        let token = self.pending.pop_front()?;
        Some(self.merge_ellipsis(token))
    }
}

/// Advance an indentation column over a run of whitespace
fn indent_width(start: usize, whitespace: &str) -> usize {
    whitespace.chars().fold(start, |column, c| match c {
        '\t' => (column / TAB_SIZE + 1) * TAB_SIZE,
        '\x0C' => 0,
        '\r' => column,
        _ => column + 1,
    })
}
