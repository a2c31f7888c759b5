use crate::intern;
use crate::token::{Position, Token, TokenKind};
use crate::value::{ErrorCode, PlorthError};
use std::rc::Rc;

pub struct Tokenizer
{
    input: Vec<char>,
    offset: usize,
    line: u32,
    column: u32,
    filename: Rc<String>,
}

fn is_delimiter(c: char) -> bool
{
    matches!(c, '(' | ')' | '[' | ']' | '{' | '}' | ':' | ';' | ',')
}

// A byte order mark counts as whitespace.
fn is_space(c: char) -> bool
{
    c.is_whitespace() || c == '\u{feff}'
}

fn delimiter_kind(c: char) -> TokenKind
{
    match c
    {
        '(' => TokenKind::LeftParen,
        ')' => TokenKind::RightParen,
        '[' => TokenKind::LeftBracket,
        ']' => TokenKind::RightBracket,
        '{' => TokenKind::LeftBrace,
        '}' => TokenKind::RightBrace,
        ':' => TokenKind::Colon,
        ';' => TokenKind::Semicolon,
        _ => TokenKind::Comma,
    }
}

impl Tokenizer
{
    pub fn new(source: &str, filename: Rc<String>, start_line: u32) -> Self
    {
        Self {
            input: source.chars().collect(),
            offset: 0,
            line: start_line.max(1),
            column: 1,
            filename,
        }
    }

    pub fn tokenize(mut self) -> Result<Vec<Token>, PlorthError>
    {
        let mut tokens = Vec::new();

        loop
        {
            self.skip_whitespace_and_comments();
            if self.eof()
            {
                return Ok(tokens);
            }

            let position = self.position();
            let c = self.input[self.offset];

            if is_delimiter(c)
            {
                self.advance();
                tokens.push(Token {
                    kind: delimiter_kind(c),
                    text: intern::intern(""),
                    position,
                });
            }
            else if c == '"'
            {
                tokens.push(self.read_string(position)?);
            }
            else
            {
                tokens.push(self.read_word(position));
            }
        }
    }

    fn position(&self) -> Position
    {
        Position {
            filename: self.filename.clone(),
            line: self.line,
            column: self.column,
        }
    }

    fn eof(&self) -> bool
    {
        self.offset >= self.input.len()
    }

    fn advance(&mut self) -> char
    {
        let c = self.input[self.offset];

        self.offset += 1;
        if c == '\n'
        {
            self.line += 1;
            self.column = 1;
        }
        else
        {
            self.column += 1;
        }
        c
    }

    fn skip_whitespace_and_comments(&mut self)
    {
        while !self.eof()
        {
            let c = self.input[self.offset];

            if is_space(c)
            {
                self.advance();
            }
            else if c == '#'
            {
                while !self.eof() && self.input[self.offset] != '\n'
                {
                    self.advance();
                }
            }
            else
            {
                break;
            }
        }
    }

    fn syntax_error(&self, message: &str, position: Position) -> PlorthError
    {
        PlorthError::with_position(ErrorCode::Syntax, message, position)
    }

    fn read_word(&mut self, position: Position) -> Token
    {
        let mut text = String::new();

        while !self.eof()
        {
            let c = self.input[self.offset];

            if is_space(c) || is_delimiter(c) || c == '#' || c == '"'
            {
                break;
            }
            text.push(self.advance());
        }

        Token {
            kind: TokenKind::Word,
            text: intern::intern_owned(text),
            position,
        }
    }

    fn read_string(&mut self, position: Position) -> Result<Token, PlorthError>
    {
        let mut text = String::new();

        self.advance();
        loop
        {
            if self.eof()
            {
                return Err(self.syntax_error("Unterminated string literal.", position));
            }

            let c = self.input[self.offset];

            match c
            {
                '"' =>
                {
                    self.advance();
                    return Ok(Token {
                        kind: TokenKind::String,
                        text: intern::intern_owned(text),
                        position,
                    });
                }
                '\n' | '\r' =>
                {
                    return Err(self.syntax_error("Unterminated string literal.", position));
                }
                '\\' =>
                {
                    self.advance();
                    text.push(self.read_escape(&position)?);
                }
                _ =>
                {
                    text.push(self.advance());
                }
            }
        }
    }

    fn read_escape(&mut self, position: &Position) -> Result<char, PlorthError>
    {
        if self.eof()
        {
            return Err(self.syntax_error("Unterminated string literal.", position.clone()));
        }
        match self.advance()
        {
            '"' => Ok('"'),
            '\\' => Ok('\\'),
            '/' => Ok('/'),
            'b' => Ok('\u{8}'),
            'f' => Ok('\u{c}'),
            'n' => Ok('\n'),
            'r' => Ok('\r'),
            't' => Ok('\t'),
            'u' => self.read_unicode_escape(position),
            _ => Err(self.syntax_error("Unrecognized escape sequence.", position.clone())),
        }
    }

    fn read_hex_quad(&mut self, position: &Position) -> Result<u32, PlorthError>
    {
        let mut result = 0u32;

        for _ in 0..4
        {
            if self.eof()
            {
                return Err(self.syntax_error("Unterminated string literal.", position.clone()));
            }

            let c = self.advance();

            match c.to_digit(16)
            {
                Some(digit) => result = (result << 4) | digit,
                None =>
                {
                    return Err(
                        self.syntax_error("Invalid Unicode escape sequence.", position.clone())
                    );
                }
            }
        }
        Ok(result)
    }

    fn read_unicode_escape(&mut self, position: &Position) -> Result<char, PlorthError>
    {
        let first = self.read_hex_quad(position)?;

        // Astral code points arrive as JSON surrogate pairs.
        if (0xd800..=0xdbff).contains(&first)
        {
            if self.eof()
                || self.advance() != '\\'
                || self.eof()
                || self.advance() != 'u'
            {
                return Err(
                    self.syntax_error("Invalid Unicode escape sequence.", position.clone())
                );
            }

            let second = self.read_hex_quad(position)?;

            if !(0xdc00..=0xdfff).contains(&second)
            {
                return Err(
                    self.syntax_error("Invalid Unicode escape sequence.", position.clone())
                );
            }

            let combined = 0x10000 + ((first - 0xd800) << 10) + (second - 0xdc00);

            return char::from_u32(combined).ok_or_else(|| {
                self.syntax_error("Invalid Unicode escape sequence.", position.clone())
            });
        }

        char::from_u32(first)
            .ok_or_else(|| self.syntax_error("Invalid Unicode escape sequence.", position.clone()))
    }
}

/// Character-level bracket balance used by the REPL to decide whether a
/// buffered chunk of input is complete. The stack holds the closing
/// characters that are still expected; mismatched closers are ignored, a
/// comment ends the line, and a string that does not close on the line
/// swallows the rest of it.
pub fn count_open_brackets(line: &str, stack: &mut Vec<char>)
{
    let chars: Vec<char> = line.chars().collect();
    let mut i = 0;

    while i < chars.len()
    {
        match chars[i]
        {
            '#' => return,
            '(' => stack.push(')'),
            '[' => stack.push(']'),
            '{' => stack.push('}'),
            ')' | ']' | '}' =>
            {
                if stack.last() == Some(&chars[i])
                {
                    stack.pop();
                }
            }
            '"' =>
            {
                i += 1;
                loop
                {
                    if i >= chars.len()
                    {
                        return;
                    }
                    else if chars[i] == '"'
                    {
                        break;
                    }
                    else if chars[i] == '\\'
                    {
                        i += 2;
                    }
                    else
                    {
                        i += 1;
                    }
                }
            }
            _ =>
            {}
        }
        i += 1;
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    fn tokenize(source: &str) -> Result<Vec<Token>, PlorthError>
    {
        Tokenizer::new(source, intern::intern("<test>"), 1).tokenize()
    }

    fn kinds(source: &str) -> Vec<TokenKind>
    {
        tokenize(source)
            .expect("tokenize")
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn recognizes_all_token_kinds()
    {
        assert_eq!(
            kinds("( ) [ ] { } : ; , foo \"bar\""),
            vec![
                TokenKind::LeftParen,
                TokenKind::RightParen,
                TokenKind::LeftBracket,
                TokenKind::RightBracket,
                TokenKind::LeftBrace,
                TokenKind::RightBrace,
                TokenKind::Colon,
                TokenKind::Semicolon,
                TokenKind::Comma,
                TokenKind::Word,
                TokenKind::String,
            ]
        );
    }

    #[test]
    fn words_split_on_delimiters()
    {
        let tokens = tokenize("dup(swap").expect("tokenize");
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[0].text.as_str(), "dup");
        assert_eq!(tokens[1].kind, TokenKind::LeftParen);
        assert_eq!(tokens[2].text.as_str(), "swap");
    }

    #[test]
    fn tracks_positions_across_lines()
    {
        let tokens = tokenize("foo\n  bar").expect("tokenize");
        assert_eq!(tokens[0].position.line, 1);
        assert_eq!(tokens[0].position.column, 1);
        assert_eq!(tokens[1].position.line, 2);
        assert_eq!(tokens[1].position.column, 3);
    }

    #[test]
    fn byte_order_mark_is_whitespace()
    {
        let tokens = tokenize("\u{feff}dup").expect("tokenize");

        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].text.as_str(), "dup");
    }

    #[test]
    fn honors_starting_line()
    {
        let tokens = Tokenizer::new("foo", intern::intern("<repl>"), 12)
            .tokenize()
            .expect("tokenize");
        assert_eq!(tokens[0].position.line, 12);
    }

    #[test]
    fn comments_run_to_end_of_line()
    {
        let tokens = tokenize("foo # ( [ \"\nbar").expect("tokenize");
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[1].text.as_str(), "bar");
    }

    #[test]
    fn string_escapes()
    {
        let tokens = tokenize(r#""a\"b\\c\/\b\f\n\r\t""#).expect("tokenize");
        assert_eq!(tokens[0].text.as_str(), "a\"b\\c/\u{8}\u{c}\n\r\t");
    }

    #[test]
    fn unicode_escape_yields_code_points()
    {
        let tokens = tokenize(r#""aäb""#).expect("tokenize");
        let points: Vec<u32> = tokens[0].text.chars().map(|c| c as u32).collect();
        assert_eq!(points, vec![0x61, 0xe4, 0x62]);
    }

    #[test]
    fn surrogate_pair_escape()
    {
        let tokens = tokenize(r#""\ud83d\ude00""#).expect("tokenize");
        assert_eq!(tokens[0].text.as_str(), "\u{1f600}");
    }

    #[test]
    fn lone_surrogate_is_rejected()
    {
        let err = tokenize(r#""\ud83d""#).expect_err("should fail");
        assert_eq!(err.code, ErrorCode::Syntax);
    }

    #[test]
    fn unknown_escape_is_rejected()
    {
        let err = tokenize(r#""\q""#).expect_err("should fail");
        assert_eq!(err.code, ErrorCode::Syntax);
    }

    #[test]
    fn unterminated_string_is_rejected()
    {
        let err = tokenize("\"abc").expect_err("should fail");
        assert_eq!(err.code, ErrorCode::Syntax);
        let err = tokenize("\"abc\ndef\"").expect_err("should fail");
        assert_eq!(err.code, ErrorCode::Syntax);
    }

    #[test]
    fn json_stringify_round_trips_through_the_tokenizer()
    {
        for sample in [
            "",
            "hello",
            "a\"b\\c",
            "tab\there",
            "p\u{e4}iv\u{e4}\u{e4}",
            "\u{1f600} mixed ascii",
            "\u{0}\u{1f}",
        ]
        {
            let quoted = crate::unicode::json_stringify(sample);
            let tokens = tokenize(&quoted).expect("tokenize");

            assert_eq!(tokens.len(), 1);
            assert_eq!(tokens[0].text.as_str(), sample);
        }
    }

    #[test]
    fn bracket_counter_tracks_nesting()
    {
        let mut stack = Vec::new();

        count_open_brackets("[1, 2,", &mut stack);
        assert_eq!(stack, vec![']']);
        count_open_brackets("3]", &mut stack);
        assert!(stack.is_empty());
    }

    #[test]
    fn bracket_counter_ignores_strings_and_comments()
    {
        let mut stack = Vec::new();

        count_open_brackets("\"([{\" # )]}", &mut stack);
        assert!(stack.is_empty());
        count_open_brackets("( \"a\\\"[\" ", &mut stack);
        assert_eq!(stack, vec![')']);
    }

    #[test]
    fn bracket_counter_matches_whole_text()
    {
        let source = ": fib ( dup 2 <\n  [1, 2, {\"a\": (3)}]\n) ;";
        let mut by_line = Vec::new();
        let mut whole = Vec::new();

        for line in source.lines()
        {
            count_open_brackets(line, &mut by_line);
        }
        count_open_brackets(&source.replace('\n', " "), &mut whole);
        assert_eq!(by_line, whole);
        assert!(by_line.is_empty());
    }
}
