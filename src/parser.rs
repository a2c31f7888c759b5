use crate::intern;
use crate::number::Number;
use crate::context::Context;
use crate::token::{Token, TokenKind};
use crate::value::{ErrorCode, Value};

/// Cursor over the token vector of a compiled quote.
pub struct TokenStream<'a>
{
    tokens: &'a [Token],
    offset: usize,
}

impl<'a> TokenStream<'a>
{
    pub fn new(tokens: &'a [Token]) -> Self
    {
        Self { tokens, offset: 0 }
    }

    pub fn peek(&self) -> Option<&'a Token>
    {
        self.tokens.get(self.offset)
    }

    pub fn next(&mut self) -> Option<&'a Token>
    {
        let token = self.tokens.get(self.offset);

        if token.is_some()
        {
            self.offset += 1;
        }
        token
    }

    pub fn advance(&mut self)
    {
        self.offset += 1;
    }
}

/// Consumes exactly one value-producing construct from the stream. Returns
/// `None` with an error latched into the context when the construct is
/// malformed.
pub fn parse_value(ctx: &mut Context, stream: &mut TokenStream) -> Option<Value>
{
    let token = match stream.next()
    {
        Some(token) => token,
        None =>
        {
            ctx.set_error(ErrorCode::Syntax, "Unexpected end of input, missing value.");
            return None;
        }
    };

    ctx.set_position(token.position.clone());
    match token.kind
    {
        TokenKind::String => Some(Value::String(token.text.clone())),
        TokenKind::LeftParen => parse_quote(ctx, stream),
        TokenKind::LeftBracket => parse_array(ctx, stream),
        TokenKind::LeftBrace => parse_object(ctx, stream),
        TokenKind::Word =>
        {
            match token.text.as_str()
            {
                "null" => return Some(Value::Null),
                "true" => return Some(ctx.runtime().true_value()),
                "false" => return Some(ctx.runtime().false_value()),
                // Yields whatever is on top of the operand stack.
                "drop" => return ctx.pop(),
                _ =>
                {}
            }
            if let Some(number) = Number::parse(token.text.as_str())
            {
                return Some(ctx.runtime().number(number));
            }

            let message = format!("Unexpected `{}', missing value.", token.to_source());

            ctx.set_error(ErrorCode::Syntax, &message);
            None
        }
        _ =>
        {
            let message = format!("Unexpected `{}', missing value.", token.to_source());

            ctx.set_error(ErrorCode::Syntax, &message);
            None
        }
    }
}

fn parse_quote(ctx: &mut Context, stream: &mut TokenStream) -> Option<Value>
{
    let mut result = Vec::new();
    let mut counter = 1;

    while let Some(token) = stream.next()
    {
        if token.is(TokenKind::LeftParen)
        {
            counter += 1;
        }
        else if token.is(TokenKind::RightParen)
        {
            counter -= 1;
            if counter == 0
            {
                break;
            }
        }
        result.push(token.clone());
    }
    if counter > 0
    {
        ctx.set_error(ErrorCode::Syntax, "Unterminated quote.");
        return None;
    }
    Some(Value::Quote(ctx.runtime().compiled(result)))
}

fn parse_array(ctx: &mut Context, stream: &mut TokenStream) -> Option<Value>
{
    let mut elements = Vec::new();

    loop
    {
        let token = match stream.peek()
        {
            Some(token) => token,
            None =>
            {
                ctx.set_error(ErrorCode::Syntax, "Unterminated array literal.");
                return None;
            }
        };

        if token.is(TokenKind::RightBracket)
        {
            stream.advance();
            break;
        }
        elements.push(parse_value(ctx, stream)?);

        let token = match stream.peek()
        {
            Some(token) => token,
            None =>
            {
                ctx.set_error(ErrorCode::Syntax, "Unterminated array literal.");
                return None;
            }
        };

        if token.is(TokenKind::Comma)
        {
            stream.advance();
        }
        else if !token.is(TokenKind::RightBracket)
        {
            let message = format!("Unexpected `{}', missing `]'.", token.to_source());

            ctx.set_error(ErrorCode::Syntax, &message);
            return None;
        }
    }
    Some(ctx.runtime().array(elements))
}

fn parse_object(ctx: &mut Context, stream: &mut TokenStream) -> Option<Value>
{
    let mut properties = Vec::new();

    loop
    {
        let token = match stream.peek()
        {
            Some(token) => token,
            None =>
            {
                ctx.set_error(ErrorCode::Syntax, "Unterminated object literal.");
                return None;
            }
        };

        if token.is(TokenKind::RightBrace)
        {
            stream.advance();
            break;
        }
        else if !token.is(TokenKind::String)
        {
            ctx.set_error(ErrorCode::Syntax, "Missing key for object literal.");
            return None;
        }

        let key = token.text.clone();

        stream.advance();
        match stream.next()
        {
            Some(token) if token.is(TokenKind::Colon) =>
            {}
            _ =>
            {
                ctx.set_error(ErrorCode::Syntax, "Missing `:' after key of an object.");
                return None;
            }
        }
        properties.push((key, parse_value(ctx, stream)?));

        let token = match stream.peek()
        {
            Some(token) => token,
            None =>
            {
                ctx.set_error(ErrorCode::Syntax, "Unterminated object literal.");
                return None;
            }
        };

        if token.is(TokenKind::Comma)
        {
            stream.advance();
        }
        else if !token.is(TokenKind::RightBrace)
        {
            let message = format!("Unexpected `{}', missing `}}'.", token.to_source());

            ctx.set_error(ErrorCode::Syntax, &message);
            return None;
        }
    }
    Some(ctx.runtime().object(properties))
}

/// True when the tokens form exactly one quote literal, parentheses
/// included.
fn body_is_single_quote(tokens: &[Token]) -> bool
{
    if tokens.len() < 2 || !tokens[0].is(TokenKind::LeftParen)
    {
        return false;
    }

    let mut counter = 0;

    for (index, token) in tokens.iter().enumerate()
    {
        if token.is(TokenKind::LeftParen)
        {
            counter += 1;
        }
        else if token.is(TokenKind::RightParen)
        {
            counter -= 1;
            if counter == 0
            {
                return index == tokens.len() - 1;
            }
        }
    }
    false
}

/// Consumes `: name tokens ;` and installs the named quote into the
/// context's local dictionary. The stream is expected to sit on the colon.
/// A body consisting of a single quote literal becomes the body of the word
/// itself, so `: square ( dup * ) ;` and `: square dup * ;` define the same
/// word.
pub fn parse_declaration(ctx: &mut Context, stream: &mut TokenStream) -> bool
{
    stream.advance();

    let name = match stream.next()
    {
        Some(token) if token.is(TokenKind::Word) => token.text.clone(),
        _ =>
        {
            ctx.set_error(ErrorCode::Syntax, "Missing name after word declaration.");
            return false;
        }
    };
    let mut tokens = Vec::new();
    let mut counter = 1;

    while let Some(token) = stream.next()
    {
        if token.is(TokenKind::Colon)
        {
            counter += 1;
        }
        else if token.is(TokenKind::Semicolon)
        {
            counter -= 1;
            if counter == 0
            {
                break;
            }
        }
        tokens.push(token.clone());
    }
    if counter > 0
    {
        ctx.set_error(ErrorCode::Syntax, "Unterminated declaration.");
        return false;
    }
    if body_is_single_quote(&tokens)
    {
        tokens = tokens[1..tokens.len() - 1].to_vec();
    }

    let quote = ctx.runtime().compiled(tokens);
    let word = ctx.runtime().word(intern::intern_symbol(name.as_str()), quote);

    ctx.exec_word(&word);
    true
}
