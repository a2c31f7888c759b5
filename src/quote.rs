use crate::context::Context;
use crate::parser::{self, TokenStream};
use crate::token::{Token, TokenKind};
use crate::value::{ErrorCode, Value};
use std::fmt;
use std::rc::Rc;

pub type NativeCallback = fn(&mut Context);

/// Suspended computation. Every variant answers `call` with true when no
/// error was latched into the context during the call.
pub enum Quote
{
    /// Token vector compiled from source code, evaluated lazily.
    Compiled(Vec<Token>),
    /// Wrapper around a host callback.
    Native(NativeCallback),
    /// Pushes the argument, then calls the wrapped quote.
    Curried
    {
        argument: Value,
        quote: Rc<Quote>,
    },
    /// Calls both quotes in sequence, short-circuiting on failure.
    Composed
    {
        left: Rc<Quote>,
        right: Rc<Quote>,
    },
    /// Calls the wrapped quote and negates the boolean it leaves on top.
    Negated(Rc<Quote>),
    /// Pushes the wrapped value and nothing else.
    Constant(Value),
}

impl Quote
{
    pub fn call(&self, ctx: &mut Context) -> bool
    {
        match self
        {
            Quote::Compiled(tokens) => call_compiled(tokens, ctx),
            Quote::Native(callback) =>
            {
                callback(ctx);
                !ctx.has_error()
            }
            Quote::Curried { argument, quote } =>
            {
                ctx.push(argument.clone());
                quote.call(ctx)
            }
            Quote::Composed { left, right } => left.call(ctx) && right.call(ctx),
            Quote::Negated(quote) =>
            {
                if !quote.call(ctx)
                {
                    return false;
                }
                match ctx.pop_boolean()
                {
                    Some(value) =>
                    {
                        ctx.push(Value::Boolean(!value));
                        true
                    }
                    None => false,
                }
            }
            Quote::Constant(value) =>
            {
                ctx.push(value.clone());
                true
            }
        }
    }

    pub fn to_source(&self) -> String
    {
        match self
        {
            Quote::Compiled(tokens) =>
            {
                let parts: Vec<String> = tokens.iter().map(Token::to_source).collect();

                format!("({})", parts.join(" "))
            }
            Quote::Native(_) => "(\"native quote\")".to_string(),
            Quote::Curried { argument, quote } =>
            {
                format!("{} {} curry", argument.to_source(), quote.to_source())
            }
            Quote::Composed { left, right } =>
            {
                format!("{} {} compose", left.to_source(), right.to_source())
            }
            Quote::Negated(quote) => format!("{} negate", quote.to_source()),
            Quote::Constant(value) => format!("({})", value.to_source()),
        }
    }
}

/// Structural equality for compiled and combinator quotes; identity for
/// native quotes.
pub fn quotes_equal(a: &Rc<Quote>, b: &Rc<Quote>) -> bool
{
    match (a.as_ref(), b.as_ref())
    {
        (Quote::Native(_), Quote::Native(_)) => Rc::ptr_eq(a, b),
        (Quote::Compiled(x), Quote::Compiled(y)) => x == y,
        (
            Quote::Curried {
                argument: arg_a,
                quote: quote_a,
            },
            Quote::Curried {
                argument: arg_b,
                quote: quote_b,
            },
        ) => arg_a == arg_b && quotes_equal(quote_a, quote_b),
        (
            Quote::Composed {
                left: left_a,
                right: right_a,
            },
            Quote::Composed {
                left: left_b,
                right: right_b,
            },
        ) => quotes_equal(left_a, left_b) && quotes_equal(right_a, right_b),
        (Quote::Negated(x), Quote::Negated(y)) => quotes_equal(x, y),
        (Quote::Constant(x), Quote::Constant(y)) => x == y,
        _ => false,
    }
}

/// Walks the token vector of a compiled quote: literals are parsed and
/// pushed, declarations install words, everything else is dispatched as a
/// word call.
fn call_compiled(tokens: &[Token], ctx: &mut Context) -> bool
{
    let mut stream = TokenStream::new(tokens);

    while let Some(token) = stream.peek()
    {
        ctx.set_position(token.position.clone());
        match token.kind
        {
            TokenKind::String
            | TokenKind::LeftParen
            | TokenKind::LeftBracket
            | TokenKind::LeftBrace => match parser::parse_value(ctx, &mut stream)
            {
                Some(value) => ctx.push(value),
                None => return false,
            },
            TokenKind::Colon =>
            {
                if !parser::parse_declaration(ctx, &mut stream)
                {
                    return false;
                }
            }
            TokenKind::Word =>
            {
                let text = token.text.clone();

                stream.advance();
                if !ctx.call_word(text.as_str())
                {
                    return false;
                }
            }
            _ =>
            {
                let message = format!("Unexpected `{}'.", token.to_source());

                ctx.set_error(ErrorCode::Syntax, &message);
                return false;
            }
        }
    }
    true
}

impl fmt::Debug for Quote
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result
    {
        match self
        {
            Quote::Compiled(tokens) => f.debug_tuple("Compiled").field(tokens).finish(),
            Quote::Native(_) => f.write_str("Native(..)"),
            Quote::Curried { argument, quote } => f
                .debug_struct("Curried")
                .field("argument", argument)
                .field("quote", quote)
                .finish(),
            Quote::Composed { left, right } => f
                .debug_struct("Composed")
                .field("left", left)
                .field("right", right)
                .finish(),
            Quote::Negated(quote) => f.debug_tuple("Negated").field(quote).finish(),
            Quote::Constant(value) => f.debug_tuple("Constant").field(value).finish(),
        }
    }
}
