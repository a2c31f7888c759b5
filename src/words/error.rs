use crate::context::Context;
use crate::number::Number;
use crate::quote::NativeCallback;
use crate::value::{Value, ValueType};

// error? ( any -- any bool )
//
// Returns true when the value on top of the stack is an error.
fn w_is_error(ctx: &mut Context)
{
    if let Some(value) = ctx.peek()
    {
        let result = ctx.runtime().boolean(value.is(ValueType::Error));

        ctx.push(result);
    }
}

// try ( quo quo -- )
//
// Executes the first quote; when it fails, the caught error is pushed onto
// the stack, the error slot is cleared and the second quote runs.
fn w_try(ctx: &mut Context)
{
    let catch_block = match ctx.pop_quote()
    {
        Some(quote) => quote,
        None => return,
    };
    let try_block = match ctx.pop_quote()
    {
        Some(quote) => quote,
        None => return,
    };

    if !try_block.call(ctx)
    {
        if let Some(error) = ctx.take_error()
        {
            ctx.push(Value::Error(error));
        }
        catch_block.call(ctx);
    }
}

// error.code ( err -- err num )
//
// Returns the error code in numeric form.
fn w_code(ctx: &mut Context)
{
    if let Some(error) = ctx.peek_error()
    {
        let code = ctx.runtime().number(Number::Int(error.code.as_number()));

        ctx.push(code);
    }
}

// error.message ( err -- err str|null )
//
// Returns the error message, or null when the error carries none.
fn w_message(ctx: &mut Context)
{
    if let Some(error) = ctx.peek_error()
    {
        if error.message.is_empty()
        {
            ctx.push(Value::Null);
        }
        else
        {
            ctx.push(Value::String(error.message.clone()));
        }
    }
}

// error.throw ( err -- )
//
// Sets the given error as the current error of the context.
fn w_throw(ctx: &mut Context)
{
    if let Some(error) = ctx.pop_error()
    {
        ctx.set_error_value(error);
    }
}

pub fn entries() -> Vec<(&'static str, NativeCallback)>
{
    vec![
        ("error?", w_is_error),
        ("try", w_try),
        ("error.code", w_code),
        ("error.message", w_message),
        ("error.throw", w_throw),
    ]
}

#[cfg(test)]
mod tests
{
    use super::*;
    use crate::runtime::Runtime;
    use crate::value::ErrorCode;

    fn run(source: &str) -> Context
    {
        let runtime = Runtime::new();
        let mut ctx = Context::new(&runtime);

        if let Some(script) = ctx.compile(source, "<test>", 1)
        {
            script.call(&mut ctx);
        }
        ctx
    }

    #[test]
    fn try_catches_and_clears_the_error()
    {
        let ctx = run("( 1 0 / ) ( error.code ) try");

        assert!(!ctx.has_error());
        assert_eq!(ctx.size(), 2);
        assert_eq!(
            ctx.stack().last(),
            Some(&Value::Number(Number::Int(ErrorCode::Range.as_number())))
        );
        assert!(ctx.stack()[0].is(ValueType::Error));
    }

    #[test]
    fn try_skips_the_catch_quote_on_success()
    {
        let ctx = run("( 42 ) ( 0 ) try");

        assert!(!ctx.has_error());
        assert_eq!(ctx.stack(), &[Value::Number(Number::Int(42))]);
    }

    #[test]
    fn error_message_reads_the_latched_message()
    {
        let ctx = run("( [] ( + ) reduce ) ( error.message ) try");

        assert!(!ctx.has_error());
        assert_eq!(
            ctx.stack().last().map(|v| v.to_display()),
            Some("Cannot reduce empty array.".to_string())
        );
    }

    #[test]
    fn throw_relatches_a_caught_error()
    {
        let ctx = run("( 1 0 / ) ( error.throw ) try");
        let error = ctx.error().expect("error");

        assert_eq!(error.code, ErrorCode::Range);
    }

    #[test]
    fn is_error_inspects_the_stack_top()
    {
        let ctx = run("1 error?");

        assert_eq!(ctx.stack().last(), Some(&Value::Boolean(false)));

        let ctx = run("( 1 0 / ) ( ) try error?");

        assert!(!ctx.has_error());
        assert_eq!(ctx.stack().last(), Some(&Value::Boolean(true)));
    }
}
