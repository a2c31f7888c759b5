use crate::context::Context;
use crate::quote::NativeCallback;
use crate::value::Value;

// call ( quo -- )
//
// Executes the quote taken from the top of the stack.
fn w_call(ctx: &mut Context)
{
    if let Some(quote) = ctx.pop_quote()
    {
        quote.call(ctx);
    }
}

// compose ( quo quo -- quo )
//
// Constructs a quote which calls the two given quotes in sequence.
fn w_compose(ctx: &mut Context)
{
    let right = match ctx.pop_quote()
    {
        Some(quote) => quote,
        None => return,
    };

    if let Some(left) = ctx.pop_quote()
    {
        let composed = ctx.runtime().compose(left, right);

        ctx.push(Value::Quote(composed));
    }
}

// curry ( any quo -- quo )
//
// Constructs a curried quote which pushes the given value onto the stack
// before calling the original quote.
fn w_curry(ctx: &mut Context)
{
    let quote = match ctx.pop_quote()
    {
        Some(quote) => quote,
        None => return,
    };

    if let Some(argument) = ctx.pop()
    {
        let curried = ctx.runtime().curry(argument, quote);

        ctx.push(Value::Quote(curried));
    }
}

// negate ( quo -- quo )
//
// Constructs a negated version of the given quote which negates the boolean
// result it leaves on the stack.
fn w_negate(ctx: &mut Context)
{
    if let Some(quote) = ctx.pop_quote()
    {
        let negated = ctx.runtime().negate(quote);

        ctx.push(Value::Quote(negated));
    }
}

// dip ( any quo -- any )
//
// Temporarily hides the value below the quote, calls the quote and places
// the hidden value back on the stack.
fn w_dip(ctx: &mut Context)
{
    let quote = match ctx.pop_quote()
    {
        Some(quote) => quote,
        None => return,
    };
    let value = match ctx.pop()
    {
        Some(value) => value,
        None => return,
    };

    quote.call(ctx);
    ctx.push(value);
}

// 2dip ( any any quo -- any any )
//
// Like dip but hides two values.
fn w_2dip(ctx: &mut Context)
{
    let quote = match ctx.pop_quote()
    {
        Some(quote) => quote,
        None => return,
    };
    let second = match ctx.pop()
    {
        Some(value) => value,
        None => return,
    };
    let first = match ctx.pop()
    {
        Some(value) => value,
        None => return,
    };

    quote.call(ctx);
    ctx.push(first);
    ctx.push(second);
}

pub fn entries() -> Vec<(&'static str, NativeCallback)>
{
    vec![
        ("call", w_call),
        ("compose", w_compose),
        ("curry", w_curry),
        ("negate", w_negate),
        ("dip", w_dip),
        ("2dip", w_2dip),
    ]
}

#[cfg(test)]
mod tests
{
    use super::*;
    use crate::number::Number;
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

    fn numbers(ctx: &Context) -> Vec<Number>
    {
        ctx.stack()
            .iter()
            .map(|value| match value
            {
                Value::Number(number) => number.clone(),
                other => panic!("expected number, got {:?}", other),
            })
            .collect()
    }

    #[test]
    fn call_executes_quote()
    {
        let ctx = run("( 1 2 + ) call");

        assert!(!ctx.has_error());
        assert_eq!(numbers(&ctx), vec![Number::Int(3)]);
    }

    #[test]
    fn compose_runs_quotes_in_sequence()
    {
        let ctx = run("( 2 ) ( 3 * ) compose call");

        assert!(!ctx.has_error());
        assert_eq!(numbers(&ctx), vec![Number::Int(6)]);
    }

    #[test]
    fn curry_prepends_argument()
    {
        let ctx = run("4 ( 2 * ) curry call");

        assert!(!ctx.has_error());
        assert_eq!(numbers(&ctx), vec![Number::Int(8)]);
    }

    #[test]
    fn negate_flips_result()
    {
        let ctx = run("( true ) negate call");

        assert!(!ctx.has_error());
        assert_eq!(ctx.stack(), &[Value::Boolean(false)]);
    }

    #[test]
    fn dip_hides_one_value()
    {
        let ctx = run("1 10 ( 2 * ) dip");

        assert!(!ctx.has_error());
        assert_eq!(numbers(&ctx), vec![Number::Int(2), Number::Int(10)]);
    }

    #[test]
    fn two_dip_hides_two_values()
    {
        let ctx = run("1 10 20 ( 2 * ) 2dip");

        assert!(!ctx.has_error());
        assert_eq!(
            numbers(&ctx),
            vec![Number::Int(2), Number::Int(10), Number::Int(20)]
        );
    }

    #[test]
    fn call_requires_a_quote()
    {
        let ctx = run("1 call");

        assert_eq!(ctx.error().map(|e| e.code), Some(ErrorCode::Type));
    }
}
