use crate::context::Context;
use crate::quote::NativeCallback;

// + ( num num -- num )
fn w_add(ctx: &mut Context)
{
    let b = match ctx.pop_number()
    {
        Some(number) => number,
        None => return,
    };

    if let Some(a) = ctx.pop_number()
    {
        let result = ctx.runtime().number(a.add(&b));

        ctx.push(result);
    }
}

// - ( num num -- num )
fn w_sub(ctx: &mut Context)
{
    let b = match ctx.pop_number()
    {
        Some(number) => number,
        None => return,
    };

    if let Some(a) = ctx.pop_number()
    {
        let result = ctx.runtime().number(a.sub(&b));

        ctx.push(result);
    }
}

// * ( num num -- num )
fn w_mul(ctx: &mut Context)
{
    let b = match ctx.pop_number()
    {
        Some(number) => number,
        None => return,
    };

    if let Some(a) = ctx.pop_number()
    {
        let result = ctx.runtime().number(a.mul(&b));

        ctx.push(result);
    }
}

// / ( num num -- num )
fn w_div(ctx: &mut Context)
{
    let b = match ctx.pop_number()
    {
        Some(number) => number,
        None => return,
    };
    let a = match ctx.pop_number()
    {
        Some(number) => number,
        None => return,
    };

    match a.div(&b)
    {
        Ok(result) =>
        {
            let value = ctx.runtime().number(result);

            ctx.push(value);
        }
        Err(error) => ctx.set_error(error.code, &error.message),
    }
}

pub fn entries() -> Vec<(&'static str, NativeCallback)>
{
    vec![("+", w_add), ("-", w_sub), ("*", w_mul), ("/", w_div)]
}
