use crate::context::Context;
use crate::number::Number;
use crate::quote::NativeCallback;
use crate::value::{ErrorCode, Value};
use std::io::Write;

// nop ( -- )
fn w_nop(_ctx: &mut Context) {}

// clear ( any... -- )
//
// Empties the whole stack.
fn w_clear(ctx: &mut Context)
{
    ctx.clear();
}

// depth ( -- num )
fn w_depth(ctx: &mut Context)
{
    let depth = ctx.runtime().number(Number::Int(ctx.size() as i64));

    ctx.push(depth);
}

// drop ( any -- )
fn w_drop(ctx: &mut Context)
{
    ctx.pop();
}

// 2drop ( any any -- )
fn w_2drop(ctx: &mut Context)
{
    if ctx.pop().is_some()
    {
        ctx.pop();
    }
}

// dup ( any -- any any )
fn w_dup(ctx: &mut Context)
{
    if let Some(value) = ctx.peek()
    {
        ctx.push(value);
    }
}

// 2dup ( a b -- a b a b )
fn w_2dup(ctx: &mut Context)
{
    let b = match ctx.pop()
    {
        Some(value) => value,
        None => return,
    };

    if let Some(a) = ctx.pop()
    {
        ctx.push(a.clone());
        ctx.push(b.clone());
        ctx.push(a);
        ctx.push(b);
    }
}

// nip ( a b -- b )
fn w_nip(ctx: &mut Context)
{
    let b = match ctx.pop()
    {
        Some(value) => value,
        None => return,
    };

    if ctx.pop().is_some()
    {
        ctx.push(b);
    }
}

// over ( a b -- a b a )
fn w_over(ctx: &mut Context)
{
    let b = match ctx.pop()
    {
        Some(value) => value,
        None => return,
    };

    if let Some(a) = ctx.pop()
    {
        ctx.push(a.clone());
        ctx.push(b);
        ctx.push(a);
    }
}

// rot ( a b c -- b c a )
fn w_rot(ctx: &mut Context)
{
    let c = match ctx.pop()
    {
        Some(value) => value,
        None => return,
    };
    let b = match ctx.pop()
    {
        Some(value) => value,
        None => return,
    };

    if let Some(a) = ctx.pop()
    {
        ctx.push(b);
        ctx.push(c);
        ctx.push(a);
    }
}

// swap ( a b -- b a )
fn w_swap(ctx: &mut Context)
{
    let b = match ctx.pop()
    {
        Some(value) => value,
        None => return,
    };

    if let Some(a) = ctx.pop()
    {
        ctx.push(b);
        ctx.push(a);
    }
}

// tuck ( a b -- b a b )
fn w_tuck(ctx: &mut Context)
{
    let b = match ctx.pop()
    {
        Some(value) => value,
        None => return,
    };

    if let Some(a) = ctx.pop()
    {
        ctx.push(b.clone());
        ctx.push(a);
        ctx.push(b);
    }
}

// typeof ( any -- any str )
fn w_typeof(ctx: &mut Context)
{
    if let Some(value) = ctx.peek()
    {
        let name = ctx.runtime().string(value.kind().name());

        ctx.push(name);
    }
}

// print ( any -- )
fn w_print(ctx: &mut Context)
{
    if let Some(value) = ctx.pop()
    {
        print!("{}", value);
        std::io::stdout().flush().ok();
    }
}

// println ( any -- )
fn w_println(ctx: &mut Context)
{
    if let Some(value) = ctx.pop()
    {
        println!("{}", value);
    }
}

// for-each ( ary quo -- )
//
// Runs the quote once for every element of the array.
fn w_for_each(ctx: &mut Context)
{
    let quote = match ctx.pop_quote()
    {
        Some(quote) => quote,
        None => return,
    };

    if let Some(array) = ctx.pop_array()
    {
        for element in array.iter()
        {
            ctx.push(element.clone());
            if !quote.call(ctx)
            {
                return;
            }
        }
    }
}

// map ( ary quo -- ary )
//
// Applies the quote to every element and collects the results into a fresh
// array.
fn w_map(ctx: &mut Context)
{
    let quote = match ctx.pop_quote()
    {
        Some(quote) => quote,
        None => return,
    };
    let array = match ctx.pop_array()
    {
        Some(array) => array,
        None => return,
    };
    let mut result = Vec::with_capacity(array.len());

    for element in array.iter()
    {
        ctx.push(element.clone());
        if !quote.call(ctx)
        {
            return;
        }
        match ctx.pop()
        {
            Some(value) => result.push(value),
            None => return,
        }
    }

    let value = ctx.runtime().array(result);

    ctx.push(value);
}

// filter ( ary quo -- ary )
//
// Collects the elements which pass the test implemented by the quote.
fn w_filter(ctx: &mut Context)
{
    let quote = match ctx.pop_quote()
    {
        Some(quote) => quote,
        None => return,
    };
    let array = match ctx.pop_array()
    {
        Some(array) => array,
        None => return,
    };
    let mut result = Vec::new();

    for element in array.iter()
    {
        ctx.push(element.clone());
        if !quote.call(ctx)
        {
            return;
        }
        match ctx.pop_boolean()
        {
            Some(true) => result.push(element.clone()),
            Some(false) =>
            {}
            None => return,
        }
    }

    let value = ctx.runtime().array(result);

    ctx.push(value);
}

// reduce ( ary quo -- any )
//
// Folds the array into a single value by applying the quote against an
// accumulator and each element in turn.
fn w_reduce(ctx: &mut Context)
{
    let quote = match ctx.pop_quote()
    {
        Some(quote) => quote,
        None => return,
    };
    let array = match ctx.pop_array()
    {
        Some(array) => array,
        None => return,
    };

    if array.is_empty()
    {
        ctx.set_error(ErrorCode::Range, "Cannot reduce empty array.");
        return;
    }

    let mut result = array[0].clone();

    for element in array.iter().skip(1)
    {
        ctx.push(result);
        ctx.push(element.clone());
        if !quote.call(ctx)
        {
            return;
        }
        match ctx.pop()
        {
            Some(value) => result = value,
            None => return,
        }
    }
    ctx.push(result);
}

// find ( ary quo -- num|null )
//
// Returns the index of the first element passing the test, or null.
fn w_find(ctx: &mut Context)
{
    let quote = match ctx.pop_quote()
    {
        Some(quote) => quote,
        None => return,
    };
    let array = match ctx.pop_array()
    {
        Some(array) => array,
        None => return,
    };

    for (index, element) in array.iter().enumerate()
    {
        ctx.push(element.clone());
        if !quote.call(ctx)
        {
            return;
        }
        match ctx.pop_boolean()
        {
            Some(true) =>
            {
                let result = ctx.runtime().number(Number::Int(index as i64));

                ctx.push(result);
                return;
            }
            Some(false) =>
            {}
            None => return,
        }
    }
    ctx.push(Value::Null);
}

// every? ( ary quo -- bool )
fn w_every(ctx: &mut Context)
{
    let quote = match ctx.pop_quote()
    {
        Some(quote) => quote,
        None => return,
    };
    let array = match ctx.pop_array()
    {
        Some(array) => array,
        None => return,
    };

    for element in array.iter()
    {
        ctx.push(element.clone());
        if !quote.call(ctx)
        {
            return;
        }
        match ctx.pop_boolean()
        {
            Some(true) =>
            {}
            Some(false) =>
            {
                let result = ctx.runtime().false_value();

                ctx.push(result);
                return;
            }
            None => return,
        }
    }

    let result = ctx.runtime().true_value();

    ctx.push(result);
}

// some? ( ary quo -- bool )
fn w_some(ctx: &mut Context)
{
    let quote = match ctx.pop_quote()
    {
        Some(quote) => quote,
        None => return,
    };
    let array = match ctx.pop_array()
    {
        Some(array) => array,
        None => return,
    };

    for element in array.iter()
    {
        ctx.push(element.clone());
        if !quote.call(ctx)
        {
            return;
        }
        match ctx.pop_boolean()
        {
            Some(true) =>
            {
                let result = ctx.runtime().true_value();

                ctx.push(result);
                return;
            }
            Some(false) =>
            {}
            None => return,
        }
    }

    let result = ctx.runtime().false_value();

    ctx.push(result);
}

pub fn entries() -> Vec<(&'static str, NativeCallback)>
{
    vec![
        ("nop", w_nop),
        ("clear", w_clear),
        ("depth", w_depth),
        ("drop", w_drop),
        ("2drop", w_2drop),
        ("dup", w_dup),
        ("2dup", w_2dup),
        ("nip", w_nip),
        ("over", w_over),
        ("rot", w_rot),
        ("swap", w_swap),
        ("tuck", w_tuck),
        ("typeof", w_typeof),
        ("print", w_print),
        ("println", w_println),
        ("for-each", w_for_each),
        ("map", w_map),
        ("filter", w_filter),
        ("reduce", w_reduce),
        ("find", w_find),
        ("every?", w_every),
        ("some?", w_some),
    ]
}
