use crate::context::Context;
use crate::number::Number;
use crate::quote::NativeCallback;
use crate::value::{ErrorCode, Value};

// len ( ary -- ary num )
//
// Returns the number of elements in the array.
fn w_len(ctx: &mut Context)
{
    if let Some(array) = ctx.peek_array()
    {
        let length = ctx.runtime().number(Number::Int(array.len() as i64));

        ctx.push(length);
    }
}

// empty? ( ary -- ary bool )
fn w_is_empty(ctx: &mut Context)
{
    if let Some(array) = ctx.peek_array()
    {
        let result = ctx.runtime().boolean(array.is_empty());

        ctx.push(result);
    }
}

// index-of ( any ary -- num|null )
//
// Returns the index of the given value in the array, or null when the array
// does not contain it.
fn w_index_of(ctx: &mut Context)
{
    let array = match ctx.pop_array()
    {
        Some(array) => array,
        None => return,
    };
    let value = match ctx.pop()
    {
        Some(value) => value,
        None => return,
    };

    for (index, element) in array.iter().enumerate()
    {
        if *element == value
        {
            let result = ctx.runtime().number(Number::Int(index as i64));

            ctx.push(result);
            return;
        }
    }
    ctx.push(Value::Null);
}

// join ( str ary -- str )
//
// Concatenates the elements into a single string, delimited by the given
// separator.
fn w_join(ctx: &mut Context)
{
    let array = match ctx.pop_array()
    {
        Some(array) => array,
        None => return,
    };

    if let Some(separator) = ctx.pop_string()
    {
        let parts: Vec<String> = array.iter().map(|e| e.to_display()).collect();
        let result = ctx.runtime().string(&parts.join(separator.as_str()));

        ctx.push(result);
    }
}

// reverse ( ary -- ary )
fn w_reverse(ctx: &mut Context)
{
    if let Some(array) = ctx.pop_array()
    {
        let reversed: Vec<Value> = array.iter().rev().cloned().collect();
        let result = ctx.runtime().array(reversed);

        ctx.push(result);
    }
}

// extract ( ary -- any... )
//
// Pushes every element of the array onto the stack.
fn w_extract(ctx: &mut Context)
{
    if let Some(array) = ctx.pop_array()
    {
        for element in array.iter()
        {
            ctx.push(element.clone());
        }
    }
}

fn normalize_index(index: &Number, length: usize) -> Option<i64>
{
    let mut index = index.as_i64()?;

    if index < 0
    {
        index += length as i64;
    }
    Some(index)
}

// @ ( num ary -- any )
//
// Retrieves a value by index; negative indexes count from the end.
fn w_get(ctx: &mut Context)
{
    let array = match ctx.pop_array()
    {
        Some(array) => array,
        None => return,
    };

    if let Some(number) = ctx.pop_number()
    {
        let index = normalize_index(&number, array.len());

        match index
        {
            Some(index) if index >= 0 && (index as usize) < array.len() =>
            {
                ctx.push(array[index as usize].clone());
            }
            _ => ctx.set_error(ErrorCode::Range, "Array index out of bounds."),
        }
    }
}

// ! ( any num ary -- ary )
//
// Sets a value by index; negative indexes count from the end and an index
// past the end appends the value instead.
fn w_set(ctx: &mut Context)
{
    let array = match ctx.pop_array()
    {
        Some(array) => array,
        None => return,
    };
    let number = match ctx.pop_number()
    {
        Some(number) => number,
        None => return,
    };

    if let Some(value) = ctx.pop()
    {
        let mut elements: Vec<Value> = array.as_ref().clone();
        let index = normalize_index(&number, elements.len());

        match index
        {
            Some(index) if index >= 0 && (index as usize) < elements.len() =>
            {
                elements[index as usize] = value;
            }
            _ => elements.push(value),
        }

        let result = ctx.runtime().array(elements);

        ctx.push(result);
    }
}

// + ( ary ary -- ary )
//
// Concatenates two arrays; the elements of the array below come first.
fn w_plus(ctx: &mut Context)
{
    let a = match ctx.pop_array()
    {
        Some(array) => array,
        None => return,
    };

    if let Some(b) = ctx.pop_array()
    {
        let mut result: Vec<Value> = Vec::with_capacity(a.len() + b.len());

        result.extend(b.iter().cloned());
        result.extend(a.iter().cloned());

        let value = ctx.runtime().array(result);

        ctx.push(value);
    }
}

// * ( num ary -- ary )
//
// Repeats the array the given number of times.
fn w_times(ctx: &mut Context)
{
    let array = match ctx.pop_array()
    {
        Some(array) => array,
        None => return,
    };

    if let Some(number) = ctx.pop_number()
    {
        let times = match number.as_i64()
        {
            Some(times) => times,
            None =>
            {
                ctx.set_error(ErrorCode::Range, "Array repeat count is too large.");
                return;
            }
        };
        let mut result = Vec::new();

        for _ in 0..times.max(0)
        {
            result.extend(array.iter().cloned());
        }

        let value = ctx.runtime().array(result);

        ctx.push(value);
    }
}

pub fn entries() -> Vec<(&'static str, NativeCallback)>
{
    vec![
        ("len", w_len),
        ("empty?", w_is_empty),
        ("index-of", w_index_of),
        ("join", w_join),
        ("reverse", w_reverse),
        ("extract", w_extract),
        ("@", w_get),
        ("!", w_set),
        ("+", w_plus),
        ("*", w_times),
    ]
}
