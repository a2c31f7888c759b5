use crate::context::Context;
use crate::quote::NativeCallback;
use crate::value::Value;

// symbol ( word -- word sym )
//
// Extracts the symbol of the word.
fn w_symbol(ctx: &mut Context)
{
    if let Some(word) = ctx.pop_word()
    {
        let symbol = word.symbol;

        ctx.push(Value::Word(word));
        ctx.push(Value::Symbol(symbol));
    }
}

// quote ( word -- word quo )
//
// Extracts the quote which acts as the body of the word.
fn w_quote(ctx: &mut Context)
{
    if let Some(word) = ctx.pop_word()
    {
        let quote = word.quote.clone();

        ctx.push(Value::Word(word));
        ctx.push(Value::Quote(quote));
    }
}

// call ( word -- )
//
// Executes the body of the word.
fn w_call(ctx: &mut Context)
{
    if let Some(word) = ctx.pop_word()
    {
        word.quote.clone().call(ctx);
    }
}

// define ( word -- )
//
// Inserts the word into the current local dictionary.
fn w_define(ctx: &mut Context)
{
    if let Some(word) = ctx.pop_word()
    {
        ctx.exec_word(&word);
    }
}

pub fn entries() -> Vec<(&'static str, NativeCallback)>
{
    vec![
        ("symbol", w_symbol),
        ("quote", w_quote),
        ("call", w_call),
        ("define", w_define),
    ]
}

#[cfg(test)]
mod tests
{
    use super::*;
    use crate::intern;
    use crate::number::Number;
    use crate::runtime::Runtime;

    fn word_value(runtime: &std::rc::Rc<Runtime>, name: &str, source: &str) -> Value
    {
        let mut probe = Context::new(runtime);
        let quote = probe.compile(source, "<test>", 1).expect("compile");

        Value::Word(runtime.word(intern::intern_symbol(name), quote))
    }

    #[test]
    fn symbol_and_quote_keep_the_word()
    {
        let runtime = Runtime::new();
        let mut ctx = Context::new(&runtime);
        let word = word_value(&runtime, "square", "dup *");

        ctx.push(word.clone());
        assert!(ctx.call_word("symbol"));
        assert_eq!(ctx.pop(), Some(runtime.symbol("square")));
        assert_eq!(ctx.pop(), Some(word.clone()));

        ctx.push(word.clone());
        assert!(ctx.call_word("quote"));
        assert_eq!(ctx.pop().map(|v| v.to_source()), Some("(dup *)".to_string()));
        assert_eq!(ctx.pop(), Some(word));
    }

    #[test]
    fn call_executes_the_body()
    {
        let runtime = Runtime::new();
        let mut ctx = Context::new(&runtime);
        let word = word_value(&runtime, "square", "dup *");

        ctx.push(Value::Number(Number::Int(5)));
        ctx.push(word);
        assert!(ctx.call_word("call"));
        assert_eq!(ctx.pop(), Some(Value::Number(Number::Int(25))));
    }

    #[test]
    fn define_installs_into_the_local_dictionary()
    {
        let runtime = Runtime::new();
        let mut ctx = Context::new(&runtime);
        let word = word_value(&runtime, "triple", "3 *");

        ctx.push(word);
        assert!(ctx.call_word("define"));
        ctx.push(Value::Number(Number::Int(7)));
        assert!(ctx.call_word("triple"));
        assert_eq!(ctx.pop(), Some(Value::Number(Number::Int(21))));
    }

    #[test]
    fn word_source_form()
    {
        let runtime = Runtime::new();
        let word = word_value(&runtime, "square", "dup *");

        assert_eq!(word.to_source(), ": square (dup *) ;");
    }
}
