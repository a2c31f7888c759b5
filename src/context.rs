use crate::intern::{self, SymbolId};
use crate::number::Number;
use crate::quote::Quote;
use crate::token::Position;
use crate::tokenizer::Tokenizer;
use crate::unicode;
use crate::value::{ErrorCode, PlorthError, Value, ValueType, Word};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use std::fs;
use std::path::PathBuf;
use std::rc::Rc;

/// Per-thread evaluation state: the operand stack, the local dictionary,
/// the latched error and the current source position. Once an error is
/// latched every operation is a no-op until the slot is cleared.
pub struct Context
{
    runtime: Rc<crate::runtime::Runtime>,
    stack: SmallVec<[Value; 8]>,
    dictionary: FxHashMap<SymbolId, Value>,
    error: Option<Rc<PlorthError>>,
    filename: Rc<String>,
    position: Option<Position>,
}

impl Context
{
    pub fn new(runtime: &Rc<crate::runtime::Runtime>) -> Self
    {
        Self {
            runtime: runtime.clone(),
            stack: SmallVec::new(),
            dictionary: FxHashMap::default(),
            error: None,
            filename: intern::intern("<unknown>"),
            position: None,
        }
    }

    pub fn runtime(&self) -> &Rc<crate::runtime::Runtime>
    {
        &self.runtime
    }

    pub fn filename(&self) -> &Rc<String>
    {
        &self.filename
    }

    pub fn set_filename(&mut self, filename: &str)
    {
        self.filename = intern::intern(filename);
    }

    pub fn set_position(&mut self, position: Position)
    {
        self.position = Some(position);
    }

    // Error slot

    pub fn has_error(&self) -> bool
    {
        self.error.is_some()
    }

    pub fn error(&self) -> Option<Rc<PlorthError>>
    {
        self.error.clone()
    }

    pub fn set_error(&mut self, code: ErrorCode, message: &str)
    {
        if self.error.is_none()
        {
            self.error = Some(Rc::new(PlorthError {
                code,
                message: intern::intern(message),
                position: self.position.clone(),
            }));
        }
    }

    pub fn set_error_value(&mut self, error: Rc<PlorthError>)
    {
        if self.error.is_none()
        {
            self.error = Some(error);
        }
    }

    pub fn clear_error(&mut self)
    {
        self.error = None;
    }

    pub fn take_error(&mut self) -> Option<Rc<PlorthError>>
    {
        self.error.take()
    }

    // Operand stack

    pub fn size(&self) -> usize
    {
        self.stack.len()
    }

    pub fn stack(&self) -> &[Value]
    {
        &self.stack
    }

    pub fn push(&mut self, value: Value)
    {
        if self.error.is_none()
        {
            self.stack.push(value);
        }
    }

    pub fn pop(&mut self) -> Option<Value>
    {
        if self.error.is_some()
        {
            return None;
        }
        match self.stack.pop()
        {
            Some(value) => Some(value),
            None =>
            {
                self.set_error(ErrorCode::Range, "Stack underflow.");
                None
            }
        }
    }

    pub fn peek(&mut self) -> Option<Value>
    {
        if self.error.is_some()
        {
            return None;
        }
        match self.stack.last()
        {
            Some(value) => Some(value.clone()),
            None =>
            {
                self.set_error(ErrorCode::Range, "Stack underflow.");
                None
            }
        }
    }

    fn typed_top(&mut self, expected: ValueType) -> bool
    {
        if self.error.is_some()
        {
            return false;
        }
        match self.stack.last()
        {
            Some(value) if value.is(expected) => true,
            Some(value) =>
            {
                let message = format!("Expected {}, got {}.", expected, value.kind());

                self.set_error(ErrorCode::Type, &message);
                false
            }
            None =>
            {
                self.set_error(ErrorCode::Range, "Stack underflow.");
                false
            }
        }
    }

    pub fn pop_boolean(&mut self) -> Option<bool>
    {
        if !self.typed_top(ValueType::Boolean)
        {
            return None;
        }
        match self.stack.pop()
        {
            Some(Value::Boolean(value)) => Some(value),
            _ => None,
        }
    }

    pub fn pop_number(&mut self) -> Option<Number>
    {
        if !self.typed_top(ValueType::Number)
        {
            return None;
        }
        match self.stack.pop()
        {
            Some(Value::Number(value)) => Some(value),
            _ => None,
        }
    }

    pub fn pop_string(&mut self) -> Option<Rc<String>>
    {
        if !self.typed_top(ValueType::String)
        {
            return None;
        }
        match self.stack.pop()
        {
            Some(Value::String(value)) => Some(value),
            _ => None,
        }
    }

    pub fn pop_array(&mut self) -> Option<Rc<Vec<Value>>>
    {
        if !self.typed_top(ValueType::Array)
        {
            return None;
        }
        match self.stack.pop()
        {
            Some(Value::Array(value)) => Some(value),
            _ => None,
        }
    }

    pub fn pop_quote(&mut self) -> Option<Rc<Quote>>
    {
        if !self.typed_top(ValueType::Quote)
        {
            return None;
        }
        match self.stack.pop()
        {
            Some(Value::Quote(value)) => Some(value),
            _ => None,
        }
    }

    pub fn pop_word(&mut self) -> Option<Rc<Word>>
    {
        if !self.typed_top(ValueType::Word)
        {
            return None;
        }
        match self.stack.pop()
        {
            Some(Value::Word(value)) => Some(value),
            _ => None,
        }
    }

    pub fn pop_error(&mut self) -> Option<Rc<PlorthError>>
    {
        if !self.typed_top(ValueType::Error)
        {
            return None;
        }
        match self.stack.pop()
        {
            Some(Value::Error(value)) => Some(value),
            _ => None,
        }
    }

    pub fn peek_array(&mut self) -> Option<Rc<Vec<Value>>>
    {
        if !self.typed_top(ValueType::Array)
        {
            return None;
        }
        match self.stack.last()
        {
            Some(Value::Array(value)) => Some(value.clone()),
            _ => None,
        }
    }

    pub fn peek_error(&mut self) -> Option<Rc<PlorthError>>
    {
        if !self.typed_top(ValueType::Error)
        {
            return None;
        }
        match self.stack.last()
        {
            Some(Value::Error(value)) => Some(value.clone()),
            _ => None,
        }
    }

    // Dictionary

    pub fn declare(&mut self, name: &str, value: Value)
    {
        self.dictionary.insert(intern::intern_symbol(name), value);
    }

    /// Installs a word: its quote lands in the local dictionary under the
    /// word's symbol.
    pub fn exec_word(&mut self, word: &Word)
    {
        self.dictionary
            .insert(word.symbol, Value::Quote(word.quote.clone()));
    }

    /// Resolves a name without dispatching it: local dictionary first, then
    /// the prototype of the value on top of the stack, then the global
    /// dictionary.
    pub fn lookup(&self, name: &str) -> Option<Value>
    {
        let id = intern::intern_symbol(name);

        if let Some(value) = self.dictionary.get(&id)
        {
            return Some(value.clone());
        }
        if let Some(top) = self.stack.last()
        {
            if let Some(prototype) = self.runtime.prototype_of(top)
            {
                if let Some(value) = prototype.property(name)
                {
                    return Some(value);
                }
            }
        }
        self.runtime.find_global(id)
    }

    /// Resolves and dispatches a word: quotes are called, any other value is
    /// pushed. Names that resolve nowhere but parse as numbers evaluate to
    /// the number; everything else is a reference error.
    pub fn call_word(&mut self, name: &str) -> bool
    {
        if self.error.is_some()
        {
            return false;
        }
        if let Some(value) = self.lookup(name)
        {
            return match value
            {
                Value::Quote(quote) => quote.call(self),
                value =>
                {
                    self.push(value);
                    true
                }
            };
        }
        if let Some(number) = Number::parse(name)
        {
            let value = self.runtime.number(number);

            self.push(value);
            return true;
        }

        let message = format!("Unknown word: `{}'.", name);

        self.set_error(ErrorCode::Reference, &message);
        false
    }

    /// Tokenizes the source and wraps the whole token vector into a compiled
    /// quote without executing it. Syntax errors land in the error slot.
    pub fn compile(&mut self, source: &str, filename: &str, start_line: u32) -> Option<Rc<Quote>>
    {
        if self.error.is_some()
        {
            return None;
        }
        match Tokenizer::new(source, intern::intern(filename), start_line).tokenize()
        {
            Ok(tokens) => Some(self.runtime.compiled(tokens)),
            Err(error) =>
            {
                self.set_error_value(Rc::new(error));
                None
            }
        }
    }

    /// Resolves `a.b.c` against the runtime's module search paths, compiles
    /// the first matching file in a fresh context and merges its dictionary
    /// into this one on success.
    pub fn import(&mut self, name: &str) -> bool
    {
        if self.error.is_some()
        {
            return false;
        }

        let relative: PathBuf = name.split('.').collect::<PathBuf>().with_extension("plorth");
        let mut found = None;

        for path in self.runtime.module_paths()
        {
            let candidate = path.join(&relative);

            if candidate.is_file()
            {
                found = Some(candidate);
                break;
            }
        }

        let path = match found
        {
            Some(path) => path,
            None =>
            {
                let message = format!("Module not found: `{}'.", name);

                self.set_error(ErrorCode::Import, &message);
                return false;
            }
        };
        let bytes = match fs::read(&path)
        {
            Ok(bytes) => bytes,
            Err(_) =>
            {
                let message = format!("Unable to read module `{}'.", name);

                self.set_error_value(Rc::new(PlorthError::new(ErrorCode::IO, &message)));
                return false;
            }
        };
        let (source, ok) = unicode::decode_utf8(&bytes);

        if !ok
        {
            self.set_error_value(Rc::new(PlorthError::new(
                ErrorCode::IO,
                "Unable to decode module source code as UTF-8.",
            )));
            return false;
        }

        let mut module_ctx = Context::new(&self.runtime);
        let filename = path.display().to_string();

        module_ctx.set_filename(&filename);

        let script = match module_ctx.compile(&source, &filename, 1)
        {
            Some(script) => script,
            None =>
            {
                if let Some(error) = module_ctx.take_error()
                {
                    self.set_error_value(error);
                }
                return false;
            }
        };

        if !script.call(&mut module_ctx)
        {
            if let Some(error) = module_ctx.take_error()
            {
                self.set_error_value(error);
            }
            return false;
        }
        self.dictionary.extend(module_ctx.dictionary);
        true
    }

    /// Empties the stack and the error slot; the dictionary and the filename
    /// survive.
    pub fn clear(&mut self)
    {
        self.stack.clear();
        self.error = None;
    }
}

#[cfg(test)]
mod tests
{
    use super::*;
    use crate::runtime::Runtime;
    use crate::value::Object;
    use indexmap::IndexMap;

    fn context() -> Context
    {
        Context::new(&Runtime::new())
    }

    fn run(ctx: &mut Context, source: &str) -> bool
    {
        match ctx.compile(source, "<test>", 1)
        {
            Some(script) => script.call(ctx),
            None => false,
        }
    }

    #[test]
    fn pop_on_empty_stack_underflows()
    {
        let mut ctx = context();

        assert_eq!(ctx.pop(), None);

        let error = ctx.error().expect("error");

        assert_eq!(error.code, ErrorCode::Range);
        assert_eq!(error.message.as_str(), "Stack underflow.");
    }

    #[test]
    fn typed_pop_mismatch_is_a_type_error()
    {
        let mut ctx = context();

        ctx.push(Value::String(intern::intern("hi")));
        assert_eq!(ctx.pop_number(), None);

        let error = ctx.error().expect("error");

        assert_eq!(error.code, ErrorCode::Type);
        assert_eq!(error.message.as_str(), "Expected number, got string.");
    }

    #[test]
    fn operations_are_noops_while_error_is_latched()
    {
        let mut ctx = context();

        ctx.push(Value::Null);
        ctx.set_error(ErrorCode::Unknown, "latched");
        ctx.push(Value::Boolean(true));
        assert_eq!(ctx.size(), 1);
        assert_eq!(ctx.pop(), None);
        assert!(!ctx.call_word("dup"));
        ctx.clear_error();
        assert_eq!(ctx.pop(), Some(Value::Null));
    }

    #[test]
    fn local_dictionary_shadows_globals()
    {
        let mut ctx = context();

        assert!(run(&mut ctx, ": depth 42 ; depth"));
        assert_eq!(ctx.pop(), Some(Value::Number(Number::Int(42))));
    }

    #[test]
    fn prototype_of_top_shadows_globals()
    {
        let runtime = Runtime::new();
        let mut ctx = Context::new(&runtime);

        runtime.add_global_word("probe", |ctx| {
            let value = ctx.runtime().string("global");

            ctx.push(value);
        });

        // An object whose prototype defines the probed name.
        let marker = runtime.string("prototype");
        let proto = Rc::new(Object::new(
            IndexMap::from_iter([(
                intern::intern("probe"),
                Value::Quote(runtime.constant(marker.clone())),
            )]),
            Some(runtime.object_prototype()),
        ));
        let object = Value::Object(Rc::new(Object::new(IndexMap::new(), Some(proto))));

        ctx.push(object);
        assert!(ctx.call_word("probe"));
        assert_eq!(ctx.pop(), Some(marker));

        // Local definitions win over the prototype.
        ctx.declare("probe", Value::Quote(runtime.constant(runtime.string("local"))));
        assert!(ctx.call_word("probe"));
        assert_eq!(ctx.pop(), Some(runtime.string("local")));

        // Without either, the global word answers.
        ctx.clear();
        ctx.dictionary.clear();
        assert!(ctx.call_word("probe"));
        assert_eq!(ctx.pop(), Some(runtime.string("global")));
    }

    #[test]
    fn numeric_words_evaluate_to_numbers()
    {
        let mut ctx = context();

        assert!(ctx.call_word("3"));
        assert!(ctx.call_word("-2.5"));
        assert_eq!(ctx.pop(), Some(Value::Number(Number::Float(-2.5))));
        assert_eq!(ctx.pop(), Some(Value::Number(Number::Int(3))));
    }

    #[test]
    fn unknown_words_are_reference_errors()
    {
        let mut ctx = context();

        assert!(!ctx.call_word("no-such-word"));

        let error = ctx.error().expect("error");

        assert_eq!(error.code, ErrorCode::Reference);
        assert_eq!(error.message.as_str(), "Unknown word: `no-such-word'.");
    }

    #[test]
    fn square_word_scenario()
    {
        let mut ctx = context();

        assert!(run(&mut ctx, ": square ( dup * ) ; 3 square"));
        assert!(!ctx.has_error());
        assert_eq!(ctx.stack(), &[Value::Number(Number::Int(9))]);
    }

    #[test]
    fn compile_reports_syntax_errors()
    {
        let mut ctx = context();

        assert!(ctx.compile("\"unterminated", "<test>", 1).is_none());

        let error = ctx.error().expect("error");

        assert_eq!(error.code, ErrorCode::Syntax);
        assert!(error.position.is_some());
    }

    #[test]
    fn compile_does_not_execute()
    {
        let mut ctx = context();

        assert!(ctx.compile("1 2 +", "<test>", 1).is_some());
        assert_eq!(ctx.size(), 0);
    }

    #[test]
    fn top_level_closers_are_syntax_errors()
    {
        let mut ctx = context();

        assert!(!run(&mut ctx, "1 )"));
        assert_eq!(ctx.error().map(|e| e.code), Some(ErrorCode::Syntax));
    }

    #[test]
    fn clear_preserves_dictionary_and_filename()
    {
        let mut ctx = context();

        ctx.set_filename("script.plorth");
        assert!(run(&mut ctx, ": answer 42 ; 1 2"));
        ctx.set_error(ErrorCode::Unknown, "latched");
        ctx.clear();
        assert_eq!(ctx.size(), 0);
        assert!(!ctx.has_error());
        assert_eq!(ctx.filename().as_str(), "script.plorth");
        assert!(run(&mut ctx, "answer"));
        assert_eq!(ctx.pop(), Some(Value::Number(Number::Int(42))));
    }

    #[test]
    fn errors_carry_positions()
    {
        let mut ctx = context();

        assert!(!run(&mut ctx, "1 2\nbogus-word"));

        let error = ctx.error().expect("error");
        let position = error.position.clone().expect("position");

        assert_eq!(position.line, 2);
        assert_eq!(position.column, 1);
    }

    #[test]
    fn buffered_input_executes_once_brackets_close()
    {
        let mut ctx = context();

        assert!(run(&mut ctx, "[1, 2,\n3]"));
        assert!(!ctx.has_error());
        assert_eq!(ctx.size(), 1);
        assert_eq!(ctx.stack()[0].to_source(), "[1, 2, 3]");
    }

    #[test]
    fn import_merges_module_dictionary()
    {
        let runtime = Runtime::new();
        let mut ctx = Context::new(&runtime);
        let root = std::env::temp_dir().join(format!("plorth-import-{}", std::process::id()));
        let dir = root.join("demo");

        fs::create_dir_all(&dir).expect("create module dir");
        fs::write(dir.join("math.plorth"), ": double 2 * ;").expect("write module");
        runtime.add_module_path(root.clone());

        assert!(ctx.import("demo.math"));
        assert!(run(&mut ctx, "21 double"));
        assert_eq!(ctx.pop(), Some(Value::Number(Number::Int(42))));

        fs::remove_dir_all(&root).ok();
    }

    #[test]
    fn import_of_missing_module_fails()
    {
        let mut ctx = context();

        assert!(!ctx.import("no.such.module"));
        assert_eq!(ctx.error().map(|e| e.code), Some(ErrorCode::Import));
    }
}
