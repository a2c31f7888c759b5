use crate::intern::{self, SymbolId};
use crate::memory::MemoryManager;
use crate::number::Number;
use crate::quote::{NativeCallback, Quote};
use crate::token::{Position, Token};
use crate::value::{ErrorCode, Object, PlorthError, Value, ValueType, Word};
use crate::words;
use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

/// Shared interpreter state: the memory manager, the prototype registry,
/// the global dictionary, interned literals, program arguments and module
/// search paths. Built once; contexts borrow it through `Rc`.
pub struct Runtime
{
    memory: MemoryManager,
    globals: RefCell<FxHashMap<SymbolId, Value>>,
    prototypes: FxHashMap<ValueType, Rc<Object>>,
    object_prototype: Rc<Object>,
    true_value: Value,
    false_value: Value,
    arguments: RefCell<Vec<Rc<String>>>,
    module_paths: RefCell<Vec<PathBuf>>,
}

impl Runtime
{
    pub fn new() -> Rc<Runtime>
    {
        let memory = MemoryManager::new();

        memory.allocate(ValueType::Object);

        let object_prototype = Rc::new(Object::new(IndexMap::new(), None));
        let build_prototype = |entries: Vec<(&'static str, NativeCallback)>| -> Rc<Object> {
            let mut properties = IndexMap::new();

            for (name, callback) in entries
            {
                memory.allocate(ValueType::Quote);
                properties.insert(
                    intern::intern(name),
                    Value::Quote(Rc::new(Quote::Native(callback))),
                );
            }
            memory.allocate(ValueType::Object);
            Rc::new(Object::new(properties, Some(object_prototype.clone())))
        };

        let mut prototypes = FxHashMap::default();

        prototypes.insert(ValueType::Object, object_prototype.clone());
        prototypes.insert(ValueType::Array, build_prototype(words::array::entries()));
        prototypes.insert(ValueType::Number, build_prototype(words::number::entries()));
        prototypes.insert(ValueType::Quote, build_prototype(words::quote::entries()));
        prototypes.insert(ValueType::Word, build_prototype(words::word::entries()));

        let mut globals = FxHashMap::default();

        for (name, callback) in words::global::entries()
            .into_iter()
            .chain(words::error::entries())
        {
            memory.allocate(ValueType::Quote);
            globals.insert(
                intern::intern_symbol(name),
                Value::Quote(Rc::new(Quote::Native(callback))),
            );
        }
        for (name, value) in [
            ("null", Value::Null),
            ("true", Value::Boolean(true)),
            ("false", Value::Boolean(false)),
        ]
        {
            memory.allocate(ValueType::Quote);
            globals.insert(
                intern::intern_symbol(name),
                Value::Quote(Rc::new(Quote::Constant(value))),
            );
        }

        Rc::new(Runtime {
            memory,
            globals: RefCell::new(globals),
            prototypes,
            object_prototype,
            true_value: Value::Boolean(true),
            false_value: Value::Boolean(false),
            arguments: RefCell::new(Vec::new()),
            module_paths: RefCell::new(Vec::new()),
        })
    }

    pub fn memory(&self) -> &MemoryManager
    {
        &self.memory
    }

    pub fn true_value(&self) -> Value
    {
        self.true_value.clone()
    }

    pub fn false_value(&self) -> Value
    {
        self.false_value.clone()
    }

    pub fn boolean(&self, value: bool) -> Value
    {
        if value
        {
            self.true_value()
        }
        else
        {
            self.false_value()
        }
    }

    pub fn number(&self, value: Number) -> Value
    {
        self.memory.allocate(ValueType::Number);
        Value::Number(value)
    }

    pub fn string(&self, value: &str) -> Value
    {
        self.memory.allocate(ValueType::String);
        Value::String(intern::intern(value))
    }

    pub fn array(&self, elements: Vec<Value>) -> Value
    {
        self.memory.allocate(ValueType::Array);
        Value::Array(Rc::new(elements))
    }

    pub fn object(&self, properties: Vec<(Rc<String>, Value)>) -> Value
    {
        let mut map = IndexMap::new();

        for (key, value) in properties
        {
            map.insert(key, value);
        }
        self.memory.allocate(ValueType::Object);
        Value::Object(Rc::new(Object::new(
            map,
            Some(self.object_prototype.clone()),
        )))
    }

    pub fn symbol(&self, name: &str) -> Value
    {
        self.memory.allocate(ValueType::Symbol);
        Value::Symbol(intern::intern_symbol(name))
    }

    pub fn word(&self, symbol: SymbolId, quote: Rc<Quote>) -> Rc<Word>
    {
        self.memory.allocate(ValueType::Word);
        Rc::new(Word { symbol, quote })
    }

    pub fn error(&self, code: ErrorCode, message: &str, position: Option<Position>) -> Value
    {
        self.memory.allocate(ValueType::Error);
        Value::Error(Rc::new(PlorthError {
            code,
            message: intern::intern(message),
            position,
        }))
    }

    pub fn compiled(&self, tokens: Vec<Token>) -> Rc<Quote>
    {
        self.memory.allocate(ValueType::Quote);
        Rc::new(Quote::Compiled(tokens))
    }

    pub fn native(&self, callback: NativeCallback) -> Rc<Quote>
    {
        self.memory.allocate(ValueType::Quote);
        Rc::new(Quote::Native(callback))
    }

    pub fn curry(&self, argument: Value, quote: Rc<Quote>) -> Rc<Quote>
    {
        self.memory.allocate(ValueType::Quote);
        Rc::new(Quote::Curried { argument, quote })
    }

    pub fn compose(&self, left: Rc<Quote>, right: Rc<Quote>) -> Rc<Quote>
    {
        self.memory.allocate(ValueType::Quote);
        Rc::new(Quote::Composed { left, right })
    }

    pub fn negate(&self, quote: Rc<Quote>) -> Rc<Quote>
    {
        self.memory.allocate(ValueType::Quote);
        Rc::new(Quote::Negated(quote))
    }

    pub fn constant(&self, value: Value) -> Rc<Quote>
    {
        self.memory.allocate(ValueType::Quote);
        Rc::new(Quote::Constant(value))
    }

    /// Prototype resolution: an object's explicit prototype slot wins, other
    /// values go through the registry, and anything unregistered falls back
    /// to the object prototype. Only the object prototype itself resolves to
    /// nothing.
    pub fn prototype_of(&self, value: &Value) -> Option<Rc<Object>>
    {
        match value
        {
            Value::Object(object) => object.prototype.clone(),
            _ => match self.prototypes.get(&value.kind())
            {
                Some(prototype) => Some(prototype.clone()),
                None => Some(self.object_prototype.clone()),
            },
        }
    }

    pub fn object_prototype(&self) -> Rc<Object>
    {
        self.object_prototype.clone()
    }

    pub fn find_global(&self, id: SymbolId) -> Option<Value>
    {
        self.globals.borrow().get(&id).cloned()
    }

    /// Installs a global word after construction. Meant for host setup such
    /// as the REPL word set; contexts sharing the runtime must not be
    /// running.
    pub fn add_global_word(&self, name: &str, callback: NativeCallback)
    {
        self.memory.allocate(ValueType::Quote);
        self.globals.borrow_mut().insert(
            intern::intern_symbol(name),
            Value::Quote(Rc::new(Quote::Native(callback))),
        );
    }

    pub fn arguments(&self) -> Vec<Rc<String>>
    {
        self.arguments.borrow().clone()
    }

    pub fn add_argument(&self, argument: &str)
    {
        self.arguments.borrow_mut().push(intern::intern(argument));
    }

    pub fn module_paths(&self) -> Vec<PathBuf>
    {
        self.module_paths.borrow().clone()
    }

    pub fn add_module_path(&self, path: PathBuf)
    {
        self.module_paths.borrow_mut().push(path);
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn prototype_resolution_order()
    {
        let runtime = Runtime::new();
        let array = runtime.array(Vec::new());
        let proto = runtime.prototype_of(&array).expect("array prototype");

        assert!(proto.own_property("len").is_some());
        // Unregistered types fall back to the object prototype.
        let string = runtime.string("x");
        let proto = runtime.prototype_of(&string).expect("string prototype");

        assert!(Rc::ptr_eq(&proto, &runtime.object_prototype()));
        // Only the object prototype itself resolves to nothing.
        let root = Value::Object(runtime.object_prototype());

        assert!(runtime.prototype_of(&root).is_none());
    }

    #[test]
    fn literal_objects_get_the_object_prototype()
    {
        let runtime = Runtime::new();
        let object = runtime.object(vec![(intern::intern("a"), Value::Null)]);
        let proto = runtime.prototype_of(&object).expect("prototype");

        assert!(Rc::ptr_eq(&proto, &runtime.object_prototype()));
    }

    #[test]
    fn globals_contain_literal_words()
    {
        let runtime = Runtime::new();

        for name in ["null", "true", "false", "dup", "try", "error?"]
        {
            assert!(
                runtime.find_global(intern::intern_symbol(name)).is_some(),
                "missing global {}",
                name
            );
        }
    }

    #[test]
    fn factories_route_through_the_memory_manager()
    {
        let runtime = Runtime::new();
        let before = runtime.memory().allocation_count(ValueType::Array);

        runtime.array(Vec::new());
        assert_eq!(
            runtime.memory().allocation_count(ValueType::Array),
            before + 1
        );
    }

    #[test]
    fn arguments_and_module_paths_accumulate()
    {
        let runtime = Runtime::new();

        runtime.add_argument("one");
        runtime.add_argument("two");
        runtime.add_module_path(PathBuf::from("/usr/lib/plorth"));
        assert_eq!(
            runtime.arguments().iter().map(|a| a.as_str()).collect::<Vec<_>>(),
            vec!["one", "two"]
        );
        assert_eq!(runtime.module_paths(), vec![PathBuf::from("/usr/lib/plorth")]);
    }

    #[test]
    fn error_factory_builds_comparable_errors()
    {
        let runtime = Runtime::new();
        let a = runtime.error(ErrorCode::Range, "Stack underflow.", None);
        let b = runtime.error(ErrorCode::Range, "Stack underflow.", None);

        assert_eq!(a, b);
        assert_eq!(a.kind(), ValueType::Error);
        assert_eq!(a.to_source(), "<range error: Stack underflow.>");
    }
}
