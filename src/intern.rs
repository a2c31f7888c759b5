use rustc_hash::FxHashMap;
use std::cell::RefCell;
use std::rc::Rc;
use std::thread_local;

pub type SymbolId = u32;

#[derive(Default)]
struct Interner
{
    strings: FxHashMap<String, Rc<String>>,
    symbols: FxHashMap<String, SymbolId>,
    names: Vec<Rc<String>>,
}

thread_local! {
    static INTERNER: RefCell<Interner> = RefCell::new(Interner::default());
}

pub fn intern(s: &str) -> Rc<String>
{
    INTERNER.with(|interner| {
        let mut guard = interner.borrow_mut();
        if let Some(existing) = guard.strings.get(s)
        {
            return existing.clone();
        }
        let rc = Rc::new(s.to_string());
        guard.strings.insert(s.to_string(), rc.clone());
        rc
    })
}

pub fn intern_owned(s: String) -> Rc<String>
{
    INTERNER.with(|interner| {
        let mut guard = interner.borrow_mut();
        if let Some(existing) = guard.strings.get(s.as_str())
        {
            return existing.clone();
        }
        let rc = Rc::new(s.clone());
        guard.strings.insert(s, rc.clone());
        rc
    })
}

pub fn intern_symbol(s: &str) -> SymbolId
{
    INTERNER.with(|interner| {
        let mut guard = interner.borrow_mut();
        if let Some(existing) = guard.symbols.get(s)
        {
            return *existing;
        }
        let id = guard.names.len() as SymbolId;
        let rc = match guard.strings.get(s)
        {
            Some(existing) => existing.clone(),
            None =>
            {
                let rc = Rc::new(s.to_string());
                guard.strings.insert(s.to_string(), rc.clone());
                rc
            }
        };
        guard.names.push(rc);
        guard.symbols.insert(s.to_string(), id);
        id
    })
}

pub fn symbol_name(id: SymbolId) -> Rc<String>
{
    INTERNER.with(|interner| {
        let guard = interner.borrow();
        guard
            .names
            .get(id as usize)
            .cloned()
            .unwrap_or_else(|| intern("<unknown>"))
    })
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn interned_strings_are_shared()
    {
        let a = intern("hello");
        let b = intern_owned("hello".to_string());
        assert!(Rc::ptr_eq(&a, &b));
    }

    #[test]
    fn symbol_ids_are_stable()
    {
        let a = intern_symbol("swap");
        let b = intern_symbol("swap");
        assert_eq!(a, b);
        assert_eq!(symbol_name(a).as_str(), "swap");
    }
}
