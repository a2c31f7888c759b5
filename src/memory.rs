use crate::value::ValueType;
use std::cell::Cell;

/// Bookkeeping side of the runtime's value allocator. The values themselves
/// are reference counted through `Rc`; the manager records how many values of
/// each type have been handed out so that debug builds can report the totals
/// when the runtime is torn down. Cycles between objects are never collected
/// and stay alive until then.
pub struct MemoryManager
{
    allocated: [Cell<u64>; ValueType::COUNT],
}

impl MemoryManager
{
    pub fn new() -> Self
    {
        Self {
            allocated: std::array::from_fn(|_| Cell::new(0)),
        }
    }

    pub fn allocate(&self, kind: ValueType)
    {
        let slot = &self.allocated[kind as usize];
        slot.set(slot.get() + 1);
    }

    pub fn allocation_count(&self, kind: ValueType) -> u64
    {
        self.allocated[kind as usize].get()
    }

    pub fn total_allocations(&self) -> u64
    {
        self.allocated.iter().map(Cell::get).sum()
    }
}

impl Drop for MemoryManager
{
    fn drop(&mut self)
    {
        #[cfg(debug_assertions)]
        {
            if std::env::var_os("PLORTH_DEBUG_MEMORY").is_some()
            {
                eprintln!("memory: {} values allocated", self.total_allocations());
                for kind in ValueType::ALL
                {
                    let count = self.allocation_count(kind);
                    if count > 0
                    {
                        eprintln!("memory:   {}: {}", kind, count);
                    }
                }
            }
        }
    }
}
