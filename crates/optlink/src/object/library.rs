use std::{cell::Cell, rc::Rc};

///
/// SolverLibrary
///
/// Reference-counted lifecycle of the foreign shared library. The count
/// is a plain counter under the crate's single-threaded discipline: a
/// handle is taken per foreign object created and released when the
/// object is dropped. The library loads on the first handle and unloads
/// only when the last handle goes away; it is never unloaded while any
/// handle is outstanding.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LibraryState {
    Unloaded,
    Loaded(usize),
}

#[derive(Debug, Default)]
pub struct SolverLibrary {
    loaded: Cell<bool>,
    handles: Cell<usize>,
}

impl SolverLibrary {
    #[must_use]
    pub fn new() -> Rc<Self> {
        Rc::new(Self {
            loaded: Cell::new(false),
            handles: Cell::new(0),
        })
    }

    /// Take a handle, loading the library on the first one.
    #[must_use]
    pub fn attach(self: &Rc<Self>) -> LibraryHandle {
        self.loaded.set(true);
        self.handles.set(self.handles.get() + 1);

        LibraryHandle {
            library: Rc::clone(self),
        }
    }

    #[must_use]
    pub fn state(&self) -> LibraryState {
        if self.loaded.get() {
            LibraryState::Loaded(self.handles.get())
        } else {
            LibraryState::Unloaded
        }
    }

    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.loaded.get()
    }

    fn release(&self) {
        let remaining = self.handles.get().saturating_sub(1);
        self.handles.set(remaining);
        if remaining == 0 {
            self.loaded.set(false);
        }
    }
}

///
/// LibraryHandle
///
/// One outstanding use of the library; dropping it releases the count.
///

#[derive(Debug)]
pub struct LibraryHandle {
    library: Rc<SolverLibrary>,
}

impl LibraryHandle {
    #[must_use]
    pub fn library(&self) -> &Rc<SolverLibrary> {
        &self.library
    }
}

impl Drop for LibraryHandle {
    fn drop(&mut self) {
        self.library.release();
    }
}
