//! Memo slots - per-instance cache of resolved association values
//!
//! Each declared association owns exactly one typed slot on the document.
//! Slots are never persisted and are invalidated only by the writer paired
//! with the association (or by a reload).

/// Resolution state of one association on one document
#[derive(Debug, Clone, PartialEq)]
pub enum Memo<T> {
    /// Nothing resolved yet; the next read goes to the store
    Unresolved,
    /// Resolved value, served without further lookups
    Resolved(Box<T>),
}

impl<T> Memo<T> {
    pub fn new() -> Self {
        Memo::Unresolved
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Memo::Resolved(_))
    }

    /// Get the resolved value if available
    pub fn get(&self) -> Option<&T> {
        match self {
            Memo::Resolved(value) => Some(&**value),
            Memo::Unresolved => None,
        }
    }

    /// Get the resolved value mutably if available
    pub fn get_mut(&mut self) -> Option<&mut T> {
        match self {
            Memo::Resolved(value) => Some(&mut **value),
            Memo::Unresolved => None,
        }
    }

    /// Store a resolved value, replacing whatever was there
    pub fn set(&mut self, value: T) -> &mut T {
        *self = Memo::Resolved(Box::new(value));
        match self {
            Memo::Resolved(value) => &mut **value,
            Memo::Unresolved => unreachable!("memo was just resolved"),
        }
    }

    /// Drop the resolved value so the next read resolves again
    pub fn invalidate(&mut self) {
        *self = Memo::Unresolved;
    }

    /// Take the resolved value, leaving the slot unresolved
    pub fn take(&mut self) -> Option<T> {
        match std::mem::replace(self, Memo::Unresolved) {
            Memo::Resolved(value) => Some(*value),
            Memo::Unresolved => None,
        }
    }

    /// Return the resolved value, running `resolve` first on a miss.
    /// `association` names the slot in trace output.
    pub fn get_or_resolve<F>(&mut self, association: &str, resolve: F) -> &mut T
    where
        F: FnOnce() -> T,
    {
        if let Memo::Unresolved = self {
            return self.set(resolve());
        }

        match self {
            Memo::Resolved(value) => {
                tracing::trace!(association, "memo hit");
                &mut **value
            }
            Memo::Unresolved => unreachable!("unresolved memo handled above"),
        }
    }

    /// Fallible `get_or_resolve`. A failed resolution leaves the slot unresolved.
    pub fn get_or_try_resolve<E, F>(&mut self, association: &str, resolve: F) -> Result<&mut T, E>
    where
        F: FnOnce() -> Result<T, E>,
    {
        if let Memo::Unresolved = self {
            let value = resolve()?;
            return Ok(self.set(value));
        }

        match self {
            Memo::Resolved(value) => {
                tracing::trace!(association, "memo hit");
                Ok(&mut **value)
            }
            Memo::Unresolved => unreachable!("unresolved memo handled above"),
        }
    }
}

impl<T> Default for Memo<T> {
    fn default() -> Self {
        Memo::Unresolved
    }
}
