use crate::{descriptor::CVarDef, error::Result, registry::Registry};

/// A statically submitted declaration, collected with `inventory`.
pub struct RegisteredCVar {
    pub def: fn() -> CVarDef,
}

impl RegisteredCVar {
    pub const fn new(def: fn() -> CVarDef) -> Self {
        Self { def }
    }
}

inventory::collect!(RegisteredCVar);

/// Submits a declaration that [`Registry::register_all`] will apply.
///
/// ```rust
/// use next_cvar::{CVarDef, CVarFlags, Registry, submit_cvar};
///
/// fn timeout() -> CVarDef {
///     let mut def = CVarDef::new("net.timeout_ms", 5000);
///     def.flags = CVarFlags::ARCHIVE;
///     def
/// }
///
/// submit_cvar!(timeout);
///
/// # fn main() -> Result<(), next_cvar::Error> {
/// let registry = Registry::new();
/// registry.register_all()?;
/// assert_eq!(registry.get_as::<i64>("net.timeout_ms")?, 5000);
/// # Ok(())
/// # }
/// ```
#[macro_export]
macro_rules! submit_cvar {
    ($def:expr) => {
        $crate::__private::inventory::submit! {
            $crate::RegisteredCVar::new($def)
        }
    };
}

impl Registry {
    /// Declares every entry submitted with [`submit_cvar!`](crate::submit_cvar).
    /// Already declared names are left as they are. Returns the number of
    /// submissions processed.
    pub fn register_all(&self) -> Result<usize> {
        let mut count = 0;
        for registration in inventory::iter::<RegisteredCVar> {
            self.create(&(registration.def)())?;
            count += 1;
        }
        Ok(count)
    }
}
