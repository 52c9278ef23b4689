use derive_builder::Builder;

use crate::{
    flags::CVarFlags,
    store::Slot,
    value::{Bound, TypeTag, Value},
};

/// Category assumed for names that carry no `category.` prefix.
pub const DEFAULT_CATEGORY: &str = "global";

/// Splits `render.fov` into `(Some("render"), "fov")` and `fov` into `(None, "fov")`.
pub fn split_name(name: &str) -> (Option<&str>, &str) {
    match name.split_once('.') {
        Some((category, key)) => (Some(category), key),
        None => (None, name),
    }
}

/// A declaration: everything `create` needs to bring an entry into existence.
///
/// ```rust
/// use next_cvar::{CVarDef, CVarFlags};
///
/// let def = CVarDef::builder()
///     .name("render.fov")
///     .initial(90.0)
///     .description("Vertical field of view in degrees")
///     .flags(CVarFlags::ARCHIVE)
///     .min(30.0)
///     .max(120.0)
///     .build()?;
/// assert_eq!(def.initial.type_tag(), next_cvar::TypeTag::Float);
/// # Ok::<(), next_cvar::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Builder)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct CVarDef {
    pub name: String,
    /// Default value; its variant becomes the declared type.
    pub initial: Value,
    #[builder(default)]
    pub description: String,
    #[builder(default)]
    pub flags: CVarFlags,
    #[builder(default, setter(into, strip_option))]
    pub min: Option<Bound>,
    #[builder(default, setter(into, strip_option))]
    pub max: Option<Bound>,
}

impl CVarDef {
    pub fn builder() -> CVarDefBuilder {
        CVarDefBuilder::default()
    }

    /// A bare declaration with no description, flags or bounds.
    pub fn new(name: impl Into<String>, initial: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            initial: initial.into(),
            description: String::new(),
            flags: CVarFlags::empty(),
            min: None,
            max: None,
        }
    }
}

impl CVarDefBuilder {
    fn validate(&self) -> Result<(), String> {
        match &self.name {
            Some(name) if name.is_empty() => Err("name must not be empty".to_string()),
            _ => Ok(()),
        }
    }
}

/// Static metadata of one entry. Owned by the registry; callers get clones.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryDescriptor {
    pub name: String,
    pub category: Option<String>,
    pub description: String,
    pub declared_type: TypeTag,
    pub flags: CVarFlags,
    pub min: Option<Bound>,
    pub max: Option<Bound>,
    pub slot: Slot,
}

impl EntryDescriptor {
    pub(crate) fn new(def: &CVarDef, flags: CVarFlags, slot: Slot) -> Self {
        let declared_type = def.initial.type_tag();
        let (category, _) = split_name(&def.name);
        Self {
            name: def.name.clone(),
            category: category.map(str::to_string),
            description: def.description.clone(),
            declared_type,
            flags,
            min: def.min.map(|b| b.for_type(declared_type)),
            max: def.max.map(|b| b.for_type(declared_type)),
            slot,
        }
    }

    /// The part of the name after the category prefix.
    pub fn key(&self) -> &str {
        split_name(&self.name).1
    }

    /// The category, or [`DEFAULT_CATEGORY`] when the name has none.
    pub fn category_or_default(&self) -> &str {
        self.category.as_deref().unwrap_or(DEFAULT_CATEGORY)
    }
}
