//! Configuration options for the conversion engine.
//!
//! This module provides the knobs a [`Grammar`](crate::Grammar) carries:
//!
//! - [`GrammarOptions`]: main configuration struct
//! - [`FieldPolicy`]: which field modifiers exclude a field from reading or writing
//! - [`ObjectUpdate`]: whether a nested object field is merged into or replaced
//! - [`EnumResolution`]: how stored values are matched to enumeration constants
//!
//! ## Examples
//!
//! ```rust
//! use grammar::{EnumResolution, Grammar, GrammarOptions, Modifiers, ObjectUpdate};
//!
//! let options = GrammarOptions::new()
//!     .with_object_update(ObjectUpdate::Replace)
//!     .with_enum_resolution(EnumResolution::Name)
//!     .with_skip_on_read(Modifiers::STATIC);
//!
//! let grammar = Grammar::with_options(options);
//! assert_eq!(grammar.options().object_update, ObjectUpdate::Replace);
//! ```

use crate::Modifiers;

/// Which modifiers exclude a field from marshalling (read) and
/// unmarshalling (write).
///
/// By default reading skips `STATIC`, `TRANSIENT` and `SYNTHETIC` fields and
/// writing additionally skips `FINAL` fields.
///
/// # Examples
///
/// ```rust
/// use grammar::{FieldPolicy, Modifiers};
///
/// let policy = FieldPolicy::default();
/// assert!(policy.reads(Modifiers::FINAL));
/// assert!(!policy.writes(Modifiers::FINAL));
/// assert!(!policy.reads(Modifiers::TRANSIENT));
/// assert!(policy.reads(Modifiers::empty()));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldPolicy {
    pub skip_on_read: Modifiers,
    pub skip_on_write: Modifiers,
}

impl Default for FieldPolicy {
    fn default() -> Self {
        let skipped = Modifiers::STATIC | Modifiers::TRANSIENT | Modifiers::SYNTHETIC;
        FieldPolicy {
            skip_on_read: skipped,
            skip_on_write: skipped | Modifiers::FINAL,
        }
    }
}

impl FieldPolicy {
    /// Returns `true` if a field with these modifiers is marshalled.
    #[inline]
    #[must_use]
    pub fn reads(&self, modifiers: Modifiers) -> bool {
        !modifiers.intersects(self.skip_on_read)
    }

    /// Returns `true` if a field with these modifiers is unmarshalled.
    #[inline]
    #[must_use]
    pub fn writes(&self, modifiers: Modifiers) -> bool {
        !modifiers.intersects(self.skip_on_write)
    }
}

/// What happens when a mapping is committed into a field that already holds
/// an object.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ObjectUpdate {
    /// Unmarshal into the existing instance; keys absent from the mapping
    /// keep their current values.
    #[default]
    Merge,
    /// Build a fresh instance from the mapping and assign it.
    Replace,
}

/// How a stored value is matched to an enumeration constant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum EnumResolution {
    /// Numbers select by ordinal, strings by exact name.
    #[default]
    NameOrOrdinal,
    /// Only strings are accepted.
    Name,
    /// Only numbers are accepted.
    Ordinal,
}

impl EnumResolution {
    #[inline]
    #[must_use]
    pub const fn accepts_name(&self) -> bool {
        matches!(self, EnumResolution::NameOrOrdinal | EnumResolution::Name)
    }

    #[inline]
    #[must_use]
    pub const fn accepts_ordinal(&self) -> bool {
        matches!(self, EnumResolution::NameOrOrdinal | EnumResolution::Ordinal)
    }
}

/// Configuration options for a [`Grammar`](crate::Grammar).
///
/// # Examples
///
/// ```rust
/// use grammar::{GrammarOptions, ObjectUpdate, EnumResolution};
///
/// let options = GrammarOptions::new();
/// assert_eq!(options.object_update, ObjectUpdate::Merge);
/// assert_eq!(options.enum_resolution, EnumResolution::NameOrOrdinal);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GrammarOptions {
    pub policy: FieldPolicy,
    pub object_update: ObjectUpdate,
    pub enum_resolution: EnumResolution,
}

impl GrammarOptions {
    /// Creates default options: the default field policy, merging object
    /// updates and enumeration lookup by name or ordinal.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the whole field selection policy.
    #[must_use]
    pub fn with_policy(mut self, policy: FieldPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Sets the modifiers that exclude a field from marshalling.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use grammar::{GrammarOptions, Modifiers};
    ///
    /// // marshal transient fields too
    /// let options = GrammarOptions::new().with_skip_on_read(Modifiers::STATIC | Modifiers::SYNTHETIC);
    /// assert!(options.policy.reads(Modifiers::TRANSIENT));
    /// ```
    #[must_use]
    pub fn with_skip_on_read(mut self, modifiers: Modifiers) -> Self {
        self.policy.skip_on_read = modifiers;
        self
    }

    /// Sets the modifiers that exclude a field from unmarshalling.
    #[must_use]
    pub fn with_skip_on_write(mut self, modifiers: Modifiers) -> Self {
        self.policy.skip_on_write = modifiers;
        self
    }

    #[must_use]
    pub fn with_object_update(mut self, update: ObjectUpdate) -> Self {
        self.object_update = update;
        self
    }

    #[must_use]
    pub fn with_enum_resolution(mut self, resolution: EnumResolution) -> Self {
        self.enum_resolution = resolution;
        self
    }
}
