use crate::bootstrap::error::UnitResult;
use std::borrow::Cow;

/// Canonical name of a configuration unit, matched exactly against exclusion sets.
pub type UnitName = Cow<'static, str>;

/// A pluggable unit that populates a container during bootstrap.
///
/// `C` is the container being configured, `S` the settings provider handed to every unit.
///
/// # Example
/// ```rust
/// use bootkit_kernel::bootstrap::{ContainerConfigurer, UnitResult};
///
/// struct Greetings;
///
/// impl<S> ContainerConfigurer<Vec<String>, S> for Greetings {
///     fn name(&self) -> bootkit_kernel::bootstrap::UnitName {
///         "Greetings".into()
///     }
///
///     fn configure(&self, container: &mut Vec<String>, _settings: &S) -> UnitResult {
///         container.push("hello".to_owned());
///         Ok(())
///     }
/// }
/// ```
pub trait ContainerConfigurer<C, S> {
    /// Canonical name; defaults to the fully qualified type name.
    fn name(&self) -> UnitName {
        Cow::Borrowed(std::any::type_name::<Self>())
    }

    /// Mutates `container` in place.
    ///
    /// # Errors
    /// Any error aborts the remaining bootstrap lifecycle.
    fn configure(&self, container: &mut C, settings: &S) -> UnitResult;
}

/// A pluggable unit that registers maps on a mapping expression `E`.
pub trait MapperConfigurer<E> {
    /// Canonical name; defaults to the fully qualified type name.
    fn name(&self) -> UnitName {
        Cow::Borrowed(std::any::type_name::<Self>())
    }

    /// Registers maps on the shared expression.
    ///
    /// # Errors
    /// Any error aborts mapper construction.
    fn configure(&self, expression: &mut E) -> UnitResult;
}

/// Boxed container unit as produced by discovery.
pub type BoxedContainerUnit<C, S> = Box<dyn ContainerConfigurer<C, S>>;

/// Boxed mapper unit as produced by discovery.
pub type BoxedMapperUnit<E> = Box<dyn MapperConfigurer<E>>;
