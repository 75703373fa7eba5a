//! Hook slot definitions: class identities, dispatch modes, arguments.

use std::borrow::Cow;
use std::fmt;

use hatch_core::Value;

use super::listener::Tap;

/// Stable identity of a class whose instances own a hook registry.
///
/// Plugins refer to a class before any instance exists, so the identity is
/// a plain name that can be declared as a `const`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassId(Cow<'static, str>);

impl ClassId {
    /// Creates an identity from a static name.
    pub const fn new(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    /// Creates an identity from an owned name.
    pub fn from_name(name: impl Into<String>) -> Self {
        Self(Cow::Owned(name.into()))
    }

    /// Returns the name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How a slot runs its listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchMode {
    /// Listeners run in order on the caller's stack; nothing suspends.
    Sync,
    /// Listeners run one after another, each awaited before the next starts.
    Sequential,
}

impl fmt::Display for DispatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sync => write!(f, "sync"),
            Self::Sequential => write!(f, "sequential"),
        }
    }
}

/// Named extension point with a declared parameter list.
#[derive(Debug, Clone)]
pub struct HookSlot {
    params: Vec<String>,
    mode: DispatchMode,
    pub(crate) taps: Vec<Tap>,
}

impl HookSlot {
    /// Creates a slot whose listeners run synchronously.
    pub fn sync<I, S>(params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_mode(DispatchMode::Sync, params)
    }

    /// Creates a slot whose listeners run sequentially and may suspend.
    pub fn sequential<I, S>(params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_mode(DispatchMode::Sequential, params)
    }

    fn with_mode<I, S>(mode: DispatchMode, params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            params: params.into_iter().map(Into::into).collect(),
            mode,
            taps: Vec::new(),
        }
    }

    /// Declared parameter names.
    pub fn params(&self) -> &[String] {
        &self.params
    }

    /// Dispatch mode.
    pub fn mode(&self) -> DispatchMode {
        self.mode
    }

    /// Number of attached listeners.
    pub fn len(&self) -> usize {
        self.taps.len()
    }

    /// Whether no listener is attached.
    pub fn is_empty(&self) -> bool {
        self.taps.is_empty()
    }

    /// Names of the attached taps, in attachment order.
    pub fn tap_names(&self) -> Vec<String> {
        self.taps.iter().map(|t| t.name().to_string()).collect()
    }
}

/// Arguments of one broadcast, paired with the slot's parameter names.
#[derive(Debug, Clone)]
pub struct HookArgs {
    hook: String,
    values: Vec<(String, Value)>,
}

impl HookArgs {
    pub(crate) fn new(hook: &str, params: &[String], values: Vec<Value>) -> Self {
        Self {
            hook: hook.to_string(),
            values: params.iter().cloned().zip(values).collect(),
        }
    }

    /// Name of the slot being broadcast.
    pub fn hook(&self) -> &str {
        &self.hook
    }

    /// Argument by parameter name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values
            .iter()
            .find(|(param, _)| param == name)
            .map(|(_, value)| value)
    }

    /// Argument by position.
    pub fn arg(&self, index: usize) -> Option<&Value> {
        self.values.get(index).map(|(_, value)| value)
    }

    /// Host object argument by parameter name.
    pub fn object<T: std::any::Any>(&self, name: &str) -> Option<&T> {
        self.get(name).and_then(Value::downcast_ref::<T>)
    }

    /// Number of arguments.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the slot takes no arguments.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_by_name_and_position() {
        let params = vec!["outlet".to_string(), "options".to_string()];
        let args = HookArgs::new(
            "created",
            &params,
            vec![Value::from("server"), Value::object(42u16)],
        );

        assert_eq!(args.hook(), "created");
        assert_eq!(args.get("outlet"), Some(&Value::from("server")));
        assert_eq!(args.arg(0), Some(&Value::from("server")));
        assert_eq!(args.object::<u16>("options"), Some(&42));
        assert!(args.get("missing").is_none());
    }

    #[test]
    fn test_class_id_const_and_owned_agree() {
        const SERVER: ClassId = ClassId::new("server");
        assert_eq!(SERVER, ClassId::from_name("server"));
        assert_eq!(SERVER.to_string(), "server");
    }
}
