#![forbid(unsafe_code)]

//! Engine configuration, fixed at construction.
//!
//! [`BlockerOptions`] is the serialisable subset (what a host can pass as
//! JSON); [`BlockerConfig`] adds the default misplaced elements, which hold
//! live element handles and therefore cannot be deserialised.

use core::fmt;
use core::time::Duration;

use serde::{Deserialize, Serialize};

use crate::misplaced::MisplacedElement;

/// Class applied to the root element while locked.
pub const DEFAULT_CLASS_NAME: &str = "has-no-scroll";
/// Quiet period after the last resize before reconciling.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(100);
/// Root property that absorbs the scrollbar width.
pub const ROOT_COMPENSATION_PROPERTY: &str = "margin-right";
/// Body property holding the saved scroll offset as a negative length.
pub const BODY_OFFSET_PROPERTY: &str = "top";

/// When compensation styles are written after the lock class is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StyleWritePolicy {
    /// Write in the same call that toggles the lock class.
    Immediate,
    /// Write on the next animation frame, avoiding a forced synchronous layout.
    #[default]
    NextFrame,
}

/// Invalid construction options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The lock class name is empty.
    EmptyClassName,
    /// The lock class name contains whitespace and would add several classes.
    InvalidClassName(String),
    /// A default misplaced element has no CSS property.
    EmptyProperty,
    /// The resize debounce interval is zero.
    ZeroDebounce,
    /// JSON options failed to parse.
    Json(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyClassName => f.write_str("class name must not be empty"),
            Self::InvalidClassName(name) => {
                write!(f, "class name must be a single token: {name:?}")
            }
            Self::EmptyProperty => f.write_str("misplaced element property must not be empty"),
            Self::ZeroDebounce => f.write_str("debounce interval must be greater than zero"),
            Self::Json(msg) => write!(f, "invalid options json: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Serialisable construction options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct BlockerOptions {
    pub class_name: String,
    pub style_write_policy: StyleWritePolicy,
    pub debounce_ms: u64,
}

impl Default for BlockerOptions {
    fn default() -> Self {
        Self {
            class_name: DEFAULT_CLASS_NAME.to_owned(),
            style_write_policy: StyleWritePolicy::default(),
            debounce_ms: DEFAULT_DEBOUNCE.as_millis() as u64,
        }
    }
}

impl BlockerOptions {
    /// Parse options from JSON; omitted fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|err| ConfigError::Json(err.to_string()))
    }
}

/// Complete engine configuration.
#[derive(Debug)]
pub struct BlockerConfig<E> {
    class_name: String,
    misplaced_elements: Vec<MisplacedElement<E>>,
    style_write_policy: StyleWritePolicy,
    debounce: Duration,
}

impl<E: Clone> Clone for BlockerConfig<E> {
    fn clone(&self) -> Self {
        Self {
            class_name: self.class_name.clone(),
            misplaced_elements: self.misplaced_elements.clone(),
            style_write_policy: self.style_write_policy,
            debounce: self.debounce,
        }
    }
}

impl<E> Default for BlockerConfig<E> {
    fn default() -> Self {
        Self::from_options(BlockerOptions::default())
    }
}

impl<E> BlockerConfig<E> {
    /// Configuration with every default.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration from serialisable options, with no default elements.
    #[must_use]
    pub fn from_options(options: BlockerOptions) -> Self {
        Self {
            class_name: options.class_name,
            misplaced_elements: Vec::new(),
            style_write_policy: options.style_write_policy,
            debounce: Duration::from_millis(options.debounce_ms),
        }
    }

    #[must_use]
    pub fn with_class_name(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = class_name.into();
        self
    }

    /// Add a misplaced element compensated on every lock.
    #[must_use]
    pub fn with_misplaced_element(mut self, element: MisplacedElement<E>) -> Self {
        self.misplaced_elements.push(element);
        self
    }

    #[must_use]
    pub fn with_misplaced_elements(
        mut self,
        elements: impl IntoIterator<Item = MisplacedElement<E>>,
    ) -> Self {
        self.misplaced_elements.extend(elements);
        self
    }

    #[must_use]
    pub fn with_style_write_policy(mut self, policy: StyleWritePolicy) -> Self {
        self.style_write_policy = policy;
        self
    }

    #[must_use]
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    #[must_use]
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    #[must_use]
    pub fn misplaced_elements(&self) -> &[MisplacedElement<E>] {
        &self.misplaced_elements
    }

    #[must_use]
    pub const fn style_write_policy(&self) -> StyleWritePolicy {
        self.style_write_policy
    }

    #[must_use]
    pub const fn debounce(&self) -> Duration {
        self.debounce
    }

    /// Check the configuration before an engine is built from it.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.class_name.is_empty() {
            return Err(ConfigError::EmptyClassName);
        }
        if self.class_name.chars().any(char::is_whitespace) {
            return Err(ConfigError::InvalidClassName(self.class_name.clone()));
        }
        if self.debounce.is_zero() {
            return Err(ConfigError::ZeroDebounce);
        }
        let missing_property = self.misplaced_elements.iter().any(|spec| {
            !matches!(spec.target(), crate::misplaced::Target::Lazy(_))
                && spec.property().is_empty()
        });
        if missing_property {
            return Err(ConfigError::EmptyProperty);
        }
        Ok(())
    }
}
