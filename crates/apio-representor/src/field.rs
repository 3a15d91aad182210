//! Field value types and extractor aliases.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};

/// Extracts a field value of type `V` from an entity.
pub type FieldFunction<T, V> = Arc<dyn Fn(&T) -> V + Send + Sync>;

/// Extracts a string field in the requested language.
pub type LocalizedFunction<T> = Arc<dyn Fn(&T, &Language) -> String + Send + Sync>;

/// Extracts an entity's identifier.
pub type IdentifierFunction<T, I> = Arc<dyn Fn(&T) -> I + Send + Sync>;

/// A numeric field value.
///
/// Integral values stay integral so renderers do not print `1.0` for `1`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    /// A signed integer.
    Integer(i64),
    /// A floating point number.
    Float(f64),
}

impl Number {
    /// Returns the value as an `f64`.
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn as_f64(&self) -> f64 {
        match *self {
            Self::Integer(value) => value as f64,
            Self::Float(value) => value,
        }
    }

    /// Returns the value as an `i64` if it is integral.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Self::Integer(value) => Some(value),
            Self::Float(_) => None,
        }
    }
}

macro_rules! number_from_integer {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Number {
                fn from(value: $ty) -> Self {
                    Self::Integer(i64::from(value))
                }
            }
        )*
    };
}

number_from_integer!(i8, i16, i32, i64, u8, u16, u32);

macro_rules! number_from_wide_integer {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Number {
                /// Values beyond the `i64` range fall back to a float.
                #[allow(clippy::cast_precision_loss)]
                fn from(value: $ty) -> Self {
                    i64::try_from(value).map_or(Self::Float(value as f64), Self::Integer)
                }
            }
        )*
    };
}

number_from_wide_integer!(u64, usize, isize);

impl From<f32> for Number {
    fn from(value: f32) -> Self {
        Self::Float(f64::from(value))
    }
}

impl From<f64> for Number {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(value) => write!(f, "{value}"),
            Self::Float(value) => write!(f, "{value}"),
        }
    }
}

/// The language a localized field is rendered in, as a BCP 47 tag.
///
/// # Example
///
/// ```
/// use apio_representor::Language;
///
/// let language = Language::new("en-US");
/// assert_eq!(language.tag(), "en-US");
/// assert_eq!(language.primary(), "en");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Language(String);

impl Language {
    /// Creates a language from its tag.
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    /// Returns the full tag.
    #[must_use]
    pub fn tag(&self) -> &str {
        &self.0
    }

    /// Returns the primary subtag (`"en"` for `"en-US"`).
    #[must_use]
    pub fn primary(&self) -> &str {
        self.0.split(['-', '_']).next().unwrap_or(&self.0)
    }
}

impl Default for Language {
    fn default() -> Self {
        Self::new("en-US")
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Formats a date field the way representations expose it
/// (`2016-06-15T09:00Z`).
#[must_use]
pub fn format_date(date: &DateTime<Utc>) -> String {
    date.format("%Y-%m-%dT%H:%MZ").to_string()
}
