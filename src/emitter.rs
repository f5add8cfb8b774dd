//! Emitters: named loggers bound to one or more dimension keys.
//!
//! An emitter holding several keys is visible to every capture bound to any
//! of them, which lets one logical logger take part in several overlapping
//! captures at once.

use std::fmt;
use std::io::Write;
use std::sync::Arc;

use crate::registry::Registry;
use crate::sink::StreamSink;
use crate::tags::DimensionKey;

/// Emit a formatted message through an [`Emitter`].
///
/// Arguments are captured with `format_args!` and only rendered when a sink
/// is bound to one of the emitter's keys.
#[macro_export]
macro_rules! emit {
    ($emitter:expr, $($arg:tt)+) => {
        $emitter.emit(::core::format_args!($($arg)+))
    };
}

/// Trace the value(s) a function is about to return.
///
/// Logs `"<function> returns <values as a tuple>"`, where `<function>` is the
/// enclosing function with the configured test prefix (`test_` by default)
/// removed. Evaluates to the value itself for one argument and to the tuple
/// for several.
#[macro_export]
macro_rules! returns {
    ($emitter:expr, $value:expr $(,)?) => {
        $emitter
            .returns(
                $crate::naming::strip_prefix_with(
                    $crate::caller_name!(),
                    &$crate::config::active().test_prefix,
                ),
                ($value,),
            )
            .0
    };
    ($emitter:expr, $($value:expr),+ $(,)?) => {
        $emitter.returns(
            $crate::naming::strip_prefix_with(
                $crate::caller_name!(),
                &$crate::config::active().test_prefix,
            ),
            ($($value),+),
        )
    };
}

/// A logical logger routed through a [`Registry`].
#[derive(Debug, Clone)]
pub struct Emitter {
    registry: Arc<Registry>,
    keys: Vec<DimensionKey>,
}

impl Emitter {
    /// Emitter reachable through a single tag collection.
    pub fn new(registry: Arc<Registry>, key: impl Into<DimensionKey>) -> Self {
        Self {
            registry,
            keys: vec![key.into()],
        }
    }

    /// Emitter reachable through every key in `keys`, in order.
    pub fn from_keys(registry: Arc<Registry>, keys: impl IntoIterator<Item = DimensionKey>) -> Self {
        Self {
            registry,
            keys: keys.into_iter().collect(),
        }
    }

    /// Add another, independent tag collection.
    pub fn and(mut self, key: impl Into<DimensionKey>) -> Self {
        self.keys.push(key.into());
        self
    }

    /// Keys in construction order; the first one names the message prefix.
    pub fn keys(&self) -> &[DimensionKey] {
        &self.keys
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// Deliver a message to every sink bound to this emitter's keys.
    pub fn emit(&self, message: fmt::Arguments<'_>) -> &Self {
        self.registry.deliver(&self.keys, message);
        self
    }

    /// Log `"<caller> returns <values>"` and hand `values` back.
    ///
    /// Usually called through [`returns!`](crate::returns), which fills in
    /// `caller` and wraps a single value in a one-element tuple.
    pub fn returns<T: fmt::Debug>(&self, caller: &str, values: T) -> T {
        self.emit(format_args!("{} returns {:?}", caller, values));
        values
    }

    /// Route all of this emitter's keys into `stream`.
    pub fn redirect<W: Write + Send + 'static>(&self, stream: W) -> &Self {
        self.redirect_to(StreamSink::shared(stream))
    }

    /// Route all of this emitter's keys into an existing sink.
    pub fn redirect_to(&self, sink: Arc<StreamSink>) -> &Self {
        self.registry.bind(&self.keys, sink);
        self
    }
}
