//! Input shapes accepted by `MonitorRegistry::import_monitors`.

use std::any::{type_name, Any};
use std::fmt;

use crate::error::ValidationError;
use crate::stream::EventStream;

use super::monitor::Monitor;

/// One value offered for import.
///
/// `Dynamic` carries values coming from an untyped host boundary (scripting
/// bindings, plugin hosts). They are accepted only if they downcast to a
/// `Monitor` or an `EventStream`.
#[allow(missing_docs)]
pub enum ImportItem {
    Monitor(Monitor),
    Stream(EventStream),
    Dynamic {
        value: Box<dyn Any + Send>,
        type_name: &'static str,
    },
}

impl ImportItem {
    /// Wraps an arbitrary value, remembering its type name for diagnostics.
    #[must_use]
    pub fn dynamic<T: Any + Send>(value: T) -> Self {
        Self::Dynamic {
            value: Box::new(value),
            type_name: type_name::<T>(),
        }
    }

    /// Resolves the item to a monitor.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::TypeMismatch` for a dynamic value of any other
    /// type.
    pub fn into_monitor(self) -> Result<Monitor, ValidationError> {
        match self {
            Self::Monitor(mon) => Ok(mon),
            Self::Stream(stream) => Ok(Monitor::from_stream(stream)),
            Self::Dynamic { value, type_name } => {
                let value = match value.downcast::<Monitor>() {
                    Ok(mon) => return Ok(*mon),
                    Err(value) => value,
                };
                match value.downcast::<EventStream>() {
                    Ok(stream) => Ok(Monitor::from_stream(*stream)),
                    Err(_) => Err(ValidationError::TypeMismatch {
                        found: type_name.to_string(),
                    }),
                }
            }
        }
    }
}

impl fmt::Debug for ImportItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Monitor(mon) => f.debug_tuple("Monitor").field(&mon.name()).finish(),
            Self::Stream(stream) => f.debug_tuple("Stream").field(&stream.channel()).finish(),
            Self::Dynamic { type_name, .. } => f.debug_tuple("Dynamic").field(type_name).finish(),
        }
    }
}

impl From<Monitor> for ImportItem {
    fn from(mon: Monitor) -> Self {
        Self::Monitor(mon)
    }
}

impl From<EventStream> for ImportItem {
    fn from(stream: EventStream) -> Self {
        Self::Stream(stream)
    }
}

/// A single item or an ordered batch.
#[allow(missing_docs)]
#[derive(Debug)]
pub enum MonitorImport {
    One(ImportItem),
    Many(Vec<ImportItem>),
}

impl MonitorImport {
    /// Items in their given order.
    #[must_use]
    pub fn into_items(self) -> Vec<ImportItem> {
        match self {
            Self::One(item) => vec![item],
            Self::Many(items) => items,
        }
    }
}

impl From<ImportItem> for MonitorImport {
    fn from(item: ImportItem) -> Self {
        Self::One(item)
    }
}

impl From<Monitor> for MonitorImport {
    fn from(mon: Monitor) -> Self {
        Self::One(mon.into())
    }
}

impl From<EventStream> for MonitorImport {
    fn from(stream: EventStream) -> Self {
        Self::One(stream.into())
    }
}

impl From<Vec<ImportItem>> for MonitorImport {
    fn from(items: Vec<ImportItem>) -> Self {
        Self::Many(items)
    }
}

impl From<Vec<Monitor>> for MonitorImport {
    fn from(monitors: Vec<Monitor>) -> Self {
        Self::Many(monitors.into_iter().map(ImportItem::from).collect())
    }
}
