//! # Stockroom Preferences
//!
//! Per-user dashboard layout and appearance settings.
//!
//! A user's widget layout is an ordered map of widget id to `{enabled, order}`.
//! It always starts from an explicit, immutable `WidgetDefaults` value handed in
//! by the caller, never from shared mutable state. Partial updates merge into the
//! existing map and can never introduce widgets that are not already there.
//!
//! Stored configuration is decoded leniently: anything that does not parse is
//! treated as absent and the defaults take over.

pub mod catalog;
pub mod error;
pub mod theme;
pub mod widgets;

pub use catalog::{WidgetDescriptor, WidgetInfo, describe};
pub use error::PreferenceError;
pub use theme::parse_theme;
pub use widgets::{WidgetDefaults, WidgetLayout, WidgetSetting, WidgetUpdate};
