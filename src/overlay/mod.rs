pub mod catalog;
pub mod dismiss;

pub use catalog::{OverlayCatalog, OverlayMatcher, OverlayRule};
pub use dismiss::dismiss_overlays;
