//! Privacy-risk metrics.

pub mod attr_disclosure;
pub mod dcr;

pub use attr_disclosure::{AttrDisclosureResult, AttributeDisclosure};
pub use dcr::{DcrResult, MedianDcr};
