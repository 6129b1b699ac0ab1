mod annotation;
mod annotation_writer;
mod attribute;
mod attribute_writer;
mod constants;

pub use annotation::*;
pub use annotation_writer::*;
pub use attribute::*;
pub use attribute_writer::AttributeWriter;
pub use constants::*;
