
//! Inspect the header meta data of OpenEXR files.
//!
//! This crate reads only the meta data section of an exr file,
//! never the pixel data, and renders it as a plain text report:
//! the file format version, whether each part of a multi-part file
//! is complete, and every attribute with its declared type and value.
//!
//! ```no_run
//! let info = exrinfo::meta::read_file_info("photo.exr")?;
//! println!("{}", exrinfo::report::file_report(&info));
//! # Ok::<(), exrinfo::error::Error>(())
//! ```

#![forbid(unsafe_code)]

#[macro_use]
extern crate smallvec;

pub mod io;
pub mod math;
pub mod meta;
pub mod report;
pub mod error;


pub mod prelude {

    // main exports
    pub use crate::meta::{FileInfo, PartHeader, read_file_info};
    pub use crate::meta::attribute::Attribute;
    pub use crate::report::file_report;

    // secondary data types
    pub use crate::meta::attribute;
    pub use crate::meta::attribute::AttributeValue;
    pub use crate::error::{Error, Result};
}
