//! Encode JVM class file attributes
//!
//! Attributes are built as [`Attribute`](class_file::Attribute) values which do not refer to any
//! constant pool. An [`AttributeWriter`](class_file::AttributeWriter) then interns whatever the
//! attribute needs into a [`ConstantPool`](class_file::ConstantPool) and appends the framed
//! `attribute_info` record to a byte sink.
//!
//! ### Simple example
//!
//! Consider the following field and method of a Java class:
//!
//! ```java,ignore,no_run
//! @Deprecated
//! public static final boolean DEBUG = true;
//!
//! public <T> List<T> load(final String path) throws IOException { ... }
//! ```
//!
//! The attributes of those members can be encoded as follows:
//!
//! ```
//! use classattr::jvm::class_file::*;
//! use classattr::jvm::*;
//!
//! # fn encode_attributes() -> Result<(), Error> {
//! let mut pool = ConstantsPool::new();
//! let mut writer = AttributeWriter::new(&mut pool);
//!
//! // Attributes of the `DEBUG` field
//! let mut field_attributes: Vec<u8> = vec![];
//! writer.write_table(
//!     vec![
//!         Attribute::constant_value(ConstValue::Boolean(true)),
//!         Attribute::deprecated(),
//!         Attribute::annotations(true, vec![AnnotationInfo::new("Ljava/lang/Deprecated;")])?,
//!     ],
//!     &mut field_attributes,
//! )?;
//!
//! // Attributes of the `load` method
//! let mut method_attributes: Vec<u8> = vec![];
//! writer.write_table(
//!     vec![
//!         Attribute::signature("<T:Ljava/lang/Object;>(Ljava/lang/String;)Ljava/util/List<TT;>;"),
//!         Attribute::exceptions(vec![String::from("java/io/IOException")])?,
//!         Attribute::method_parameters(vec![MethodParameter {
//!             name: Some(String::from("path")),
//!             access_flags: ParameterAccessFlags::FINAL,
//!         }])?,
//!     ],
//!     &mut method_attributes,
//! )?;
//!
//! // The pool now holds every constant the attributes refer to
//! let mut constant_pool: Vec<u8> = vec![];
//! pool.serialize(&mut constant_pool)?;
//! # Ok(())
//! # }
//! # encode_attributes().unwrap();
//! ```

mod access_flags;
mod binary_format;
pub mod class_file;
mod errors;

pub use access_flags::*;
pub use binary_format::*;
pub use errors::*;
