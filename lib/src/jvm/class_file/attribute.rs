use crate::jvm::class_file::{AnnotationInfo, ElementValue, TypeAnnotationInfo};
use crate::jvm::{u16_count, u8_count, Error, InnerClassAccessFlags, ParameterAccessFlags};
use std::fmt;

/// Kinds of attributes which can be encoded
///
/// Each kind has a fixed name: the attribute is identified in the class file by a
/// `CONSTANT_Utf8_info` holding exactly this name.
///
/// [0]: https://docs.oracle.com/javase/specs/jvms/se15/html/jvms-4.html#jvms-4.7-310
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Kind {
    Signature,
    Exceptions,
    InnerClasses,
    ConstantValue,
    RuntimeVisibleAnnotations,
    RuntimeInvisibleAnnotations,
    AnnotationDefault,
    RuntimeVisibleParameterAnnotations,
    RuntimeInvisibleParameterAnnotations,
    Deprecated,
    RuntimeVisibleTypeAnnotations,
    RuntimeInvisibleTypeAnnotations,
    MethodParameters,
}

impl Kind {
    pub const ALL: [Kind; 13] = [
        Kind::Signature,
        Kind::Exceptions,
        Kind::InnerClasses,
        Kind::ConstantValue,
        Kind::RuntimeVisibleAnnotations,
        Kind::RuntimeInvisibleAnnotations,
        Kind::AnnotationDefault,
        Kind::RuntimeVisibleParameterAnnotations,
        Kind::RuntimeInvisibleParameterAnnotations,
        Kind::Deprecated,
        Kind::RuntimeVisibleTypeAnnotations,
        Kind::RuntimeInvisibleTypeAnnotations,
        Kind::MethodParameters,
    ];

    /// Name of the attribute
    pub const fn name(self) -> &'static str {
        match self {
            Kind::Signature => "Signature",
            Kind::Exceptions => "Exceptions",
            Kind::InnerClasses => "InnerClasses",
            Kind::ConstantValue => "ConstantValue",
            Kind::RuntimeVisibleAnnotations => "RuntimeVisibleAnnotations",
            Kind::RuntimeInvisibleAnnotations => "RuntimeInvisibleAnnotations",
            Kind::AnnotationDefault => "AnnotationDefault",
            Kind::RuntimeVisibleParameterAnnotations => "RuntimeVisibleParameterAnnotations",
            Kind::RuntimeInvisibleParameterAnnotations => "RuntimeInvisibleParameterAnnotations",
            Kind::Deprecated => "Deprecated",
            Kind::RuntimeVisibleTypeAnnotations => "RuntimeVisibleTypeAnnotations",
            Kind::RuntimeInvisibleTypeAnnotations => "RuntimeInvisibleTypeAnnotations",
            Kind::MethodParameters => "MethodParameters",
        }
    }

    /// Find the kind with this attribute name
    pub fn from_name(name: &str) -> Option<Kind> {
        Kind::ALL.iter().copied().find(|kind| kind.name() == name)
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Attributes (used in classes, fields, and methods)
///
/// Attribute values never contain constant pool indices: everything they refer to is interned
/// when the attribute is written (see [`AttributeWriter`](super::AttributeWriter)). Lists keep
/// the order they were built in and are written in that order.
///
/// Prefer the constructor functions over building variants directly, since they reject values
/// whose lists could not be counted in the encoded attribute.
///
/// [0]: https://docs.oracle.com/javase/specs/jvms/se15/html/jvms-4.html#jvms-4.7
#[derive(Debug, Clone, PartialEq)]
pub enum Attribute {
    /// [0]: https://docs.oracle.com/javase/specs/jvms/se15/html/jvms-4.html#jvms-4.7.9
    Signature { signature: String },

    /// Checked exceptions a method may throw, as binary class names
    ///
    /// [0]: https://docs.oracle.com/javase/specs/jvms/se15/html/jvms-4.html#jvms-4.7.5
    Exceptions { exceptions: Vec<String> },

    /// [0]: https://docs.oracle.com/javase/specs/jvms/se15/html/jvms-4.html#jvms-4.7.6
    InnerClasses { inners: Vec<InnerClass> },

    /// [0]: https://docs.oracle.com/javase/specs/jvms/se15/html/jvms-4.html#jvms-4.7.2
    ConstantValue { value: ConstValue },

    /// [0]: https://docs.oracle.com/javase/specs/jvms/se15/html/jvms-4.html#jvms-4.7.16
    RuntimeVisibleAnnotations { annotations: Vec<AnnotationInfo> },

    /// [0]: https://docs.oracle.com/javase/specs/jvms/se15/html/jvms-4.html#jvms-4.7.17
    RuntimeInvisibleAnnotations { annotations: Vec<AnnotationInfo> },

    /// Default value of an annotation interface element
    ///
    /// [0]: https://docs.oracle.com/javase/specs/jvms/se15/html/jvms-4.html#jvms-4.7.22
    AnnotationDefault { value: ElementValue },

    /// One list of annotations per formal parameter
    ///
    /// [0]: https://docs.oracle.com/javase/specs/jvms/se15/html/jvms-4.html#jvms-4.7.18
    RuntimeVisibleParameterAnnotations { parameters: Vec<Vec<AnnotationInfo>> },

    /// [0]: https://docs.oracle.com/javase/specs/jvms/se15/html/jvms-4.html#jvms-4.7.19
    RuntimeInvisibleParameterAnnotations { parameters: Vec<Vec<AnnotationInfo>> },

    /// [0]: https://docs.oracle.com/javase/specs/jvms/se15/html/jvms-4.html#jvms-4.7.15
    Deprecated,

    /// [0]: https://docs.oracle.com/javase/specs/jvms/se15/html/jvms-4.html#jvms-4.7.20
    RuntimeVisibleTypeAnnotations { annotations: Vec<TypeAnnotationInfo> },

    /// [0]: https://docs.oracle.com/javase/specs/jvms/se15/html/jvms-4.html#jvms-4.7.21
    RuntimeInvisibleTypeAnnotations { annotations: Vec<TypeAnnotationInfo> },

    /// [0]: https://docs.oracle.com/javase/specs/jvms/se15/html/jvms-4.html#jvms-4.7.24
    MethodParameters { parameters: Vec<MethodParameter> },
}

impl Attribute {
    pub fn signature(signature: impl Into<String>) -> Attribute {
        Attribute::Signature {
            signature: signature.into(),
        }
    }

    pub fn exceptions(exceptions: Vec<String>) -> Result<Attribute, Error> {
        Attribute::Exceptions { exceptions }.checked()
    }

    pub fn inner_classes(inners: Vec<InnerClass>) -> Result<Attribute, Error> {
        Attribute::InnerClasses { inners }.checked()
    }

    pub fn constant_value(value: ConstValue) -> Attribute {
        Attribute::ConstantValue { value }
    }

    /// `RuntimeVisibleAnnotations` or `RuntimeInvisibleAnnotations`
    pub fn annotations(visible: bool, annotations: Vec<AnnotationInfo>) -> Result<Attribute, Error> {
        if visible {
            Attribute::RuntimeVisibleAnnotations { annotations }.checked()
        } else {
            Attribute::RuntimeInvisibleAnnotations { annotations }.checked()
        }
    }

    pub fn annotation_default(value: ElementValue) -> Attribute {
        Attribute::AnnotationDefault { value }
    }

    /// `RuntimeVisibleParameterAnnotations` or `RuntimeInvisibleParameterAnnotations`
    pub fn parameter_annotations(
        visible: bool,
        parameters: Vec<Vec<AnnotationInfo>>,
    ) -> Result<Attribute, Error> {
        if visible {
            Attribute::RuntimeVisibleParameterAnnotations { parameters }.checked()
        } else {
            Attribute::RuntimeInvisibleParameterAnnotations { parameters }.checked()
        }
    }

    pub fn deprecated() -> Attribute {
        Attribute::Deprecated
    }

    /// `RuntimeVisibleTypeAnnotations` or `RuntimeInvisibleTypeAnnotations`
    pub fn type_annotations(
        visible: bool,
        annotations: Vec<TypeAnnotationInfo>,
    ) -> Result<Attribute, Error> {
        if visible {
            Attribute::RuntimeVisibleTypeAnnotations { annotations }.checked()
        } else {
            Attribute::RuntimeInvisibleTypeAnnotations { annotations }.checked()
        }
    }

    pub fn method_parameters(parameters: Vec<MethodParameter>) -> Result<Attribute, Error> {
        Attribute::MethodParameters { parameters }.checked()
    }

    pub fn kind(&self) -> Kind {
        match self {
            Attribute::Signature { .. } => Kind::Signature,
            Attribute::Exceptions { .. } => Kind::Exceptions,
            Attribute::InnerClasses { .. } => Kind::InnerClasses,
            Attribute::ConstantValue { .. } => Kind::ConstantValue,
            Attribute::RuntimeVisibleAnnotations { .. } => Kind::RuntimeVisibleAnnotations,
            Attribute::RuntimeInvisibleAnnotations { .. } => Kind::RuntimeInvisibleAnnotations,
            Attribute::AnnotationDefault { .. } => Kind::AnnotationDefault,
            Attribute::RuntimeVisibleParameterAnnotations { .. } => {
                Kind::RuntimeVisibleParameterAnnotations
            }
            Attribute::RuntimeInvisibleParameterAnnotations { .. } => {
                Kind::RuntimeInvisibleParameterAnnotations
            }
            Attribute::Deprecated => Kind::Deprecated,
            Attribute::RuntimeVisibleTypeAnnotations { .. } => Kind::RuntimeVisibleTypeAnnotations,
            Attribute::RuntimeInvisibleTypeAnnotations { .. } => {
                Kind::RuntimeInvisibleTypeAnnotations
            }
            Attribute::MethodParameters { .. } => Kind::MethodParameters,
        }
    }

    /// Check that every top-level list fits in the count that prefixes it
    ///
    /// Lists nested inside annotations are checked as they are encoded, which also happens
    /// before any of the attribute is written out.
    pub fn check_shape(&self) -> Result<(), Error> {
        match self {
            Attribute::Exceptions { exceptions } => {
                u16_count("exceptions", exceptions.len())?;
            }
            Attribute::InnerClasses { inners } => {
                u16_count("inner classes", inners.len())?;
            }
            Attribute::RuntimeVisibleAnnotations { annotations }
            | Attribute::RuntimeInvisibleAnnotations { annotations } => {
                u16_count("annotations", annotations.len())?;
            }
            Attribute::RuntimeVisibleParameterAnnotations { parameters }
            | Attribute::RuntimeInvisibleParameterAnnotations { parameters } => {
                u8_count("annotated parameters", parameters.len())?;
                for annotations in parameters {
                    u16_count("parameter annotations", annotations.len())?;
                }
            }
            Attribute::RuntimeVisibleTypeAnnotations { annotations }
            | Attribute::RuntimeInvisibleTypeAnnotations { annotations } => {
                u16_count("type annotations", annotations.len())?;
            }
            Attribute::MethodParameters { parameters } => {
                u8_count("method parameters", parameters.len())?;
            }
            Attribute::Signature { .. }
            | Attribute::ConstantValue { .. }
            | Attribute::AnnotationDefault { .. }
            | Attribute::Deprecated => (),
        }
        Ok(())
    }

    fn checked(self) -> Result<Attribute, Error> {
        self.check_shape()?;
        Ok(self)
    }
}

/// Entry in the `InnerClasses` attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InnerClass {
    /// Binary name of the inner class (eg. `java/util/Map$Entry`)
    pub inner_class: String,

    /// Binary name of the enclosing class
    pub outer_class: String,

    /// Simple name of the inner class (absent for anonymous classes)
    pub inner_name: Option<String>,

    pub access_flags: InnerClassAccessFlags,
}

/// Entry in the `MethodParameters` attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodParameter {
    /// Absent for parameters with no name (written as index 0)
    pub name: Option<String>,
    pub access_flags: ParameterAccessFlags,
}

/// Constant value of a field, or constant element value of an annotation
///
/// The variant doubles as the constant's kind, so the value always matches its kind.
#[derive(Debug, Clone, PartialEq)]
pub enum ConstValue {
    Int(i32),
    Char(u16),
    Short(i16),
    Byte(i8),
    Long(i64),
    Double(f64),
    Float(f32),
    Boolean(bool),
    String(String),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ConstKind {
    Int,
    Char,
    Short,
    Byte,
    Long,
    Double,
    Float,
    Boolean,
    String,
}

impl ConstValue {
    pub fn kind(&self) -> ConstKind {
        match self {
            ConstValue::Int(_) => ConstKind::Int,
            ConstValue::Char(_) => ConstKind::Char,
            ConstValue::Short(_) => ConstKind::Short,
            ConstValue::Byte(_) => ConstKind::Byte,
            ConstValue::Long(_) => ConstKind::Long,
            ConstValue::Double(_) => ConstKind::Double,
            ConstValue::Float(_) => ConstKind::Float,
            ConstValue::Boolean(_) => ConstKind::Boolean,
            ConstValue::String(_) => ConstKind::String,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn kind_names_round_trip() {
        for kind in Kind::ALL {
            assert_eq!(Kind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(Kind::from_name("Code"), None);
        assert_eq!(Kind::MethodParameters.to_string(), "MethodParameters");
    }

    #[test]
    fn constructors_agree_with_kind() {
        let visible = Attribute::annotations(true, vec![]).unwrap();
        let invisible = Attribute::annotations(false, vec![]).unwrap();
        assert_eq!(visible.kind(), Kind::RuntimeVisibleAnnotations);
        assert_eq!(invisible.kind(), Kind::RuntimeInvisibleAnnotations);
        assert_eq!(
            Attribute::parameter_annotations(false, vec![vec![]])
                .unwrap()
                .kind(),
            Kind::RuntimeInvisibleParameterAnnotations
        );
        assert_eq!(
            Attribute::type_annotations(true, vec![]).unwrap().kind(),
            Kind::RuntimeVisibleTypeAnnotations
        );
        assert_eq!(Attribute::deprecated().kind(), Kind::Deprecated);
    }

    #[test]
    fn too_many_method_parameters() {
        let parameter = MethodParameter {
            name: None,
            access_flags: ParameterAccessFlags::empty(),
        };
        assert!(Attribute::method_parameters(vec![parameter.clone(); 255]).is_ok());
        assert!(matches!(
            Attribute::method_parameters(vec![parameter; 256]),
            Err(Error::TooManyEntries {
                what: "method parameters",
                count: 256,
                max: 255
            })
        ));
    }

    #[test]
    fn too_many_annotated_parameters() {
        assert!(matches!(
            Attribute::parameter_annotations(true, vec![vec![]; 256]),
            Err(Error::TooManyEntries {
                what: "annotated parameters",
                ..
            })
        ));
    }

    #[test]
    fn too_many_exceptions() {
        let exceptions = vec![String::from("java/io/IOException"); 65536];
        assert!(matches!(
            Attribute::exceptions(exceptions),
            Err(Error::TooManyEntries { max: 65535, .. })
        ));
    }

    #[test]
    fn const_kinds() {
        assert_eq!(ConstValue::Char(0x41).kind(), ConstKind::Char);
        assert_eq!(ConstValue::Boolean(true).kind(), ConstKind::Boolean);
        assert_eq!(ConstValue::String(String::from("x")).kind(), ConstKind::String);
    }
}
