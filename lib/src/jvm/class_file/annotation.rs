use crate::jvm::class_file::ConstValue;

/// Annotation as found in the `Runtime*Annotations` attributes and nested in element values
///
/// [0]: https://docs.oracle.com/javase/specs/jvms/se15/html/jvms-4.html#jvms-4.7.16
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationInfo {
    /// Field descriptor of the annotation interface (eg. `Ljava/lang/Deprecated;`)
    pub type_descriptor: String,

    /// Element-value pairs, in the order they are written
    pub element_value_pairs: Vec<ElementValuePair>,
}

impl AnnotationInfo {
    /// Annotation with no element-value pairs (eg. a marker annotation)
    pub fn new(type_descriptor: impl Into<String>) -> AnnotationInfo {
        AnnotationInfo {
            type_descriptor: type_descriptor.into(),
            element_value_pairs: vec![],
        }
    }

    /// Append an element-value pair
    pub fn with_element(mut self, name: impl Into<String>, value: ElementValue) -> AnnotationInfo {
        self.element_value_pairs.push(ElementValuePair {
            name: name.into(),
            value,
        });
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ElementValuePair {
    pub name: String,
    pub value: ElementValue,
}

/// Value of an annotation element
///
/// [0]: https://docs.oracle.com/javase/specs/jvms/se15/html/jvms-4.html#jvms-4.7.16.1
#[derive(Debug, Clone, PartialEq)]
pub enum ElementValue {
    /// Primitive or `String` constant
    Const(ConstValue),

    /// Enum constant
    Enum {
        /// Field descriptor of the enum class (eg. `Ljava/lang/annotation/RetentionPolicy;`)
        type_descriptor: String,
        const_name: String,
    },

    /// Class literal, given by its return descriptor (eg. `V` for `void.class`)
    Class { return_descriptor: String },

    /// Nested annotation
    Annotation(AnnotationInfo),

    Array(Vec<ElementValue>),
}

impl ElementValue {
    /// Tag byte which prefixes the encoded element value
    pub fn tag(&self) -> u8 {
        match self {
            ElementValue::Const(constant) => match constant {
                ConstValue::Byte(_) => b'B',
                ConstValue::Char(_) => b'C',
                ConstValue::Double(_) => b'D',
                ConstValue::Float(_) => b'F',
                ConstValue::Int(_) => b'I',
                ConstValue::Long(_) => b'J',
                ConstValue::Short(_) => b'S',
                ConstValue::Boolean(_) => b'Z',
                ConstValue::String(_) => b's',
            },
            ElementValue::Enum { .. } => b'e',
            ElementValue::Class { .. } => b'c',
            ElementValue::Annotation(_) => b'@',
            ElementValue::Array(_) => b'[',
        }
    }
}

/// Annotation on a use of a type
///
/// [0]: https://docs.oracle.com/javase/specs/jvms/se15/html/jvms-4.html#jvms-4.7.20
#[derive(Debug, Clone, PartialEq)]
pub struct TypeAnnotationInfo {
    pub target: TargetInfo,
    pub path: TypePath,
    pub annotation: AnnotationInfo,
}

/// Which type in a declaration or expression is annotated
///
/// The first group of targets appear on classes, fields, and methods. The second group only
/// appears in the type annotations of a `Code` attribute.
///
/// [0]: https://docs.oracle.com/javase/specs/jvms/se15/html/jvms-4.html#jvms-4.7.20.1
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetInfo {
    ClassTypeParameter { type_parameter_index: u8 },
    MethodTypeParameter { type_parameter_index: u8 },

    /// Supertype in `extends` or `implements` (`u16::MAX` for the superclass)
    ClassExtends { supertype_index: u16 },

    ClassTypeParameterBound { type_parameter_index: u8, bound_index: u8 },
    MethodTypeParameterBound { type_parameter_index: u8, bound_index: u8 },
    Field,
    MethodReturn,
    MethodReceiver,
    MethodFormalParameter { formal_parameter_index: u8 },

    /// Type in a `throws` clause, indexing the `Exceptions` attribute
    Throws { throws_type_index: u16 },

    LocalVariable { table: Vec<LocalVariableTarget> },
    ResourceVariable { table: Vec<LocalVariableTarget> },
    ExceptionParameter { exception_table_index: u16 },
    InstanceOf { offset: u16 },
    New { offset: u16 },
    ConstructorReference { offset: u16 },
    MethodReference { offset: u16 },
    Cast { offset: u16, type_argument_index: u8 },
    ConstructorInvocationTypeArgument { offset: u16, type_argument_index: u8 },
    MethodInvocationTypeArgument { offset: u16, type_argument_index: u8 },
    ConstructorReferenceTypeArgument { offset: u16, type_argument_index: u8 },
    MethodReferenceTypeArgument { offset: u16, type_argument_index: u8 },
}

impl TargetInfo {
    /// Value of the `target_type` byte
    pub fn target_type(&self) -> u8 {
        match self {
            TargetInfo::ClassTypeParameter { .. } => 0x00,
            TargetInfo::MethodTypeParameter { .. } => 0x01,
            TargetInfo::ClassExtends { .. } => 0x10,
            TargetInfo::ClassTypeParameterBound { .. } => 0x11,
            TargetInfo::MethodTypeParameterBound { .. } => 0x12,
            TargetInfo::Field => 0x13,
            TargetInfo::MethodReturn => 0x14,
            TargetInfo::MethodReceiver => 0x15,
            TargetInfo::MethodFormalParameter { .. } => 0x16,
            TargetInfo::Throws { .. } => 0x17,
            TargetInfo::LocalVariable { .. } => 0x40,
            TargetInfo::ResourceVariable { .. } => 0x41,
            TargetInfo::ExceptionParameter { .. } => 0x42,
            TargetInfo::InstanceOf { .. } => 0x43,
            TargetInfo::New { .. } => 0x44,
            TargetInfo::ConstructorReference { .. } => 0x45,
            TargetInfo::MethodReference { .. } => 0x46,
            TargetInfo::Cast { .. } => 0x47,
            TargetInfo::ConstructorInvocationTypeArgument { .. } => 0x48,
            TargetInfo::MethodInvocationTypeArgument { .. } => 0x49,
            TargetInfo::ConstructorReferenceTypeArgument { .. } => 0x4A,
            TargetInfo::MethodReferenceTypeArgument { .. } => 0x4B,
        }
    }
}

/// Live range of a local variable in a `localvar_target`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalVariableTarget {
    pub start_pc: u16,
    pub length: u16,
    pub index: u16,
}

/// Path to the annotated part of a compound type (empty when the whole type is annotated)
///
/// [0]: https://docs.oracle.com/javase/specs/jvms/se15/html/jvms-4.html#jvms-4.7.20.2
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypePath(pub Vec<TypePathEntry>);

impl TypePath {
    pub fn empty() -> TypePath {
        TypePath(vec![])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypePathEntry {
    pub kind: TypePathKind,

    /// Which type argument is entered (always 0 unless `kind` is `TypeArgument`)
    pub type_argument_index: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypePathKind {
    /// Deeper in an array type
    Array = 0,

    /// Deeper in a nested type
    Nested = 1,

    /// On the bound of a wildcard type argument
    Wildcard = 2,

    /// On a type argument of a parameterized type
    TypeArgument = 3,
}
