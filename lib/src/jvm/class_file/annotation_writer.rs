use super::attribute_writer::constant_value_index;
use crate::jvm::class_file::{
    AnnotationInfo, ConstValue, ConstantPool, ElementValue, TargetInfo, TypeAnnotationInfo,
    TypePath,
};
use crate::jvm::{u16_count, u8_count, Error, Serialize};

/// Encoder for annotations, element values, and type annotations
///
/// Each method appends one self-contained structure to the sink, interning whatever it refers to
/// into the pool. The sink is always an in-memory buffer: the attribute writer measures what was
/// written before framing it.
pub trait AnnotationValueWriter {
    /// Write an `annotation` structure
    fn write_annotation<P: ConstantPool + ?Sized>(
        &self,
        pool: &mut P,
        annotation: &AnnotationInfo,
        sink: &mut Vec<u8>,
    ) -> Result<(), Error>;

    /// Write an `element_value` structure
    fn write_element_value<P: ConstantPool + ?Sized>(
        &self,
        pool: &mut P,
        value: &ElementValue,
        sink: &mut Vec<u8>,
    ) -> Result<(), Error>;

    /// Write a `type_annotation` structure
    fn write_type_annotation<P: ConstantPool + ?Sized>(
        &self,
        pool: &mut P,
        annotation: &TypeAnnotationInfo,
        sink: &mut Vec<u8>,
    ) -> Result<(), Error>;
}

/// Annotation encoder following the class file format
///
/// [0]: https://docs.oracle.com/javase/specs/jvms/se15/html/jvms-4.html#jvms-4.7.16
#[derive(Copy, Clone, Debug, Default)]
pub struct AnnotationWriter;

impl AnnotationValueWriter for AnnotationWriter {
    fn write_annotation<P: ConstantPool + ?Sized>(
        &self,
        pool: &mut P,
        annotation: &AnnotationInfo,
        sink: &mut Vec<u8>,
    ) -> Result<(), Error> {
        let pairs = &annotation.element_value_pairs;
        let num_pairs = u16_count("element value pairs", pairs.len())?;

        pool.utf8(&annotation.type_descriptor)?.serialize(sink)?;
        num_pairs.serialize(sink)?;
        for pair in pairs {
            pool.utf8(&pair.name)?.serialize(sink)?;
            self.write_element_value(pool, &pair.value, sink)?;
        }
        Ok(())
    }

    fn write_element_value<P: ConstantPool + ?Sized>(
        &self,
        pool: &mut P,
        value: &ElementValue,
        sink: &mut Vec<u8>,
    ) -> Result<(), Error> {
        value.tag().serialize(sink)?;
        match value {
            // Unlike a `ConstantValue`, string elements point straight at the UTF-8 entry
            ElementValue::Const(ConstValue::String(string)) => {
                pool.utf8(string)?.serialize(sink)?;
            }
            ElementValue::Const(constant) => {
                constant_value_index(pool, constant)?.serialize(sink)?;
            }
            ElementValue::Enum {
                type_descriptor,
                const_name,
            } => {
                pool.utf8(type_descriptor)?.serialize(sink)?;
                pool.utf8(const_name)?.serialize(sink)?;
            }
            ElementValue::Class { return_descriptor } => {
                pool.utf8(return_descriptor)?.serialize(sink)?;
            }
            ElementValue::Annotation(annotation) => {
                self.write_annotation(pool, annotation, sink)?;
            }
            ElementValue::Array(values) => {
                u16_count("array element values", values.len())?.serialize(sink)?;
                for value in values {
                    self.write_element_value(pool, value, sink)?;
                }
            }
        }
        Ok(())
    }

    fn write_type_annotation<P: ConstantPool + ?Sized>(
        &self,
        pool: &mut P,
        annotation: &TypeAnnotationInfo,
        sink: &mut Vec<u8>,
    ) -> Result<(), Error> {
        write_target_info(&annotation.target, sink)?;
        write_type_path(&annotation.path, sink)?;
        self.write_annotation(pool, &annotation.annotation, sink)
    }
}

/// Write `target_type` followed by the matching `target_info` union member
fn write_target_info(target: &TargetInfo, sink: &mut Vec<u8>) -> Result<(), Error> {
    target.target_type().serialize(sink)?;
    match target {
        TargetInfo::ClassTypeParameter {
            type_parameter_index,
        }
        | TargetInfo::MethodTypeParameter {
            type_parameter_index,
        } => type_parameter_index.serialize(sink)?,

        TargetInfo::ClassExtends { supertype_index } => supertype_index.serialize(sink)?,

        TargetInfo::ClassTypeParameterBound {
            type_parameter_index,
            bound_index,
        }
        | TargetInfo::MethodTypeParameterBound {
            type_parameter_index,
            bound_index,
        } => {
            type_parameter_index.serialize(sink)?;
            bound_index.serialize(sink)?;
        }

        // `empty_target`
        TargetInfo::Field | TargetInfo::MethodReturn | TargetInfo::MethodReceiver => (),

        TargetInfo::MethodFormalParameter {
            formal_parameter_index,
        } => formal_parameter_index.serialize(sink)?,

        TargetInfo::Throws { throws_type_index } => throws_type_index.serialize(sink)?,

        TargetInfo::LocalVariable { table } | TargetInfo::ResourceVariable { table } => {
            u16_count("local variable targets", table.len())?.serialize(sink)?;
            for entry in table {
                entry.start_pc.serialize(sink)?;
                entry.length.serialize(sink)?;
                entry.index.serialize(sink)?;
            }
        }

        TargetInfo::ExceptionParameter {
            exception_table_index,
        } => exception_table_index.serialize(sink)?,

        TargetInfo::InstanceOf { offset }
        | TargetInfo::New { offset }
        | TargetInfo::ConstructorReference { offset }
        | TargetInfo::MethodReference { offset } => offset.serialize(sink)?,

        TargetInfo::Cast {
            offset,
            type_argument_index,
        }
        | TargetInfo::ConstructorInvocationTypeArgument {
            offset,
            type_argument_index,
        }
        | TargetInfo::MethodInvocationTypeArgument {
            offset,
            type_argument_index,
        }
        | TargetInfo::ConstructorReferenceTypeArgument {
            offset,
            type_argument_index,
        }
        | TargetInfo::MethodReferenceTypeArgument {
            offset,
            type_argument_index,
        } => {
            offset.serialize(sink)?;
            type_argument_index.serialize(sink)?;
        }
    }
    Ok(())
}

fn write_type_path(path: &TypePath, sink: &mut Vec<u8>) -> Result<(), Error> {
    u8_count("type path entries", path.0.len())?.serialize(sink)?;
    for entry in &path.0 {
        (entry.kind as u8).serialize(sink)?;
        entry.type_argument_index.serialize(sink)?;
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::jvm::class_file::{
        ConstantIndex, ConstantsPool, LocalVariableTarget, TypePathEntry, TypePathKind,
    };

    fn encode_annotation(pool: &mut ConstantsPool, annotation: &AnnotationInfo) -> Vec<u8> {
        let mut out = vec![];
        AnnotationWriter
            .write_annotation(pool, annotation, &mut out)
            .unwrap();
        out
    }

    #[test]
    fn marker_annotation() {
        let mut pool = ConstantsPool::new();
        let bytes = encode_annotation(&mut pool, &AnnotationInfo::new("Ljava/lang/Override;"));
        assert_eq!(bytes, vec![0, 1, 0, 0]);
    }

    #[test]
    fn constant_elements() {
        let mut pool = ConstantsPool::new();
        let annotation = AnnotationInfo::new("LA;")
            .with_element("flag", ElementValue::Const(ConstValue::Boolean(true)))
            .with_element("name", ElementValue::Const(ConstValue::String("x".into())))
            .with_element("big", ElementValue::Const(ConstValue::Long(5)));
        let bytes = encode_annotation(&mut pool, &annotation);

        assert_eq!(
            bytes,
            vec![
                0, 1, // type_index: "LA;"
                0, 3, // num_element_value_pairs
                0, 2, b'Z', 0, 3, // flag = #3 Integer 1
                0, 4, b's', 0, 5, // name = #5 Utf8 "x"
                0, 6, b'J', 0, 7, // big = #7 Long 5
            ]
        );
        assert_eq!(
            pool.get(ConstantIndex(3)),
            Some(&crate::jvm::class_file::Constant::Integer(1))
        );
        assert_eq!(pool.next_index(), 9);
    }

    #[test]
    fn char_and_byte_share_integer_entries() {
        let mut pool = ConstantsPool::new();
        let annotation = AnnotationInfo::new("LA;")
            .with_element("c", ElementValue::Const(ConstValue::Char(65)))
            .with_element("b", ElementValue::Const(ConstValue::Byte(65)));
        let bytes = encode_annotation(&mut pool, &annotation);
        assert_eq!(&bytes[4..9], &[0, 2, b'C', 0, 3]);
        assert_eq!(&bytes[9..14], &[0, 4, b'B', 0, 3]);
    }

    #[test]
    fn nested_values() {
        let mut pool = ConstantsPool::new();
        let annotation = AnnotationInfo::new("LOuter;").with_element(
            "value",
            ElementValue::Array(vec![
                ElementValue::Enum {
                    type_descriptor: "LE;".into(),
                    const_name: "ONE".into(),
                },
                ElementValue::Class {
                    return_descriptor: "V".into(),
                },
                ElementValue::Annotation(AnnotationInfo::new("LInner;")),
            ]),
        );
        let bytes = encode_annotation(&mut pool, &annotation);
        assert_eq!(
            bytes,
            vec![
                0, 1, 0, 1, // LOuter; with one pair
                0, 2, b'[', 0, 3, // value = array of 3
                b'e', 0, 3, 0, 4, // LE;.ONE
                b'c', 0, 5, // V
                b'@', 0, 6, 0, 0, // @LInner;
            ]
        );
    }

    #[test]
    fn type_annotation_with_path() {
        let mut pool = ConstantsPool::new();
        let annotation = TypeAnnotationInfo {
            target: TargetInfo::MethodFormalParameter {
                formal_parameter_index: 1,
            },
            path: TypePath(vec![
                TypePathEntry {
                    kind: TypePathKind::TypeArgument,
                    type_argument_index: 0,
                },
                TypePathEntry {
                    kind: TypePathKind::Array,
                    type_argument_index: 0,
                },
            ]),
            annotation: AnnotationInfo::new("LNonNull;"),
        };
        let mut bytes = vec![];
        AnnotationWriter
            .write_type_annotation(&mut pool, &annotation, &mut bytes)
            .unwrap();
        assert_eq!(bytes, vec![0x16, 1, 2, 3, 0, 0, 0, 0, 1, 0, 0]);
    }

    #[test]
    fn local_variable_target() {
        let mut bytes = vec![];
        let target = TargetInfo::ResourceVariable {
            table: vec![LocalVariableTarget {
                start_pc: 4,
                length: 10,
                index: 2,
            }],
        };
        write_target_info(&target, &mut bytes).unwrap();
        assert_eq!(bytes, vec![0x41, 0, 1, 0, 4, 0, 10, 0, 2]);
    }

    #[test]
    fn overlong_type_path() {
        let mut pool = ConstantsPool::new();
        let annotation = TypeAnnotationInfo {
            target: TargetInfo::Field,
            path: TypePath(vec![
                TypePathEntry {
                    kind: TypePathKind::Array,
                    type_argument_index: 0,
                };
                256
            ]),
            annotation: AnnotationInfo::new("LA;"),
        };
        let mut bytes = vec![];
        assert!(matches!(
            AnnotationWriter.write_type_annotation(&mut pool, &annotation, &mut bytes),
            Err(Error::TooManyEntries {
                what: "type path entries",
                ..
            })
        ));
    }
}
