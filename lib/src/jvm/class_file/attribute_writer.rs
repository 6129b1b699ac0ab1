use crate::jvm::class_file::{
    AnnotationValueWriter, AnnotationWriter, Attribute, ConstValue, ConstantIndex, ConstantPool,
    Kind, Utf8ConstantIndex,
};
use crate::jvm::{u16_count, u8_count, Error, Serialize};
use byteorder::WriteBytesExt;

/// Writes attributes as framed `attribute_info` records
///
/// Every record is `u2 attribute_name_index; u4 attribute_length; u1 info[attribute_length]`. The
/// body length is either computed up front from the attribute's shape (for bodies made of a
/// fixed number of fields per list entry), or measured by first encoding the body into a
/// temporary buffer (for bodies containing annotations, whose size depends on arbitrarily nested
/// element values).
///
/// Every constant the body refers to is resolved before the header is written, so a failure to
/// intern a constant never leaves a partially written record in the sink.
///
/// The writer borrows the pool mutably for as long as it lives: attributes going into one class
/// file must be written one after another, but writers for different class files (each with
/// their own pool) are completely independent.
pub struct AttributeWriter<'p, P: ConstantPool + ?Sized, A: AnnotationValueWriter = AnnotationWriter>
{
    pool: &'p mut P,
    annotation_writer: A,
}

impl<'p, P: ConstantPool + ?Sized> AttributeWriter<'p, P> {
    /// Make a writer which encodes annotations with [`AnnotationWriter`]
    pub fn new(pool: &'p mut P) -> AttributeWriter<'p, P> {
        AttributeWriter::with_annotation_writer(pool, AnnotationWriter)
    }
}

impl<'p, P: ConstantPool + ?Sized, A: AnnotationValueWriter> AttributeWriter<'p, P, A> {
    pub fn with_annotation_writer(pool: &'p mut P, annotation_writer: A) -> AttributeWriter<'p, P, A> {
        AttributeWriter {
            pool,
            annotation_writer,
        }
    }

    /// Append one framed attribute to the sink
    pub fn write<W: WriteBytesExt>(&mut self, attribute: Attribute, sink: &mut W) -> Result<(), Error> {
        attribute.check_shape()?;
        let kind = attribute.kind();
        let name_index = self.pool.utf8(kind.name())?;

        match attribute {
            Attribute::Signature { signature } => {
                let signature = self.pool.utf8(&signature)?;

                write_header(sink, kind, name_index, 2)?;
                signature.serialize(sink)?;
            }

            Attribute::Exceptions { exceptions } => {
                let count = u16_count("exceptions", exceptions.len())?;
                let exceptions = exceptions
                    .iter()
                    .map(|exception| self.pool.class_info(exception))
                    .collect::<Result<Vec<_>, _>>()?;

                write_header(sink, kind, name_index, 2 + 2 * count as u32)?;
                count.serialize(sink)?;
                for exception in exceptions {
                    exception.serialize(sink)?;
                }
            }

            Attribute::InnerClasses { inners } => {
                let count = u16_count("inner classes", inners.len())?;
                let mut entries = Vec::with_capacity(inners.len());
                for inner in &inners {
                    let inner_class = self.pool.class_info(&inner.inner_class)?;
                    let outer_class = self.pool.class_info(&inner.outer_class)?;
                    let inner_name = match &inner.inner_name {
                        Some(name) => self.pool.utf8(name)?.into(),
                        None => ConstantIndex(0),
                    };
                    entries.push((inner_class, outer_class, inner_name, inner.access_flags));
                }

                write_header(sink, kind, name_index, 2 + 8 * count as u32)?;
                count.serialize(sink)?;
                for (inner_class, outer_class, inner_name, access_flags) in entries {
                    inner_class.serialize(sink)?;
                    outer_class.serialize(sink)?;
                    inner_name.serialize(sink)?;
                    access_flags.serialize(sink)?;
                }
            }

            Attribute::ConstantValue { value } => {
                let value = constant_value_index(&mut *self.pool, &value)?;

                write_header(sink, kind, name_index, 2)?;
                value.serialize(sink)?;
            }

            Attribute::MethodParameters { parameters } => {
                let count = u8_count("method parameters", parameters.len())?;
                let mut entries = Vec::with_capacity(parameters.len());
                for parameter in &parameters {
                    let name = match &parameter.name {
                        Some(name) => self.pool.utf8(name)?.into(),
                        None => ConstantIndex(0),
                    };
                    entries.push((name, parameter.access_flags));
                }

                write_header(sink, kind, name_index, 1 + 4 * count as u32)?;
                count.serialize(sink)?;
                for (name, access_flags) in entries {
                    name.serialize(sink)?;
                    access_flags.serialize(sink)?;
                }
            }

            Attribute::Deprecated => write_header(sink, kind, name_index, 0)?,

            Attribute::RuntimeVisibleAnnotations { annotations }
            | Attribute::RuntimeInvisibleAnnotations { annotations } => {
                let mut body = vec![];
                u16_count("annotations", annotations.len())?.serialize(&mut body)?;
                for annotation in &annotations {
                    self.annotation_writer
                        .write_annotation(&mut *self.pool, annotation, &mut body)?;
                }
                write_buffered(sink, kind, name_index, body)?;
            }

            Attribute::AnnotationDefault { value } => {
                let mut body = vec![];
                self.annotation_writer
                    .write_element_value(&mut *self.pool, &value, &mut body)?;
                write_buffered(sink, kind, name_index, body)?;
            }

            Attribute::RuntimeVisibleParameterAnnotations { parameters }
            | Attribute::RuntimeInvisibleParameterAnnotations { parameters } => {
                let mut body = vec![];
                u8_count("annotated parameters", parameters.len())?.serialize(&mut body)?;
                for annotations in &parameters {
                    u16_count("parameter annotations", annotations.len())?.serialize(&mut body)?;
                    for annotation in annotations {
                        self.annotation_writer
                            .write_annotation(&mut *self.pool, annotation, &mut body)?;
                    }
                }
                write_buffered(sink, kind, name_index, body)?;
            }

            Attribute::RuntimeVisibleTypeAnnotations { annotations }
            | Attribute::RuntimeInvisibleTypeAnnotations { annotations } => {
                let mut body = vec![];
                u16_count("type annotations", annotations.len())?.serialize(&mut body)?;
                for annotation in &annotations {
                    self.annotation_writer
                        .write_type_annotation(&mut *self.pool, annotation, &mut body)?;
                }
                write_buffered(sink, kind, name_index, body)?;
            }
        }

        Ok(())
    }

    /// Append an attribute table: `u2 attributes_count` followed by each framed attribute
    pub fn write_table<W: WriteBytesExt>(
        &mut self,
        attributes: Vec<Attribute>,
        sink: &mut W,
    ) -> Result<(), Error> {
        u16_count("attributes", attributes.len())?.serialize(sink)?;
        for attribute in attributes {
            self.write(attribute, sink)?;
        }
        Ok(())
    }
}

fn write_header<W: WriteBytesExt>(
    sink: &mut W,
    kind: Kind,
    name_index: Utf8ConstantIndex,
    length: u32,
) -> Result<(), Error> {
    log::trace!("Writing {} attribute ({} bytes)", kind, length);
    name_index.serialize(sink)?;
    length.serialize(sink)?;
    Ok(())
}

/// Frame a body which was fully encoded ahead of time
fn write_buffered<W: WriteBytesExt>(
    sink: &mut W,
    kind: Kind,
    name_index: Utf8ConstantIndex,
    body: Vec<u8>,
) -> Result<(), Error> {
    let length = u32::try_from(body.len()).map_err(|_| Error::TooManyEntries {
        what: "attribute body bytes",
        count: body.len(),
        max: u32::MAX as usize,
    })?;
    write_header(sink, kind, name_index, length)?;
    sink.write_all(&body)?;
    Ok(())
}

/// Get or insert the loadable constant for a constant value
///
/// `char`, `short`, `byte`, and `boolean` have no constant of their own: like `int`, they are all
/// stored as `CONSTANT_Integer_info` (with `true` as 1 and `false` as 0).
pub(crate) fn constant_value_index<P: ConstantPool + ?Sized>(
    pool: &mut P,
    value: &ConstValue,
) -> Result<ConstantIndex, Error> {
    match value {
        ConstValue::Int(int) => pool.integer(*int),
        ConstValue::Char(c) => pool.integer(i32::from(*c)),
        ConstValue::Short(short) => pool.integer(i32::from(*short)),
        ConstValue::Byte(byte) => pool.integer(i32::from(*byte)),
        ConstValue::Boolean(boolean) => pool.integer(if *boolean { 1 } else { 0 }),
        ConstValue::Long(long) => pool.long_info(*long),
        ConstValue::Double(double) => pool.double_info(*double),
        ConstValue::Float(float) => pool.float_info(*float),
        ConstValue::String(string) => Ok(pool.string(string)?.into()),
    }
}
