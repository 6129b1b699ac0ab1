mod args;

use classattr::jvm::class_file::*;
use classattr::jvm::{u16_count, Error};

use clap::{crate_version, value_parser, Arg, ArgAction, Command};
use std::io::{self, Write};

fn main() -> Result<(), Error> {
    env_logger::init();

    let matches = Command::new("Class file attribute encoder")
        .version(crate_version!())
        .author("Alec Theriault <alec.theriault@gmail.com>")
        .about("Encode JVM class file attributes and dump the bytes and constant pool")
        .arg(
            Arg::new("signature")
                .long("signature")
                .value_name("SIG")
                .help("Add a `Signature` attribute (eg. `Ljava/util/List<TT;>;`)"),
        )
        .arg(
            Arg::new("exception")
                .long("exception")
                .value_name("CLASS")
                .action(ArgAction::Append)
                .help("Add a class to the `Exceptions` attribute (eg. `java/io/IOException`)"),
        )
        .arg(
            Arg::new("inner")
                .long("inner")
                .value_name("INNER:OUTER:NAME:FLAGS")
                .action(ArgAction::Append)
                .value_parser(args::parse_inner_class)
                .help("Add an entry to the `InnerClasses` attribute (empty NAME if anonymous)"),
        )
        .arg(
            Arg::new("constant")
                .long("constant")
                .value_name("KIND:VALUE")
                .value_parser(args::parse_constant)
                .help("Add a `ConstantValue` attribute (eg. `int:42`, `string:hello`)"),
        )
        .arg(
            Arg::new("annotation")
                .long("annotation")
                .value_name("DESC")
                .action(ArgAction::Append)
                .help("Add a marker annotation to `RuntimeVisibleAnnotations`"),
        )
        .arg(
            Arg::new("parameter")
                .long("parameter")
                .value_name("NAME[:FLAGS]")
                .action(ArgAction::Append)
                .value_parser(args::parse_parameter)
                .help("Add an entry to `MethodParameters` (`_` for an unnamed parameter)"),
        )
        .arg(
            Arg::new("deprecated")
                .long("deprecated")
                .action(ArgAction::SetTrue)
                .help("Add a `Deprecated` attribute"),
        )
        .arg(
            Arg::new("reserve")
                .long("reserve")
                .value_name("COUNT")
                .value_parser(value_parser!(u16))
                .help("Pre-populate the pool with this many placeholder entries"),
        )
        .get_matches();

    let mut attributes = vec![];
    if let Some(signature) = matches.get_one::<String>("signature") {
        attributes.push(Attribute::signature(signature.as_str()));
    }
    if let Some(exceptions) = matches.get_many::<String>("exception") {
        attributes.push(Attribute::exceptions(exceptions.cloned().collect())?);
    }
    if let Some(inners) = matches.get_many::<InnerClass>("inner") {
        attributes.push(Attribute::inner_classes(inners.cloned().collect())?);
    }
    if let Some(constant) = matches.get_one::<ConstValue>("constant") {
        attributes.push(Attribute::constant_value(constant.clone()));
    }
    if let Some(descriptors) = matches.get_many::<String>("annotation") {
        let annotations = descriptors
            .map(|descriptor| AnnotationInfo::new(descriptor.as_str()))
            .collect();
        attributes.push(Attribute::annotations(true, annotations)?);
    }
    if let Some(parameters) = matches.get_many::<MethodParameter>("parameter") {
        attributes.push(Attribute::method_parameters(parameters.cloned().collect())?);
    }
    if matches.get_flag("deprecated") {
        attributes.push(Attribute::deprecated());
    }

    let mut pool = ConstantsPool::new();
    if let Some(reserved) = matches.get_one::<u16>("reserve") {
        log::info!("Reserving {} pool entries", reserved);
        for i in 0..*reserved {
            pool.utf8(&format!("reserved${}", i))?;
        }
    }

    // Encode each record separately so they can be printed one per line
    let attributes_count = u16_count("attributes", attributes.len())?;
    let mut records = vec![];
    let mut writer = AttributeWriter::new(&mut pool);
    for attribute in attributes {
        let kind = attribute.kind();
        let mut record = vec![];
        writer.write(attribute, &mut record)?;
        records.push((kind, record));
    }
    log::info!("Encoded {} attributes", records.len());

    let stdout = io::stdout();
    let mut out = stdout.lock();
    writeln!(out, "attributes_count: {}", hex(&attributes_count.to_be_bytes()))?;
    for (kind, record) in &records {
        writeln!(out, "{}: {}", kind, hex(record))?;
    }
    writeln!(out, "constant_pool_count: {}", pool.next_index())?;
    for (index, constant) in pool.iter() {
        writeln!(out, "  #{} = {}", index.0, describe(constant))?;
    }

    Ok(())
}

/// Space-separated pairs of hex digits
fn hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|byte| format!("{:02x}", byte))
        .collect::<Vec<_>>()
        .join(" ")
}

fn describe(constant: &Constant) -> String {
    match constant {
        Constant::Class(name) => format!("Class #{}", (name.0).0),
        Constant::String(contents) => format!("String #{}", (contents.0).0),
        Constant::Integer(integer) => format!("Integer {}", integer),
        Constant::Float(float) => format!("Float {:?}", float),
        Constant::Long(long) => format!("Long {}", long),
        Constant::Double(double) => format!("Double {:?}", double),
        Constant::Utf8(utf8) => format!("Utf8 {:?}", utf8),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn hex_bytes() {
        assert_eq!(hex(&[]), "");
        assert_eq!(hex(&[0x00, 0x0a, 0xff]), "00 0a ff");
    }

    #[test]
    fn describe_constants() {
        let mut pool = ConstantsPool::new();
        let class = pool.class_info("java/lang/Object").unwrap();
        assert_eq!(describe(pool.get(class.0).unwrap()), "Class #1");
        assert_eq!(describe(&Constant::Double(2.0)), "Double 2.0");
        assert_eq!(describe(&Constant::Utf8(String::from("a\"b"))), "Utf8 \"a\\\"b\"");
    }
}
