//! A javap-style disassembler demo consuming `jclassfile`.
//!
//! Kept as an external collaborator rather than part of the library: CLI
//! argument handling and output formatting carry no invariants of their
//! own.

use std::fs;
use std::path::PathBuf;

use clap::Parser;
use jclassfile::attributes::Attribute;
use jclassfile::bytecode::{
    self, LookupSwitchVisitor, NoOperandVisitor, OneOperandVisitor, TableSwitchVisitor, TwoOperandVisitor,
    Visitors,
};
use jclassfile::error::ContextStack;
use jclassfile::opcode::Opcode;
use jclassfile::ClassFile;

#[derive(Parser, Debug)]
#[command(author, version, about = "Disassembles a JVM class file", long_about = None)]
struct Args {
    /// Path to a .class file
    #[arg(value_name = "CLASS")]
    class_file: PathBuf,

    /// Disassemble the bytecode of each method's Code attribute
    #[arg(short = 'c', long)]
    disassemble: bool,

    /// Print line number tables alongside disassembly
    #[arg(short, long)]
    line: bool,
}

fn main() {
    let args = Args::parse();

    if let Err(err) = run(&args) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let bytes = fs::read(&args.class_file)?;
    let class_file = jclassfile::parse(&bytes)?;

    print_summary(&class_file)?;

    if let Err(err) = class_file.check_access_flags() {
        println!("warning: access-flag combination invalid: {err}");
    }

    if args.disassemble {
        disassemble_methods(&class_file, args.line)?;
    }

    Ok(())
}

fn print_summary(class_file: &ClassFile) -> Result<(), Box<dyn std::error::Error>> {
    let ctx = ContextStack::new();

    for attribute in &class_file.attributes {
        if let Attribute::SourceFile { sourcefile_index } = attribute {
            println!("Compiled from \"{}\"", class_file.constant_pool.utf8(*sourcefile_index, &ctx)?);
        }
    }

    println!(
        "class {} extends {}",
        class_file.this_class_name()?,
        class_file.super_class_name()?.unwrap_or("(none)"),
    );
    println!("  minor version: {}", class_file.version.minor);
    println!("  major version: {}", class_file.version.major);
    println!("  flags: {:?}", class_file.access_flags);
    println!("  constant pool entries: {}", class_file.constant_pool.count());

    for method in &class_file.methods {
        let name = class_file.constant_pool.utf8(method.name_index, &ctx)?;
        let descriptor = class_file.constant_pool.utf8(method.descriptor_index, &ctx)?;
        println!("  {descriptor} {name}({:?})", method.access_flags);
    }

    Ok(())
}

fn disassemble_methods(class_file: &ClassFile, with_lines: bool) -> Result<(), Box<dyn std::error::Error>> {
    let ctx = ContextStack::new();
    for method in &class_file.methods {
        let name = class_file.constant_pool.utf8(method.name_index, &ctx)?;
        for attribute in &method.attributes {
            let Attribute::Code(code) = attribute else { continue };
            println!("\n  Code for {name}:");
            println!("    stack={}, locals={}", code.max_stack, code.max_locals);

            let mut printer = PrintingVisitor::default();
            let mut visitors = Visitors {
                no_operand: &mut printer,
                one_operand: &mut printer,
                two_operand: &mut printer,
                lookup_switch: &mut printer,
                table_switch: &mut printer,
            };
            bytecode::parse_bytecode(&code.code, &mut visitors)?;

            if with_lines {
                for nested in &code.attributes {
                    if let Attribute::LineNumberTable(entries) = nested {
                        println!("    LineNumberTable:");
                        for entry in entries {
                            println!("      line {}: {}", entry.line_number, entry.start_pc);
                        }
                    }
                }
            }
        }
    }
    Ok(())
}

#[derive(Default)]
struct PrintingVisitor;

impl NoOperandVisitor for PrintingVisitor {
    fn visit(&mut self, position: u64, opcode: Opcode) {
        println!("    {position:>5}: {}", opcode.mnemonic());
    }
}

impl OneOperandVisitor for PrintingVisitor {
    fn visit(&mut self, position: u64, opcode: Opcode, operand: i32) {
        println!("    {position:>5}: {} {operand}", opcode.mnemonic());
    }
}

impl TwoOperandVisitor for PrintingVisitor {
    fn visit(&mut self, position: u64, opcode: Opcode, operand1: i32, operand2: i32) {
        println!("    {position:>5}: {} {operand1}, {operand2}", opcode.mnemonic());
    }
}

impl LookupSwitchVisitor for PrintingVisitor {
    fn visit(&mut self, position: u64, default_offset: i32, pairs: &[u8]) {
        println!("    {position:>5}: lookupswitch default:{default_offset} ({} pair(s))", pairs.len() / 8);
    }
}

impl TableSwitchVisitor for PrintingVisitor {
    fn visit(&mut self, position: u64, default_offset: i32, low: i32, high: i32, _jump_offsets: &[u8]) {
        println!("    {position:>5}: tableswitch {low}..{high}, default:{default_offset}");
    }
}
