//! Example converting a file and printing what happened.
//!
//! Run with: cargo run --example convert_file -- data.csv data.xml

use std::env;
use std::path::PathBuf;

use tabconv::{Converter, WriterSink};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = env::args().skip(1);
    let (Some(input), Some(output)) = (args.next(), args.next()) else {
        eprintln!("usage: convert_file <input> <output>");
        std::process::exit(2);
    };
    let (input, output) = (PathBuf::from(input), PathBuf::from(output));

    let converter = Converter::new();
    let mut sink = WriterSink::new(std::io::stdout());

    println!("=== Input preview ===");
    converter.preview(&input, &mut sink)?;

    println!("\n=== Conversion ===");
    let report = converter.convert(&input, &output, &mut sink)?;
    println!("Rows: {}", report.rows);
    println!("Columns: {}", report.columns);
    println!("Bytes written: {}", report.bytes_written);

    Ok(())
}
