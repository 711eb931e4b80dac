#![allow(dead_code)]

use flate2::write::GzEncoder;
use flate2::Compression;
use std::io::Write;
use std::path::{Path, PathBuf};

/// A few rows in the layout of the bank marketing file (semicolon delimited, quoted text).
pub const BANK_SEMICOLON: &str = "\"age\";\"job\";\"marital\";\"balance\";\"duration\";\"y\"
58;\"management\";\"married\";2143;261;\"no\"
44;\"technician\";\"single\";29;151;\"no\"
33;\"entrepreneur\";\"married\";2;76;\"yes\"
47;\"blue-collar\";\"married\";1506;92;\"no\"
33;\"unknown\";\"single\";1;198;\"no\"
35;\"management\";\"married\";231;139;\"yes\"
28;\"management\";\"single\";447;217;\"yes\"
42;\"entrepreneur\";\"divorced\";2;380;\"no\"
";

pub fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

pub fn write_gzip(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    let file = std::fs::File::create(&path).unwrap();
    let mut encoder = GzEncoder::new(file, Compression::default());
    encoder.write_all(contents.as_bytes()).unwrap();
    encoder.finish().unwrap();
    path
}
