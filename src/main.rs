
//! Prints the meta data of each exr file given on the command line.

use exrinfo::prelude::*;

fn main() {
    let paths: Vec<String> = std::env::args().skip(1).collect();

    if paths.is_empty() {
        eprintln!("usage: exrinfo imagefile [imagefile ...]");
        std::process::exit(1);
    }

    let mut failed = false;

    for path in &paths {
        match read_file_info(path) {
            Ok(info) => print!("{}", file_report(&info)),

            Err(error) => {
                eprintln!("{}: {}", path, error);
                failed = true;
            },
        }
    }

    if failed {
        std::process::exit(1);
    }
}
