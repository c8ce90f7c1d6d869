use std::path::Path;

use anyhow::Result;

use cairn::domain::services::SecurityScanner;
use cairn::presentation::{exit, render_scan, OutputFormat};

use super::{load_context, print_error, Globals};

pub fn cmd_scan(path: &Path, globals: &Globals) -> Result<i32> {
    let context = match load_context(path) {
        Ok(context) => context,
        Err(err) => {
            print_error(&err, globals.json);
            return Ok(exit::INVALID);
        }
    };

    let report = SecurityScanner::new().scan_context(&context);
    let rendered = render_scan(&report, path, OutputFormat::from_flag(globals.json));
    if globals.json {
        println!("{}", rendered);
    } else {
        print!("{}", rendered);
    }

    Ok(if report.is_safe {
        exit::SUCCESS
    } else {
        exit::SECURITY
    })
}
