// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `shellflow flowscript` — a line-at-a-time interpreter.

use sf_flowscript::{evaluate_script, Environment};
use std::io::{BufRead, Write};

pub fn run() -> anyhow::Result<()> {
    let env = Environment::global();
    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();

    loop {
        print!("> ");
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();
        if line == "exit" {
            break;
        }
        if line.is_empty() {
            continue;
        }

        match evaluate_script(line, &env) {
            Ok(value) => println!("{}", value),
            Err(err) => println!("Error: {}", err),
        }
    }
    Ok(())
}
