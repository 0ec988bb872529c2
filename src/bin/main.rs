use std::process::exit;

use clap::Parser;
use wol_alias::cmd::Cmd;

fn main() {
    let cmd = Cmd::parse();
    exit(match cmd.main() {
        Ok(..) => 0,
        Err(e) => {
            e.print_error();
            e.exit_code()
        }
    })
}
