mod commands;
mod domain;
mod services;

use std::process::ExitCode;

use clap::{CommandFactory, Parser};

use crate::commands::base_commands::{CliArgs, Commands};
use crate::commands::check_cmd::check_command;
use crate::commands::schedule_cmd::schedule_command;

fn main() -> ExitCode {
    let args = CliArgs::parse();
    match args.command {
        cmd @ Commands::Schedule { .. } => schedule_command(cmd),
        cmd @ Commands::Check { .. } => check_command(cmd),
        Commands::Completions { shell } => {
            let mut cmd = CliArgs::command();
            clap_complete::generate(shell, &mut cmd, "projections", &mut std::io::stdout());
            ExitCode::SUCCESS
        }
    }
}
