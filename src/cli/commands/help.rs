//! help command - Show top-level or per-command help

use crate::cli::args::Cli;
use crate::cli::SilentExit;
use anyhow::Result;
use clap::CommandFactory;

/// Print help for `subcommand`, or the top-level help.
///
/// An unknown subcommand prints a notice and the top-level help, then fails
/// with status 1 and nothing on stderr.
pub fn help(subcommand: Option<&str>) -> Result<()> {
    let mut cmd = Cli::command();
    cmd.build();

    let Some(name) = subcommand else {
        print!("{}", cmd.render_help());
        return Ok(());
    };

    match cmd.find_subcommand_mut(name).map(|sub| sub.render_help()) {
        Some(rendered) => {
            print!("{}", rendered);
            Ok(())
        }
        None => {
            println!("Command '{}' does not exist.\n", name);
            print!("{}", cmd.render_help());
            Err(SilentExit(1).into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_subcommand_succeeds() {
        assert!(help(Some("save")).is_ok());
        assert!(help(None).is_ok());
    }

    #[test]
    fn unknown_subcommand_exits_silently() {
        let err = help(Some("frobnicate")).unwrap_err();
        let exit = err.downcast_ref::<SilentExit>().unwrap();
        assert_eq!(exit.0, 1);
    }
}
