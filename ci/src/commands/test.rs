use argh::FromArgs;
use xshell::cmd;

use crate::Flag;
use crate::Prepare;
use crate::PreparedCommand;

/// Runs the unit and integration tests.
#[derive(FromArgs, Default)]
#[argh(subcommand, name = "test")]
pub struct TestCommand {}

impl Prepare for TestCommand {
    fn prepare<'a>(&self, sh: &'a xshell::Shell, flags: Flag) -> Vec<PreparedCommand<'a>> {
        let no_fail_fast = flags
            .contains(Flag::KEEP_GOING)
            .then_some("--no-fail-fast");

        vec![PreparedCommand::new::<Self>(
            cmd!(sh, "cargo test --workspace --lib --bins --tests {no_fail_fast...}"),
            "Please fix failing tests in output above.",
        )]
    }
}
