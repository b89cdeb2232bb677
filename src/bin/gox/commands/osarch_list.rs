//! `gox --osarch-list`

use anyhow::Result;

use crate::cli::Cli;
use gox::ops::osarch_list;

pub fn execute(cli: Cli) -> Result<()> {
    let config = super::current_config()?;
    let gocmd = super::gocmd(cli.gocmd, &config);

    print!("{}", osarch_list(&gocmd)?);
    Ok(())
}
