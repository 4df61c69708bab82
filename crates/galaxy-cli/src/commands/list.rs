//! List command - files planned per environment and namespace

use galaxy_core::{Galaxy, Printer};

use crate::error::Result;

pub fn run(galaxy: &Galaxy) -> Result<()> {
    for (environment, inventories) in galaxy.results() {
        if let Some(inventory) = inventories.last() {
            println!("{}", Printer::files(environment, inventory));
        }
    }
    Ok(())
}
