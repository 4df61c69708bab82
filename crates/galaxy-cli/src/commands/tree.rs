//! Tree command

use galaxy_core::{Galaxy, Printer};

use crate::error::Result;

pub fn run(galaxy: &Galaxy) -> Result<()> {
    println!("{}", Printer::tree(galaxy.results()));
    Ok(())
}
