//! Compare command - releases of every environment side by side

use console::style;
use galaxy_core::{Galaxy, Printer};

use crate::error::Result;

pub fn run(galaxy: &Galaxy) -> Result<()> {
    let table = Printer::table(galaxy.results());
    let mut lines = table.lines();

    if let Some(header) = lines.next() {
        println!("{}", style(header).bold());
    }
    for line in lines {
        println!("{}", line);
    }
    Ok(())
}
