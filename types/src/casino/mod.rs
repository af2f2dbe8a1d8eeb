mod constants;
mod game;
mod ledger;
mod sports;

pub use constants::*;
pub use game::*;
pub use ledger::*;
pub use sports::*;

#[cfg(test)]
mod tests;
