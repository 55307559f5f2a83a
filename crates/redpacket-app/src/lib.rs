mod balance;
mod controller;
mod state;
#[cfg(test)]
mod test_utils;

pub use balance::*;
pub use controller::*;
pub use state::*;
