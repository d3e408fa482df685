pub mod cli;
pub mod execute;
pub mod ui;
pub mod utils;
pub mod wallets;
