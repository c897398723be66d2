/// Ledger, series and layout export.
pub mod export;
/// Lossy line streaming for descriptor and `.eio` files.
pub mod lines;
pub mod locate;
