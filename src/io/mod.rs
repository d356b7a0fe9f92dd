//! I/O utilities for exporting simulation results.
pub mod export;
