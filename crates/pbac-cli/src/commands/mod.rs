pub mod compat;
pub mod expand;
pub mod replay;
