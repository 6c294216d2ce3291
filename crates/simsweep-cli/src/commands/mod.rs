pub mod expand;
pub mod extract;
pub mod generate;
