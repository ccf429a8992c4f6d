pub mod driver;

pub use driver::assemble;
