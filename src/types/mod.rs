mod number;
mod value;

pub use number::Number;
pub use value::{DocValue, Object};
