mod forms;
mod upload;

pub use forms::*;
pub use upload::*;
