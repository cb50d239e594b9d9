pub mod advice;
pub mod calendar;
pub mod error;
pub mod factors;
pub mod scorer;
pub mod zones;


pub use calendar::*;
pub use error::ScoreError;
pub use factors::*;
pub use scorer::*;
pub use zones::*;
