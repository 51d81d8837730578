//! 서비스 전반에서 사용되는 공통 타입.

mod currency;
mod key;
mod series;
mod timeframe;

pub use currency::*;
pub use key::*;
pub use series::*;
pub use timeframe::*;
