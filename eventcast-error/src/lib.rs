//! Ошибки eventcast.
//!
//! - `status_code`: числовые коды статуса и их классификация.
//! - `ext`: трейт [`ErrorExt`], общий для всех ошибок крейта.
//! - `stack`: [`StackError`] с цепочкой контекстов.
//! - `types`: типизированные ошибки брокера, кодека, сети и конфигурации.

pub mod ext;
pub mod stack;
pub mod status_code;
pub mod types;

pub use ext::*;
pub use stack::*;
pub use status_code::*;
pub use types::*;

pub type EventcastResult<T> = Result<T, StackError>;
