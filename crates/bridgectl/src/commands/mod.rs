pub mod assess;
pub mod classify;
pub mod completion;
pub mod health;
pub mod request;
pub mod respond;
pub mod session;
