pub mod alert;
pub mod auth;
pub mod event;
pub mod run;
pub mod source;
pub mod tags;
