mod accounts;
mod bbs;
mod rubrics;
mod sms;

pub use accounts::{ProfileUpdate, Registration};
pub use bbs::Page;
