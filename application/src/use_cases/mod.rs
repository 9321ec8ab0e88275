//! Use cases of the dispatch flow

pub mod dispatch_message;
pub mod front_desk;
pub mod process_change_batch;
pub mod submit_question;

#[cfg(test)]
pub(crate) mod test_support;
