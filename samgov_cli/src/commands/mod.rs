pub mod attachments;
pub mod lookup;
pub mod search;
