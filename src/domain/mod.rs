pub mod batch_query;
pub mod subscriber_email;
pub mod subscriber_entry;
